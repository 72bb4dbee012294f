//! Calendar-day bucketing of the event stream.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dose::DoseEvent;

/// All events that fall on one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Most recent first
    pub events: Vec<DoseEvent>,
}

impl DayBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            events: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Local calendar day an instant falls on.
pub fn local_day<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Partition events into one bucket per local calendar day, most recent day
/// first.
///
/// Every day from the earliest event's day through today is present, empty
/// or not. Days after today only appear when they contain events.
pub fn group_by_day<Tz: TimeZone>(
    events: &[DoseEvent],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<DayBucket> {
    let today = local_day(&now, tz);

    let mut days: BTreeMap<NaiveDate, Vec<DoseEvent>> = BTreeMap::new();
    for event in events {
        days.entry(local_day(&event.timestamp, tz))
            .or_default()
            .push(event.clone());
    }

    let first = days
        .keys()
        .next()
        .copied()
        .map_or(today, |earliest| earliest.min(today));
    for day in first.iter_days().take_while(|d| *d <= today) {
        days.entry(day).or_default();
    }

    days.into_iter()
        .rev()
        .map(|(date, mut events)| {
            events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
            DayBucket { date, events }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn ev(id: &str, ts: DateTime<Utc>) -> DoseEvent {
        DoseEvent::new(id, "lane", ts, 1.0, "mg")
    }

    #[test]
    fn no_events_yields_today_only() {
        let now = at(2024, 5, 10, 12, 0);
        let buckets = group_by_day(&[], now, &Utc);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert!(buckets[0].is_empty());
    }

    #[test]
    fn fills_empty_days_through_today() {
        let now = at(2024, 5, 10, 12, 0);
        let events = vec![ev("a", at(2024, 5, 7, 9, 0)), ev("b", at(2024, 5, 9, 22, 0))];
        let buckets = group_by_day(&events, now, &Utc);
        let dates: Vec<u32> = buckets.iter().map(|b| chrono::Datelike::day(&b.date)).collect();
        assert_eq!(dates, vec![10, 9, 8, 7]);
        assert!(buckets[0].is_empty());
        assert!(buckets[2].is_empty());
        assert_eq!(buckets[3].events[0].id.as_str(), "a");
    }

    #[test]
    fn future_days_only_appear_with_events() {
        let now = at(2024, 5, 10, 12, 0);
        let events = vec![ev("later", at(2024, 5, 13, 9, 0))];
        let buckets = group_by_day(&events, now, &Utc);
        let dates: Vec<u32> = buckets.iter().map(|b| chrono::Datelike::day(&b.date)).collect();
        assert_eq!(dates, vec![13, 10]);
    }

    #[test]
    fn uses_local_calendar_day() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = at(2024, 5, 10, 12, 0);
        // 22:30 UTC on the 9th is 01:30 on the 10th at UTC+3
        let events = vec![ev("late", at(2024, 5, 9, 22, 30))];
        let buckets = group_by_day(&events, now, &tz);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].events.len(), 1);
    }

    #[test]
    fn events_within_day_are_most_recent_first() {
        let now = at(2024, 5, 10, 23, 0);
        let base = at(2024, 5, 10, 8, 0);
        let events = vec![
            ev("a", base),
            ev("c", base + Duration::hours(2)),
            ev("b", base + Duration::hours(1)),
        ];
        let buckets = group_by_day(&events, now, &Utc);
        let ids: Vec<&str> = buckets[0].events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
