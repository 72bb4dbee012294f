//! Greedy clustering of visually crowded events within one lane.
//!
//! Events are scanned in ascending ordinate order. A group keeps absorbing the
//! next event while its gap to the group's last member is below the threshold.
//! Group boundaries depend only on scan order and are never rebalanced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expansion::ClusterKey;
use crate::dose::{sum_normalized, Amount, DoseEvent};

/// An event with its true ordinate in the day-block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEvent {
    pub event: DoseEvent,
    pub ordinate: f64,
}

/// Two or more events collapsed into one marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterGroup {
    pub key: ClusterKey,
    /// Ascending ordinate order
    pub members: Vec<PlacedEvent>,
    /// Mean of the member ordinates
    pub representative_ordinate: f64,
    /// Summed member quantities, one entry per canonical unit
    pub totals: Vec<Amount>,
    pub latest_timestamp: DateTime<Utc>,
}

impl ClusterGroup {
    fn from_members(members: Vec<PlacedEvent>) -> Self {
        let key = ClusterKey::from_members(members.iter().map(|m| m.event.id.clone()));
        let representative_ordinate =
            members.iter().map(|m| m.ordinate).sum::<f64>() / members.len() as f64;
        let totals = sum_normalized(members.iter().map(|m| (m.event.quantity, &m.event.unit)));
        let latest_timestamp = members
            .iter()
            .map(|m| m.event.timestamp)
            .max()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            key,
            members,
            representative_ordinate,
            totals,
            latest_timestamp,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One entry of a clustered lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LaneEntry {
    Single(PlacedEvent),
    Cluster(ClusterGroup),
}

impl LaneEntry {
    /// Events of this entry in scan order.
    pub fn members(&self) -> &[PlacedEvent] {
        match self {
            LaneEntry::Single(single) => std::slice::from_ref(single),
            LaneEntry::Cluster(group) => &group.members,
        }
    }

    /// Where the collapsed marker for this entry sits.
    pub fn ordinate(&self) -> f64 {
        match self {
            LaneEntry::Single(single) => single.ordinate,
            LaneEntry::Cluster(group) => group.representative_ordinate,
        }
    }
}

/// Sort events by ascending ordinate.
///
/// Equal ordinates fall back to most recent timestamp first, then event id,
/// so the order is fully reproducible.
pub fn sort_by_ordinate(events: &mut [PlacedEvent]) {
    events.sort_by(|a, b| {
        a.ordinate
            .total_cmp(&b.ordinate)
            .then_with(|| b.event.timestamp.cmp(&a.event.timestamp))
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
}

/// Cluster one lane's events for one day.
///
/// Adjacent events closer than `threshold` merge. Equal ordinates merge even
/// when the threshold is zero. Groups of one are emitted as `Single`.
pub fn cluster(mut events: Vec<PlacedEvent>, threshold: f64) -> Vec<LaneEntry> {
    sort_by_ordinate(&mut events);

    let mut entries = Vec::new();
    let mut group: Vec<PlacedEvent> = Vec::new();

    for placed in events {
        let joins = group.last().is_some_and(|last| {
            let gap = placed.ordinate - last.ordinate;
            gap < threshold || gap == 0.0
        });
        if !joins && !group.is_empty() {
            entries.push(close_group(std::mem::take(&mut group)));
        }
        group.push(placed);
    }
    if !group.is_empty() {
        entries.push(close_group(group));
    }

    entries
}

fn close_group(mut group: Vec<PlacedEvent>) -> LaneEntry {
    if group.len() == 1 {
        if let Some(single) = group.pop() {
            return LaneEntry::Single(single);
        }
    }
    LaneEntry::Cluster(ClusterGroup::from_members(group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dose::DoseUnit;
    use chrono::{Duration, TimeZone};

    fn placed(id: &str, ordinate: f64) -> PlacedEvent {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
        PlacedEvent {
            event: DoseEvent::new(
                id,
                "lane",
                base - Duration::minutes(ordinate as i64),
                10.0,
                "mg",
            ),
            ordinate,
        }
    }

    fn shape(entries: &[LaneEntry]) -> Vec<Vec<&str>> {
        entries
            .iter()
            .map(|e| e.members().iter().map(|m| m.event.id.as_str()).collect())
            .collect()
    }

    #[test]
    fn groups_close_events() {
        let events = vec![placed("d", 50.0), placed("a", 0.0), placed("c", 9.0), placed("b", 5.0)];
        let entries = cluster(events, 10.0);
        assert_eq!(shape(&entries), vec![vec!["a", "b", "c"], vec!["d"]]);

        let LaneEntry::Cluster(group) = &entries[0] else {
            panic!("expected cluster");
        };
        assert!((group.representative_ordinate - 14.0 / 3.0).abs() < 1e-9);
        assert_eq!(group.totals.len(), 1);
        assert_eq!(group.totals[0].value, 30.0);
        assert_eq!(group.totals[0].unit, DoseUnit::Milligram);
        assert_eq!(group.latest_timestamp, group.members[0].event.timestamp);
        assert!(matches!(entries[1], LaneEntry::Single(_)));
    }

    #[test]
    fn gap_equal_to_threshold_splits() {
        let entries = cluster(vec![placed("a", 0.0), placed("b", 10.0)], 10.0);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn equal_ordinates_always_merge() {
        let entries = cluster(vec![placed("a", 3.0), placed("b", 3.0)], 0.0);
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0], LaneEntry::Cluster(_)));
    }

    #[test]
    fn chains_grow_past_threshold() {
        // Each gap is below threshold so the group keeps absorbing.
        let events = (0..5).map(|i| placed(&format!("e{i}"), i as f64 * 8.0)).collect();
        let entries = cluster(events, 10.0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].members().len(), 5);
    }

    #[test]
    fn empty_lane() {
        assert!(cluster(Vec::new(), 10.0).is_empty());
    }

    #[test]
    fn mixed_units_total_separately() {
        let mut a = placed("a", 0.0);
        let mut b = placed("b", 1.0);
        a.event.unit = DoseUnit::Gram;
        a.event.quantity = 0.5;
        b.event.unit = DoseUnit::Milliliter;
        let entries = cluster(vec![a, b], 10.0);
        let LaneEntry::Cluster(group) = &entries[0] else {
            panic!("expected cluster");
        };
        assert_eq!(group.totals[0].value, 500.0);
        assert_eq!(group.totals[1].unit, DoseUnit::Milliliter);
    }
}
