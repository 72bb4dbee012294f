//! Property-based invariant tests for the timeline engine.
//!
//! 1. Ordinates strictly decrease with time of day at every zoom
//! 2. Day grouping is idempotent and covers every day through today
//! 3. Clustering partitions the lane and preserves scan order
//! 4. Solved layouts keep adjacent items at least the minimum apart
//! 5. A single item is never moved

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use dosetrail_core::dose::DoseEvent;
use dosetrail_core::timeline::{
    cluster, group_by_day, ordinate, solve_lane, solve_layout, sort_by_ordinate, LaneEntry,
    LayoutInput, PlacedEvent, RelaxationParams, ZoomLevel, ZOOM_LEVELS,
};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

// ── Strategies ──────────────────────────────────────────────────────────

fn zoom_strategy() -> impl Strategy<Value = ZoomLevel> {
    prop_oneof![
        prop::sample::select(ZOOM_LEVELS.to_vec()),
        0.01f64..50.0,
    ]
    .prop_map(|f| ZoomLevel::new(f).unwrap())
}

fn minute_strategy() -> impl Strategy<Value = u32> {
    0u32..1440
}

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap()
}

/// Events spread over up to ten days before `base() + 10 days`.
fn events_strategy() -> impl Strategy<Value = Vec<DoseEvent>> {
    prop::collection::vec((0i64..10 * 1440, 0usize..3), 0..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (minute, lane))| {
                DoseEvent::new(
                    format!("e{i}"),
                    format!("lane{lane}"),
                    base() + Duration::minutes(minute),
                    1.0,
                    "mg",
                )
            })
            .collect()
    })
}

fn placed_strategy() -> impl Strategy<Value = Vec<PlacedEvent>> {
    prop::collection::vec(0u32..300, 0..30).prop_map(|ordinates| {
        ordinates
            .into_iter()
            .enumerate()
            .map(|(i, o)| PlacedEvent {
                event: DoseEvent::new(
                    format!("p{i:02}"),
                    "lane",
                    base() + Duration::minutes(1440 - i64::from(o)),
                    2.0,
                    "mg",
                ),
                ordinate: f64::from(o),
            })
            .collect()
    })
}

fn sorted_ordinates_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..400.0, 2..30).prop_map(|mut v| {
        v.sort_by(f64::total_cmp);
        v
    })
}

fn inputs(ordinates: &[f64]) -> Vec<LayoutInput> {
    ordinates
        .iter()
        .enumerate()
        .map(|(i, &o)| LayoutInput::new(format!("i{i:02}"), o))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Ordinate monotonicity
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ordinate_strictly_decreases_with_time(
        zoom in zoom_strategy(),
        a in minute_strategy(),
        b in minute_strategy(),
    ) {
        prop_assume!(a < b);
        let ta = NaiveTime::from_hms_opt(a / 60, a % 60, 0).unwrap();
        let tb = NaiveTime::from_hms_opt(b / 60, b % 60, 0).unwrap();
        prop_assert!(ordinate(&ta, zoom) > ordinate(&tb, zoom));
    }

    #[test]
    fn ordinate_scales_linearly_with_zoom(zoom in zoom_strategy(), m in minute_strategy()) {
        let t = NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap();
        let one = ordinate(&t, ZoomLevel::DEFAULT);
        let scaled = ordinate(&t, zoom);
        prop_assert!((scaled - one * zoom.factor()).abs() < EPS);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Day grouping
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn grouping_is_idempotent(events in events_strategy(), now_offset in 0i64..12 * 1440) {
        let now = base() + Duration::minutes(now_offset);
        let first = group_by_day(&events, now, &Utc);
        let flattened: Vec<DoseEvent> =
            first.iter().flat_map(|b| b.events.iter().cloned()).collect();
        let second = group_by_day(&flattened, now, &Utc);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn grouping_covers_every_day_through_today(
        events in events_strategy(),
        now_offset in 0i64..12 * 1440,
    ) {
        let now = base() + Duration::minutes(now_offset);
        let buckets = group_by_day(&events, now, &Utc);
        let today = now.date_naive();

        prop_assert!(buckets.iter().any(|b| b.date == today));
        prop_assert!(buckets.windows(2).all(|w| w[0].date > w[1].date));
        let total: usize = buckets.iter().map(|b| b.events.len()).sum();
        prop_assert_eq!(total, events.len());

        // Contiguous from the earliest bucket up to today.
        let past: Vec<_> = buckets.iter().filter(|b| b.date <= today).collect();
        for pair in past.windows(2) {
            prop_assert_eq!(pair[0].date.pred_opt().unwrap(), pair[1].date);
        }
        // Future buckets are never empty.
        for bucket in buckets.iter().filter(|b| b.date > today) {
            prop_assert!(!bucket.events.is_empty());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Clustering is a partition
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clustering_partitions_in_scan_order(events in placed_strategy(), threshold in 0.0f64..40.0) {
        let mut expected = events.clone();
        sort_by_ordinate(&mut expected);
        let expected_ids: Vec<_> = expected.iter().map(|p| p.event.id.clone()).collect();

        let entries = cluster(events, threshold);
        let ids: Vec<_> = entries
            .iter()
            .flat_map(|e| e.members().iter().map(|m| m.event.id.clone()))
            .collect();
        prop_assert_eq!(ids, expected_ids);

        for entry in &entries {
            if let LaneEntry::Cluster(group) = entry {
                prop_assert!(group.members.len() > 1);
                for pair in group.members.windows(2) {
                    prop_assert!(pair[1].ordinate - pair[0].ordinate < threshold
                        || pair[1].ordinate == pair[0].ordinate);
                }
                prop_assert_eq!(group.key.len(), group.members.len());
            }
        }
        for pair in entries.windows(2) {
            let last = pair[0].members().last().unwrap().ordinate;
            let first = pair[1].members()[0].ordinate;
            prop_assert!(first - last >= threshold && first != last);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4 & 5. Layout separation and single-item identity
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_keeps_minimum_separation(
        ordinates in sorted_ordinates_strategy(),
        sep in 1.0f64..40.0,
    ) {
        let solved = solve_layout(&inputs(&ordinates), sep);
        prop_assert_eq!(solved.len(), ordinates.len());
        for pair in solved.windows(2) {
            prop_assert!((pair[1].display_ordinate - pair[0].display_ordinate).abs() >= sep - EPS);
        }
    }

    #[test]
    fn lane_layout_keeps_minimum_separation(
        ordinates in sorted_ordinates_strategy(),
        sep in 1.0f64..40.0,
        settle in prop::option::of(0.0f64..2.0),
    ) {
        let mut params = RelaxationParams::new(sep);
        params.settle_tolerance = settle;
        let solved = solve_lane(&inputs(&ordinates), &params);
        prop_assert_eq!(solved.len(), ordinates.len());
        for pair in solved.windows(2) {
            prop_assert!(pair[1].display_ordinate - pair[0].display_ordinate >= sep - EPS);
        }
    }

    #[test]
    fn single_item_is_identity(o in -1000.0f64..5000.0, sep in 0.0f64..100.0) {
        let solved = solve_layout(&inputs(&[o]), sep);
        prop_assert_eq!(solved[0].display_ordinate, o);
    }
}
