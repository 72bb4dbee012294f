//! Render model assembly.
//!
//! Chains the pipeline for each day: place every event at its true ordinate,
//! cluster each lane, solve display positions for whatever is individually
//! visible, and emit plain values for the presentation layer to draw.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cluster::{cluster, LaneEntry, PlacedEvent};
use super::day::{group_by_day, DayBucket};
use super::expansion::{ClusterKey, ExpansionState};
use super::layout::{solve_lane, LayoutInput, RelaxationParams};
use super::ordinate::{day_height, ordinate, ZoomLevel};
use crate::dose::{Amount, DoseEvent, EventId, LaneId};

/// Pixel policy for decluttering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Gap below which adjacent events collapse into a cluster
    pub cluster_threshold: f64,
    /// Relaxation tuning, including the minimum display separation
    pub relaxation: RelaxationParams,
    /// Panel offsets up to this size draw no connector
    pub connector_tolerance: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            cluster_threshold: 24.0,
            relaxation: RelaxationParams::new(28.0),
            connector_tolerance: 0.5,
        }
    }
}

/// Inputs owned by the presentation layer for one render.
#[derive(Debug, Clone, Copy)]
pub struct TimelineView<'a> {
    pub zoom: ZoomLevel,
    pub expansion: &'a ExpansionState,
    pub settings: &'a LayoutSettings,
}

/// An individually drawn event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderMarker {
    pub event_id: EventId,
    /// True ordinate, where the dot goes
    pub dot: f64,
    /// Display ordinate, where the panel goes
    pub panel: f64,
    /// Whether a line joins dot and panel
    pub connector: bool,
    /// Set when the marker comes from an expanded cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterKey>,
}

/// A collapsed cluster drawn as a single aggregate marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub key: ClusterKey,
    pub ordinate: f64,
    pub count: usize,
    pub totals: Vec<Amount>,
    pub latest_timestamp: DateTime<Utc>,
}

/// Everything drawn for one lane on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneLayout {
    pub lane: LaneId,
    /// Ascending panel order
    pub markers: Vec<RenderMarker>,
    pub clusters: Vec<ClusterSummary>,
}

impl LaneLayout {
    /// Keys of every cluster in this lane, expanded or not.
    pub fn cluster_keys(&self) -> impl Iterator<Item = &ClusterKey> {
        self.clusters
            .iter()
            .map(|c| &c.key)
            .chain(self.markers.iter().filter_map(|m| m.cluster.as_ref()))
    }
}

/// Everything drawn for one day-block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLayout {
    pub date: NaiveDate,
    pub day_height: f64,
    pub lanes: Vec<LaneLayout>,
}

impl DayLayout {
    pub fn lane(&self, lane: &LaneId) -> Option<&LaneLayout> {
        self.lanes.iter().find(|l| &l.lane == lane)
    }
}

/// Lay out one day. Lanes are independent and come out ordered by lane id.
pub fn layout_day<Tz: TimeZone>(bucket: &DayBucket, tz: &Tz, view: &TimelineView<'_>) -> DayLayout {
    let mut lanes: BTreeMap<&LaneId, Vec<PlacedEvent>> = BTreeMap::new();
    for event in &bucket.events {
        lanes.entry(&event.lane).or_default().push(place(event, tz, view.zoom));
    }

    let lanes: Vec<LaneLayout> = lanes
        .into_iter()
        .map(|(lane, placed)| layout_lane(lane.clone(), placed, view))
        .collect();

    tracing::debug!(
        date = %bucket.date,
        events = bucket.events.len(),
        lanes = lanes.len(),
        zoom = view.zoom.factor(),
        "laid out day"
    );

    DayLayout {
        date: bucket.date,
        day_height: day_height(view.zoom),
        lanes,
    }
}

/// Group events by day and lay out every day, most recent first.
pub fn layout_timeline<Tz: TimeZone>(
    events: &[DoseEvent],
    now: DateTime<Utc>,
    tz: &Tz,
    view: &TimelineView<'_>,
) -> Vec<DayLayout> {
    group_by_day(events, now, tz)
        .iter()
        .map(|bucket| layout_day(bucket, tz, view))
        .collect()
}

fn place<Tz: TimeZone>(event: &DoseEvent, tz: &Tz, zoom: ZoomLevel) -> PlacedEvent {
    PlacedEvent {
        event: event.clone(),
        ordinate: ordinate(&event.timestamp.with_timezone(tz), zoom),
    }
}

fn layout_lane(lane: LaneId, placed: Vec<PlacedEvent>, view: &TimelineView<'_>) -> LaneLayout {
    let entries = cluster(placed, view.settings.cluster_threshold);

    let mut visible: Vec<(LayoutInput, Option<ClusterKey>)> = Vec::new();
    let mut clusters = Vec::new();
    for entry in entries {
        match entry {
            LaneEntry::Single(single) => visible.push((input(&single), None)),
            LaneEntry::Cluster(group) if view.expansion.is_expanded(&group.key) => {
                for member in &group.members {
                    visible.push((input(member), Some(group.key.clone())));
                }
            }
            LaneEntry::Cluster(group) => clusters.push(ClusterSummary {
                count: group.len(),
                ordinate: group.representative_ordinate,
                key: group.key,
                totals: group.totals,
                latest_timestamp: group.latest_timestamp,
            }),
        }
    }

    let inputs: Vec<LayoutInput> = visible.iter().map(|(i, _)| i.clone()).collect();
    let origin: BTreeMap<EventId, Option<ClusterKey>> = visible
        .into_iter()
        .map(|(i, key)| (i.id, key))
        .collect();

    let markers = solve_lane(&inputs, &view.settings.relaxation)
        .into_iter()
        .map(|item| RenderMarker {
            connector: item.displacement().abs() > view.settings.connector_tolerance,
            dot: item.true_ordinate,
            panel: item.display_ordinate,
            cluster: origin.get(&item.id).cloned().flatten(),
            event_id: item.id,
        })
        .collect();

    LaneLayout {
        lane,
        markers,
        clusters,
    }
}

fn input(placed: &PlacedEvent) -> LayoutInput {
    LayoutInput {
        id: placed.event.id.clone(),
        true_ordinate: placed.ordinate,
    }
}
