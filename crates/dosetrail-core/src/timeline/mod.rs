//! Timeline declutter-and-layout engine.
//!
//! This module provides:
//! - Time-of-day to pixel ordinate mapping under a zoom factor
//! - Calendar-day bucketing of the event stream
//! - Greedy per-lane clustering of crowded events
//! - Relaxation layout of individually visible markers
//! - Tick planning for the day ruler
//!
//! Every stage is a pure function over plain values; callers own the zoom
//! level and expansion state and pass them in on each render.

mod cluster;
mod day;
mod expansion;
mod layout;
mod ordinate;
mod render;
mod ticks;

pub use cluster::{cluster, sort_by_ordinate, ClusterGroup, LaneEntry, PlacedEvent};
pub use day::{group_by_day, local_day, DayBucket};
pub use expansion::{ClusterKey, ExpansionState};
pub use layout::{
    solve_lane, solve_layout, solve_layout_with, LayoutInput, LayoutItem, RelaxationParams,
};
pub use ordinate::{
    day_height, minute_ordinate, minutes_of_day, ordinate, ZoomLevel, BASE_DAY_MINUTES,
    ZOOM_LEVELS,
};
pub use render::{
    layout_day, layout_timeline, ClusterSummary, DayLayout, LaneLayout, LayoutSettings,
    RenderMarker, TimelineView,
};
pub use ticks::{day_ticks, tick_plan, Tick, TickPlan};
