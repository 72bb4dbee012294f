//! # Dosetrail Core Library
//!
//! This library provides the layout engine behind the Dosetrail dose log's
//! day timeline. Logged doses arrive as snapshots from an external event
//! store; the engine turns them into per-day, per-lane marker positions the
//! presentation layer can draw directly.
//!
//! ## Architecture
//!
//! - **Dose**: Event records, units, and snapshot validation
//! - **Timeline**: Ordinate mapping, day grouping, clustering, relaxation
//!   layout, and tick planning
//! - **Storage**: TOML-based configuration of the layout policy
//!
//! ## Key Components
//!
//! - [`layout_timeline`]: Full pipeline from events to render model
//! - [`ExpansionState`]: Which clusters the user has opened
//! - [`Config`]: Application configuration management

pub mod dose;
pub mod error;
pub mod storage;
pub mod timeline;

pub use dose::{Amount, DoseEvent, DoseUnit, EventId, EventSnapshot, LaneId};
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use storage::Config;
pub use timeline::{
    layout_day, layout_timeline, ClusterKey, DayBucket, DayLayout, ExpansionState,
    LayoutSettings, TimelineView, ZoomLevel,
};
