//! Dose events as the layout engine sees them.
//!
//! This module provides:
//! - The immutable event record and its id newtypes
//! - Dose units with quantity normalization
//! - Validation of inbound store snapshots

mod event;
mod snapshot;
mod unit;

pub use event::{DoseEvent, EventId, LaneId};
pub use snapshot::{EventRecord, EventSnapshot, Ingested, RejectedRecord};
pub use unit::{sum_normalized, Amount, DoseUnit};
