//! Event snapshot ingestion.
//!
//! The event store delivers its full contents on every change. Each snapshot
//! replaces the working set outright; records are validated here so the
//! layout engine only ever sees well-formed events.
//!
//! Records are kept as raw JSON until ingestion and decoded one at a time, so
//! a single record with a wrongly-typed field is rejected on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use super::event::{DoseEvent, EventId, LaneId};
use super::unit::DoseUnit;
use crate::error::{CoreError, ValidationError};

/// A raw record as delivered by the store, before validation.
///
/// Every field is optional; `null` and absent are treated alike.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub lane: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

impl EventRecord {
    /// Decode one raw record.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::MalformedRecord(
                "expected a JSON object".to_string(),
            ));
        }
        EventRecord::deserialize(value)
            .map_err(|e| ValidationError::MalformedRecord(e.to_string()))
    }

    /// Validate this record into a `DoseEvent`.
    pub fn validate(&self) -> Result<DoseEvent, ValidationError> {
        let id = required(&self.id, "id")?;
        let lane = required(&self.lane, "lane")?;
        let raw_timestamp = required(&self.timestamp, "timestamp")?;
        let timestamp = DateTime::parse_from_rfc3339(raw_timestamp)
            .map_err(|e| ValidationError::MalformedTimestamp {
                value: raw_timestamp.to_string(),
                message: e.to_string(),
            })?
            .with_timezone(&Utc);
        let quantity = self.quantity.ok_or(ValidationError::MissingField("quantity"))?;
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(ValidationError::InvalidQuantity(quantity));
        }

        Ok(DoseEvent {
            id: EventId(id.to_string()),
            lane: LaneId(lane.to_string()),
            timestamp,
            quantity,
            unit: DoseUnit::parse(self.unit.as_deref().unwrap_or_default()),
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

/// Best-effort id of a raw record, for reporting rejections.
fn raw_id(value: &Value) -> String {
    match value.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// A full snapshot of the event store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSnapshot {
    /// Undecoded records in delivery order
    pub events: Vec<Value>,
}

/// A record that failed validation, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position of the record in the snapshot
    pub index: usize,
    pub id: String,
    pub error: ValidationError,
}

/// Result of ingesting a snapshot leniently.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub events: Vec<DoseEvent>,
    pub rejected: Vec<RejectedRecord>,
}

impl EventSnapshot {
    /// Build a snapshot from already-typed records.
    pub fn from_records(records: impl IntoIterator<Item = EventRecord>) -> Self {
        Self {
            events: records
                .into_iter()
                .filter_map(|r| serde_json::to_value(r).ok())
                .collect(),
        }
    }

    /// Decode a snapshot from JSON: either a bare array of records or an
    /// object with an `events` array.
    ///
    /// Only the document shape is checked here; records are decoded by
    /// [`EventSnapshot::ingest`].
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let doc: Value = serde_json::from_str(json)?;
        let events = match doc {
            Value::Array(events) => events,
            Value::Object(mut map) => match map.remove("events") {
                Some(Value::Array(events)) => events,
                _ => {
                    return Err(CoreError::Validation(ValidationError::MalformedSnapshot(
                        "object has no `events` array".to_string(),
                    )))
                }
            },
            _ => {
                return Err(CoreError::Validation(ValidationError::MalformedSnapshot(
                    "expected an array of records or an object with an `events` array"
                        .to_string(),
                )))
            }
        };
        Ok(Self { events })
    }

    /// Load a snapshot file.
    pub fn read(path: &Path) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validate every record, keeping the good ones and reporting the rest.
    ///
    /// A record whose id was already accepted earlier in the snapshot is
    /// rejected as a duplicate.
    pub fn ingest(&self) -> Ingested {
        let mut seen: HashSet<EventId> = HashSet::new();
        let mut out = Ingested::default();

        for (index, value) in self.events.iter().enumerate() {
            let result = EventRecord::from_value(value)
                .and_then(|record| record.validate())
                .and_then(|event| {
                    if seen.insert(event.id.clone()) {
                        Ok(event)
                    } else {
                        Err(ValidationError::DuplicateId(event.id.0))
                    }
                });
            match result {
                Ok(event) => out.events.push(event),
                Err(error) => {
                    let id = raw_id(value);
                    tracing::warn!(index, id = %id, %error, "rejected event record");
                    out.rejected.push(RejectedRecord { index, id, error });
                }
            }
        }

        tracing::debug!(
            accepted = out.events.len(),
            rejected = out.rejected.len(),
            "ingested snapshot"
        );
        out
    }

    /// Validate every record, failing on the first bad one.
    pub fn ingest_strict(&self) -> Result<Vec<DoseEvent>, ValidationError> {
        let ingested = self.ingest();
        match ingested.rejected.into_iter().next() {
            Some(rejected) => Err(rejected.error),
            None => Ok(ingested.events),
        }
    }
}
