//! Dose event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::unit::DoseUnit;

/// Identifier of a single logged event, assigned by the event store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

/// Identifier of a lane: one subject whose events are laid out independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(EventId);
string_id!(LaneId);

/// One logged dose.
///
/// Immutable once created; an edit in the store arrives as a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseEvent {
    pub id: EventId,
    pub lane: LaneId,
    pub timestamp: DateTime<Utc>,
    pub quantity: f64,
    pub unit: DoseUnit,
    #[serde(default)]
    pub category: Option<String>,
}

impl DoseEvent {
    pub fn new(
        id: impl Into<String>,
        lane: impl Into<String>,
        timestamp: DateTime<Utc>,
        quantity: f64,
        unit: impl Into<DoseUnit>,
    ) -> Self {
        Self {
            id: EventId(id.into()),
            lane: LaneId(lane.into()),
            timestamp,
            quantity,
            unit: unit.into(),
            category: None,
        }
    }

    /// Set category tag
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn builder_sets_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let event = DoseEvent::new("e1", "alice", at, 200.0, "mg").with_category("morning");
        assert_eq!(event.id.as_str(), "e1");
        assert_eq!(event.lane, LaneId::from("alice"));
        assert_eq!(event.unit, DoseUnit::Milligram);
        assert_eq!(event.category.as_deref(), Some("morning"));
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&EventId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
