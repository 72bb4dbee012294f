pub mod config;
pub mod days;
pub mod layout;
pub mod ticks;

use chrono::{DateTime, FixedOffset, Utc};
use clap::Args;
use dosetrail_core::dose::{DoseEvent, EventSnapshot};
use dosetrail_core::Config;
use std::io::Read;
use std::path::PathBuf;

/// Options shared by commands that read an event snapshot.
#[derive(Args)]
pub struct SnapshotArgs {
    /// Snapshot JSON file, or "-" for stdin
    #[arg(long, short)]
    pub input: PathBuf,
    /// Current instant (RFC 3339); defaults to the system clock
    #[arg(long)]
    pub now: Option<String>,
    /// Calendar days use this UTC offset in minutes instead of the system zone
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,
    /// Fail on the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

/// Time zone calendar days are computed in.
pub enum Zone {
    Fixed(FixedOffset),
    Local,
}

impl SnapshotArgs {
    pub fn load_events(&self) -> dosetrail_core::Result<Vec<DoseEvent>> {
        let snapshot = if self.input.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            EventSnapshot::from_json(&buf)?
        } else {
            EventSnapshot::read(&self.input)?
        };
        if self.strict {
            Ok(snapshot.ingest_strict()?)
        } else {
            let ingested = snapshot.ingest();
            if !ingested.rejected.is_empty() {
                tracing::warn!(skipped = ingested.rejected.len(), "skipped malformed records");
            }
            Ok(ingested.events)
        }
    }

    pub fn now(&self) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
        match &self.now {
            Some(s) => Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
            None => Ok(Utc::now()),
        }
    }

    pub fn zone(&self, config: &Config) -> Result<Zone, Box<dyn std::error::Error>> {
        match self.utc_offset {
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(Zone::Fixed)
                .ok_or_else(|| format!("utc offset out of range: {minutes}").into()),
            None => Ok(config
                .display
                .utc_offset()
                .map_or(Zone::Local, Zone::Fixed)),
        }
    }
}
