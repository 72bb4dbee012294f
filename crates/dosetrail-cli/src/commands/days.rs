use chrono::{Local, NaiveDate};
use clap::Args;
use dosetrail_core::timeline::{group_by_day, DayBucket};
use dosetrail_core::Config;
use serde::Serialize;

use super::{SnapshotArgs, Zone};

#[derive(Args)]
pub struct DaysArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
    /// Include each day's events in the output
    #[arg(long)]
    pub events: bool,
}

#[derive(Serialize)]
struct DaySummary<'a> {
    date: NaiveDate,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a DayBucket>,
}

pub fn run(args: DaysArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let events = args.snapshot.load_events()?;
    let now = args.snapshot.now()?;

    let buckets = match args.snapshot.zone(&config)? {
        Zone::Fixed(offset) => group_by_day(&events, now, &offset),
        Zone::Local => group_by_day(&events, now, &Local),
    };

    let summaries: Vec<DaySummary<'_>> = buckets
        .iter()
        .map(|bucket| DaySummary {
            date: bucket.date,
            count: bucket.events.len(),
            events: args.events.then_some(bucket),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}
