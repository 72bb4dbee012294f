use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use dosetrail_core::dose::{DoseEvent, EventId};
use dosetrail_core::timeline::{layout_timeline, DayLayout, TimelineView, ZoomLevel};
use dosetrail_core::{ClusterKey, Config, ExpansionState};

use super::{SnapshotArgs, Zone};

#[derive(Args)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
    /// Zoom level such as 2 or 2x; defaults to the configured level
    #[arg(long, short)]
    pub zoom: Option<ZoomLevel>,
    /// Expand the cluster with these comma-separated member ids (repeatable)
    #[arg(long = "expand", value_name = "IDS")]
    pub expand: Vec<String>,
    /// Expand every cluster
    #[arg(long, conflicts_with = "expand")]
    pub expand_all: bool,
    /// Only output this day (YYYY-MM-DD)
    #[arg(long)]
    pub day: Option<NaiveDate>,
}

pub fn run(args: LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let events = args.snapshot.load_events()?;
    let now = args.snapshot.now()?;
    let zoom = args.zoom.unwrap_or_else(|| config.default_zoom());
    let settings = config.layout_settings();

    let mut expansion: ExpansionState = args
        .expand
        .iter()
        .map(|ids| {
            ClusterKey::from_members(
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(EventId::from),
            )
        })
        .filter(|key| !key.is_empty())
        .collect();

    let render =
        |expansion: &ExpansionState| -> Result<Vec<DayLayout>, Box<dyn std::error::Error>> {
            let view = TimelineView {
                zoom,
                expansion,
                settings: &settings,
            };
            Ok(match args.snapshot.zone(&config)? {
                Zone::Fixed(offset) => render_in(&events, now, &offset, &view),
                Zone::Local => render_in(&events, now, &Local, &view),
            })
        };

    let mut days = render(&expansion)?;
    if args.expand_all {
        expansion = days
            .iter()
            .flat_map(|d| d.lanes.iter())
            .flat_map(|l| l.clusters.iter().map(|c| c.key.clone()))
            .collect();
        days = render(&expansion)?;
    }
    if let Some(day) = args.day {
        days.retain(|d| d.date == day);
    }

    println!("{}", serde_json::to_string_pretty(&days)?);
    Ok(())
}

fn render_in<Tz: TimeZone>(
    events: &[DoseEvent],
    now: DateTime<Utc>,
    tz: &Tz,
    view: &TimelineView<'_>,
) -> Vec<DayLayout> {
    layout_timeline(events, now, tz, view)
}
