use clap::Args;
use dosetrail_core::timeline::{
    day_height, day_ticks, tick_plan, Tick, TickPlan, ZoomLevel, ZOOM_LEVELS,
};
use dosetrail_core::Config;
use serde::Serialize;

#[derive(Args)]
pub struct TicksArgs {
    /// Zoom level such as 2 or 2x; defaults to the configured level
    #[arg(long, short)]
    pub zoom: Option<ZoomLevel>,
    /// List the tick plan of every discrete zoom level instead
    #[arg(long, conflicts_with = "zoom")]
    pub levels: bool,
}

#[derive(Serialize)]
struct Ruler {
    zoom: f64,
    day_height: f64,
    plan: TickPlan,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ticks: Vec<Tick>,
}

pub fn run(args: TicksArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.levels {
        let rulers: Vec<Ruler> = ZOOM_LEVELS
            .iter()
            .map(|&factor| ZoomLevel::new(factor).map(|zoom| ruler(zoom, false)))
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&rulers)?);
        return Ok(());
    }

    let zoom = match args.zoom {
        Some(zoom) => zoom,
        None => Config::load_or_default().default_zoom(),
    };
    println!("{}", serde_json::to_string_pretty(&ruler(zoom, true))?);
    Ok(())
}

fn ruler(zoom: ZoomLevel, with_ticks: bool) -> Ruler {
    Ruler {
        zoom: zoom.factor(),
        day_height: day_height(zoom),
        plan: tick_plan(zoom),
        ticks: if with_ticks { day_ticks(zoom) } else { Vec::new() },
    }
}
