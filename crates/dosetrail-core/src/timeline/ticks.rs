//! Day ruler tick planning.

use serde::{Deserialize, Serialize};

use super::ordinate::{minute_ordinate, ZoomLevel, BASE_DAY_MINUTES};

/// Tick and label spacing for the day ruler, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickPlan {
    pub tick_interval_minutes: u32,
    pub label_interval_minutes: u32,
}

impl TickPlan {
    const fn new(tick: u32, label: u32) -> Self {
        Self {
            tick_interval_minutes: tick,
            label_interval_minutes: label,
        }
    }
}

/// (highest zoom the row applies to, plan), ascending by zoom.
const TICK_TABLE: [(f64, TickPlan); 6] = [
    (0.25, TickPlan::new(60, 240)),
    (0.5, TickPlan::new(60, 120)),
    (1.0, TickPlan::new(30, 60)),
    (2.0, TickPlan::new(15, 30)),
    (4.0, TickPlan::new(5, 15)),
    (6.0, TickPlan::new(2, 10)),
];

const FINEST: TickPlan = TickPlan::new(1, 5);

/// Pick tick spacing for a zoom level: the first row whose threshold the
/// zoom does not exceed, or per-minute ticks beyond the table.
pub fn tick_plan(zoom: ZoomLevel) -> TickPlan {
    TICK_TABLE
        .iter()
        .find(|(max_zoom, _)| zoom.factor() <= *max_zoom)
        .map_or(FINEST, |(_, plan)| *plan)
}

/// One mark on the day ruler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub minute_of_day: u32,
    pub ordinate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Every tick mark for one day-block, from midnight to midnight inclusive.
pub fn day_ticks(zoom: ZoomLevel) -> Vec<Tick> {
    let plan = tick_plan(zoom);
    let day_minutes = BASE_DAY_MINUTES as u32;

    (0..=day_minutes)
        .step_by(plan.tick_interval_minutes as usize)
        .map(|minute| Tick {
            minute_of_day: minute,
            ordinate: minute_ordinate(minute, zoom),
            label: (minute % plan.label_interval_minutes == 0)
                .then(|| format!("{:02}:{:02}", minute / 60, minute % 60)),
        })
        .collect()
}
