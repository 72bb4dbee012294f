//! Time-of-day to pixel ordinate mapping.
//!
//! A day-block is `BASE_DAY_MINUTES * zoom` pixels tall. Midnight at the start
//! of the day sits at the bottom of the block and later times sit nearer the
//! top, so the ordinate strictly decreases as the time of day increases.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Logical minutes in one day-block.
pub const BASE_DAY_MINUTES: f64 = 1440.0;

/// Discrete zoom levels offered by the presentation layer, ascending.
pub const ZOOM_LEVELS: [f64; 11] = [0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0, 6.0, 8.0, 10.0];

/// Pixels per logical minute. Always finite and greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ZoomLevel(f64);

impl ZoomLevel {
    pub const DEFAULT: ZoomLevel = ZoomLevel(1.0);

    pub fn new(factor: f64) -> Result<Self, ValidationError> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(ValidationError::InvalidZoom(factor))
        }
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    /// Next discrete level above this one, or the highest level.
    pub fn zoom_in(self) -> Self {
        let next = ZOOM_LEVELS
            .iter()
            .copied()
            .find(|&level| level > self.0)
            .unwrap_or(ZOOM_LEVELS[ZOOM_LEVELS.len() - 1]);
        Self(next.max(self.0))
    }

    /// Next discrete level below this one, or the lowest level.
    pub fn zoom_out(self) -> Self {
        let prev = ZOOM_LEVELS
            .iter()
            .rev()
            .copied()
            .find(|&level| level < self.0)
            .unwrap_or(ZOOM_LEVELS[0]);
        Self(prev.min(self.0))
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for ZoomLevel {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ZoomLevel> for f64 {
    fn from(zoom: ZoomLevel) -> Self {
        zoom.0
    }
}

impl FromStr for ZoomLevel {
    type Err = ValidationError;

    /// Accepts `2`, `2.5`, or `2x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['x', 'X']);
        let factor = trimmed
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidZoom(f64::NAN))?;
        Self::new(factor)
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Minutes since local midnight, ignoring seconds.
pub fn minutes_of_day<T: Timelike>(time: &T) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Pixel ordinate of a local time within its day-block.
pub fn ordinate<T: Timelike>(time: &T, zoom: ZoomLevel) -> f64 {
    minute_ordinate(minutes_of_day(time), zoom)
}

/// Pixel ordinate of a minute-of-day within its day-block.
pub fn minute_ordinate(minute_of_day: u32, zoom: ZoomLevel) -> f64 {
    (BASE_DAY_MINUTES - f64::from(minute_of_day)) * zoom.factor()
}

/// Pixel height of one day-block.
pub fn day_height(zoom: ZoomLevel) -> f64 {
    BASE_DAY_MINUTES * zoom.factor()
}
