//! Display positions for individually visible markers.
//!
//! Markers that are too close get pushed apart so their panels never overlap,
//! while each panel stays as close as possible to the time it belongs to.
//! This is a heuristic relaxation, not an exact optimizer: it converges
//! visually for tens of items within the pass budget, not for thousands.

use serde::{Deserialize, Serialize};

use crate::dose::EventId;

/// Tuning for the relaxation loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxationParams {
    /// Minimum gap between adjacent display ordinates (pixels)
    pub min_separation: f64,
    /// Number of sweep-and-pull passes
    pub passes: usize,
    /// Fraction of the remaining displacement recovered per pass
    pub damping: f64,
    /// Stop early once no item moves more than this in a pass
    pub settle_tolerance: Option<f64>,
}

impl RelaxationParams {
    pub const DEFAULT_PASSES: usize = 40;
    pub const DEFAULT_DAMPING: f64 = 0.08;

    pub fn new(min_separation: f64) -> Self {
        Self {
            min_separation,
            passes: Self::DEFAULT_PASSES,
            damping: Self::DEFAULT_DAMPING,
            settle_tolerance: None,
        }
    }

    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn with_settle_tolerance(mut self, tolerance: f64) -> Self {
        self.settle_tolerance = Some(tolerance);
        self
    }
}

/// A marker that must be shown individually, at its true position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInput {
    pub id: EventId,
    pub true_ordinate: f64,
}

impl LayoutInput {
    pub fn new(id: impl Into<String>, true_ordinate: f64) -> Self {
        Self {
            id: EventId::new(id),
            true_ordinate,
        }
    }
}

/// A solved marker position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub id: EventId,
    pub true_ordinate: f64,
    pub display_ordinate: f64,
}

impl LayoutItem {
    pub fn displacement(&self) -> f64 {
        self.display_ordinate - self.true_ordinate
    }
}

/// Solve one group of items, pre-sorted by ascending true ordinate, with the
/// default pass budget.
pub fn solve_layout(items: &[LayoutInput], min_separation: f64) -> Vec<LayoutItem> {
    solve_layout_with(items, &RelaxationParams::new(min_separation))
}

/// Solve one group of items, pre-sorted by ascending true ordinate.
///
/// The group is seeded as a contiguous stack centred on the mean true
/// ordinate, then relaxed: each pass sweeps overlaps apart in both directions
/// and pulls every item a damped step toward its true ordinate. Sweep order
/// alternates between passes so the stack does not creep in one direction.
/// A final pair of sweeps runs after the last pull, so adjacent items are at
/// least `min_separation` apart on return.
pub fn solve_layout_with(items: &[LayoutInput], params: &RelaxationParams) -> Vec<LayoutItem> {
    debug_assert!(
        items
            .windows(2)
            .all(|w| w[0].true_ordinate <= w[1].true_ordinate),
        "layout input must be sorted by true ordinate"
    );

    match items {
        [] => return Vec::new(),
        [only] => {
            return vec![LayoutItem {
                id: only.id.clone(),
                true_ordinate: only.true_ordinate,
                display_ordinate: only.true_ordinate,
            }]
        }
        _ => {}
    }

    let sep = params.min_separation;
    let truth: Vec<f64> = items.iter().map(|i| i.true_ordinate).collect();
    let n = truth.len();
    let centroid = truth.iter().sum::<f64>() / n as f64;
    let half = (n - 1) as f64 * sep / 2.0;
    let mut display: Vec<f64> = (0..n).map(|i| centroid - half + i as f64 * sep).collect();

    let mut passes_run = 0;
    for pass in 0..params.passes {
        let before = display.clone();
        if pass % 2 == 0 {
            sweep_forward(&mut display, sep);
            sweep_backward(&mut display, sep);
        } else {
            sweep_backward(&mut display, sep);
            sweep_forward(&mut display, sep);
        }
        for (d, t) in display.iter_mut().zip(&truth) {
            *d += (t - *d) * params.damping;
        }
        passes_run = pass + 1;

        if let Some(tolerance) = params.settle_tolerance {
            let moved = display
                .iter()
                .zip(&before)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            if moved <= tolerance {
                tracing::trace!(passes = passes_run, moved, "relaxation settled early");
                break;
            }
        }
    }

    if passes_run % 2 == 0 {
        sweep_forward(&mut display, sep);
        sweep_backward(&mut display, sep);
    } else {
        sweep_backward(&mut display, sep);
        sweep_forward(&mut display, sep);
    }

    items
        .iter()
        .zip(display)
        .map(|(item, display_ordinate)| LayoutItem {
            id: item.id.clone(),
            true_ordinate: item.true_ordinate,
            display_ordinate,
        })
        .collect()
}

fn sweep_forward(display: &mut [f64], sep: f64) {
    for i in 1..display.len() {
        let gap = display[i] - display[i - 1];
        if gap < sep {
            display[i] += sep - gap;
        }
    }
}

fn sweep_backward(display: &mut [f64], sep: f64) {
    for i in (0..display.len().saturating_sub(1)).rev() {
        let gap = display[i + 1] - display[i];
        if gap < sep {
            display[i] -= sep - gap;
        }
    }
}

/// Solve every visible item of one lane.
///
/// Items are split into runs whose neighbouring true ordinates are closer
/// than `min_separation`, and each run is solved on its own. When two solved
/// neighbouring runs collide they are merged and solved together, until no
/// collisions remain. Items with room around them keep their true ordinate.
pub fn solve_lane(items: &[LayoutInput], params: &RelaxationParams) -> Vec<LayoutItem> {
    let mut sorted: Vec<LayoutInput> = items.to_vec();
    sorted.sort_by(|a, b| {
        a.true_ordinate
            .total_cmp(&b.true_ordinate)
            .then_with(|| a.id.cmp(&b.id))
    });

    // Each run is a half-open index range into `sorted`.
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for i in 1..=sorted.len() {
        let split = i == sorted.len()
            || sorted[i].true_ordinate - sorted[i - 1].true_ordinate >= params.min_separation;
        if split {
            runs.push((start, i));
            start = i;
        }
    }

    let mut solved: Vec<Vec<LayoutItem>> = runs
        .iter()
        .map(|&(a, b)| solve_layout_with(&sorted[a..b], params))
        .collect();

    loop {
        let collision = (1..runs.len()).find(|&k| {
            let prev = solved[k - 1].last().map(|i| i.display_ordinate);
            let next = solved[k].first().map(|i| i.display_ordinate);
            match (prev, next) {
                (Some(p), Some(n)) => n - p < params.min_separation,
                _ => false,
            }
        });
        let Some(k) = collision else { break };

        let merged = (runs[k - 1].0, runs[k].1);
        runs[k - 1] = merged;
        runs.remove(k);
        solved[k - 1] = solve_layout_with(&sorted[merged.0..merged.1], params);
        solved.remove(k);
    }

    solved.into_iter().flatten().collect()
}
