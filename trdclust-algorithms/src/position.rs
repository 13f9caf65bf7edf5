//! Sub-pad position estimators.
//!
//! - **LUT**: per-layer table lookup on the three-pad charge asymmetry
//! - **Center of gravity**: charge-weighted mean over a five-pad window
//!
//! Both return the offset of the cluster from the center pad in pad units,
//! negative towards lower columns.

use trdclust_core::digits::DigitArray;
use trdclust_core::geometry::N_LAYER;

use crate::lut::{ASYMMETRY_MAX, ASYMMETRY_MIN, LUT_BINS, POSITION_TABLE};
use crate::maxima::MaxCandidate;

/// Margin kept inside the calibrated asymmetry range.
const BOUND_MARGIN: f64 = 0.000_005;

/// Position offset returned for asymmetries above the table range.
const SATURATED_POSITION: f64 = 0.5;

/// Positional weight of the two outer pads in the centroid.
const OUTER_LEVER_ARM: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayerBounds {
    min: f64,
    max: f64,
    width: f64,
}

/// Lookup-table position estimator.
///
/// Built once before reconstruction and shared read-only between workers.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionLut {
    bounds: [LayerBounds; N_LAYER as usize],
}

impl Default for PositionLut {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionLut {
    /// Creates the estimator from the built-in table.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new() -> Self {
        let bounds = std::array::from_fn(|layer| {
            let min = ASYMMETRY_MIN[layer] + BOUND_MARGIN;
            let max = ASYMMETRY_MAX[layer] - BOUND_MARGIN;
            LayerBounds {
                min,
                max,
                width: (max - min) / (LUT_BINS - 1) as f64,
            }
        });
        Self { bounds }
    }

    /// Table entry of `layer` at `bin`.
    #[must_use]
    pub fn value(&self, layer: u8, bin: usize) -> Option<f64> {
        POSITION_TABLE
            .get(usize::from(layer))
            .and_then(|row| row.get(bin))
            .copied()
    }

    /// Asymmetry range `(min, max)` covered by the table of `layer`.
    #[must_use]
    pub fn range(&self, layer: u8) -> (f64, f64) {
        let bounds = &self.bounds[Self::layer_index(layer)];
        (bounds.min, bounds.max)
    }

    /// Estimates the position from the left, center and right amplitudes.
    ///
    /// Equal neighbours give 0. Asymmetries below the table range give 0,
    /// above it they saturate at half a pad towards the larger neighbour.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn position(&self, layer: u8, left: f64, center: f64, right: f64) -> f64 {
        if left == right {
            return 0.0;
        }
        let (asymmetry, side) = if left > right {
            ((left - right) / center, -1.0)
        } else {
            ((right - left) / center, 1.0)
        };

        let layer = Self::layer_index(layer);
        let bounds = &self.bounds[layer];
        if asymmetry < bounds.min {
            0.0
        } else if asymmetry > bounds.max {
            side * SATURATED_POSITION
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bin = ((asymmetry - bounds.min) / bounds.width) as usize;
            side * POSITION_TABLE[layer][bin.min(LUT_BINS - 1)]
        }
    }

    fn layer_index(layer: u8) -> usize {
        usize::from(layer).min(N_LAYER as usize - 1)
    }
}

/// Center of gravity of `[p0, left, center, right, p4]`.
///
/// The outer pads only enter the normalization; their lever arm is zero.
/// Returns 0 for an empty window.
#[must_use]
pub fn center_of_gravity(signals: &[f64; 5]) -> f64 {
    let sum: f64 = signals.iter().sum();
    if sum == 0.0 {
        return 0.0;
    }
    let [p0, left, _, right, p4] = *signals;
    (OUTER_LEVER_ARM * (p4 - p0) + (right - left)) / sum
}

/// Five-pad window around a maximum for [`center_of_gravity`].
///
/// The outer pads are read only inside the chamber and are dropped when they
/// are not smaller than their inner neighbour.
#[must_use]
pub fn cog_window(digits: &DigitArray, max: &MaxCandidate) -> [f64; 5] {
    let [left, center, right] = max.signals.map(f64::from);
    let (row, col, time) = (max.row, max.col, max.time);

    let mut p0 = 0.0;
    if col > 2 {
        p0 = f64::from(digits.get(row, col - 2, time));
        if p0 >= left {
            p0 = 0.0;
        }
    }
    let mut p4 = 0.0;
    if col + 3 < digits.n_cols() {
        p4 = f64::from(digits.get(row, col + 2, time));
        if p4 >= right {
            p4 = 0.0;
        }
    }
    [p0, left, center, right, p4]
}
