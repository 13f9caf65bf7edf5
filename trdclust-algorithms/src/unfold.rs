//! Five-pad cluster resolution.
//!
//! Two maxima two columns apart share the pad between them. The charge on
//! that pad is split by a fixed-point iteration on the pad response function:
//! guess a split, place both clusters from it, predict the boundary pad from
//! each cluster's pad response and take the left share of the prediction as
//! the next split.

use trdclust_core::calibration::Calibration;
use trdclust_core::digits::DigitArray;

use crate::maxima::MaxCandidate;

/// Convergence tolerance on the split ratio.
pub const UNFOLD_EPSILON: f64 = 0.01;

/// Iteration cap of the fixed-point search.
pub const UNFOLD_MAX_ITERATIONS: usize = 10;

/// Outcome of one unfolding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unfolded {
    /// Fraction of the shared pad assigned to the left cluster, in `[0, 1]`.
    pub ratio: f64,
    /// Iterations run before convergence or the cap.
    pub iterations: usize,
}

/// Splits the shared pad of `pads = [l0, l1, shared, r1, r2]`.
///
/// A non-finite update (empty pads, degenerate response) keeps the previous
/// ratio and ends the iteration.
pub fn unfold<C: Calibration + ?Sized>(calibration: &C, layer: u8, pads: &[f64; 5]) -> Unfolded {
    let [p0, p1, p2, p3, p4] = *pads;
    let mut ratio = 0.5;
    let mut previous = 0.0_f64;
    let mut iterations = 0;

    while (previous - ratio).abs() > UNFOLD_EPSILON && iterations < UNFOLD_MAX_ITERATIONS {
        iterations += 1;
        previous = ratio;

        let left_pos = (ratio * p2 - p0) / (p0 + p1 + ratio * p2);
        let right_pos = (p4 - (1.0 - ratio) * p2) / ((1.0 - ratio) * p2 + p3 + p4);

        let left_amp = p1 / calibration.pad_response(1.0, left_pos, layer)[1];
        let right_amp = p3 / calibration.pad_response(1.0, right_pos, layer)[1];

        let left = calibration.pad_response(left_amp, left_pos, layer);
        let right = calibration.pad_response(right_amp, right_pos, layer);

        let next = left[2] / (left[2] + right[0]);
        if next.is_finite() {
            ratio = next.clamp(0.0, 1.0);
        }
    }

    Unfolded { ratio, iterations }
}

/// Applies the five-pad split to neighbouring maxima of one chamber.
pub struct FivePadResolver<'a, C: ?Sized> {
    calibration: &'a C,
    layer: u8,
    sig_thresh: f32,
}

impl<'a, C: Calibration + ?Sized> FivePadResolver<'a, C> {
    /// Creates a resolver for one chamber layer.
    pub fn new(calibration: &'a C, layer: u8, sig_thresh: f32) -> Self {
        Self {
            calibration,
            layer,
            sig_thresh,
        }
    }

    /// Splits the pad shared by `left` and `right` and flags both maxima.
    ///
    /// Returns `None` and leaves both untouched when the pair is not
    /// adjacent, when either maximum sits within two columns of the chamber
    /// edge, or when a significant pad two columns beyond the pair points to
    /// a wider pileup.
    pub fn resolve(
        &self,
        digits: &DigitArray,
        left: &mut MaxCandidate,
        right: &mut MaxCandidate,
    ) -> Option<Unfolded> {
        if !left.shares_boundary_with(right) {
            return None;
        }
        if left.col < 2 || right.col + 3 > digits.n_cols() {
            return None;
        }

        let (row, time) = (left.row, left.time);
        let outer_left = digits.get(row, left.col - 2, time);
        let outer_right = digits.get(row, right.col + 2, time);
        if self.significant(outer_left) || self.significant(outer_right) {
            return None;
        }

        let pads = [
            f64::from(left.signals[0]),
            f64::from(left.signals[1]),
            f64::from(left.signals[2]),
            f64::from(right.signals[1]),
            f64::from(right.signals[2]),
        ];
        let unfolded = unfold(self.calibration, self.layer, &pads);

        left.signals[2] = scale(left.signals[2], unfolded.ratio);
        right.signals[0] = scale(right.signals[0], 1.0 - unfolded.ratio);
        left.five_pad = true;
        right.five_pad = true;
        Some(unfolded)
    }

    fn significant(&self, amplitude: i16) -> bool {
        f32::from(amplitude) >= self.sig_thresh
    }
}

#[allow(clippy::cast_possible_truncation)]
fn scale(amplitude: i16, factor: f64) -> i16 {
    (f64::from(amplitude) * factor).round_ties_even() as i16
}
