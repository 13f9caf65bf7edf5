//! Three-pad local maximum search.
//!
//! A pad is a maximum when it dominates its left and right neighbours in the
//! same row and time bin. Ties are broken asymmetrically (the right
//! neighbour may equal the center, the left one may not) so that a flat top
//! yields exactly one maximum, always the leftmost pad of the plateau's
//! upper edge. One bad pad among the three is tolerated under a relaxed rule;
//! two or more reject the candidate.

use trdclust_core::calibration::{Calibration, PadStatus};
use trdclust_core::cluster::{MaskedPad, MaskedPosition};
use trdclust_core::digits::DigitArray;
use trdclust_core::param::RecoParam;

/// A maximum found during the scan, before it becomes a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxCandidate {
    /// Pad row.
    pub row: usize,
    /// Pad column of the center pad.
    pub col: usize,
    /// Time bin.
    pub time: usize,
    /// Left, center and right amplitudes after bad-pad handling.
    pub signals: [i16; 3],
    /// The bad pad tolerated by the relaxed rule, if any.
    pub masked: Option<MaskedPad>,
    /// Charge on the boundary pad was split with a neighbouring maximum.
    pub five_pad: bool,
}

impl MaxCandidate {
    /// True if `next` starts two columns to the right in the same row and time bin.
    #[must_use]
    pub fn shares_boundary_with(&self, next: &Self) -> bool {
        self.time == next.time && self.row == next.row && next.col == self.col + 2
    }
}

/// Maximum test bound to one chamber's calibration.
pub struct MaximumFinder<'a, C: ?Sized> {
    calibration: &'a C,
    detector: u16,
    noise_det: f32,
    max_thresh: f32,
    sig_thresh: f32,
    min_max_cut_sigma: f32,
    min_left_right_cut_sigma: f32,
}

impl<'a, C: Calibration + ?Sized> MaximumFinder<'a, C> {
    /// Binds the thresholds of `param` to the noise of `detector`.
    pub fn new(param: &RecoParam, calibration: &'a C, detector: u16) -> Self {
        Self {
            calibration,
            detector,
            noise_det: calibration.noise_det(detector),
            max_thresh: param.max_thresh,
            sig_thresh: param.sig_thresh,
            min_max_cut_sigma: param.min_max_cut_sigma,
            min_left_right_cut_sigma: param.min_left_right_cut_sigma,
        }
    }

    /// Tests `(row, col, time)` and returns the candidate if it is a maximum.
    pub fn find(
        &self,
        digits: &DigitArray,
        row: usize,
        col: usize,
        time: usize,
    ) -> Option<MaxCandidate> {
        let center = digits.get(row, col, time);
        if f32::from(center) < self.max_thresh {
            return None;
        }

        let pad_noise = self.noise_det * self.calibration.noise_pad(self.detector, row, col);
        if f32::from(center) < self.min_max_cut_sigma * pad_noise {
            return None;
        }

        if col < 1 || col + 1 >= digits.n_cols() {
            return None;
        }

        let status = [
            self.calibration.pad_status(self.detector, row, col - 1),
            self.calibration.pad_status(self.detector, row, col),
            self.calibration.pad_status(self.detector, row, col + 1),
        ];
        let mut signals = [
            digits.get(row, col - 1, time),
            center,
            digits.get(row, col + 1, time),
        ];

        let masked = if status.iter().all(|s| !s.is_bad()) {
            if !self.good_pads_maximum(&signals, pad_noise) {
                return None;
            }
            None
        } else {
            Some(self.bad_pad_maximum(&status, &mut signals)?)
        };

        Some(MaxCandidate {
            row,
            col,
            time,
            signals,
            masked,
            five_pad: false,
        })
    }

    fn significant(&self, amplitude: i16) -> bool {
        f32::from(amplitude) >= self.sig_thresh
    }

    fn good_pads_maximum(&self, signals: &[i16; 3], pad_noise: f32) -> bool {
        let [left, center, right] = *signals;
        if right > center || left >= center {
            return false;
        }
        if !self.significant(right) && !self.significant(left) {
            return false;
        }
        let sum = i32::from(left) + i32::from(center) + i32::from(right);
        #[allow(clippy::cast_precision_loss)]
        let sum = sum as f32;
        sum >= self.min_left_right_cut_sigma * pad_noise
    }

    /// Relaxed rule for exactly one bad pad. The bad pad's amplitude is
    /// replaced: zero for a neighbour, the maximum threshold for the center.
    fn bad_pad_maximum(
        &self,
        status: &[PadStatus; 3],
        signals: &mut [i16; 3],
    ) -> Option<MaskedPad> {
        let [left, center, right] = *signals;
        let bad = status.map(PadStatus::is_bad);

        let position = match bad {
            [false, false, true] if center > left && self.significant(left) => {
                signals[2] = 0;
                MaskedPosition::Right
            }
            [true, false, false] if center >= right && self.significant(right) => {
                signals[0] = 0;
                MaskedPosition::Left
            }
            [false, true, false] if self.significant(right) || self.significant(left) => {
                #[allow(clippy::cast_possible_truncation)]
                let floor = self.max_thresh.round_ties_even() as i16;
                signals[1] = floor;
                MaskedPosition::Center
            }
            _ => return None,
        };

        let status = match position {
            MaskedPosition::Left => status[0],
            MaskedPosition::Center => status[1],
            MaskedPosition::Right => status[2],
        };
        Some(MaskedPad { position, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trdclust_core::calibration::CalibrationTable;

    fn digits_with_row(values: &[i16]) -> DigitArray {
        let mut digits = DigitArray::zeros(1, values.len(), 1);
        for (col, &v) in values.iter().enumerate() {
            digits.set(0, col, 0, v);
        }
        digits
    }

    fn maxima(digits: &DigitArray, calib: &CalibrationTable) -> Vec<MaxCandidate> {
        let param = RecoParam::default();
        let finder = MaximumFinder::new(&param, calib, 0);
        (0..digits.n_cols())
            .filter_map(|col| finder.find(digits, 0, col, 0))
            .collect()
    }

    #[test]
    fn test_single_three_pad_pulse() {
        let digits = digits_with_row(&[0, 0, 0, 50, 120, 60, 0, 0]);
        let found = maxima(&digits, &CalibrationTable::new());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].col, 4);
        assert_eq!(found[0].signals, [50, 120, 60]);
        assert!(found[0].masked.is_none());
        assert!(!found[0].five_pad);
    }

    #[test]
    fn test_edges_never_report_maxima() {
        let digits = digits_with_row(&[200, 10, 0, 0, 0, 10, 200]);
        assert!(maxima(&digits, &CalibrationTable::new()).is_empty());
    }

    #[test]
    fn test_flat_top_tie_break() {
        // Right neighbour may equal the center, left may not.
        let digits = digits_with_row(&[0, 40, 100, 100, 40, 0]);
        let found = maxima(&digits, &CalibrationTable::new());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].col, 2);
    }

    #[test]
    fn test_thresholds() {
        // Center below the absolute threshold.
        let digits = digits_with_row(&[0, 2, 4, 2, 0]);
        assert!(maxima(&digits, &CalibrationTable::new()).is_empty());

        // Neighbours below the significance threshold.
        let digits = digits_with_row(&[0, 3, 50, 3, 0]);
        assert!(maxima(&digits, &CalibrationTable::new()).is_empty());

        // Noise-scaled center threshold.
        let digits = digits_with_row(&[0, 10, 30, 10, 0]);
        assert_eq!(maxima(&digits, &CalibrationTable::new()).len(), 1);
        assert!(maxima(&digits, &CalibrationTable::new().with_noise(8.0)).is_empty());

        // Noise-scaled sum threshold: 4*6=24 passes the center cut, 8*6=48 fails the sum.
        let digits = digits_with_row(&[0, 4, 30, 4, 0]);
        assert!(maxima(&digits, &CalibrationTable::new().with_noise(6.0)).is_empty());
    }

    #[test]
    fn test_bad_center_pad() {
        let digits = digits_with_row(&[0, 0, 50, 100, 60, 0, 0]);
        let mut calib = CalibrationTable::new();
        calib.set_pad_status(0, 0, 3, PadStatus::Masked);

        let found = maxima(&digits, &calib);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].col, 3);
        assert_eq!(found[0].signals, [50, 4, 60]);
        assert_eq!(
            found[0].masked,
            Some(MaskedPad {
                position: MaskedPosition::Center,
                status: PadStatus::Masked,
            })
        );
    }

    #[test]
    fn test_bad_neighbour_pads() {
        // Dead pads read nothing.
        let digits = digits_with_row(&[0, 0, 50, 100, 0, 0, 0]);

        let mut calib = CalibrationTable::new();
        calib.set_pad_status(0, 0, 4, PadStatus::NotConnected);
        let found = maxima(&digits, &calib);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signals, [50, 100, 0]);
        assert_eq!(found[0].masked.map(|m| m.position), Some(MaskedPosition::Right));

        let digits = digits_with_row(&[0, 0, 0, 100, 60, 0, 0]);
        let mut calib = CalibrationTable::new();
        calib.set_pad_status(0, 0, 2, PadStatus::BridgedLeft);
        let found = maxima(&digits, &calib);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signals, [0, 100, 60]);
        assert_eq!(
            found[0].masked.map(|m| m.status),
            Some(PadStatus::BridgedLeft)
        );
    }

    #[test]
    fn test_two_bad_pads_reject() {
        let digits = digits_with_row(&[0, 0, 50, 100, 60, 0, 0]);
        let mut calib = CalibrationTable::new();
        calib.set_pad_status(0, 0, 3, PadStatus::Masked);
        calib.set_pad_status(0, 0, 4, PadStatus::Masked);
        assert!(maxima(&digits, &calib).is_empty());
    }

    #[test]
    fn test_shares_boundary() {
        let left = MaxCandidate {
            row: 0,
            col: 4,
            time: 7,
            signals: [1, 2, 1],
            masked: None,
            five_pad: false,
        };
        let right = MaxCandidate { col: 6, ..left };
        assert!(left.shares_boundary_with(&right));
        assert!(!right.shares_boundary_with(&left));
        assert!(!left.shares_boundary_with(&MaxCandidate { time: 8, ..right }));
    }
}
