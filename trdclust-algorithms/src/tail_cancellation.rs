//! Tail cancellation by recursive deconvolution.
//!
//! The front-end shaper leaves an exponential tail behind every pulse. The
//! filter models the tail as one or two exponentials and subtracts their
//! running remainder from each sample, pad by pad:
//!
//! ```text
//! out[i]       = in[i] - sum_k rem_k
//! rem_k        = rate_k * (rem_k + weight_k * out[i])
//! ```
//!
//! Every pad starts with empty remainders. Pads flagged bad skip the filter
//! so their noise never enters a valid recursive state.
#![allow(clippy::cast_possible_truncation)]

use trdclust_core::calibration::Calibration;
use trdclust_core::digits::{DigitArray, SignalIndex};
use trdclust_core::error::Result;
use trdclust_core::param::TailParams;

/// Deconvolution filter for one tail model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailFilter {
    rates: [f64; TailParams::MAX_COMPONENTS],
    weights: [f64; TailParams::MAX_COMPONENTS],
    n_exp: usize,
}

impl TailFilter {
    /// Builds the filter, validating the tail model first.
    pub fn new(params: &TailParams) -> Result<Self> {
        params.validate()?;
        let mut rates = [0.0; TailParams::MAX_COMPONENTS];
        let mut weights = [0.0; TailParams::MAX_COMPONENTS];
        for (k, component) in params.components.iter().enumerate() {
            rates[k] = (-TailParams::DT / component.time_constant).exp();
            weights[k] = component.weight;
        }
        Ok(Self {
            rates,
            weights,
            n_exp: params.components.len(),
        })
    }

    /// Per-sample decay factors of the active components.
    #[must_use]
    pub fn rates(&self) -> &[f64] {
        &self.rates[..self.n_exp]
    }

    /// Feedback weights of the active components.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights[..self.n_exp]
    }

    /// Deconvolves `source` into `target`. Both must have the same length.
    pub fn deconvolve(&self, source: &[f64], target: &mut [f64]) {
        debug_assert_eq!(source.len(), target.len());
        let mut remainder = [0.0; TailParams::MAX_COMPONENTS];
        let mut correction = 0.0;

        // Output first, then remainders, then the next correction.
        for (out, &sample) in target.iter_mut().zip(source) {
            let result = sample - correction;
            *out = result;

            for k in 0..self.n_exp {
                remainder[k] = self.rates[k] * (remainder[k] + self.weights[k] * result);
            }
            correction = remainder[..self.n_exp].iter().sum();
        }
    }
}

/// Scratch buffers for one pad's time series.
#[derive(Debug, Clone, Default)]
pub struct TailScratch {
    input: Vec<f64>,
    output: Vec<f64>,
}

impl TailScratch {
    fn prepare(&mut self, n_time: usize) {
        self.input.clear();
        self.input.resize(n_time, 0.0);
        self.output.clear();
        self.output.resize(n_time, 0.0);
    }
}

/// Gain correction, deconvolution and ADC threshold for a whole chamber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailCancellation {
    filter: TailFilter,
    adc_thresh: f64,
}

impl TailCancellation {
    /// Combines the filter with the ADC threshold.
    #[must_use]
    pub fn new(filter: TailFilter, adc_thresh: f32) -> Self {
        Self {
            filter,
            adc_thresh: f64::from(adc_thresh),
        }
    }

    /// The deconvolution filter.
    #[must_use]
    pub fn filter(&self) -> &TailFilter {
        &self.filter
    }

    /// Rewrites every indexed pad of the chamber in place.
    ///
    /// Each sample is divided by the chamber and pad gain, bad pads keep the
    /// gain-corrected input, good pads are deconvolved, and samples at or
    /// below the ADC threshold are zeroed. Returns the number of pads visited.
    pub fn apply<C: Calibration + ?Sized>(
        &self,
        detector: u16,
        digits: &mut DigitArray,
        index: &SignalIndex,
        calibration: &C,
        scratch: &mut TailScratch,
    ) -> usize {
        let gain_det = f64::from(calibration.gain_factor_det(detector));
        scratch.prepare(digits.n_time());

        let mut pads = 0;
        for (row, col) in index.pads() {
            let gain = gain_det * f64::from(calibration.gain_factor_pad(detector, row, col));
            let corrupted = calibration.pad_status(detector, row, col).is_bad();

            let mut series = digits.pad_series_mut(row, col);
            for (input, &adc) in scratch.input.iter_mut().zip(series.iter()) {
                *input = f64::from(adc) / gain;
            }

            if corrupted {
                scratch.output.copy_from_slice(&scratch.input);
            } else {
                self.filter.deconvolve(&scratch.input, &mut scratch.output);
            }

            for (sample, &out) in series.iter_mut().zip(&scratch.output) {
                *sample = if out > self.adc_thresh {
                    out.round_ties_even() as i16
                } else {
                    0
                };
            }
            pads += 1;
        }
        pads
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, clippy::cast_precision_loss)]
    use super::*;
    use approx::assert_abs_diff_eq;
    use trdclust_core::calibration::{CalibrationTable, PadStatus};
    use trdclust_core::geometry::ChamberId;
    use trdclust_core::param::ExpComponent;

    fn single() -> TailFilter {
        TailFilter::new(&TailParams::single()).unwrap()
    }

    /// Impulse of height `amplitude` at `start` followed by the tail the
    /// filter model predicts.
    fn tailed_pulse(filter: &TailFilter, amplitude: f64, start: usize, n: usize) -> Vec<f64> {
        let mut signal = vec![0.0; n];
        signal[start] = amplitude;
        for (i, sample) in signal.iter_mut().enumerate().skip(start + 1) {
            let steps = (i - start) as i32;
            *sample = filter
                .rates()
                .iter()
                .zip(filter.weights())
                .map(|(&rate, &weight)| weight * rate.powi(steps) * amplitude)
                .sum();
        }
        signal
    }

    #[test]
    fn test_rates_from_time_constants() {
        let filter = single();
        assert_eq!(filter.rates().len(), 1);
        assert_abs_diff_eq!(filter.rates()[0], (-0.1f64 / 1.156).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(filter.weights()[0], 0.066);
        assert_eq!(TailFilter::new(&TailParams::double()).unwrap().rates().len(), 2);
    }

    #[test]
    fn test_zero_signal_stays_zero() {
        let filter = TailFilter::new(&TailParams::double()).unwrap();
        let source = vec![0.0; 30];
        let mut target = vec![1.0; 30];
        filter.deconvolve(&source, &mut target);
        assert!(target.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_exponential_tail_is_removed() {
        let filter = single();
        let source = tailed_pulse(&filter, 1000.0, 3, 30);
        let mut target = vec![0.0; 30];
        filter.deconvolve(&source, &mut target);

        assert_abs_diff_eq!(target[3], 1000.0, epsilon = 1e-9);
        for (i, &v) in target.iter().enumerate() {
            if i != 3 {
                assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_double_exponential_tail_is_removed() {
        let filter = TailFilter::new(&TailParams {
            components: vec![
                ExpComponent {
                    time_constant: 1.156,
                    weight: 0.114,
                },
                ExpComponent {
                    time_constant: 0.3,
                    weight: 0.2,
                },
            ],
        })
        .unwrap();
        let source = tailed_pulse(&filter, 500.0, 0, 20);
        let mut target = vec![0.0; 20];
        filter.deconvolve(&source, &mut target);
        assert_abs_diff_eq!(target[0], 500.0, epsilon = 1e-9);
        assert!(target[1..].iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_invalid_tail_model_rejected() {
        assert!(TailFilter::new(&TailParams { components: vec![] }).is_err());
    }

    fn chamber_with_pulse() -> (DigitArray, SignalIndex, Vec<f64>) {
        let filter = single();
        let pulse = tailed_pulse(&filter, 800.0, 2, 24);
        let mut digits = DigitArray::zeros(1, 8, 24);
        for (t, &v) in pulse.iter().enumerate() {
            digits.set(0, 3, t, v.round() as i16);
        }
        let index = SignalIndex::from_digits(ChamberId::new(0, 0, 0).unwrap(), &digits);
        (digits, index, pulse)
    }

    #[test]
    fn test_chamber_tail_cancellation_recovers_impulse() {
        let (mut digits, index, _) = chamber_with_pulse();
        let calib = CalibrationTable::new();
        let tc = TailCancellation::new(single(), 0.0);
        let mut scratch = TailScratch::default();

        let pads = tc.apply(0, &mut digits, &index, &calib, &mut scratch);
        assert_eq!(pads, 1);
        assert_eq!(digits.get(0, 3, 2), 800);
        for t in (0..24).filter(|&t| t != 2) {
            assert!(digits.get(0, 3, t).abs() <= 1, "time bin {t}");
        }
    }

    #[test]
    fn test_bad_pad_skips_deconvolution() {
        let (mut digits, index, pulse) = chamber_with_pulse();
        let mut calib = CalibrationTable::new();
        calib.set_pad_status(0, 0, 3, PadStatus::Masked);
        let tc = TailCancellation::new(single(), 0.0);
        let mut scratch = TailScratch::default();

        tc.apply(0, &mut digits, &index, &calib, &mut scratch);
        // Tail survives untouched.
        assert_eq!(digits.get(0, 3, 3), pulse[3].round() as i16);
        assert!(digits.get(0, 3, 3) > 0);
    }

    #[test]
    fn test_gain_and_threshold() {
        let mut digits = DigitArray::zeros(1, 4, 3);
        digits.set(0, 1, 0, 100);
        digits.set(0, 1, 1, 9);
        digits.set(0, 1, 2, -20);
        let index = SignalIndex::new(ChamberId::new(0, 0, 0).unwrap(), [(0, 1)]);
        let mut calib = CalibrationTable::new().with_gain_factor(2.0);
        calib.set_pad_gain(0, 0, 1, 0.5);
        calib.set_pad_status(0, 0, 1, PadStatus::Masked);

        let tc = TailCancellation::new(single(), 9.0);
        tc.apply(0, &mut digits, &index, &calib, &mut TailScratch::default());

        // Gain product is 1.0; 9 is at the threshold, negatives are zeroed.
        assert_eq!(digits.get(0, 1, 0), 100);
        assert_eq!(digits.get(0, 1, 1), 0);
        assert_eq!(digits.get(0, 1, 2), 0);
    }
}
