//! Reconstruction parameters.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sub-pad position estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionMethod {
    /// Per-layer lookup table on the left/right charge asymmetry.
    #[default]
    Lut,
    /// Charge-weighted center of gravity over up to five pads.
    CenterOfGravity,
}

/// One exponential of the front-end tail.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExpComponent {
    /// Decay constant in units of 100 ns.
    pub time_constant: f64,
    /// Fraction of the output fed back into the tail.
    pub weight: f64,
}

/// Tail model removed by the deconvolution filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TailParams {
    pub components: Vec<ExpComponent>,
}

impl Default for TailParams {
    fn default() -> Self {
        Self::single()
    }
}

impl TailParams {
    /// Sampling interval in units of the time constants.
    pub const DT: f64 = 0.1;

    /// Maximum number of exponentials the filter handles.
    pub const MAX_COMPONENTS: usize = 2;

    /// One-exponential tail model.
    #[must_use]
    pub fn single() -> Self {
        Self {
            components: vec![ExpComponent {
                time_constant: 1.156,
                weight: 0.066,
            }],
        }
    }

    /// Two-exponential tail model.
    #[must_use]
    pub fn double() -> Self {
        Self {
            components: vec![
                ExpComponent {
                    time_constant: 1.156,
                    weight: 0.114,
                },
                ExpComponent {
                    time_constant: 0.130,
                    weight: 0.624,
                },
            ],
        }
    }

    /// Checks component count and time constants.
    pub fn validate(&self) -> Result<()> {
        if self.components.is_empty() || self.components.len() > Self::MAX_COMPONENTS {
            return Err(Error::InvalidParam(format!(
                "tail model needs 1 or 2 exponentials, got {}",
                self.components.len()
            )));
        }
        for component in &self.components {
            if component.time_constant <= 0.0 || component.time_constant.is_nan() {
                return Err(Error::InvalidParam(format!(
                    "tail time constant must be positive, got {}",
                    component.time_constant
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds and switches of the cluster finder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecoParam {
    /// Minimum amplitude of a maximum's center pad.
    pub max_thresh: f32,
    /// Minimum amplitude of a significant neighbour.
    pub sig_thresh: f32,
    /// Center threshold in units of the pad noise.
    pub min_max_cut_sigma: f32,
    /// Three-pad sum threshold in units of the pad noise.
    pub min_left_right_cut_sigma: f32,
    /// Samples at or below this value are zeroed after tail cancellation.
    pub adc_thresh: f32,
    pub position_method: PositionMethod,
    /// Run the deconvolution filter before the maximum search.
    pub tail_cancellation: bool,
    pub tail_params: TailParams,
    /// Trigger mode: skip pad counting and the 7-pad signal record.
    pub hlt_mode: bool,
}

impl Default for RecoParam {
    fn default() -> Self {
        Self {
            max_thresh: 4.5,
            sig_thresh: 3.5,
            min_max_cut_sigma: 4.0,
            min_left_right_cut_sigma: 8.0,
            adc_thresh: 0.0,
            position_method: PositionMethod::Lut,
            tail_cancellation: true,
            tail_params: TailParams::single(),
            hlt_mode: false,
        }
    }
}

impl RecoParam {
    /// Creates parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum threshold.
    #[must_use]
    pub fn with_max_thresh(mut self, thresh: f32) -> Self {
        self.max_thresh = thresh;
        self
    }

    /// Sets the significance threshold.
    #[must_use]
    pub fn with_sig_thresh(mut self, thresh: f32) -> Self {
        self.sig_thresh = thresh;
        self
    }

    /// Sets both noise cut factors.
    #[must_use]
    pub fn with_noise_cuts(mut self, max_sigma: f32, sum_sigma: f32) -> Self {
        self.min_max_cut_sigma = max_sigma;
        self.min_left_right_cut_sigma = sum_sigma;
        self
    }

    /// Sets the ADC threshold.
    #[must_use]
    pub fn with_adc_thresh(mut self, thresh: f32) -> Self {
        self.adc_thresh = thresh;
        self
    }

    /// Selects the position estimator.
    #[must_use]
    pub fn with_position_method(mut self, method: PositionMethod) -> Self {
        self.position_method = method;
        self
    }

    /// Enables or disables tail cancellation.
    #[must_use]
    pub fn with_tail_cancellation(mut self, enabled: bool) -> Self {
        self.tail_cancellation = enabled;
        self
    }

    /// Sets the tail model.
    #[must_use]
    pub fn with_tail_params(mut self, params: TailParams) -> Self {
        self.tail_params = params;
        self
    }

    /// Enables trigger mode.
    #[must_use]
    pub fn with_hlt_mode(mut self, hlt_mode: bool) -> Self {
        self.hlt_mode = hlt_mode;
        self
    }

    /// Rejects negative thresholds and malformed tail models.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("max_thresh", self.max_thresh),
            ("sig_thresh", self.sig_thresh),
            ("min_max_cut_sigma", self.min_max_cut_sigma),
            ("min_left_right_cut_sigma", self.min_left_right_cut_sigma),
            ("adc_thresh", self.adc_thresh),
        ];
        for (name, value) in thresholds {
            if value < 0.0 || value.is_nan() {
                return Err(Error::InvalidParam(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.tail_cancellation {
            self.tail_params.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let param = RecoParam::default();
        assert!(param.validate().is_ok());
        assert_eq!(param.position_method, PositionMethod::Lut);
        assert!(TailParams::double().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let param = RecoParam::new()
            .with_max_thresh(10.0)
            .with_sig_thresh(5.0)
            .with_noise_cuts(2.0, 3.0)
            .with_position_method(PositionMethod::CenterOfGravity)
            .with_tail_cancellation(false)
            .with_hlt_mode(true);

        assert!((param.max_thresh - 10.0).abs() < f32::EPSILON);
        assert!((param.sig_thresh - 5.0).abs() < f32::EPSILON);
        assert!((param.min_left_right_cut_sigma - 3.0).abs() < f32::EPSILON);
        assert!(!param.tail_cancellation);
        assert!(param.hlt_mode);
    }

    #[test]
    fn test_validation_failures() {
        assert!(RecoParam::new().with_sig_thresh(-1.0).validate().is_err());
        assert!(RecoParam::new().with_max_thresh(f32::NAN).validate().is_err());

        let empty = TailParams { components: vec![] };
        assert!(RecoParam::new()
            .with_tail_params(empty.clone())
            .validate()
            .is_err());
        // Tail model is irrelevant without tail cancellation.
        assert!(RecoParam::new()
            .with_tail_cancellation(false)
            .with_tail_params(empty)
            .validate()
            .is_ok());

        let mut negative = TailParams::single();
        negative.components[0].time_constant = -1.0;
        assert!(negative.validate().is_err());
    }
}
