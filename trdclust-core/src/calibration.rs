//! Calibration interface consumed by the clusterizer.
//!
//! The clusterizer only reads calibration constants. Providers are shared
//! between chamber workers and must not change while a run is in progress.
#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::N_LAYER;

/// Pad status from the calibration database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PadStatus {
    #[default]
    Ok,
    Masked,
    BridgedLeft,
    BridgedRight,
    ReadSecond,
    NotConnected,
}

impl PadStatus {
    /// Returns true for every status other than [`PadStatus::Ok`].
    #[inline]
    #[must_use]
    pub fn is_bad(self) -> bool {
        self != Self::Ok
    }
}

/// Read-only access to gain, noise, pad status and pad response.
pub trait Calibration: Send + Sync {
    /// Returns true if the provider has constants for the chamber.
    fn has_chamber(&self, detector: u16) -> bool;

    /// Chamber-wide gain factor.
    fn gain_factor_det(&self, detector: u16) -> f32;

    /// Pad gain factor relative to the chamber value.
    fn gain_factor_pad(&self, detector: u16, row: usize, col: usize) -> f32;

    /// Chamber-wide noise.
    fn noise_det(&self, detector: u16) -> f32;

    /// Pad noise relative to the chamber value.
    fn noise_pad(&self, detector: u16, row: usize, col: usize) -> f32;

    fn pad_status(&self, detector: u16, row: usize, col: usize) -> PadStatus;

    /// Expected left, center and right amplitudes for a charge `amplitude`
    /// deposited `position` pad widths from the center of the middle pad.
    fn pad_response(&self, amplitude: f64, position: f64, layer: u8) -> [f64; 3];
}

/// Chamber-wide constants with sparse per-pad overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ChamberCalibration {
    pub gain_factor: f32,
    pub noise: f32,
    pub pad_gain: HashMap<(usize, usize), f32>,
    pub pad_noise: HashMap<(usize, usize), f32>,
    pub pad_status: HashMap<(usize, usize), PadStatus>,
}

impl Default for ChamberCalibration {
    fn default() -> Self {
        Self {
            gain_factor: 1.0,
            noise: 1.0,
            pad_gain: HashMap::new(),
            pad_noise: HashMap::new(),
            pad_status: HashMap::new(),
        }
    }
}

/// In-memory calibration with a Gaussian pad-response function.
///
/// Chambers without an explicit entry fall back to `default_chamber` unless
/// `strict` is set, in which case they report no calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    pub default_chamber: ChamberCalibration,
    pub chambers: HashMap<u16, ChamberCalibration>,
    /// Width of the pad response per layer, in pad units.
    pub prf_sigma: [f64; N_LAYER as usize],
    pub strict: bool,
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self {
            default_chamber: ChamberCalibration::default(),
            chambers: HashMap::new(),
            prf_sigma: [0.515, 0.502, 0.491, 0.481, 0.471, 0.463],
            strict: false,
        }
    }
}

impl CalibrationTable {
    /// Creates a table where every chamber uses the default constants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only chambers with an explicit entry are calibrated.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Sets the noise of the default chamber.
    #[must_use]
    pub fn with_noise(mut self, noise: f32) -> Self {
        self.default_chamber.noise = noise;
        self
    }

    /// Sets the gain factor of the default chamber.
    #[must_use]
    pub fn with_gain_factor(mut self, gain_factor: f32) -> Self {
        self.default_chamber.gain_factor = gain_factor;
        self
    }

    /// Returns the constants of one chamber, creating them from the defaults.
    pub fn chamber_mut(&mut self, detector: u16) -> &mut ChamberCalibration {
        let default = &self.default_chamber;
        self.chambers
            .entry(detector)
            .or_insert_with(|| default.clone())
    }

    /// Marks a pad with a non-ok status.
    pub fn set_pad_status(&mut self, detector: u16, row: usize, col: usize, status: PadStatus) {
        self.chamber_mut(detector)
            .pad_status
            .insert((row, col), status);
    }

    /// Sets a pad gain factor.
    pub fn set_pad_gain(&mut self, detector: u16, row: usize, col: usize, gain: f32) {
        self.chamber_mut(detector).pad_gain.insert((row, col), gain);
    }

    /// Sets a pad noise value.
    pub fn set_pad_noise(&mut self, detector: u16, row: usize, col: usize, noise: f32) {
        self.chamber_mut(detector).pad_noise.insert((row, col), noise);
    }

    fn chamber(&self, detector: u16) -> &ChamberCalibration {
        self.chambers
            .get(&detector)
            .unwrap_or(&self.default_chamber)
    }

    /// Charge fraction a pad of unit width collects from a Gaussian cloud
    /// centered `offset` pad widths away.
    fn pad_fraction(sigma: f64, offset: f64) -> f64 {
        let norm = 1.0 / (sigma * std::f64::consts::SQRT_2);
        0.5 * (erf((offset + 0.5) * norm) - erf((offset - 0.5) * norm))
    }
}

impl Calibration for CalibrationTable {
    fn has_chamber(&self, detector: u16) -> bool {
        !self.strict || self.chambers.contains_key(&detector)
    }

    fn gain_factor_det(&self, detector: u16) -> f32 {
        self.chamber(detector).gain_factor
    }

    fn gain_factor_pad(&self, detector: u16, row: usize, col: usize) -> f32 {
        self.chamber(detector)
            .pad_gain
            .get(&(row, col))
            .copied()
            .unwrap_or(1.0)
    }

    fn noise_det(&self, detector: u16) -> f32 {
        self.chamber(detector).noise
    }

    fn noise_pad(&self, detector: u16, row: usize, col: usize) -> f32 {
        self.chamber(detector)
            .pad_noise
            .get(&(row, col))
            .copied()
            .unwrap_or(1.0)
    }

    fn pad_status(&self, detector: u16, row: usize, col: usize) -> PadStatus {
        self.chamber(detector)
            .pad_status
            .get(&(row, col))
            .copied()
            .unwrap_or_default()
    }

    fn pad_response(&self, amplitude: f64, position: f64, layer: u8) -> [f64; 3] {
        let layer = usize::from(layer).min(self.prf_sigma.len() - 1);
        let sigma = self.prf_sigma[layer];
        [
            amplitude * Self::pad_fraction(sigma, position + 1.0),
            amplitude * Self::pad_fraction(sigma, position),
            amplitude * Self::pad_fraction(sigma, position - 1.0),
        ]
    }
}

/// Error function (Abramowitz-Stegun 7.1.26, |error| < 1.5e-7).
fn erf(x: f64) -> f64 {
    const A: [f64; 5] = [
        0.254_829_592,
        -0.284_496_736,
        1.421_413_741,
        -1.453_152_027,
        1.061_405_429,
    ];
    const P: f64 = 0.327_591_1;

    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A[0] + t * (A[1] + t * (A[2] + t * (A[3] + t * A[4]))));
    sign * (1.0 - poly * (-x * x).exp())
}
