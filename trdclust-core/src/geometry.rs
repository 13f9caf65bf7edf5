//! Chamber identity and the local-to-tracking space transform.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of layers in a stack.
pub const N_LAYER: u8 = 6;
/// Number of stacks along the beam direction.
pub const N_STACK: u8 = 5;
/// Number of azimuthal sectors.
pub const N_SECTOR: u8 = 18;
/// Total number of chambers.
pub const N_DETECTOR: u16 = N_LAYER as u16 * N_STACK as u16 * N_SECTOR as u16;

/// Layer/stack/sector address of a chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChamberId {
    pub layer: u8,
    pub stack: u8,
    pub sector: u8,
}

impl ChamberId {
    /// Creates a chamber address, rejecting coordinates outside the detector.
    pub fn new(layer: u8, stack: u8, sector: u8) -> Result<Self> {
        if layer >= N_LAYER || stack >= N_STACK || sector >= N_SECTOR {
            return Err(Error::InvalidChamber {
                layer,
                stack,
                sector,
            });
        }
        Ok(Self {
            layer,
            stack,
            sector,
        })
    }

    /// Recovers the address from a detector number.
    pub fn from_detector(detector: u16) -> Result<Self> {
        let layers = u16::from(N_LAYER);
        let stacks = u16::from(N_STACK);
        if detector >= N_DETECTOR {
            return Err(Error::InvalidChamber {
                layer: (detector % layers) as u8,
                stack: ((detector / layers) % stacks) as u8,
                sector: (detector / (layers * stacks)) as u8,
            });
        }
        Ok(Self {
            layer: (detector % layers) as u8,
            stack: ((detector / layers) % stacks) as u8,
            sector: (detector / (layers * stacks)) as u8,
        })
    }

    /// Detector number: `layer + 6 * stack + 30 * sector`.
    #[inline]
    #[must_use]
    pub fn detector(&self) -> u16 {
        u16::from(self.layer)
            + u16::from(N_LAYER) * u16::from(self.stack)
            + u16::from(N_LAYER) * u16::from(N_STACK) * u16::from(self.sector)
    }
}

/// A maximum in pad-local coordinates, as handed to the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalCluster {
    pub detector: u16,
    pub layer: u8,
    pub row: u16,
    pub col: u16,
    pub time: u16,
    /// Sub-pad position relative to the center pad, in pad units.
    pub pad_position: f64,
    /// Left, center and right amplitudes.
    pub signals: [i16; 3],
}

/// A calibrated space point in the local tracking frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpacePoint {
    /// x (drift direction), y (pad direction), z (row direction) in cm.
    pub position: [f32; 3],
    /// Variances in y and z (cm^2).
    pub sigma2: [f32; 2],
    pub charge: f32,
    /// Time bin after t0 correction.
    pub time_bin: i16,
    /// False when the point lies outside the nominal chamber volume.
    pub in_chamber: bool,
}

/// Maps pad-local cluster coordinates into the tracking frame.
///
/// Implementations hold the chamber geometry, alignment and drift
/// calibration; they are shared read-only between worker threads.
pub trait Transform: Send + Sync {
    fn transform(&self, local: &LocalCluster) -> SpacePoint;
}

/// Pad-plane geometry with a constant drift velocity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PadPlaneTransform {
    /// Pad width along y (cm).
    pub pad_width: f64,
    /// Pad length along z (cm).
    pub pad_length: f64,
    pub n_rows: usize,
    pub n_cols: usize,
    /// Drift velocity (cm/us).
    pub drift_velocity: f64,
    /// ADC sampling frequency (MHz).
    pub sampling_frequency: f64,
    /// Time offset in time bins.
    pub t0: f64,
    /// Drift plus amplification region depth (cm).
    pub drift_length: f64,
    /// Position resolution along y, as a fraction of the pad width.
    pub resolution_fraction: f64,
}

impl Default for PadPlaneTransform {
    fn default() -> Self {
        Self {
            pad_width: 0.7,
            pad_length: 8.0,
            n_rows: 16,
            n_cols: 144,
            drift_velocity: 1.5,
            sampling_frequency: 10.0,
            t0: 0.0,
            drift_length: 3.7,
            resolution_fraction: 0.06,
        }
    }
}

impl PadPlaneTransform {
    /// Sets the pad-plane size.
    #[must_use]
    pub fn with_pad_plane(mut self, n_rows: usize, n_cols: usize) -> Self {
        self.n_rows = n_rows;
        self.n_cols = n_cols;
        self
    }

    /// Sets the time offset.
    #[must_use]
    pub fn with_t0(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    /// Sets the drift velocity.
    #[must_use]
    pub fn with_drift_velocity(mut self, drift_velocity: f64) -> Self {
        self.drift_velocity = drift_velocity;
        self
    }
}

impl Transform for PadPlaneTransform {
    fn transform(&self, local: &LocalCluster) -> SpacePoint {
        let time = f64::from(local.time) - self.t0;
        let x = self.drift_velocity * time / self.sampling_frequency;
        let y = (f64::from(local.col) + 0.5 + local.pad_position - self.n_cols as f64 / 2.0)
            * self.pad_width;
        let z = (f64::from(local.row) + 0.5 - self.n_rows as f64 / 2.0) * self.pad_length;

        let half_width = self.n_cols as f64 * self.pad_width / 2.0;
        let in_chamber = (0.0..=self.drift_length).contains(&x) && y.abs() <= half_width;

        let sigma_y = self.pad_width * self.resolution_fraction;
        let charge: f64 = local.signals.iter().map(|&s| f64::from(s)).sum();

        SpacePoint {
            position: [x as f32, y as f32, z as f32],
            sigma2: [
                (sigma_y * sigma_y) as f32,
                (self.pad_length * self.pad_length / 12.0) as f32,
            ],
            charge: charge as f32,
            time_bin: time.round() as i16,
            in_chamber,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_detector_number_roundtrip() {
        let id = ChamberId::new(3, 2, 17).unwrap();
        assert_eq!(id.detector(), 3 + 12 + 510);
        assert_eq!(ChamberId::from_detector(id.detector()).unwrap(), id);
    }

    #[test]
    fn test_invalid_chamber() {
        assert!(ChamberId::new(6, 0, 0).is_err());
        assert!(ChamberId::from_detector(N_DETECTOR).is_err());
        assert_eq!(N_DETECTOR, 540);
    }

    #[test]
    fn test_pad_plane_transform() {
        let transform = PadPlaneTransform::default().with_pad_plane(2, 10);
        let local = LocalCluster {
            detector: 0,
            layer: 0,
            row: 1,
            col: 5,
            time: 10,
            pad_position: 0.25,
            signals: [10, 40, 20],
        };
        let point = transform.transform(&local);

        assert_relative_eq!(point.position[0], 1.5, epsilon = 1e-6);
        assert_relative_eq!(point.position[1], 0.75 * 0.7, epsilon = 1e-6);
        assert_relative_eq!(point.position[2], 4.0, epsilon = 1e-6);
        assert_relative_eq!(point.charge, 70.0);
        assert_eq!(point.time_bin, 10);
        assert!(point.in_chamber);
    }

    #[test]
    fn test_late_time_bin_outside_chamber() {
        let transform = PadPlaneTransform::default();
        let local = LocalCluster {
            detector: 0,
            layer: 0,
            row: 0,
            col: 70,
            time: 29,
            pad_position: 0.0,
            signals: [0, 10, 0],
        };
        // 1.5 cm/us * 2.9 us = 4.35 cm > 3.7 cm
        assert!(!transform.transform(&local).in_chamber);
    }
}
