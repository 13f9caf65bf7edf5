//! Error types for trdclust-core.

use thiserror::Error;

/// Result type alias for trdclust operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How a failure affects the surrounding reconstruction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A chamber precondition is missing; skip the chamber and go on.
    Skippable,
    /// Data and geometry disagree; the chamber is aborted and reported.
    Consistency,
    /// The run cannot continue.
    Fatal,
}

/// Core error types for cluster reconstruction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The chamber carries no digit data (switched off or empty).
    #[error("no digits for detector {detector}")]
    NoDigits { detector: u16 },

    /// The active-pad index of the chamber was never built.
    #[error("signal index not built for detector {detector}")]
    IndexNotBuilt { detector: u16 },

    /// The calibration provider has no constants for the chamber.
    #[error("no calibration for detector {detector}")]
    MissingCalibration { detector: u16 },

    /// Digit array and signal index disagree on the pad plane.
    #[error("digit array shape {rows}x{cols} does not contain pad ({row}, {col})")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        row: usize,
        col: usize,
    },

    /// Detector number computed from layer/stack/sector differs from the one requested.
    #[error("detector mismatch: requested {requested}, index points to {computed}")]
    DetectorMismatch { requested: u16, computed: u16 },

    /// Layer/stack/sector outside the detector.
    #[error("invalid chamber: layer {layer}, stack {stack}, sector {sector}")]
    InvalidChamber { layer: u8, stack: u8, sector: u8 },

    /// No calibration provider was supplied at startup.
    #[error("calibration service unavailable")]
    CalibrationUnavailable,

    /// Reconstruction parameters failed validation.
    #[error("invalid reconstruction parameter: {0}")]
    InvalidParam(String),
}

impl Error {
    /// Classifies the error for the multi-chamber driver.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoDigits { .. }
            | Self::IndexNotBuilt { .. }
            | Self::MissingCalibration { .. }
            | Self::DimensionMismatch { .. } => Severity::Skippable,
            Self::DetectorMismatch { .. } | Self::InvalidChamber { .. } => Severity::Consistency,
            Self::CalibrationUnavailable | Self::InvalidParam(_) => Severity::Fatal,
        }
    }

    /// Returns true if the whole run has to stop.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
