//! trdclust-core: Core types and interfaces for pad-detector cluster reconstruction.
//!
//! This crate holds the data the cluster finder consumes and produces: the
//! per-chamber digit array and active-pad index, the calibration and
//! geometry interfaces, the reconstruction parameters and the cluster record.
//!

pub mod calibration;
pub mod cluster;
pub mod digits;
pub mod error;
pub mod geometry;
pub mod param;
pub mod statistics;

pub use calibration::{Calibration, CalibrationTable, ChamberCalibration, PadStatus};
pub use cluster::{Cluster, ClusterStore, MaskedPad, MaskedPosition};
pub use digits::{ChamberDigits, DigitArray, SignalIndex};
pub use error::{Error, Result, Severity};
pub use geometry::{ChamberId, LocalCluster, PadPlaneTransform, SpacePoint, Transform};
pub use param::{ExpComponent, PositionMethod, RecoParam, TailParams};
pub use statistics::{ClusterizerState, ClusterizerStatistics};
