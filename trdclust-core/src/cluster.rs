//! Reconstructed clusters and the sink they are appended to.

use crate::calibration::PadStatus;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which pad of a three-pad maximum is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MaskedPosition {
    Left,
    Center,
    Right,
}

impl MaskedPosition {
    /// Numeric code: 1 (left), 2 (center), 3 (right).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Center => 2,
            Self::Right => 3,
        }
    }
}

/// The single bad pad tolerated inside a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaskedPad {
    pub position: MaskedPosition,
    pub status: PadStatus,
}

/// A reconstructed space point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    pub detector: u16,
    /// x (drift), y (pad), z (row) in the local tracking frame (cm).
    pub position: [f32; 3],
    /// Variances in y and z (cm^2).
    pub sigma2: [f32; 2],
    pub charge: f32,
    /// Number of pads above the significance threshold; at least 1.
    pub pad_count: u8,
    /// Amplitudes of the pads `col - 3 ..= col + 3`.
    pub signals: [i16; 7],
    pub pad_row: u16,
    pub pad_col: u16,
    pub pad_time: u16,
    /// Time bin after t0 correction.
    pub local_time_bin: i16,
    /// Sub-pad position relative to the center pad (pad units).
    pub center: f32,
    pub masked: Option<MaskedPad>,
    /// Charge was shared with a neighbouring maximum and unfolded.
    pub five_pad: bool,
    pub in_chamber: bool,
}

impl Cluster {
    /// Returns true if a bad pad contributed to the cluster.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.masked.is_some()
    }

    /// Sum of the center pad and its two neighbours.
    #[must_use]
    pub fn three_pad_sum(&self) -> i32 {
        self.signals[2..5].iter().map(|&s| i32::from(s)).sum()
    }
}

/// Destination for finished clusters.
pub trait ClusterStore {
    fn append(&mut self, cluster: Cluster);
}

impl ClusterStore for Vec<Cluster> {
    fn append(&mut self, cluster: Cluster) {
        self.push(cluster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> Cluster {
        Cluster {
            detector: 0,
            position: [0.0; 3],
            sigma2: [0.0; 2],
            charge: 0.0,
            pad_count: 1,
            signals: [1, 2, 10, 40, 20, 3, 0],
            pad_row: 0,
            pad_col: 5,
            pad_time: 3,
            local_time_bin: 3,
            center: 0.0,
            masked: None,
            five_pad: false,
            in_chamber: true,
        }
    }

    #[test]
    fn test_store_appends_in_order() {
        let mut store: Vec<Cluster> = Vec::new();
        let mut second = cluster();
        second.pad_col = 9;
        ClusterStore::append(&mut store, cluster());
        ClusterStore::append(&mut store, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store[1].pad_col, 9);
    }

    #[test]
    fn test_three_pad_sum_and_mask() {
        let mut c = cluster();
        assert_eq!(c.three_pad_sum(), 70);
        assert!(!c.is_masked());
        c.masked = Some(MaskedPad {
            position: MaskedPosition::Right,
            status: PadStatus::Masked,
        });
        assert!(c.is_masked());
        assert_eq!(MaskedPosition::Right.code(), 3);
    }
}
