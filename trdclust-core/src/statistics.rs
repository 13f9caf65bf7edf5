//! Diagnostic counters and the reusable per-worker state trait.

use std::ops::AddAssign;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counters collected while reconstructing chambers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterizerStatistics {
    /// Chambers that produced a cluster list.
    pub chambers_processed: usize,
    /// Chambers skipped because of a failed precondition.
    pub chambers_skipped: usize,
    /// Pads run through the tail cancellation filter.
    pub pads_filtered: usize,
    /// Three-pad maxima found.
    pub maxima: usize,
    /// Maxima with one bad pad.
    pub corrupted: usize,
    /// Pairs of maxima unfolded as five-pad clusters.
    pub five_pad_merges: usize,
    /// Clusters appended to the store.
    pub clusters: usize,
    /// Clusters outside the nominal chamber volume.
    pub out_of_chamber: usize,
}

impl AddAssign for ClusterizerStatistics {
    fn add_assign(&mut self, other: Self) {
        self.chambers_processed += other.chambers_processed;
        self.chambers_skipped += other.chambers_skipped;
        self.pads_filtered += other.pads_filtered;
        self.maxima += other.maxima;
        self.corrupted += other.corrupted;
        self.five_pad_merges += other.five_pad_merges;
        self.clusters += other.clusters;
        self.out_of_chamber += other.out_of_chamber;
    }
}

/// Scratch state reused from one chamber to the next.
pub trait ClusterizerState {
    /// Resets counters and scratch buffers without freeing them.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_accumulate() {
        let mut total = ClusterizerStatistics::default();
        total += ClusterizerStatistics {
            chambers_processed: 1,
            maxima: 4,
            clusters: 4,
            five_pad_merges: 1,
            ..Default::default()
        };
        total += ClusterizerStatistics {
            chambers_skipped: 1,
            ..Default::default()
        };
        assert_eq!(total.chambers_processed, 1);
        assert_eq!(total.chambers_skipped, 1);
        assert_eq!(total.maxima, 4);
        assert_eq!(total.five_pad_merges, 1);
    }
}
