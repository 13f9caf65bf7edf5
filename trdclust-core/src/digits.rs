//! Digit storage and the active-pad index of a chamber.
//!
//! A chamber's digits live in a dense `[row, col, time]` array. The time axis
//! is the innermost one, so each pad's time series is a contiguous slice that
//! the tail cancellation filter can rewrite in place.
#![allow(clippy::cast_possible_truncation)]

use ndarray::{s, Array3, ArrayViewMut1};

use crate::error::{Error, Result};
use crate::geometry::ChamberId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense 3D array of ADC amplitudes for one chamber.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitArray {
    data: Array3<i16>,
}

impl DigitArray {
    /// Creates a zeroed array.
    #[must_use]
    pub fn zeros(n_rows: usize, n_cols: usize, n_time: usize) -> Self {
        Self {
            data: Array3::zeros((n_rows, n_cols, n_time)),
        }
    }

    /// Wraps an existing `[row, col, time]` array.
    #[must_use]
    pub fn from_array(data: Array3<i16>) -> Self {
        Self { data }
    }

    /// Returns true if the array holds any samples at all.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.data.dim().0
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.data.dim().1
    }

    #[must_use]
    pub fn n_time(&self) -> usize {
        self.data.dim().2
    }

    /// Amplitude at `(row, col, time)`; 0 outside the array.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize, time: usize) -> i16 {
        self.data.get((row, col, time)).copied().unwrap_or(0)
    }

    /// Amplitude with a signed column, for neighbour lookups past the edge.
    #[inline]
    #[must_use]
    pub fn get_signed(&self, row: usize, col: i64, time: usize) -> i16 {
        usize::try_from(col).map_or(0, |col| self.get(row, col, time))
    }

    /// Sets one sample. Writes outside the array are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, time: usize, value: i16) {
        if let Some(sample) = self.data.get_mut((row, col, time)) {
            *sample = value;
        }
    }

    /// Mutable view of one pad's time series.
    pub fn pad_series_mut(&mut self, row: usize, col: usize) -> ArrayViewMut1<'_, i16> {
        self.data.slice_mut(s![row, col, ..])
    }

    /// Clamps negative samples to zero.
    pub fn delete_negatives(&mut self) {
        self.data.mapv_inplace(|v| v.max(0));
    }

    /// Zeroes the array, keeping its allocation for the next chamber.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Resizes to a new pad plane and zeroes every sample.
    ///
    /// The allocation is kept when the shape does not change.
    pub fn reshape(&mut self, n_rows: usize, n_cols: usize, n_time: usize) {
        if self.data.dim() == (n_rows, n_cols, n_time) {
            self.clear();
        } else {
            self.data = Array3::zeros((n_rows, n_cols, n_time));
        }
    }

    /// Drops all samples.
    pub fn release(&mut self) {
        self.data = Array3::zeros((0, 0, 0));
    }
}

/// Active pads of one chamber, in scan order.
///
/// Pads are kept sorted by row and then by column with duplicates removed.
/// The maximum search relies on this order to see neighbouring maxima one
/// after the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalIndex {
    chamber: Option<ChamberId>,
    pads: Vec<(u16, u16)>,
}

impl SignalIndex {
    /// Creates an index for the given pads.
    pub fn new(chamber: ChamberId, pads: impl IntoIterator<Item = (u16, u16)>) -> Self {
        let mut pads: Vec<(u16, u16)> = pads.into_iter().collect();
        pads.sort_unstable();
        pads.dedup();
        Self {
            chamber: Some(chamber),
            pads,
        }
    }

    /// Builds the index from every pad with at least one nonzero sample.
    pub fn from_digits(chamber: ChamberId, digits: &DigitArray) -> Self {
        let (n_rows, n_cols, _) = digits.data.dim();
        let mut pads = Vec::new();
        for row in 0..n_rows {
            for col in 0..n_cols {
                if digits.data.slice(s![row, col, ..]).iter().any(|&v| v != 0) {
                    pads.push((row as u16, col as u16));
                }
            }
        }
        Self {
            chamber: Some(chamber),
            pads,
        }
    }

    /// Returns true once a chamber has been assigned.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.chamber.is_some()
    }

    /// Returns true if at least one pad is active.
    #[must_use]
    pub fn has_entry(&self) -> bool {
        !self.pads.is_empty()
    }

    #[must_use]
    pub fn chamber(&self) -> Option<ChamberId> {
        self.chamber
    }

    /// Number of active pads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    /// Active `(row, col)` pairs in ascending row, then column order.
    pub fn pads(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pads
            .iter()
            .map(|&(row, col)| (usize::from(row), usize::from(col)))
    }

    /// Checks that every indexed pad lies inside the array.
    pub fn check_bounds(&self, digits: &DigitArray) -> Result<()> {
        let (rows, cols) = (digits.n_rows(), digits.n_cols());
        match self
            .pads()
            .find(|&(row, col)| row >= rows || col >= cols)
        {
            Some((row, col)) => Err(Error::DimensionMismatch {
                rows,
                cols,
                row,
                col,
            }),
            None => Ok(()),
        }
    }

    /// Forgets the pads and the chamber.
    pub fn clear(&mut self) {
        self.chamber = None;
        self.pads.clear();
    }
}

/// Everything the clusterizer needs from the digit source for one chamber.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChamberDigits {
    /// Detector number the caller asks to reconstruct.
    pub detector: u16,
    pub digits: DigitArray,
    pub index: SignalIndex,
}

impl ChamberDigits {
    /// Bundles digits with an index built from their nonzero pads.
    #[must_use]
    pub fn with_built_index(chamber: ChamberId, digits: DigitArray) -> Self {
        let index = SignalIndex::from_digits(chamber, &digits);
        Self {
            detector: chamber.detector(),
            digits,
            index,
        }
    }

    /// Releases the digits and the index after processing.
    pub fn release(&mut self) {
        self.digits.release();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chamber() -> ChamberId {
        ChamberId::new(0, 0, 0).unwrap()
    }

    #[test]
    fn test_digit_array_access() {
        let mut digits = DigitArray::zeros(2, 4, 3);
        assert!(digits.has_data());
        digits.set(1, 2, 0, 17);
        assert_eq!(digits.get(1, 2, 0), 17);
        assert_eq!(digits.get(5, 2, 0), 0);
        assert_eq!(digits.get_signed(1, -1, 0), 0);
        assert_eq!(digits.get_signed(1, 2, 0), 17);

        digits.pad_series_mut(1, 2).fill(-3);
        digits.delete_negatives();
        assert_eq!(digits.get(1, 2, 2), 0);
    }

    #[test]
    fn test_reshape_reuses_array() {
        let mut digits = DigitArray::zeros(2, 4, 3);
        digits.set(1, 3, 2, 9);
        digits.reshape(2, 4, 3);
        assert_eq!(digits.get(1, 3, 2), 0);

        digits.reshape(16, 144, 24);
        assert_eq!(
            (digits.n_rows(), digits.n_cols(), digits.n_time()),
            (16, 144, 24)
        );
    }

    #[test]
    fn test_empty_array_has_no_data() {
        assert!(!DigitArray::default().has_data());
        let mut digits = DigitArray::zeros(1, 1, 1);
        digits.release();
        assert!(!digits.has_data());
    }

    #[test]
    fn test_index_is_sorted_and_deduplicated() {
        let index = SignalIndex::new(chamber(), [(1, 5), (0, 7), (1, 2), (0, 7)]);
        let pads: Vec<_> = index.pads().collect();
        assert_eq!(pads, vec![(0, 7), (1, 2), (1, 5)]);
        assert!(index.is_allocated());
        assert!(index.has_entry());
    }

    #[test]
    fn test_index_from_digits() {
        let mut digits = DigitArray::zeros(2, 3, 4);
        digits.set(1, 0, 3, 5);
        digits.set(0, 2, 1, 9);
        let index = SignalIndex::from_digits(chamber(), &digits);
        assert_eq!(index.pads().collect::<Vec<_>>(), vec![(0, 2), (1, 0)]);
    }

    #[test]
    fn test_index_bounds_check() {
        let digits = DigitArray::zeros(2, 3, 4);
        let index = SignalIndex::new(chamber(), [(0, 3)]);
        assert!(matches!(
            index.check_bounds(&digits),
            Err(Error::DimensionMismatch { col: 3, .. })
        ));
        assert!(!SignalIndex::default().is_allocated());
    }
}
