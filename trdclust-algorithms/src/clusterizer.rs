//! Per-chamber cluster reconstruction.
//!
//! [`Clusterizer::make_clusters`] runs the full chain on one chamber:
//! tail cancellation, the maximum scan with one-maximum look-ahead for
//! five-pad pairs, position estimation and the transform into a space point.
#![allow(clippy::cast_possible_truncation)]

use log::{debug, trace, warn};
use trdclust_core::calibration::Calibration;
use trdclust_core::cluster::{Cluster, ClusterStore};
use trdclust_core::digits::{ChamberDigits, DigitArray};
use trdclust_core::error::{Error, Result};
use trdclust_core::geometry::{LocalCluster, Transform};
use trdclust_core::param::{PositionMethod, RecoParam};
use trdclust_core::statistics::{ClusterizerState, ClusterizerStatistics};

use crate::maxima::{MaxCandidate, MaximumFinder};
use crate::position::{center_of_gravity, cog_window, PositionLut};
use crate::tail_cancellation::{TailCancellation, TailFilter, TailScratch};
use crate::unfold::FivePadResolver;

/// Scratch state of one worker, reused across chambers.
#[derive(Debug, Clone, Default)]
pub struct ChamberState {
    tail: TailScratch,
    stats: ClusterizerStatistics,
}

impl ChamberState {
    /// Counters of the last processed chamber.
    #[must_use]
    pub fn statistics(&self) -> ClusterizerStatistics {
        self.stats
    }
}

impl ClusterizerState for ChamberState {
    fn reset(&mut self) {
        self.stats = ClusterizerStatistics::default();
    }
}

/// Builder for [`Clusterizer`].
pub struct ClusterizerBuilder<'a> {
    param: RecoParam,
    calibration: Option<&'a dyn Calibration>,
    transform: Option<&'a dyn Transform>,
}

impl<'a> ClusterizerBuilder<'a> {
    /// Sets the calibration provider.
    #[must_use]
    pub fn calibration(mut self, calibration: &'a dyn Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Sets the space-point transform.
    #[must_use]
    pub fn transform(mut self, transform: &'a dyn Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Validates the parameters and builds the clusterizer.
    ///
    /// # Errors
    /// [`Error::CalibrationUnavailable`] without a calibration provider,
    /// [`Error::InvalidParam`] for bad parameters or a missing transform.
    pub fn build(self) -> Result<Clusterizer<'a>> {
        self.param.validate()?;
        let calibration = self.calibration.ok_or(Error::CalibrationUnavailable)?;
        let transform = self
            .transform
            .ok_or_else(|| Error::InvalidParam("no space-point transform configured".into()))?;

        let tail = if self.param.tail_cancellation {
            let filter = TailFilter::new(&self.param.tail_params)?;
            Some(TailCancellation::new(filter, self.param.adc_thresh))
        } else {
            None
        };

        Ok(Clusterizer {
            param: self.param,
            calibration,
            transform,
            lut: PositionLut::new(),
            tail,
        })
    }
}

/// Cluster finder for single chambers.
///
/// Holds only read-only collaborators, so one instance can serve many
/// worker threads, each with its own [`ChamberState`].
pub struct Clusterizer<'a> {
    param: RecoParam,
    calibration: &'a dyn Calibration,
    transform: &'a dyn Transform,
    lut: PositionLut,
    tail: Option<TailCancellation>,
}

impl<'a> Clusterizer<'a> {
    /// Starts a builder with the given parameters.
    #[must_use]
    pub fn builder(param: RecoParam) -> ClusterizerBuilder<'a> {
        ClusterizerBuilder {
            param,
            calibration: None,
            transform: None,
        }
    }

    /// The reconstruction parameters.
    #[must_use]
    pub fn param(&self) -> &RecoParam {
        &self.param
    }

    /// The position lookup table.
    #[must_use]
    pub fn lut(&self) -> &PositionLut {
        &self.lut
    }

    /// Creates a fresh scratch state for one worker.
    #[must_use]
    pub fn create_state(&self) -> ChamberState {
        ChamberState::default()
    }

    /// Reconstructs one chamber and appends its clusters to `store`.
    ///
    /// The digits are modified in place by the tail cancellation.
    ///
    /// # Errors
    /// Missing data, index or calibration for the chamber, an index that
    /// points outside the digit array, or an index built for another chamber.
    pub fn make_clusters<S: ClusterStore + ?Sized>(
        &self,
        chamber: &mut ChamberDigits,
        state: &mut ChamberState,
        store: &mut S,
    ) -> Result<ClusterizerStatistics> {
        state.reset();
        let detector = chamber.detector;

        if !chamber.digits.has_data() {
            return Err(Error::NoDigits { detector });
        }
        let Some(chamber_id) = chamber.index.chamber() else {
            return Err(Error::IndexNotBuilt { detector });
        };
        if !self.calibration.has_chamber(detector) {
            return Err(Error::MissingCalibration { detector });
        }
        let computed = chamber_id.detector();
        if computed != detector {
            warn!("detector {detector}: signal index belongs to detector {computed}");
            return Err(Error::DetectorMismatch {
                requested: detector,
                computed,
            });
        }
        chamber.index.check_bounds(&chamber.digits)?;

        if let Some(tail) = &self.tail {
            state.stats.pads_filtered = tail.apply(
                detector,
                &mut chamber.digits,
                &chamber.index,
                self.calibration,
                &mut state.tail,
            );
        }

        let digits = &chamber.digits;
        let layer = chamber_id.layer;
        let finder = MaximumFinder::new(&self.param, self.calibration, detector);
        let resolver = FivePadResolver::new(self.calibration, layer, self.param.sig_thresh);
        let stats = &mut state.stats;

        let mut last: Option<MaxCandidate> = None;
        for time in 0..digits.n_time() {
            for (row, col) in chamber.index.pads() {
                let Some(mut current) = finder.find(digits, row, col, time) else {
                    continue;
                };
                stats.maxima += 1;
                if current.masked.is_some() {
                    stats.corrupted += 1;
                }
                trace!(
                    "detector {detector}: maximum at row {row} col {col} time {time}: {:?}",
                    current.signals
                );

                if let Some(mut previous) = last.take() {
                    if resolver
                        .resolve(digits, &mut previous, &mut current)
                        .is_some()
                    {
                        stats.five_pad_merges += 1;
                    }
                    self.create_cluster(digits, detector, layer, &previous, stats, store);
                }
                last = Some(current);
            }
        }
        if let Some(previous) = last {
            self.create_cluster(digits, detector, layer, &previous, stats, store);
        }

        stats.chambers_processed = 1;
        debug!(
            "detector {detector}: {} maxima, {} clusters, {} corrupted, {} five-pad",
            stats.maxima, stats.clusters, stats.corrupted, stats.five_pad_merges
        );
        Ok(*stats)
    }

    fn create_cluster<S: ClusterStore + ?Sized>(
        &self,
        digits: &DigitArray,
        detector: u16,
        layer: u8,
        max: &MaxCandidate,
        stats: &mut ClusterizerStatistics,
        store: &mut S,
    ) {
        let [left, center, right] = max.signals.map(f64::from);
        let pad_position = match self.param.position_method {
            PositionMethod::Lut => self.lut.position(layer, left, center, right),
            PositionMethod::CenterOfGravity => center_of_gravity(&cog_window(digits, max)),
        };

        let (pad_count, signals) = if self.param.hlt_mode {
            (1, [0; 7])
        } else {
            self.pad_summary(digits, max)
        };

        let point = self.transform.transform(&LocalCluster {
            detector,
            layer,
            row: max.row as u16,
            col: max.col as u16,
            time: max.time as u16,
            pad_position,
            signals: max.signals,
        });

        if !point.in_chamber {
            stats.out_of_chamber += 1;
        }
        stats.clusters += 1;

        store.append(Cluster {
            detector,
            position: point.position,
            sigma2: point.sigma2,
            charge: point.charge,
            pad_count,
            signals,
            pad_row: max.row as u16,
            pad_col: max.col as u16,
            pad_time: max.time as u16,
            local_time_bin: point.time_bin,
            center: pad_position as f32,
            masked: max.masked,
            five_pad: max.five_pad,
            in_chamber: point.in_chamber,
        });
    }

    /// Counts the significant pads around the maximum and records the
    /// seven-pad window `col - 3 ..= col + 3`.
    fn pad_summary(&self, digits: &DigitArray, max: &MaxCandidate) -> (u8, [i16; 7]) {
        let (row, col, time) = (max.row, max.col, max.time);
        let significant = |c: usize| f32::from(digits.get(row, c, time)) >= self.param.sig_thresh;

        let mut pad_count: u8 = 1;
        let mut offset = 1;
        while offset <= col && significant(col - offset) {
            pad_count = pad_count.saturating_add(1);
            offset += 1;
        }
        offset = 1;
        while col + offset < digits.n_cols() && significant(col + offset) {
            pad_count = pad_count.saturating_add(1);
            offset += 1;
        }

        let mut signals = [0; 7];
        for (slot, value) in signals.iter_mut().enumerate() {
            if let Some(c) = (col + slot).checked_sub(3) {
                *value = digits.get(row, c, time);
            }
        }
        signals[2..5].copy_from_slice(&max.signals);
        (pad_count, signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trdclust_core::calibration::CalibrationTable;
    use trdclust_core::digits::SignalIndex;
    use trdclust_core::geometry::{ChamberId, PadPlaneTransform};

    fn chamber_with_row(values: &[i16]) -> ChamberDigits {
        let mut digits = DigitArray::zeros(1, values.len(), 2);
        for (col, &v) in values.iter().enumerate() {
            digits.set(0, col, 1, v);
        }
        ChamberDigits::with_built_index(ChamberId::new(0, 0, 0).unwrap(), digits)
    }

    fn plain_param() -> RecoParam {
        RecoParam::default().with_tail_cancellation(false)
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let calib = CalibrationTable::new();
        let transform = PadPlaneTransform::default();

        let err = Clusterizer::builder(plain_param())
            .transform(&transform)
            .build()
            .err();
        assert_eq!(err, Some(Error::CalibrationUnavailable));

        let err = Clusterizer::builder(plain_param())
            .calibration(&calib)
            .build()
            .err();
        assert!(matches!(err, Some(Error::InvalidParam(_))));

        let err = Clusterizer::builder(plain_param().with_max_thresh(-1.0))
            .calibration(&calib)
            .transform(&transform)
            .build()
            .err();
        assert!(matches!(err, Some(Error::InvalidParam(_))));
    }

    #[test]
    fn test_pad_summary_counts_significant_run() {
        let calib = CalibrationTable::new();
        let transform = PadPlaneTransform::default();
        let clusterizer = Clusterizer::builder(plain_param())
            .calibration(&calib)
            .transform(&transform)
            .build()
            .unwrap();

        let mut chamber = chamber_with_row(&[2, 4, 5, 50, 120, 60, 8, 3, 0]);
        let mut clusters = Vec::new();
        let stats = clusterizer
            .make_clusters(&mut chamber, &mut clusterizer.create_state(), &mut clusters)
            .unwrap();

        assert_eq!(stats.clusters, 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.pad_col, 4);
        assert_eq!(cluster.pad_time, 1);
        // 4, 5, 50 on the left, 60, 8 on the right.
        assert_eq!(cluster.pad_count, 6);
        assert_eq!(cluster.signals, [4, 5, 50, 120, 60, 8, 3]);
    }

    #[test]
    fn test_precondition_errors() {
        let calib = CalibrationTable::new().strict();
        let transform = PadPlaneTransform::default();
        let clusterizer = Clusterizer::builder(plain_param())
            .calibration(&calib)
            .transform(&transform)
            .build()
            .unwrap();
        let mut state = clusterizer.create_state();
        let mut clusters = Vec::new();

        let mut empty = ChamberDigits::default();
        assert_eq!(
            clusterizer.make_clusters(&mut empty, &mut state, &mut clusters),
            Err(Error::NoDigits { detector: 0 })
        );

        let mut unindexed = ChamberDigits {
            detector: 0,
            digits: DigitArray::zeros(1, 4, 1),
            index: SignalIndex::default(),
        };
        assert_eq!(
            clusterizer.make_clusters(&mut unindexed, &mut state, &mut clusters),
            Err(Error::IndexNotBuilt { detector: 0 })
        );

        let mut chamber = chamber_with_row(&[0, 50, 120, 60, 0]);
        assert_eq!(
            clusterizer.make_clusters(&mut chamber, &mut state, &mut clusters),
            Err(Error::MissingCalibration { detector: 0 })
        );
        assert!(clusters.is_empty());
    }
}
