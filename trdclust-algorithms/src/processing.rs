//! Event-level processing helpers that run the clusterizer over many chambers.

use log::{debug, info, warn};
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use trdclust_core::cluster::Cluster;
use trdclust_core::digits::{ChamberDigits, SignalIndex};
use trdclust_core::error::Result;
use trdclust_core::geometry::ChamberId;
use trdclust_core::statistics::ClusterizerStatistics;

use crate::clusterizer::{ChamberState, Clusterizer};

/// Clusters of one event with the counters summed over its chambers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reconstruction {
    /// Clusters in chamber order.
    pub clusters: Vec<Cluster>,
    /// Aggregate counters.
    pub statistics: ClusterizerStatistics,
}

/// Reconstructs every chamber of an event in parallel.
///
/// Chambers without data or without active pads are skipped, a missing
/// index is built from the digits. Chambers failing a precondition or a
/// consistency check are logged and skipped; fatal errors abort the run.
/// Digits of processed chambers are released afterwards.
///
/// # Errors
/// Returns the first fatal error in chamber order.
pub fn reconstruct_chambers(
    clusterizer: &Clusterizer<'_>,
    chambers: &mut [ChamberDigits],
) -> Result<Reconstruction> {
    let outcomes: Vec<Result<Option<(Vec<Cluster>, ClusterizerStatistics)>>> = chambers
        .par_iter_mut()
        .map_init(
            || clusterizer.create_state(),
            |state, chamber| reconstruct_chamber(clusterizer, chamber, state),
        )
        .collect();

    let mut reconstruction = Reconstruction::default();
    for (chamber, outcome) in chambers.iter().zip(outcomes) {
        match outcome {
            Ok(Some((clusters, statistics))) => {
                reconstruction.clusters.extend(clusters);
                reconstruction.statistics += statistics;
            }
            Ok(None) => reconstruction.statistics.chambers_skipped += 1,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!("skipping detector {}: {err}", chamber.detector);
                reconstruction.statistics.chambers_skipped += 1;
            }
        }
    }

    info!(
        "number of found clusters: {}",
        reconstruction.clusters.len()
    );
    Ok(reconstruction)
}

/// Runs one chamber. `Ok(None)` means there was nothing to reconstruct.
fn reconstruct_chamber(
    clusterizer: &Clusterizer<'_>,
    chamber: &mut ChamberDigits,
    state: &mut ChamberState,
) -> Result<Option<(Vec<Cluster>, ClusterizerStatistics)>> {
    if !chamber.digits.has_data() {
        debug!("detector {}: no digits", chamber.detector);
        return Ok(None);
    }
    if !chamber.index.is_allocated() {
        let chamber_id = ChamberId::from_detector(chamber.detector)?;
        chamber.index = SignalIndex::from_digits(chamber_id, &chamber.digits);
    }
    if !chamber.index.has_entry() {
        debug!("detector {}: no active pads", chamber.detector);
        return Ok(None);
    }

    chamber.digits.delete_negatives();
    let mut clusters = Vec::new();
    let statistics = clusterizer.make_clusters(chamber, state, &mut clusters)?;
    chamber.release();
    Ok(Some((clusters, statistics)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trdclust_core::calibration::CalibrationTable;
    use trdclust_core::digits::DigitArray;
    use trdclust_core::geometry::PadPlaneTransform;
    use trdclust_core::param::RecoParam;

    fn chamber_with_pulse(detector: u16) -> ChamberDigits {
        let mut digits = DigitArray::zeros(2, 16, 4);
        for (col, v) in [(6, 50), (7, 120), (8, 60)] {
            digits.set(1, col, 2, v);
        }
        ChamberDigits {
            detector,
            digits,
            index: SignalIndex::default(),
        }
    }

    #[test]
    fn test_builds_missing_index_and_releases_digits() {
        let calib = CalibrationTable::new();
        let transform = PadPlaneTransform::default().with_pad_plane(2, 16);
        let clusterizer = Clusterizer::builder(RecoParam::default().with_tail_cancellation(false))
            .calibration(&calib)
            .transform(&transform)
            .build()
            .unwrap();

        let mut chambers = vec![
            chamber_with_pulse(37),
            ChamberDigits::default(),
            chamber_with_pulse(500),
        ];
        let result = reconstruct_chambers(&clusterizer, &mut chambers).unwrap();

        assert_eq!(result.clusters.len(), 2);
        assert_eq!(result.clusters[0].detector, 37);
        assert_eq!(result.clusters[1].detector, 500);
        assert_eq!(result.statistics.chambers_processed, 2);
        assert_eq!(result.statistics.chambers_skipped, 1);
        assert!(!chambers[0].digits.has_data());
    }

    #[test]
    fn test_invalid_detector_is_skipped() {
        let calib = CalibrationTable::new();
        let transform = PadPlaneTransform::default();
        let clusterizer = Clusterizer::builder(RecoParam::default())
            .calibration(&calib)
            .transform(&transform)
            .build()
            .unwrap();

        let mut chambers = vec![chamber_with_pulse(540)];
        let result = reconstruct_chambers(&clusterizer, &mut chambers).unwrap();
        assert!(result.clusters.is_empty());
        assert_eq!(result.statistics.chambers_skipped, 1);
    }
}
