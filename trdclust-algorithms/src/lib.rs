//! trdclust-algorithms: Processing stages of the pad-detector cluster finder.
//!
//! This crate provides the per-chamber reconstruction chain:
//! - **Tail cancellation** - recursive deconvolution of the shaper tail
//! - **Maximum search** - three-pad maxima with bad-pad tolerance
//! - **Unfolding** - charge split between neighbouring maxima (five-pad clusters)
//! - **Position** - lookup-table and center-of-gravity estimators
//! - **Clusterizer** - the scan loop and cluster builder
//!
#![warn(missing_docs)]

mod clusterizer;
mod lut;
mod maxima;
mod position;
mod processing;
mod tail_cancellation;
mod unfold;

pub use clusterizer::{ChamberState, Clusterizer, ClusterizerBuilder};
pub use lut::LUT_BINS;
pub use maxima::{MaxCandidate, MaximumFinder};
pub use position::{center_of_gravity, cog_window, PositionLut};
pub use processing::{reconstruct_chambers, Reconstruction};
pub use tail_cancellation::{TailCancellation, TailFilter, TailScratch};
pub use unfold::{unfold, FivePadResolver, Unfolded, UNFOLD_EPSILON, UNFOLD_MAX_ITERATIONS};

// Re-export core reconstruction types
pub use trdclust_core::cluster::{Cluster, ClusterStore};
pub use trdclust_core::statistics::{ClusterizerState, ClusterizerStatistics};
