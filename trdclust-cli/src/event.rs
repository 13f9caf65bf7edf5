//! JSON event files: sparse per-chamber digits plus optional bad-pad list.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use trdclust_core::calibration::{CalibrationTable, PadStatus};
use trdclust_core::digits::{ChamberDigits, DigitArray, SignalIndex};

use crate::{CliError, Result};

/// One ADC sample.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DigitRecord {
    pub row: usize,
    pub col: usize,
    pub time: usize,
    pub adc: i16,
}

/// A chamber's pad-plane size and its non-zero samples.
#[derive(Debug, Clone, Deserialize)]
pub struct ChamberRecord {
    pub detector: u16,
    pub rows: usize,
    pub cols: usize,
    pub time_bins: usize,
    #[serde(default)]
    pub digits: Vec<DigitRecord>,
}

/// Pad with a non-default status.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BadPadRecord {
    pub detector: u16,
    pub row: usize,
    pub col: usize,
    pub status: PadStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventFile {
    pub chambers: Vec<ChamberRecord>,
    #[serde(default)]
    pub bad_pads: Vec<BadPadRecord>,
}

impl EventFile {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Number of samples over all chambers.
    pub fn digit_count(&self) -> usize {
        self.chambers.iter().map(|c| c.digits.len()).sum()
    }

    /// Registers the bad pads in `calib`.
    pub fn apply_pad_status(&self, calib: &mut CalibrationTable) {
        for pad in &self.bad_pads {
            calib.set_pad_status(pad.detector, pad.row, pad.col, pad.status);
        }
    }

    /// Expands the sparse samples into dense chamber arrays.
    ///
    /// The active-pad index is left unbuilt; the event driver fills it in.
    pub fn into_chambers(self) -> Result<Vec<ChamberDigits>> {
        self.chambers
            .into_iter()
            .map(ChamberRecord::into_chamber)
            .collect()
    }
}

impl ChamberRecord {
    fn into_chamber(self) -> Result<ChamberDigits> {
        let mut digits = DigitArray::zeros(self.rows, self.cols, self.time_bins);
        for d in &self.digits {
            if d.row >= self.rows || d.col >= self.cols || d.time >= self.time_bins {
                return Err(CliError::Input(format!(
                    "detector {}: sample ({}, {}, {}) outside {}x{}x{}",
                    self.detector, d.row, d.col, d.time, self.rows, self.cols, self.time_bins
                )));
            }
            digits.set(d.row, d.col, d.time, d.adc);
        }
        Ok(ChamberDigits {
            detector: self.detector,
            digits,
            index: SignalIndex::default(),
        })
    }
}
