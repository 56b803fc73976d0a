//! Channel-averaged weighted spectrum sampling

use crate::error::{Result, SpectrumError};
use crate::weights::WeightTable;

/// Per-channel decibel magnitudes for one analysis window, `fft_size / 2` long
#[derive(Debug, Clone, PartialEq)]
pub struct RawBinFrame {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl RawBinFrame {
    /// A frame of `bins` bins per channel, all set to `fill`
    pub fn new(bins: usize, fill: f32) -> Self {
        Self {
            left: vec![fill; bins],
            right: vec![fill; bins],
        }
    }

    /// Number of bins available in both channels
    pub fn len(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize both channels, filling new bins with `fill`
    pub fn resize(&mut self, bins: usize, fill: f32) {
        self.left.resize(bins, fill);
        self.right.resize(bins, fill);
    }
}

/// One decibel-domain amplitude per band, in band order
pub type SpectrumSample = Vec<f64>;

/// Reduce a frame to one amplitude per band.
///
/// Each band is the weighted sum over its bins of the left/right mean. A bin
/// index past the end of the frame means the table and frame disagree about
/// the FFT size; that is reported rather than clamped.
pub fn sample(weights: &WeightTable, frame: &RawBinFrame) -> Result<SpectrumSample> {
    let len = frame.len();
    weights
        .iter()
        .enumerate()
        .map(|(band, group)| {
            group.bins.iter().try_fold(0.0f64, |acc, &(bin, w)| {
                if bin >= len {
                    return Err(SpectrumError::IndexOutOfRange { band, bin, len });
                }
                let mixed = (frame.left[bin] as f64 + frame.right[bin] as f64) / 2.0;
                Ok(acc + w * mixed)
            })
        })
        .collect()
}
