//! Frequency analysis of stereo input and the per-instance spectrum analyser

use std::f64::consts::PI;
use std::sync::Arc;

use log::{debug, info};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::config::SpectrumConfig;
use crate::error::Result;
use crate::sampler::{sample, RawBinFrame, SpectrumSample};
use crate::smoothing::{amplitude_to_db, BinSmoother};
use crate::weights::{WeightCache, WeightTable};

/// Anything that can hand over the current decibel spectrum of both channels.
///
/// Implementations fill `frame.left` and `frame.right` (each `fft_size / 2`
/// long) in place and must follow live changes to FFT size, decibel range
/// and smoothing passed through `reconfigure`.
pub trait BinSource {
    /// Overwrite `frame` with the latest analysis window
    fn fill_frame(&mut self, frame: &mut RawBinFrame);

    /// Seconds of audio consumed so far; never decreases
    fn timestamp(&self) -> f64;

    /// Apply a new configuration
    fn reconfigure(&mut self, config: &SpectrumConfig);
}

/// Blackman-windowed magnitude spectrum of one channel, in decibels.
///
/// Magnitudes are scaled by `1 / fft_size` and smoothed over time before
/// conversion; silence maps to `min_decibels` rather than negative infinity.
pub struct FftAnalyser {
    fft_size: usize,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    buffer: Vec<Complex<f64>>,
    magnitudes: Vec<f64>,
    smoother: BinSmoother,
    min_decibels: f64,
}

impl FftAnalyser {
    pub fn new(config: &SpectrumConfig) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft_size: config.fft_size,
            fft: planner.plan_fft_forward(config.fft_size),
            window: blackman_window(config.fft_size),
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            magnitudes: vec![0.0; config.bin_count()],
            smoother: BinSmoother::new(config.bin_count(), config.smoothing),
            min_decibels: config.min_decibels,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Follow a configuration change, re-planning only if the FFT size moved
    pub fn reconfigure(&mut self, config: &SpectrumConfig) {
        if config.fft_size != self.fft_size {
            *self = Self::new(config);
            return;
        }
        self.smoother.reset(config.bin_count(), config.smoothing);
        self.min_decibels = config.min_decibels;
    }

    /// Analyse the newest `fft_size` samples of `samples` into `out`.
    ///
    /// Shorter input is treated as preceded by silence. At most
    /// `fft_size / 2` bins of `out` are written.
    pub fn analyse(&mut self, samples: &[f32], out: &mut [f32]) {
        let n = self.fft_size;
        let recent = &samples[samples.len().saturating_sub(n)..];
        let pad = n - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let value = if i < pad { 0.0 } else { recent[i - pad] as f64 };
            *slot = Complex::new(value * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / n as f64;
        for (magnitude, bin) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *magnitude = bin.norm() * scale;
        }

        let smoothed = self.smoother.update(&self.magnitudes);
        for (db, &magnitude) in out.iter_mut().zip(smoothed) {
            *db = amplitude_to_db(magnitude, self.min_decibels) as f32;
        }
    }
}

/// Blackman window of length `size` (a0 = 0.42, a1 = 0.5, a2 = 0.08)
pub fn blackman_window(size: usize) -> Vec<f64> {
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = i as f64 / n;
            0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
        })
        .collect()
}

/// A pair of channel analysers sharing one configuration
pub struct StereoAnalyser {
    left: FftAnalyser,
    right: FftAnalyser,
}

impl StereoAnalyser {
    pub fn new(config: &SpectrumConfig) -> Self {
        Self {
            left: FftAnalyser::new(config),
            right: FftAnalyser::new(config),
        }
    }

    pub fn reconfigure(&mut self, config: &SpectrumConfig) {
        self.left.reconfigure(config);
        self.right.reconfigure(config);
    }

    /// Analyse both channels into `frame`
    pub fn analyse(&mut self, left: &[f32], right: &[f32], frame: &mut RawBinFrame) {
        self.left.analyse(left, &mut frame.left);
        self.right.analyse(right, &mut frame.right);
    }
}

/// Owns one visualization's configuration, weight cache and frame buffers.
///
/// Each instance keeps its own cache, so several analysers in one process
/// do not interfere.
pub struct SpectrumAnalyser<S: BinSource> {
    options: SpectrumConfig,
    weights: WeightCache,
    frame: RawBinFrame,
    source: S,
}

impl<S: BinSource> SpectrumAnalyser<S> {
    pub fn new(options: SpectrumConfig, source: S) -> Result<Self> {
        options.validate()?;
        let frame = RawBinFrame::new(options.bin_count(), options.min_decibels as f32);
        Ok(Self {
            options,
            weights: WeightCache::new(),
            frame,
            source,
        })
    }

    pub fn options(&self) -> &SpectrumConfig {
        &self.options
    }

    /// Replace the configuration.
    ///
    /// The source is only reconfigured when an analysis parameter changed;
    /// the frame buffers follow the FFT size. Cached tables are kept.
    pub fn set_options(&mut self, next: SpectrumConfig) -> Result<()> {
        next.validate()?;
        let prev = &self.options;

        let analysis_changed = next.fft_size != prev.fft_size
            || next.min_decibels != prev.min_decibels
            || next.max_decibels != prev.max_decibels
            || next.sample_rate != prev.sample_rate
            || next.smoothing != prev.smoothing;
        if analysis_changed {
            info!(
                "Reconfiguring analyser: FFT size {}, {} to {} dB, smoothing {}",
                next.fft_size, next.min_decibels, next.max_decibels, next.smoothing
            );
            self.source.reconfigure(&next);
        }
        if next.fft_size != prev.fft_size {
            self.frame.resize(next.bin_count(), next.min_decibels as f32);
        }
        if next.num_bars != prev.num_bars {
            debug!("Bar count changed from {} to {}", prev.num_bars, next.num_bars);
        }

        self.options = next;
        Ok(())
    }

    /// Weight table for the current configuration
    pub fn weights(&mut self) -> Result<Arc<WeightTable>> {
        self.weights.get_weights(&self.options)
    }

    /// Pull a fresh frame from the source and reduce it to one value per band
    pub fn get_spectrum(&mut self) -> Result<SpectrumSample> {
        self.source.fill_frame(&mut self.frame);
        let weights = self.weights.get_weights(&self.options)?;
        sample(&weights, &self.frame)
    }

    /// The most recently filled frame
    pub fn frame(&self) -> &RawBinFrame {
        &self.frame
    }

    pub fn timestamp(&self) -> f64 {
        self.source.timestamp()
    }

    /// Number of weight tables built so far
    pub fn cached_tables(&self) -> usize {
        self.weights.len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
