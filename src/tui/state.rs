//! Application state management

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use spectrum_path::analyser::{BinSource, StereoAnalyser};
use spectrum_path::color::ColorHsl;
use spectrum_path::config::SpectrumConfig;
use spectrum_path::curve::Path;
use spectrum_path::sampler::RawBinFrame;
use spectrum_path::shape::ShapeOptions;

/// The most recent samples of both channels, newest last.
///
/// Written by the audio callback, read by the analysis tick. Holds at most
/// one analysis window per channel.
pub struct StereoRing {
    capacity: usize,
    left: VecDeque<f32>,
    right: VecDeque<f32>,
    frames_written: u64,
}

impl StereoRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            left: VecDeque::with_capacity(capacity),
            right: VecDeque::with_capacity(capacity),
            frames_written: 0,
        }
    }

    /// Append interleaved samples; mono input feeds both channels
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in data.chunks_exact(channels) {
            let left = frame[0];
            let right = if channels > 1 { frame[1] } else { frame[0] };
            self.left.push_back(left);
            self.right.push_back(right);
            self.frames_written += 1;
        }
        self.trim();
    }

    /// Change the window length, keeping the newest samples
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    /// Copy both channels out, oldest first
    pub fn copy_into(&self, left: &mut Vec<f32>, right: &mut Vec<f32>) {
        left.clear();
        left.extend(self.left.iter().copied());
        right.clear();
        right.extend(self.right.iter().copied());
    }

    /// Total stereo frames received since creation
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn trim(&mut self) {
        while self.left.len() > self.capacity {
            self.left.pop_front();
        }
        while self.right.len() > self.capacity {
            self.right.pop_front();
        }
    }
}

/// Ring shared between the audio callback and the analysis tick
pub type SharedRing = Arc<Mutex<StereoRing>>;

/// Lock the ring, recovering the data if a holder panicked mid-update
pub fn lock_ring(ring: &SharedRing) -> MutexGuard<'_, StereoRing> {
    ring.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live audio as a `BinSource`: the shared ring run through a stereo FFT analyser
pub struct LiveSource {
    ring: SharedRing,
    analyser: StereoAnalyser,
    sample_rate: f64,
    frames_seen: u64,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl LiveSource {
    pub fn new(ring: SharedRing, config: &SpectrumConfig) -> Self {
        Self {
            ring,
            analyser: StereoAnalyser::new(config),
            sample_rate: config.sample_rate,
            frames_seen: 0,
            left: Vec::with_capacity(config.fft_size),
            right: Vec::with_capacity(config.fft_size),
        }
    }
}

impl BinSource for LiveSource {
    fn fill_frame(&mut self, frame: &mut RawBinFrame) {
        {
            let ring = lock_ring(&self.ring);
            ring.copy_into(&mut self.left, &mut self.right);
            self.frames_seen = ring.frames_written();
        }
        self.analyser.analyse(&self.left, &self.right, frame);
    }

    fn timestamp(&self) -> f64 {
        self.frames_seen as f64 / self.sample_rate
    }

    fn reconfigure(&mut self, config: &SpectrumConfig) {
        self.analyser.reconfigure(config);
        self.sample_rate = config.sample_rate;
        lock_ring(&self.ring).set_capacity(config.fft_size);
    }
}

/// Everything produced by one analysis tick
#[derive(Clone)]
pub struct Snapshot {
    pub path: Path,
    pub colors: Vec<ColorHsl>,
    pub timestamp: f64,
}

/// Internal application state
pub struct AppState {
    pub device_name: String,
    pub status: String,
    pub shape: ShapeOptions,
    pub frozen: bool,
    pub snapshot: Option<Snapshot>,
}

impl AppState {
    /// Create a new application state with default values
    pub fn new(device_name: String, shape: ShapeOptions) -> Self {
        Self {
            status: format!("Listening to {}... Press Esc or q to quit.", device_name),
            device_name,
            shape,
            frozen: false,
            snapshot: None,
        }
    }
}
