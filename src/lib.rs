//! Spectrum path - turns stereo frequency-bin magnitudes into perceptually
//! spaced bars and a smooth, colored, closable vector path.
//!
//! The pipeline per animation tick:
//! 1. a [`analyser::BinSource`] fills a [`sampler::RawBinFrame`] with decibel magnitudes,
//! 2. [`weights::WeightCache`] supplies the cached bin-to-band weights for the current config,
//! 3. [`sampler::sample`] reduces the frame to one value per band,
//! 4. [`shape`] and [`curve`] turn those values into a [`curve::Path`],
//! 5. [`color`] gives every band its color.

pub mod analyser;
pub mod color;
pub mod config;
pub mod constants;
pub mod curve;
pub mod error;
pub mod sampler;
pub mod shape;
pub mod smoothing;
pub mod weights;
