//! Spectrum configuration and validation

use crate::constants::spectrum::*;
use crate::error::{Result, SpectrumError};

/// Parameters of one analysis session.
///
/// Replacing the configuration at runtime reconfigures the analyser and may
/// grow the weight cache, but never evicts from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumConfig {
    /// Number of perceptual bands (bars)
    pub num_bars: usize,
    /// Lowest band edge in Hz
    pub min_freq: f64,
    /// Highest band edge in Hz
    pub max_freq: f64,
    /// Analysis window length, a power of two
    pub fft_size: usize,
    /// Bottom of the displayed decibel range
    pub min_decibels: f64,
    /// Top of the displayed decibel range
    pub max_decibels: f64,
    /// Sample rate of the audio feeding the analyser
    pub sample_rate: f64,
    /// Time smoothing of bin magnitudes, in `[0, 1)`
    pub smoothing: f64,
}

/// Composite cache key for weight tables.
///
/// Frequencies are stored as raw bit patterns so the key can derive `Eq` and
/// `Hash`; validated configs never carry NaN or signed zero here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeightKey {
    pub num_bars: usize,
    min_freq_bits: u64,
    max_freq_bits: u64,
    pub fft_size: usize,
}

impl WeightKey {
    pub fn min_freq(&self) -> f64 {
        f64::from_bits(self.min_freq_bits)
    }

    pub fn max_freq(&self) -> f64 {
        f64::from_bits(self.max_freq_bits)
    }
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            num_bars: DEFAULT_NUM_BARS,
            min_freq: DEFAULT_MIN_FREQ,
            max_freq: DEFAULT_MAX_FREQ,
            fft_size: DEFAULT_FFT_SIZE,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl SpectrumConfig {
    /// Number of frequency bins in one channel of a frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Key under which this configuration's weight table is cached.
    ///
    /// Sample rate and decibel range are not part of the key.
    pub fn weight_key(&self) -> WeightKey {
        WeightKey {
            num_bars: self.num_bars,
            min_freq_bits: self.min_freq.to_bits(),
            max_freq_bits: self.max_freq.to_bits(),
            fft_size: self.fft_size,
        }
    }

    /// Check every field, returning the first violation found
    pub fn validate(&self) -> Result<()> {
        if self.num_bars == 0 {
            return Err(invalid("number of bars must be greater than 0".to_string()));
        }
        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(invalid(format!(
                "FFT size must be a power of two of at least 2, got {}",
                self.fft_size
            )));
        }
        if !self.min_freq.is_finite() || self.min_freq <= 0.0 {
            return Err(invalid(format!(
                "minimum frequency must be positive, got {}",
                self.min_freq
            )));
        }
        if !self.max_freq.is_finite() || self.max_freq <= self.min_freq {
            return Err(invalid(format!(
                "maximum frequency ({}) must be greater than minimum frequency ({})",
                self.max_freq, self.min_freq
            )));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(invalid(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !self.min_decibels.is_finite()
            || !self.max_decibels.is_finite()
            || self.max_decibels <= self.min_decibels
        {
            return Err(invalid(format!(
                "maximum decibels ({}) must be greater than minimum decibels ({})",
                self.max_decibels, self.min_decibels
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(invalid(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        Ok(())
    }

    /// Map a decibel value onto `[0, 1]` across the configured range
    pub fn normalize_db(&self, db: f64) -> f64 {
        ((db - self.min_decibels) / (self.max_decibels - self.min_decibels)).clamp(0.0, 1.0)
    }
}

fn invalid(msg: String) -> SpectrumError {
    SpectrumError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SpectrumConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_fields() {
        let base = SpectrumConfig::default();

        let cases = [
            SpectrumConfig { num_bars: 0, ..base.clone() },
            SpectrumConfig { fft_size: 1000, ..base.clone() },
            SpectrumConfig { fft_size: 1, ..base.clone() },
            SpectrumConfig { min_freq: 0.0, ..base.clone() },
            SpectrumConfig { max_freq: base.min_freq, ..base.clone() },
            SpectrumConfig { sample_rate: -1.0, ..base.clone() },
            SpectrumConfig { max_decibels: base.min_decibels, ..base.clone() },
            SpectrumConfig { smoothing: 1.0, ..base.clone() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(SpectrumError::InvalidConfig(_))),
                "expected rejection of {:?}",
                config
            );
        }
    }

    #[test]
    fn test_weight_key_ignores_sample_rate_and_decibels() {
        let a = SpectrumConfig::default();
        let b = SpectrumConfig {
            sample_rate: 48_000.0,
            min_decibels: -90.0,
            max_decibels: -10.0,
            ..a.clone()
        };
        assert_eq!(a.weight_key(), b.weight_key());

        let c = SpectrumConfig { num_bars: a.num_bars + 1, ..a.clone() };
        assert_ne!(a.weight_key(), c.weight_key());
        assert_eq!(a.weight_key().min_freq(), a.min_freq);
        assert_eq!(a.weight_key().max_freq(), a.max_freq);
    }

    #[test]
    fn test_normalize_db_clamps() {
        let config = SpectrumConfig::default();
        assert_eq!(config.normalize_db(-200.0), 0.0);
        assert_eq!(config.normalize_db(0.0), 1.0);
        assert!((config.normalize_db(-65.0) - 0.5).abs() < 1e-12);
    }
}
