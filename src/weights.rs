//! Logarithmic band layout and FFT-bin-to-band weight tables

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::config::{SpectrumConfig, WeightKey};
use crate::constants::weights::MAX_BINS_PER_BAND;
use crate::error::Result;

/// The bins averaged into one band, with their weights.
///
/// Bin indices are strictly increasing. Weights are `1 / count` each, where
/// `count` was fixed before clipping at `fft_size / 2`, so a group cut short
/// at the top of the spectrum sums to less than one.
#[derive(Debug, Clone, PartialEq)]
pub struct BinWeightGroup {
    pub bins: Vec<(usize, f64)>,
}

impl BinWeightGroup {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn weight_sum(&self) -> f64 {
        self.bins.iter().map(|&(_, w)| w).sum()
    }
}

/// One weight group per band, lowest band first
pub type WeightTable = Vec<BinWeightGroup>;

/// Compute the `num_bars + 1` band edges in Hz.
///
/// The exponent is square-root warped, packing the low end more densely
/// than a plain logarithmic scale would.
pub fn band_edges(config: &SpectrumConfig) -> Vec<f64> {
    let n = config.num_bars as f64;
    let span = (config.max_freq / config.min_freq).ln();
    (0..=config.num_bars)
        .map(|i| config.min_freq * ((i as f64 / n).sqrt() * span).exp())
        .collect()
}

/// Build the weight table for a configuration without caching
pub fn build_weights(config: &SpectrumConfig) -> Result<WeightTable> {
    config.validate()?;

    let freqs = band_edges(config);
    let half = config.bin_count();
    let width = config.sample_rate / half as f64;

    let table = freqs
        .windows(2)
        .map(|edge| {
            let count = (((edge[1] - edge[0]) / width).ceil() as usize).min(MAX_BINS_PER_BAND);
            let start = (edge[0] / width).floor() as usize;
            let weight = 1.0 / count as f64;
            let bins = (start..start + count)
                .take_while(|&bin| bin < half)
                .map(|bin| (bin, weight))
                .collect();
            BinWeightGroup { bins }
        })
        .collect();

    Ok(table)
}

/// Insert-only store of weight tables, one per analyser.
///
/// Entries are immutable once inserted and never evicted; the number of
/// distinct live configurations is tiny. Writes need `&mut self`, so shared
/// readers are safe as long as insertion stays serialized.
#[derive(Debug, Default)]
pub struct WeightCache {
    tables: HashMap<WeightKey, Arc<WeightTable>>,
}

impl WeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `config`, building it on first use.
    ///
    /// Configurations that share `(num_bars, min_freq, max_freq, fft_size)`
    /// get the same table even if their other fields differ.
    pub fn get_weights(&mut self, config: &SpectrumConfig) -> Result<Arc<WeightTable>> {
        let key = config.weight_key();
        if let Some(table) = self.tables.get(&key) {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(build_weights(config)?);
        debug!(
            "Built weight table for {} bars, {}-{} Hz, FFT size {} ({} cached)",
            key.num_bars,
            key.min_freq(),
            key.max_freq(),
            key.fft_size,
            self.tables.len() + 1
        );
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpectrumError;
    use approx::assert_abs_diff_eq;

    fn config(num_bars: usize, min_freq: f64, max_freq: f64, fft_size: usize) -> SpectrumConfig {
        SpectrumConfig {
            num_bars,
            min_freq,
            max_freq,
            fft_size,
            ..SpectrumConfig::default()
        }
    }

    #[test]
    fn test_band_edges_span_range() {
        let cfg = config(10, 20.0, 20_000.0, 2048);
        let edges = band_edges(&cfg);
        assert_eq!(edges.len(), 11);
        assert_abs_diff_eq!(edges[0], 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(edges[10], 20_000.0, epsilon = 1e-6);
        assert!(edges.windows(2).all(|w| w[1] > w[0]));
        // the square-root warp makes the first band wider than a pure log split would
        let pure_log_second = 20.0 * (1000.0f64).powf(0.1);
        assert!(edges[1] > pure_log_second);
    }

    #[test]
    fn test_groups_are_well_formed() {
        for (bars, fft) in [(8, 1024), (48, 4096), (100, 8192), (3, 32)] {
            let cfg = config(bars, 30.0, 16_000.0, fft);
            let table = build_weights(&cfg).unwrap();
            assert_eq!(table.len(), bars);
            for group in &table {
                assert!(!group.is_empty());
                assert!(group.len() <= MAX_BINS_PER_BAND);
                assert!(group.bins.windows(2).all(|w| w[1].0 == w[0].0 + 1));
                assert!(group.bins.iter().all(|&(bin, _)| bin < fft / 2));
                assert_abs_diff_eq!(group.weight_sum(), 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_known_layout() {
        // 44100 / 512 = 86.13 Hz per bin
        let cfg = config(4, 100.0, 10_000.0, 1024);
        let table = build_weights(&cfg).unwrap();
        let edges = band_edges(&cfg);
        let width = 44_100.0 / 512.0;
        for (group, edge) in table.iter().zip(edges.windows(2)) {
            let start = (edge[0] / width).floor() as usize;
            let count = (((edge[1] - edge[0]) / width).ceil() as usize).min(16);
            assert_eq!(group.bins[0].0, start);
            assert_eq!(group.len(), count);
        }
        assert_eq!(table[0].bins[0].0, 1);
    }

    #[test]
    fn test_top_band_truncated_below_unity() {
        // 64 bins of 1378 Hz; the top band would need bins past the end
        let cfg = SpectrumConfig {
            num_bars: 4,
            min_freq: 1000.0,
            max_freq: 60_000.0,
            fft_size: 64,
            sample_rate: 44_100.0,
            ..SpectrumConfig::default()
        };
        let table = build_weights(&cfg).unwrap();
        let top = table.last().unwrap();
        assert_eq!(top.bins.last().unwrap().0, 31);
        // the weights keep the pre-clip count, so the sum stays under one
        assert!(top.weight_sum() < 1.0);
        assert_abs_diff_eq!(table[0].weight_sum(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(
            build_weights(&config(0, 30.0, 16_000.0, 1024)),
            Err(SpectrumError::InvalidConfig(_))
        ));
        assert!(matches!(
            build_weights(&config(8, 30.0, 16_000.0, 1000)),
            Err(SpectrumError::InvalidConfig(_))
        ));
        assert!(matches!(
            build_weights(&config(8, 16_000.0, 30.0, 1024)),
            Err(SpectrumError::InvalidConfig(_))
        ));
        assert!(matches!(
            build_weights(&config(8, -5.0, 30.0, 1024)),
            Err(SpectrumError::InvalidConfig(_))
        ));

        let mut cache = WeightCache::new();
        assert!(cache.get_weights(&config(0, 30.0, 16_000.0, 1024)).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_returns_same_table() {
        let mut cache = WeightCache::new();
        let a = config(16, 30.0, 16_000.0, 2048);
        let first = cache.get_weights(&a).unwrap();

        // a different sample rate and decibel range still hits the cached entry
        let b = SpectrumConfig {
            sample_rate: 96_000.0,
            min_decibels: -120.0,
            ..a.clone()
        };
        let second = cache.get_weights(&b).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        // changing a key field grows the cache and never evicts
        let c = SpectrumConfig { num_bars: 24, ..a.clone() };
        let third = cache.get_weights(&c).unwrap();
        assert_eq!(third.len(), 24);
        assert_eq!(cache.len(), 2);
        let again = cache.get_weights(&a).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
}
