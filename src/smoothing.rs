//! Bin magnitude smoothing and decibel conversion

/// Exponential time smoothing of FFT bin magnitudes across frames.
///
/// Each update blends the previous smoothed magnitude with the new one:
/// `tau * previous + (1 - tau) * current`.
pub struct BinSmoother {
    tau: f64,
    smoothed: Vec<f64>,
}

impl BinSmoother {
    /// Create a smoother for `bins` bins, starting from silence
    pub fn new(bins: usize, tau: f64) -> Self {
        Self {
            tau,
            smoothed: vec![0.0; bins],
        }
    }

    /// Blend a new set of magnitudes in and return the smoothed values
    pub fn update(&mut self, magnitudes: &[f64]) -> &[f64] {
        for (smoothed, &current) in self.smoothed.iter_mut().zip(magnitudes) {
            let blended = self.tau * *smoothed + (1.0 - self.tau) * current;
            // NaN or infinity would stick forever once blended in
            *smoothed = if blended.is_finite() { blended } else { 0.0 };
        }
        &self.smoothed
    }

    /// Get the current smoothed magnitudes
    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    /// Change the bin count and smoothing constant, forgetting history
    pub fn reset(&mut self, bins: usize, tau: f64) {
        self.tau = tau;
        self.smoothed.clear();
        self.smoothed.resize(bins, 0.0);
    }
}

/// Convert linear amplitude to decibels, never going below `floor_db`
pub fn amplitude_to_db(amplitude: f64, floor_db: f64) -> f64 {
    if amplitude > 0.0 {
        (20.0 * amplitude.log10()).max(floor_db)
    } else {
        floor_db
    }
}

/// Convert decibels to linear amplitude
pub fn db_to_amplitude(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_smoother_blends_towards_input() {
        let mut smoother = BinSmoother::new(2, 0.5);
        smoother.update(&[1.0, 0.0]);
        assert_eq!(smoother.smoothed(), &[0.5, 0.0]);
        smoother.update(&[1.0, 2.0]);
        assert_eq!(smoother.smoothed(), &[0.75, 1.0]);
    }

    #[test]
    fn test_zero_tau_passes_through() {
        let mut smoother = BinSmoother::new(3, 0.0);
        assert_eq!(smoother.update(&[0.1, 0.2, 0.3]), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut smoother = BinSmoother::new(2, 0.9);
        smoother.update(&[1.0, 1.0]);
        smoother.reset(4, 0.0);
        assert_eq!(smoother.smoothed(), &[0.0; 4]);
        assert_eq!(smoother.update(&[1.0, 2.0, 3.0, 4.0]), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_db_conversions() {
        assert_abs_diff_eq!(amplitude_to_db(1.0, -100.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(amplitude_to_db(0.1, -100.0), -20.0, epsilon = 1e-9);
        assert_eq!(amplitude_to_db(0.0, -100.0), -100.0);
        assert_eq!(amplitude_to_db(1e-12, -100.0), -100.0);
        assert_abs_diff_eq!(db_to_amplitude(-20.0), 0.1, epsilon = 1e-12);
    }
}
