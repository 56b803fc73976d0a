//! Application constants and configuration values

/// Spectrum analysis defaults
pub mod spectrum {
    /// Number of bars drawn across the spectrum
    pub const DEFAULT_NUM_BARS: usize = 48;
    /// Lowest band edge in Hz
    pub const DEFAULT_MIN_FREQ: f64 = 30.0;
    /// Highest band edge in Hz
    pub const DEFAULT_MAX_FREQ: f64 = 16_000.0;
    /// Analysis window length in samples (power of two)
    pub const DEFAULT_FFT_SIZE: usize = 4096;
    /// Floor of the displayed decibel range
    pub const DEFAULT_MIN_DECIBELS: f64 = -100.0;
    /// Ceiling of the displayed decibel range
    pub const DEFAULT_MAX_DECIBELS: f64 = -30.0;
    /// Time smoothing applied to bin magnitudes between frames
    pub const DEFAULT_SMOOTHING: f64 = 0.8;
    /// Sample rate assumed until a device reports its own
    pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;
    /// Bar count limits for live adjustment
    pub const MIN_NUM_BARS: usize = 2;
    pub const MAX_NUM_BARS: usize = 256;
}

/// Weight table construction constants
pub mod weights {
    /// Upper bound on the number of bins averaged into one band
    pub const MAX_BINS_PER_BAND: usize = 16;
}

/// Audio capture constants
pub mod audio {
    /// Buffer size for audio streams
    pub const BUFFER_SIZE: cpal::BufferSize = cpal::BufferSize::Default;
    /// Preferred capture sample rate
    pub const PREFERRED_SAMPLE_RATE: u32 = 44_100;
    /// Channels requested from the input device
    pub const DEFAULT_CHANNELS: u16 = 2;
}

/// UI display constants
pub mod ui {
    /// UI update interval in milliseconds
    pub const UPDATE_INTERVAL_MS: u64 = 33;
    /// RGB hex color (`#rrggbb`) of the lowest band
    pub const DEFAULT_LOW_COLOR: &str = "#2e6cff";
    /// RGB hex color (`#rrggbb`) of the highest band
    pub const DEFAULT_HIGH_COLOR: &str = "#ff3d7f";
    /// Width of the headless drawing box
    pub const DEFAULT_PATH_WIDTH: f64 = 1000.0;
    /// Height of the headless drawing box
    pub const DEFAULT_PATH_HEIGHT: f64 = 300.0;
    /// Line pieces used to approximate each cubic segment on the terminal canvas
    pub const CURVE_FLATTEN_STEPS: usize = 8;
}
