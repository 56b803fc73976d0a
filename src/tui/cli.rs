//! Command line parsing and validation

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use spectrum_path::color::{parse_rgb, rgb_to_hsl, ColorHsl};
use spectrum_path::config::SpectrumConfig;
use spectrum_path::constants::{spectrum, ui};
use spectrum_path::shape::{OutlineStyle, ShapeOptions};

use super::error::{AppError, AppResult};

/// Command line arguments for the spectrum-path application
#[derive(Parser)]
#[command(name = "spectrum-path")]
#[command(about = "Live audio spectrum drawn as a smooth, colored path")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the live spectrum in the terminal
    View(ViewArgs),
    /// Print one serialized path per analysis tick to stdout
    Path(PathArgs),
    /// List available audio input devices
    List(ListArgs),
}

/// Outline drawing style
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Style {
    /// Smooth cubic curves through the bar tops
    Curve,
    /// Straight lines between bar tops
    Lines,
}

impl From<Style> for OutlineStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Curve => OutlineStyle::Curve,
            Style::Lines => OutlineStyle::Lines,
        }
    }
}

/// Options shared by every command that analyses audio
#[derive(clap::Args, Clone)]
pub struct SpectrumArgs {
    /// Number of bars (frequency bands)
    #[arg(long, default_value_t = spectrum::DEFAULT_NUM_BARS)]
    pub bars: usize,

    /// Lowest band edge in Hz
    #[arg(long, default_value_t = spectrum::DEFAULT_MIN_FREQ)]
    pub min_freq: f64,

    /// Highest band edge in Hz
    #[arg(long, default_value_t = spectrum::DEFAULT_MAX_FREQ)]
    pub max_freq: f64,

    /// FFT window size in samples (power of two)
    #[arg(long, default_value_t = spectrum::DEFAULT_FFT_SIZE)]
    pub fft_size: usize,

    /// Bottom of the displayed decibel range (e.g., -100)
    #[arg(long, default_value_t = spectrum::DEFAULT_MIN_DECIBELS, allow_hyphen_values = true)]
    pub min_db: f64,

    /// Top of the displayed decibel range (e.g., -30)
    #[arg(long, default_value_t = spectrum::DEFAULT_MAX_DECIBELS, allow_hyphen_values = true)]
    pub max_db: f64,

    /// Time smoothing between frames, from 0 (none) up to but excluding 1
    #[arg(long, default_value_t = spectrum::DEFAULT_SMOOTHING)]
    pub smoothing: f64,

    /// Audio input device name (optional, uses default if not specified)
    #[arg(long)]
    pub device: Option<String>,

    /// Color of the lowest band (#rrggbb)
    #[arg(long, default_value = ui::DEFAULT_LOW_COLOR)]
    pub low_color: String,

    /// Color of the highest band (#rrggbb)
    #[arg(long, default_value = ui::DEFAULT_HIGH_COLOR)]
    pub high_color: String,

    /// Outline style
    #[arg(long, value_enum, default_value_t = Style::Curve)]
    pub style: Style,

    /// Mirror the outline below the baseline into a closed ribbon
    #[arg(long)]
    pub ribbon: bool,
}

#[derive(Parser)]
pub struct ViewArgs {
    #[command(flatten)]
    pub spectrum: SpectrumArgs,

    /// Write log output to this file (the terminal is taken by the display)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct PathArgs {
    #[command(flatten)]
    pub spectrum: SpectrumArgs,

    /// Capture duration in seconds (optional, runs until Ctrl+C if neither this nor --frames is given)
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Number of paths to print before exiting
    #[arg(long)]
    pub frames: Option<usize>,

    /// Width of the drawing box
    #[arg(long, default_value_t = ui::DEFAULT_PATH_WIDTH)]
    pub width: f64,

    /// Height of the drawing box
    #[arg(long, default_value_t = ui::DEFAULT_PATH_HEIGHT)]
    pub height: f64,

    /// Append the per-band HSL colors after each path
    #[arg(long)]
    pub colors: bool,
}

#[derive(Parser)]
pub struct ListArgs {}

/// Application configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct Config {
    pub spectrum: SpectrumConfig,
    pub device_name: Option<String>,
    pub low_color: ColorHsl,
    pub high_color: ColorHsl,
    pub shape: ShapeOptions,
}

impl Config {
    /// Create configuration from view arguments
    pub fn from_view_args(view_args: &ViewArgs) -> AppResult<Self> {
        let shape = ShapeOptions {
            width: ui::DEFAULT_PATH_WIDTH,
            height: ui::DEFAULT_PATH_HEIGHT,
            style: view_args.spectrum.style.into(),
            ribbon: view_args.spectrum.ribbon,
        };
        Self::from_spectrum_args(&view_args.spectrum, shape)
    }

    /// Create configuration from path arguments
    pub fn from_path_args(path_args: &PathArgs) -> AppResult<Self> {
        if let Some(seconds) = path_args.seconds
            && seconds <= 0.0
        {
            return Err(AppError::Config("Seconds must be positive".to_string()));
        }
        if path_args.frames == Some(0) {
            return Err(AppError::Config("Frames must be at least 1".to_string()));
        }
        if !(path_args.width > 0.0 && path_args.height > 0.0) {
            return Err(AppError::Config(format!(
                "Drawing box must have a positive size, got {}x{}",
                path_args.width, path_args.height
            )));
        }

        let shape = ShapeOptions {
            width: path_args.width,
            height: path_args.height,
            style: path_args.spectrum.style.into(),
            ribbon: path_args.spectrum.ribbon,
        };
        Self::from_spectrum_args(&path_args.spectrum, shape)
    }

    fn from_spectrum_args(args: &SpectrumArgs, shape: ShapeOptions) -> AppResult<Self> {
        let spectrum = SpectrumConfig {
            num_bars: args.bars,
            min_freq: args.min_freq,
            max_freq: args.max_freq,
            fft_size: args.fft_size,
            min_decibels: args.min_db,
            max_decibels: args.max_db,
            sample_rate: spectrum::DEFAULT_SAMPLE_RATE,
            smoothing: args.smoothing,
        };
        spectrum.validate()?;

        Ok(Config {
            spectrum,
            device_name: args.device.clone(),
            low_color: rgb_to_hsl(parse_rgb(&args.low_color)?),
            high_color: rgb_to_hsl(parse_rgb(&args.high_color)?),
            shape,
        })
    }

    /// Adopt the sample rate reported by the opened device
    pub fn with_sample_rate(mut self, sample_rate: u32) -> AppResult<Self> {
        self.spectrum.sample_rate = sample_rate as f64;
        self.spectrum.validate()?;
        Ok(self)
    }
}
