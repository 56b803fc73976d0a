//! Main application logic and orchestration

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use spectrum_path::analyser::SpectrumAnalyser;
use spectrum_path::color::ColorHsl;
use spectrum_path::constants::{spectrum, ui as ui_constants};
use spectrum_path::curve::{flatten, to_path};
use spectrum_path::shape::{band_colors, spectrum_path, ShapeOptions};

use super::audio;
use super::cli::Config;
use super::error::{AppError, AppResult};
use super::state::{AppState, LiveSource, Snapshot, StereoRing};
use super::ui;

/// Main application struct
pub struct App {
    config: Config,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

/// Exit codes for the application
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    UserExit = 1, // User pressed Escape, q or Ctrl+C
    Error = 2,    // Actual application error
}

/// Result type that includes user exit information
pub type AppRunResult = Result<(), AppError>;

/// Extended result that tracks exit reason
pub struct RunResult {
    pub result: AppRunResult,
    pub exit_code: ExitCode,
}

impl RunResult {
    fn error(err: AppError) -> Self {
        RunResult {
            result: Err(err),
            exit_code: ExitCode::Error,
        }
    }
}

/// Live capture wired to a spectrum analyser.
///
/// Holds the cpal stream; capture stops when this is dropped.
pub struct Visualizer {
    _stream: cpal::Stream,
    device_name: String,
    analyser: SpectrumAnalyser<LiveSource>,
    low_color: ColorHsl,
    high_color: ColorHsl,
}

impl Visualizer {
    /// Open the configured device and start analysing it
    pub fn open(config: &Config) -> AppResult<Self> {
        let ring = Arc::new(Mutex::new(StereoRing::new(config.spectrum.fft_size)));
        let (stream, audio_config) = audio::start_capture(config.device_name.as_deref(), Arc::clone(&ring))?;
        let config = config.clone().with_sample_rate(audio_config.sample_rate)?;

        let source = LiveSource::new(ring, &config.spectrum);
        let analyser = SpectrumAnalyser::new(config.spectrum.clone(), source)?;

        Ok(Self {
            _stream: stream,
            device_name: audio_config.device_name,
            analyser,
            low_color: config.low_color,
            high_color: config.high_color,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Analyse the latest audio into a path and its band colors
    pub fn tick(&mut self, shape: &ShapeOptions) -> AppResult<Snapshot> {
        let sample = self.analyser.get_spectrum()?;
        let path = spectrum_path(&sample, self.analyser.options(), shape)?;
        let colors = band_colors(sample.len(), self.low_color, self.high_color);
        Ok(Snapshot {
            path,
            colors,
            timestamp: self.analyser.timestamp(),
        })
    }

    /// Change the bar count, clamped to the supported range; returns the new count
    pub fn adjust_bars(&mut self, delta: isize) -> AppResult<usize> {
        let current = self.analyser.options().num_bars;
        let next = current
            .saturating_add_signed(delta)
            .clamp(spectrum::MIN_NUM_BARS, spectrum::MAX_NUM_BARS);
        if next != current {
            let mut options = self.analyser.options().clone();
            options.num_bars = next;
            self.analyser.set_options(options)?;
        }
        Ok(next)
    }

    pub fn num_bars(&self) -> usize {
        self.analyser.options().num_bars
    }

    pub fn cached_tables(&self) -> usize {
        self.analyser.cached_tables()
    }
}

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    MoreBars,
    FewerBars,
    ToggleStyle,
    ToggleRibbon,
    ToggleFreeze,
}

/// Map a key event to an action, if it has one
pub fn key_action(key_event: &KeyEvent) -> Option<KeyAction> {
    match key_event.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Up => Some(KeyAction::MoreBars),
        KeyCode::Down => Some(KeyAction::FewerBars),
        KeyCode::Char('s') => Some(KeyAction::ToggleStyle),
        KeyCode::Char('r') => Some(KeyAction::ToggleRibbon),
        KeyCode::Char(' ') => Some(KeyAction::ToggleFreeze),
        _ => None,
    }
}

impl App {
    /// Initialize the application with an existing configuration
    pub fn new_with_config(config: Config) -> AppResult<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(App { config, terminal })
    }

    /// Run the main application loop
    pub async fn run(mut self) -> RunResult {
        let mut visualizer = match Visualizer::open(&self.config) {
            Ok(visualizer) => visualizer,
            Err(e) => {
                let _ = self.cleanup();
                return RunResult::error(e);
            }
        };

        let mut app_state = AppState::new(visualizer.device_name().to_string(), self.config.shape);
        let result = self.event_loop(&mut visualizer, &mut app_state).await;

        // Cleanup - ensure graceful exit
        drop(visualizer);
        if let Err(e) = self.cleanup() {
            warn!("Failed to restore terminal: {}", e);
        }

        match result {
            Ok(exit_code) => RunResult {
                result: Ok(()),
                exit_code,
            },
            Err(e) => RunResult::error(e),
        }
    }

    async fn event_loop(&mut self, visualizer: &mut Visualizer, app_state: &mut AppState) -> AppResult<ExitCode> {
        let mut interval = tokio::time::interval(Duration::from_millis(ui_constants::UPDATE_INTERVAL_MS));

        loop {
            if !app_state.frozen {
                app_state.snapshot = Some(visualizer.tick(&app_state.shape)?);
            }

            let ui_state = ui_state(app_state, visualizer);
            self.terminal.draw(|f| ui::render_ui(f, &ui_state))?;

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    return Ok(ExitCode::UserExit);
                }
                _ = tokio::time::sleep(Duration::from_millis(1)) => {}
            }

            while crossterm::event::poll(Duration::from_millis(0)).unwrap_or(false) {
                let Ok(Event::Key(key_event)) = crossterm::event::read() else {
                    continue;
                };
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                match key_action(&key_event) {
                    Some(KeyAction::Quit) => return Ok(ExitCode::UserExit),
                    Some(KeyAction::MoreBars) => {
                        let bars = visualizer.adjust_bars(1)?;
                        app_state.status = format!("{} bars", bars);
                    }
                    Some(KeyAction::FewerBars) => {
                        let bars = visualizer.adjust_bars(-1)?;
                        app_state.status = format!("{} bars", bars);
                    }
                    Some(KeyAction::ToggleStyle) => {
                        app_state.shape.style = app_state.shape.style.toggled();
                        debug!("Outline style set to {:?}", app_state.shape.style);
                    }
                    Some(KeyAction::ToggleRibbon) => {
                        app_state.shape.ribbon = !app_state.shape.ribbon;
                        debug!("Ribbon {}", if app_state.shape.ribbon { "on" } else { "off" });
                    }
                    Some(KeyAction::ToggleFreeze) => {
                        app_state.frozen = !app_state.frozen;
                        app_state.status = if app_state.frozen {
                            "Frozen. Press space to resume.".to_string()
                        } else {
                            format!("Listening to {}...", app_state.device_name)
                        };
                    }
                    None => {}
                }
            }

            interval.tick().await;
        }
    }

    /// Clean up terminal state
    fn cleanup(&mut self) -> AppResult<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

fn ui_state(app_state: &AppState, visualizer: &Visualizer) -> ui::UiState {
    let (pieces, colors, timestamp) = match &app_state.snapshot {
        Some(snapshot) => (
            flatten(&snapshot.path, ui_constants::CURVE_FLATTEN_STEPS),
            snapshot.colors.clone(),
            snapshot.timestamp,
        ),
        None => (Vec::new(), Vec::new(), 0.0),
    };
    ui::UiState {
        device_name: app_state.device_name.clone(),
        status: app_state.status.clone(),
        num_bars: visualizer.num_bars(),
        style: app_state.shape.style,
        ribbon: app_state.shape.ribbon,
        frozen: app_state.frozen,
        timestamp,
        cached_tables: visualizer.cached_tables(),
        width: app_state.shape.width,
        height: app_state.shape.height,
        pieces,
        colors,
    }
}

/// Limits for a headless run; with neither set it runs until Ctrl+C
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessLimits {
    pub seconds: Option<f32>,
    pub frames: Option<usize>,
}

impl HeadlessLimits {
    fn reached(&self, frames: usize, elapsed: Duration) -> bool {
        self.frames.is_some_and(|limit| frames >= limit)
            || self.seconds.is_some_and(|limit| elapsed.as_secs_f32() >= limit)
    }
}

/// Format band colors as space separated CSS `hsl()` values
pub fn format_colors(colors: &[ColorHsl]) -> String {
    colors
        .iter()
        .map(|c| format!("hsl({:.1},{:.1}%,{:.1}%)", c.h, c.s, c.l))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print one serialized path per tick to stdout; returns the number printed
pub async fn run_headless(config: Config, limits: HeadlessLimits, with_colors: bool) -> AppResult<usize> {
    let mut visualizer = Visualizer::open(&config)?;
    info!("Writing paths from '{}'", visualizer.device_name());

    let mut interval = tokio::time::interval(Duration::from_millis(ui_constants::UPDATE_INTERVAL_MS));
    let start = Instant::now();
    let stdout = io::stdout();
    let mut printed = 0;

    while !limits.reached(printed, start.elapsed()) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = interval.tick() => {}
        }

        let snapshot = visualizer.tick(&config.shape)?;
        let line = if with_colors {
            format!("{}\t{}", to_path(&snapshot.path), format_colors(&snapshot.colors))
        } else {
            to_path(&snapshot.path)
        };

        let mut out = stdout.lock();
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                debug!("Output closed after {} paths", printed);
                break;
            }
            return Err(e.into());
        }
        printed += 1;
    }

    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_actions() {
        assert_eq!(key_action(&key(KeyCode::Esc, KeyModifiers::NONE)), Some(KeyAction::Quit));
        assert_eq!(key_action(&key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(KeyAction::Quit));
        assert_eq!(
            key_action(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
        assert_eq!(key_action(&key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(key_action(&key(KeyCode::Up, KeyModifiers::NONE)), Some(KeyAction::MoreBars));
        assert_eq!(key_action(&key(KeyCode::Down, KeyModifiers::NONE)), Some(KeyAction::FewerBars));
        assert_eq!(key_action(&key(KeyCode::Char(' '), KeyModifiers::NONE)), Some(KeyAction::ToggleFreeze));
    }

    #[test]
    fn test_headless_limits() {
        let frames = HeadlessLimits {
            frames: Some(3),
            seconds: None,
        };
        assert!(!frames.reached(2, Duration::from_secs(100)));
        assert!(frames.reached(3, Duration::ZERO));

        let seconds = HeadlessLimits {
            frames: None,
            seconds: Some(0.5),
        };
        assert!(!seconds.reached(1000, Duration::from_millis(499)));
        assert!(seconds.reached(0, Duration::from_millis(500)));

        assert!(!HeadlessLimits::default().reached(usize::MAX, Duration::from_secs(3600)));
    }

    #[test]
    fn test_format_colors() {
        let colors = [ColorHsl::new(210.0, 100.0, 59.0), ColorHsl::new(340.3, 50.0, 40.0)];
        assert_eq!(format_colors(&colors), "hsl(210.0,100.0%,59.0%) hsl(340.3,50.0%,40.0%)");
        assert_eq!(format_colors(&[]), "");
    }
}
