//! UI rendering and layout utilities

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
    Frame,
};
use spectrum_path::color::ColorHsl;
use spectrum_path::curve::Point;
use spectrum_path::shape::{band_at, OutlineStyle};

/// Application state for UI rendering
#[derive(Clone)]
pub struct UiState {
    pub device_name: String,
    pub status: String,
    pub num_bars: usize,
    pub style: OutlineStyle,
    pub ribbon: bool,
    pub frozen: bool,
    pub timestamp: f64,
    pub cached_tables: usize,
    pub width: f64,
    pub height: f64,
    /// Straight pieces of the current path
    pub pieces: Vec<(usize, Point, Point)>,
    pub colors: Vec<ColorHsl>,
}

/// Color of the band under the middle of a path piece
pub fn piece_color(from: Point, to: Point, width: f64, colors: &[ColorHsl]) -> Color {
    if colors.is_empty() {
        return Color::White;
    }
    let band = band_at((from.x + to.x) / 2.0, width, colors.len());
    let [r, g, b] = colors[band].to_rgb();
    Color::Rgb(r, g, b)
}

fn style_label(style: OutlineStyle) -> &'static str {
    match style {
        OutlineStyle::Curve => "curve",
        OutlineStyle::Lines => "lines",
    }
}

/// Header line summarizing the current settings
pub fn create_info_line(state: &UiState) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("{} bars", state.num_bars), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::raw(format!("style: {}", style_label(state.style))),
        Span::raw("  "),
        Span::raw(format!("ribbon: {}", if state.ribbon { "on" } else { "off" })),
        Span::raw("  "),
        Span::raw(format!("t = {:.2}s", state.timestamp)),
        Span::raw("  "),
        Span::styled(
            format!("{} weight table(s)", state.cached_tables),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if state.frozen {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("FROZEN", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

/// Render the complete UI
pub fn render_ui(f: &mut Frame, state: &UiState) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(size);

    // Device and settings
    let device_block = Block::default().title(state.device_name.as_str()).borders(Borders::ALL);
    let device_text = Paragraph::new(create_info_line(state)).block(device_block);
    f.render_widget(device_text, chunks[0]);

    // Status
    let status_block = Block::default().title("Status").borders(Borders::ALL);
    let status_text = Paragraph::new(state.status.as_str()).block(status_block);
    f.render_widget(status_text, chunks[1]);

    // Spectrum path
    let y_bounds = if state.ribbon {
        [-state.height, state.height]
    } else {
        [0.0, state.height]
    };
    let canvas = Canvas::default()
        .block(Block::default().title("Spectrum").borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds([0.0, state.width])
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for &(_, from, to) in &state.pieces {
                ctx.draw(&CanvasLine {
                    x1: from.x,
                    y1: from.y,
                    x2: to.x,
                    y2: to.y,
                    color: piece_color(from, to, state.width, &state.colors),
                });
            }
        });
    f.render_widget(canvas, chunks[2]);

    let help = Paragraph::new(
        "Esc/q quit  Up/Down bars  s style  r ribbon  space freeze",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[3]);
}
