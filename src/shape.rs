//! Mapping spectrum samples to drawable paths and per-band colors

use crate::color::{interp_hsl, ColorHsl};
use crate::config::SpectrumConfig;
use crate::curve::{abs_lines, cubic_bezier_curves, reverse_path_components, Path, Point};
use crate::error::Result;

/// How consecutive bar tops are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineStyle {
    /// Smooth cubic segments
    #[default]
    Curve,
    /// Straight segments
    Lines,
}

impl OutlineStyle {
    pub fn toggled(self) -> Self {
        match self {
            OutlineStyle::Curve => OutlineStyle::Lines,
            OutlineStyle::Lines => OutlineStyle::Curve,
        }
    }
}

/// Geometry of the drawn shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeOptions {
    pub width: f64,
    pub height: f64,
    pub style: OutlineStyle,
    /// Mirror the outline below the baseline and close it into a ribbon
    pub ribbon: bool,
}

/// Bar tops with unit X spacing and Y scaled to `height`.
///
/// The tangent rule of `cubic_bezier_curves` assumes uniform X steps, so
/// curves are built in this space and stretched horizontally afterwards.
pub fn amplitude_points(sample: &[f64], config: &SpectrumConfig, height: f64) -> Vec<Point> {
    sample
        .iter()
        .enumerate()
        .map(|(i, &db)| Point::new(i as f64, height * config.normalize_db(db)))
        .collect()
}

/// Connect points with the requested style
pub fn outline(points: &[Point], style: OutlineStyle) -> Result<Path> {
    match style {
        OutlineStyle::Curve => cubic_bezier_curves(points, |p| p.x, |p| p.y),
        OutlineStyle::Lines => abs_lines(points, |p| p.x, |p| p.y),
    }
}

/// The outline mirrored below the baseline, joined end to end into one closed shape
pub fn ribbon(points: &[Point], style: OutlineStyle) -> Result<Path> {
    let mut upper = outline(points, style)?;
    let lower = upper.map_points(|p| Point::new(p.x, -p.y));
    upper.join(&reverse_path_components(&lower));
    Ok(upper)
}

/// Build the full path for one spectrum sample, spanning `[0, width]` horizontally
pub fn spectrum_path(sample: &[f64], config: &SpectrumConfig, options: &ShapeOptions) -> Result<Path> {
    let points = amplitude_points(sample, config, options.height);
    let path = if options.ribbon {
        ribbon(&points, options.style)?
    } else {
        outline(&points, options.style)?
    };

    let step = if points.len() > 1 {
        options.width / (points.len() - 1) as f64
    } else {
        0.0
    };
    Ok(path.map_points(|p| Point::new(p.x * step, p.y)))
}

/// Band index nearest to horizontal position `x` on a path of `width`
pub fn band_at(x: f64, width: f64, num_bars: usize) -> usize {
    if num_bars < 2 || width <= 0.0 {
        return 0;
    }
    let position = (x / width * (num_bars - 1) as f64).round();
    (position.max(0.0) as usize).min(num_bars - 1)
}

/// One color per band, sweeping from `low` to `high` along the short hue arc
pub fn band_colors(num_bars: usize, low: ColorHsl, high: ColorHsl) -> Vec<ColorHsl> {
    if num_bars == 1 {
        return vec![low];
    }
    (0..num_bars)
        .map(|i| interp_hsl(i as f64 / (num_bars - 1) as f64, low, high))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{to_path, PathSegment};
    use approx::assert_abs_diff_eq;

    fn config() -> SpectrumConfig {
        SpectrumConfig {
            min_decibels: -100.0,
            max_decibels: -20.0,
            ..SpectrumConfig::default()
        }
    }

    #[test]
    fn test_amplitude_points_normalize() {
        let points = amplitude_points(&[-100.0, -60.0, -20.0, 0.0, -150.0], &config(), 10.0);
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 5.0, 10.0, 10.0, 0.0]);
        assert_eq!(points[3].x, 3.0);
    }

    #[test]
    fn test_line_path_spans_width() {
        let options = ShapeOptions {
            width: 100.0,
            height: 10.0,
            style: OutlineStyle::Lines,
            ribbon: false,
        };
        let path = spectrum_path(&[-100.0, -60.0, -20.0], &config(), &options).unwrap();
        assert_eq!(to_path(&path), "M0,0L50,5L100,10Z");
    }

    #[test]
    fn test_single_bar_path() {
        let options = ShapeOptions {
            width: 100.0,
            height: 10.0,
            style: OutlineStyle::Curve,
            ribbon: false,
        };
        let path = spectrum_path(&[-60.0], &config(), &options).unwrap();
        assert_eq!(to_path(&path), "M0,5Z");
    }

    #[test]
    fn test_ribbon_is_closed_and_symmetric() {
        let points = [Point::new(0.0, 1.0), Point::new(1.0, 3.0), Point::new(2.0, 2.0)];
        let path = ribbon(&points, OutlineStyle::Curve).unwrap();
        let segments = path.segments();

        // move, two upper cubics, bridge line, two lower cubics
        assert_eq!(segments.len(), 6);
        assert_eq!(segments[0], PathSegment::Move { at: Point::new(0.0, 1.0) });
        assert_eq!(
            segments[3],
            PathSegment::Line {
                start: Point::new(2.0, 2.0),
                end: Point::new(2.0, -2.0)
            }
        );
        assert_eq!(path.end(), Point::new(0.0, -1.0));

        match (segments[1], segments[5]) {
            (
                PathSegment::Cubic { control1: up, .. },
                PathSegment::Cubic { control2: down, .. },
            ) => {
                assert_abs_diff_eq!(up.x, down.x, epsilon = 1e-12);
                assert_abs_diff_eq!(up.y, -down.y, epsilon = 1e-12);
            }
            other => panic!("expected cubic segments, got {:?}", other),
        }
    }

    #[test]
    fn test_ribbon_at_floor_prints_plain_zero() {
        let options = ShapeOptions {
            width: 10.0,
            height: 10.0,
            style: OutlineStyle::Lines,
            ribbon: true,
        };
        let path = spectrum_path(&[-100.0, -60.0], &config(), &options).unwrap();
        assert_eq!(to_path(&path), "M0,0L10,5L10,-5L0,0Z");
    }

    #[test]
    fn test_band_at() {
        assert_eq!(band_at(0.0, 100.0, 5), 0);
        assert_eq!(band_at(49.0, 100.0, 5), 2);
        assert_eq!(band_at(100.0, 100.0, 5), 4);
        assert_eq!(band_at(140.0, 100.0, 5), 4);
        assert_eq!(band_at(-3.0, 100.0, 5), 0);
        assert_eq!(band_at(50.0, 100.0, 1), 0);
    }

    #[test]
    fn test_band_colors_sweep() {
        let low = ColorHsl::new(350.0, 80.0, 50.0);
        let high = ColorHsl::new(30.0, 40.0, 60.0);
        let colors = band_colors(5, low, high);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], low);
        assert_abs_diff_eq!(colors[4].h, high.h, epsilon = 1e-9);
        // the sweep crosses zero instead of going the long way round
        assert_abs_diff_eq!(colors[2].h, 10.0, epsilon = 1e-9);
        assert_eq!(band_colors(1, low, high), vec![low]);
    }
}
