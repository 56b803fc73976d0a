//! RGB/HSL conversion and hue-aware interpolation

use crate::error::{Result, SpectrumError};

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorHsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl ColorHsl {
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Convert back to 8-bit RGB for renderers without HSL support
    pub fn to_rgb(&self) -> [u8; 3] {
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        if s == 0.0 {
            let v = to_channel(l);
            return [v, v, v];
        }

        let t2 = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let t1 = 2.0 * l - t2;
        let h = self.h.rem_euclid(360.0) / 360.0;

        [
            to_channel(hue_to_channel(t1, t2, h + 1.0 / 3.0)),
            to_channel(hue_to_channel(t1, t2, h)),
            to_channel(hue_to_channel(t1, t2, h - 1.0 / 3.0)),
        ]
    }
}

fn hue_to_channel(t1: f64, t2: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if 6.0 * t < 1.0 {
        t1 + (t2 - t1) * 6.0 * t
    } else if 2.0 * t < 1.0 {
        t2
    } else if 3.0 * t < 2.0 {
        t1 + (t2 - t1) * (2.0 / 3.0 - t) * 6.0
    } else {
        t1
    }
}

fn to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Standard min/max/delta HSL derivation.
///
/// Achromatic input (max == min) yields hue 0 and saturation 0. The
/// saturation formula branches on lightness; the two forms disagree at the
/// boundary, so the branch is kept as is.
pub fn rgb_to_hsl(rgb: [u8; 3]) -> ColorHsl {
    let r = rgb[0] as f64 / 255.0;
    let g = rgb[1] as f64 / 255.0;
    let b = rgb[2] as f64 / 255.0;
    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    let mut h = if max == min {
        0.0
    } else if r == max {
        (g - b) / delta
    } else if g == max {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };

    h = (h * 60.0).min(360.0);
    if h < 0.0 {
        h += 360.0;
    }

    let l = (min + max) / 2.0;

    let s = if max == min {
        0.0
    } else if l <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    ColorHsl::new(h, s * 100.0, l * 100.0)
}

/// Interpolate between two colors, taking the shorter way around the hue circle.
///
/// When both arcs are equally long the direct arc wins.
pub fn interp_hsl(alpha: f64, c1: ColorHsl, c2: ColorHsl) -> ColorHsl {
    let mut hue_delta = c2.h - c1.h;
    let alt_hue_delta = if hue_delta > 0.0 {
        c2.h - (c1.h + 360.0)
    } else {
        c2.h + 360.0 - c1.h
    };
    if alt_hue_delta.abs() < hue_delta.abs() {
        hue_delta = alt_hue_delta;
    }

    let s = c1.s * (1.0 - alpha) + c2.s * alpha;
    let l = c1.l * (1.0 - alpha) + c2.l * alpha;
    let hue = c1.h + alpha * hue_delta;
    let h = (hue + 360.0) % 360.0;
    ColorHsl::new(h, s, l)
}

/// Parse a `#rrggbb` hex string
pub fn parse_rgb(hex: &str) -> Result<[u8; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(SpectrumError::InvalidConfig(format!(
            "expected a color like #rrggbb, got {:?}",
            hex
        )));
    }

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let pair = &digits[i * 2..i * 2 + 2];
        *channel = u8::from_str_radix(pair, 16).map_err(|_| {
            SpectrumError::InvalidConfig(format!("invalid hex digits {:?} in color {:?}", pair, hex))
        })?;
    }
    Ok(rgb)
}
