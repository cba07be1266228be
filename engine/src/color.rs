use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

use crate::ease::lerp;

/// Straight (non-premultiplied) 8-bit color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Nrgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Nrgba {
    Nrgba { r, g, b, a }
}

pub const fn rgb(r: u8, g: u8, b: u8) -> Nrgba {
    rgba(r, g, b, 255)
}

fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

impl Nrgba {
    pub const TRANSPARENT: Self = rgba(0, 0, 0, 0);
    pub const WHITE: Self = rgb(255, 255, 255);
    pub const BLACK: Self = rgb(0, 0, 0);

    /// Components in `0..=1`, optionally with color multiplied by alpha.
    pub fn to_normalized(self, premultiply: bool) -> [f64; 4] {
        let a = self.a as f64 / 255.0;
        let mut c = [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            a,
        ];
        if premultiply {
            c[0] *= a;
            c[1] *= a;
            c[2] *= a;
        }
        c
    }

    pub fn to_premultiplied_f32(self) -> [f32; 4] {
        self.to_normalized(true).map(|v| v as f32)
    }

    /// Scales alpha by `alpha`, color untouched.
    pub fn fade(self, alpha: f64) -> Self {
        Self {
            a: to_byte(self.a as f64 / 255.0 * alpha),
            ..self
        }
    }

    /// Straight-alpha interpolation of all four components.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let a = self.to_normalized(false);
        let b = other.to_normalized(false);
        rgba(
            to_byte(lerp(a[0], b[0], t)),
            to_byte(lerp(a[1], b[1], t)),
            to_byte(lerp(a[2], b[2], t)),
            to_byte(lerp(a[3], b[3], t)),
        )
    }

    /// Hue in radians `[0, 2π)`, saturation and value in `[0, 1]`.
    pub fn to_hsv(self) -> [f64; 3] {
        let [r, g, b, _] = self.to_normalized(false);

        let c_max = r.max(g).max(b);
        let c_min = r.min(g).min(b);
        let dist = c_max - c_min;

        let mut hue = if dist == 0.0 {
            0.0
        } else if c_max == r {
            ((g - b) / dist) % 6.0
        } else if c_max == g {
            (b - r) / dist + 2.0
        } else {
            (r - g) / dist + 4.0
        };
        hue = (hue * 60f64.to_radians()).rem_euclid(TAU);

        let saturation = if c_max > 0.0 { dist / c_max } else { 0.0 };

        [hue, saturation.clamp(0.0, 1.0), c_max.clamp(0.0, 1.0)]
    }

    /// Opaque color from hue (radians, wrapped), saturation and value.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let hue = hue.rem_euclid(TAU);
        let saturation = saturation.clamp(0.0, 1.0);
        let value = value.clamp(0.0, 1.0);

        let c = saturation * value;
        let h = hue / 60f64.to_radians();
        let x = c * (1.0 - ((h % 2.0) - 1.0).abs());

        let (r, g, b) = match h {
            h if h < 1.0 => (c, x, 0.0),
            h if h < 2.0 => (x, c, 0.0),
            h if h < 3.0 => (0.0, c, x),
            h if h < 4.0 => (0.0, x, c),
            h if h < 5.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = value - c;

        rgb(to_byte(r + m), to_byte(g + m), to_byte(b + m))
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.trim().strip_prefix('#')?;
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl fmt::Display for Nrgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

/// Shift applied to a color in HSV space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HsvMod {
    /// `-π..=π`
    pub hue: f64,
    /// `-1..=1`
    pub saturation: f64,
    /// `-1..=1`
    pub value: f64,
}

impl HsvMod {
    pub fn apply(&self, color: Nrgba) -> Nrgba {
        if *self == Self::default() {
            return color;
        }
        let [h, s, v] = color.to_hsv();
        Nrgba {
            a: color.a,
            ..Nrgba::from_hsv(h + self.hue, s + self.saturation, v + self.value)
        }
    }
}

/// Fades `color` by `alpha`, then composites `highlight_color` faded by
/// `highlight` over it. Output is premultiplied.
pub fn mod_color(color: Nrgba, alpha: f64, highlight: f64, highlight_color: Nrgba) -> [f32; 4] {
    let base = color.fade(alpha).to_normalized(true);
    let over = highlight_color.fade(highlight).to_normalized(true);
    let inv = 1.0 - over[3];
    [
        (over[0] + base[0] * inv) as f32,
        (over[1] + base[1] * inv) as f32,
        (over[2] + base[2] * inv) as f32,
        (over[3] + base[3] * inv) as f32,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_only_touches_alpha() {
        assert_eq!(rgb(10, 20, 30).fade(0.5), rgba(10, 20, 30, 127));
        assert_eq!(rgb(10, 20, 30).fade(2.0), rgb(10, 20, 30));
    }

    #[test]
    fn hsv_round_trip_primary_colors() {
        for color in [rgb(255, 0, 0), rgb(0, 255, 0), rgb(0, 0, 255)] {
            let [h, s, v] = color.to_hsv();
            assert_eq!(Nrgba::from_hsv(h, s, v), color);
        }
    }

    #[test]
    fn hue_shift_rotates_red_to_green() {
        let shift = HsvMod {
            hue: 120f64.to_radians(),
            ..Default::default()
        };
        let shifted = shift.apply(rgba(255, 0, 0, 40));
        assert_eq!(shifted.a, 40);
        assert!(shifted.g > 250 && shifted.r < 5);
    }

    #[test]
    fn mod_color_without_highlight_is_premultiplied_fade() {
        let out = mod_color(rgb(255, 0, 0), 0.5, 0.0, Nrgba::WHITE);
        assert!((out[0] - 0.498).abs() < 0.01);
        assert!((out[3] - 0.498).abs() < 0.01);
    }

    #[test]
    fn full_highlight_covers_base() {
        let out = mod_color(rgb(255, 0, 0), 1.0, 1.0, rgb(0, 0, 255));
        assert_eq!(out, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn hex_parse_and_display() {
        assert_eq!(Nrgba::from_hex("#FF8000"), Some(rgb(255, 128, 0)));
        assert_eq!(Nrgba::from_hex("#ff800080"), Some(rgba(255, 128, 0, 128)));
        assert_eq!(Nrgba::from_hex("ff8000"), None);
        assert_eq!(rgba(1, 2, 3, 4).to_string(), "#01020304");
    }
}
