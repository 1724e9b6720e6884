//! Color spaces used by the fill picker.
//!
//! [`Hsva`] is the canonical in-memory color: hue in degrees (0–360),
//! saturation and value in percent (0–100), alpha in 0.0–1.0. Conversions
//! to and from RGB bytes and hex strings live here as free functions; the
//! normalized math they wrap is in `math`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FillError;
use crate::math;

/// Hex shown whenever a color cannot be computed.
pub const FALLBACK_HEX: &str = "#D9D9D9";

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Round and clamp float channels into 0–255. NaN becomes 0.
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    /// Channels as 0.0–1.0 floats.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

/// 8-bit RGB plus a float alpha in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Hue (0–360), saturation (0–100), value (0–100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// [`Hsv`] with alpha. Always finite and in range once built through
/// [`Hsva::new`] or [`Hsva::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsva {
    pub h: f64,
    pub s: f64,
    pub v: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Default for Hsva {
    /// `#D9D9D9`, fully opaque.
    fn default() -> Self {
        Self {
            h: 0.0,
            s: 0.0,
            v: 85.0,
            a: 1.0,
        }
    }
}

impl Hsva {
    /// Build a color, clamping every component into range.
    pub fn new(h: f64, s: f64, v: f64, a: f64) -> Self {
        Self { h, s, v, a }.clamped()
    }

    /// Copy with out-of-range components clamped and NaN replaced.
    pub fn clamped(self) -> Self {
        Self {
            h: math::clamp_or(self.h, 0.0, 360.0, 0.0),
            s: math::clamp_or(self.s, 0.0, 100.0, 0.0),
            v: math::clamp_or(self.v, 0.0, 100.0, 0.0),
            a: math::clamp_or(self.a, 0.0, 1.0, 1.0),
        }
    }

    pub fn from_hsv(hsv: Hsv, a: f64) -> Self {
        Self::new(hsv.h, hsv.s, hsv.v, a)
    }

    pub fn from_rgba(rgba: Rgba) -> Self {
        Self::from_hsv(rgb_to_hsv(rgba.r, rgba.g, rgba.b), rgba.a)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (also 3-digit shorthand).
    pub fn from_hex(hex: &str) -> Result<Self, FillError> {
        parse_hex(hex).map(Self::from_rgba)
    }

    pub fn hsv(&self) -> Hsv {
        Hsv {
            h: self.h,
            s: self.s,
            v: self.v,
        }
    }

    pub fn rgb(&self) -> Rgb {
        hsv_to_rgb(self.h, self.s, self.v)
    }

    /// Opaque `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        hsv_to_hex(self.hsv())
    }

    /// `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex_alpha(&self) -> String {
        rgb_alpha_to_hex(self.rgb(), self.a)
    }

    /// Alpha as a whole percentage.
    pub fn opacity(&self) -> f64 {
        (self.a * 100.0).round()
    }

    /// Replace hue/saturation/value, keeping alpha.
    pub fn with_hsv(self, hsv: Hsv) -> Self {
        Self::from_hsv(hsv, self.a)
    }
}

fn channel(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

/// HSV (degrees, percent, percent) → 8-bit RGB.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let (r, g, b) = math::hsv_to_rgb(
        h / 360.0,
        (s / 100.0).clamp(0.0, 1.0),
        (v / 100.0).clamp(0.0, 1.0),
    );
    Rgb::from_f64(r * 255.0, g * 255.0, b * 255.0)
}

/// 8-bit RGB → HSV (degrees, percent, percent). Hue is 0 for grays.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (r, g, b) = Rgb::new(r, g, b).to_unit();
    let (h, s, v) = math::rgb_to_hsv(r, g, b);
    Hsv {
        h: h * 360.0,
        s: s * 100.0,
        v: v * 100.0,
    }
}

/// HSV → uppercase `#RRGGBB`. Non-finite input yields [`FALLBACK_HEX`].
pub fn hsv_to_hex(hsv: Hsv) -> String {
    if !(hsv.h.is_finite() && hsv.s.is_finite() && hsv.v.is_finite()) {
        return FALLBACK_HEX.to_string();
    }
    rgb_alpha_to_hex(hsv_to_rgb(hsv.h, hsv.s, hsv.v), 1.0)
}

/// `#RRGGBB` → HSV. Malformed input yields the fallback gray.
pub fn hex_to_hsv(hex: &str) -> Hsv {
    let rgba = parse_hex(hex).unwrap_or(Rgba {
        r: 0xD9,
        g: 0xD9,
        b: 0xD9,
        a: 1.0,
    });
    rgb_to_hsv(rgba.r, rgba.g, rgba.b)
}

/// Uppercase hex; the 8-digit form is produced only when `a != 1`.
pub fn rgb_alpha_to_hex(rgb: Rgb, a: f64) -> String {
    let a = math::clamp_or(a, 0.0, 1.0, 1.0);
    if a == 1.0 {
        format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
    } else {
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            rgb.r,
            rgb.g,
            rgb.b,
            channel(a * 255.0)
        )
    }
}

/// CSS `rgba(r, g, b, a)`.
pub fn rgba_css(rgb: Rgb, a: f64) -> String {
    format!("rgba({}, {}, {}, {})", rgb.r, rgb.g, rgb.b, a)
}

/// Parse hex with or without `#`: 3, 6 or 8 digits.
pub fn parse_hex(hex: &str) -> Result<Rgba, FillError> {
    let stripped = hex.trim().trim_start_matches('#');
    if !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FillError::InvalidHex(hex.to_string()));
    }
    let byte = |i: usize| u8::from_str_radix(&stripped[i..i + 2], 16);
    let parsed = match stripped.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&stripped[i..i + 1], 16).map(|n| n * 17);
            nibble(0).and_then(|r| Ok((r, nibble(1)?, nibble(2)?, 255)))
        }
        6 => byte(0).and_then(|r| Ok((r, byte(2)?, byte(4)?, 255))),
        8 => byte(0).and_then(|r| Ok((r, byte(2)?, byte(4)?, byte(6)?))),
        _ => return Err(FillError::InvalidHex(hex.to_string())),
    };
    let (r, g, b, a) = parsed.map_err(|_| FillError::InvalidHex(hex.to_string()))?;
    Ok(Rgba {
        r,
        g,
        b,
        a: a as f64 / 255.0,
    })
}

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^rgba?\(\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)\s*(?:,\s*(\d*\.?\d+)\s*)?\)$",
    )
    .expect("rgb pattern is valid")
});

static HSL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^hsla?\(\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)%\s*,\s*(\d+(?:\.\d+)?)%\s*(?:,\s*(\d*\.?\d+)\s*)?\)$",
    )
    .expect("hsl pattern is valid")
});

/// Parse `#hex[alpha]`, `rgb()/rgba()` or `hsl()/hsla()`.
/// Returns `None` for anything else.
pub fn parse_color_string(css: &str) -> Option<Rgba> {
    let css = css.trim();
    if css.starts_with('#') {
        return parse_hex(css).ok();
    }
    let number = |s: &str| s.parse::<f64>().ok();
    let alpha = |m: Option<regex::Match<'_>>| match m {
        Some(m) => number(m.as_str()).map(|a| a.clamp(0.0, 1.0)),
        None => Some(1.0),
    };

    if let Some(caps) = RGB_RE.captures(css) {
        let rgb = Rgb::from_f64(
            number(&caps[1])?,
            number(&caps[2])?,
            number(&caps[3])?,
        );
        return Some(Rgba {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            a: alpha(caps.get(4))?,
        });
    }

    if let Some(caps) = HSL_RE.captures(css) {
        let h = number(&caps[1])? / 360.0;
        let s = (number(&caps[2])? / 100.0).clamp(0.0, 1.0);
        let l = (number(&caps[3])? / 100.0).clamp(0.0, 1.0);
        let (r, g, b) = math::hsl_to_rgb(h, s, l);
        let rgb = Rgb::from_f64(r * 255.0, g * 255.0, b * 255.0);
        return Some(Rgba {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            a: alpha(caps.get(4))?,
        });
    }

    None
}

/// Parse typed color text: hex with or without `#`, or any form
/// [`parse_color_string`] accepts.
pub fn parse_color(text: &str) -> Result<Rgba, FillError> {
    parse_hex(text)
        .ok()
        .or_else(|| parse_color_string(text))
        .ok_or_else(|| FillError::UnrecognizedColor(text.trim().to_string()))
}

/// Normalize free-typed hex text to uppercase `RRGGBB` or `RRGGBBAA`
/// (no `#`). Shorthand is expanded; anything unparseable becomes the
/// fallback gray.
pub fn normalize_hex(text: &str) -> String {
    match parse_hex(text) {
        Ok(rgba) => rgb_alpha_to_hex(rgba.rgb(), rgba.a)
            .trim_start_matches('#')
            .to_string(),
        Err(_) => FALLBACK_HEX.trim_start_matches('#').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_rgb_round_trip_within_one() {
        // Each channel rounds by at most half a byte, which moves the hue by
        // at most 120 / (chroma - 1) degrees for a chroma in bytes. From
        // s = v = 70 the chroma is at least 124, so the hue stays within 1.
        for h in (0..360).step_by(7) {
            for s in (70..=100).step_by(10) {
                for v in (70..=100).step_by(10) {
                    let rgb = hsv_to_rgb(h as f64, s as f64, v as f64);
                    let back = rgb_to_hsv(rgb.r, rgb.g, rgb.b);
                    assert!((back.s - s as f64).abs() <= 1.0, "s {s} -> {}", back.s);
                    assert!((back.v - v as f64).abs() <= 1.0, "v {v} -> {}", back.v);
                    let dh = (back.h - h as f64).abs();
                    assert!(
                        dh.min(360.0 - dh) <= 1.0,
                        "h {h} s {s} v {v} -> {}",
                        back.h
                    );
                }
            }
        }
    }

    #[test]
    fn test_grays_round_trip_with_zero_hue() {
        for h in (0..360).step_by(45) {
            for v in 0..=100 {
                let rgb = hsv_to_rgb(h as f64, 0.0, v as f64);
                assert!(rgb.r == rgb.g && rgb.g == rgb.b, "h {h} v {v} -> {rgb:?}");
                let back = rgb_to_hsv(rgb.r, rgb.g, rgb.b);
                assert_eq!(back.h, 0.0);
                assert_eq!(back.s, 0.0);
                // Half a byte of rounding is 0.196 percent.
                assert!((back.v - v as f64).abs() <= 0.2, "v {v} -> {}", back.v);
            }
        }
    }

    #[test]
    fn test_hex_round_trip() {
        for hex in ["#000000", "#FFFFFF", "#FF0000", "#1A2B3C", "#D9D9D9", "#737373", "#80FF01"] {
            assert_eq!(hsv_to_hex(hex_to_hsv(hex)), hex);
        }
    }

    #[test]
    fn test_invalid_hsv_falls_back_to_gray() {
        let hsv = Hsv {
            h: f64::NAN,
            s: 50.0,
            v: 50.0,
        };
        assert_eq!(hsv_to_hex(hsv), FALLBACK_HEX);
        assert_eq!(hsv_to_hex(hex_to_hsv("nope")), FALLBACK_HEX);
    }

    #[test]
    fn test_alpha_hex_length_contract() {
        let rgb = Rgb::new(255, 0, 0);
        assert_eq!(rgb_alpha_to_hex(rgb, 1.0), "#FF0000");
        assert_eq!(rgb_alpha_to_hex(rgb, 0.5), "#FF000080");
        assert_eq!(rgb_alpha_to_hex(rgb, 0.0), "#FF000000");
        assert_eq!(rgb_alpha_to_hex(rgb, 0.999).len(), 9);
        assert_eq!(rgb_alpha_to_hex(rgb, 7.0).len(), 7);
    }

    #[test]
    fn test_parse_color_string_forms() {
        let red = parse_color_string("rgb(255, 0, 0)").unwrap();
        assert_eq!((red.r, red.g, red.b, red.a), (255, 0, 0, 1.0));

        let half = parse_color_string("rgba(0,128,255,0.5)").unwrap();
        assert_eq!((half.r, half.g, half.b, half.a), (0, 128, 255, 0.5));

        let blue = parse_color_string("hsl(240, 100%, 50%)").unwrap();
        assert_eq!(blue.rgb(), Rgb::new(0, 0, 255));

        let gray = parse_color_string("hsla(0, 0%, 50%, 0.25)").unwrap();
        assert_eq!(gray.rgb(), Rgb::new(128, 128, 128));
        assert_eq!(gray.a, 0.25);

        let short = parse_color_string("#f0a").unwrap();
        assert_eq!(short.rgb(), Rgb::new(255, 0, 170));

        let with_alpha = parse_color_string("#FF000080").unwrap();
        assert!((with_alpha.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_color_string_rejects_unknown() {
        assert!(parse_color_string("red").is_none());
        assert!(parse_color_string("rgb(1, 2)").is_none());
        assert!(parse_color_string("#12345").is_none());
        assert!(parse_color_string("").is_none());
    }

    #[test]
    fn test_hsva_clamps() {
        let c = Hsva::new(400.0, -3.0, 150.0, f64::NAN);
        assert_eq!(c, Hsva::new(360.0, 0.0, 100.0, 1.0));
        assert_eq!(Hsva::default().to_hex(), FALLBACK_HEX);
    }

    #[test]
    fn test_parse_color_accepts_bare_hex_and_css() {
        assert_eq!(parse_color("ff8000").unwrap().rgb(), Rgb::new(255, 128, 0));
        assert_eq!(parse_color(" rgb(1, 2, 3) ").unwrap().rgb(), Rgb::new(1, 2, 3));
        match parse_color("teal") {
            Err(FillError::UnrecognizedColor(text)) => assert_eq!(text, "teal"),
            other => panic!("expected UnrecognizedColor, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("#abc"), "AABBCC");
        assert_eq!(normalize_hex("ff000080"), "FF000080");
        assert_eq!(normalize_hex("ff0000ff"), "FF0000");
        assert_eq!(normalize_hex("zz"), "D9D9D9");
    }
}
