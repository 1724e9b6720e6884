//! Gradient model: geometry plus an ordered list of color stops.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb};
use crate::math;

/// Fewest stops a gradient may have.
pub const MIN_STOPS: usize = 2;

/// Angle offset between the angle widget (0° points right) and the stored
/// CSS angle (0° points up).
const PICKER_ANGLE_OFFSET: f64 = 90.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
    Angular,
}

impl GradientType {
    pub const ALL: [GradientType; 3] = [Self::Linear, Self::Radial, Self::Angular];

    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Radial => "Radial",
            Self::Angular => "Angular",
        }
    }

    /// Radial gradients are placed by their centre, the others by an angle.
    pub fn uses_angle(self) -> bool {
        !matches!(self, Self::Radial)
    }
}

/// A color control point. `position` and `opacity` are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: String,
    pub opacity: f64,
}

impl GradientStop {
    pub fn new(position: f64, color: impl Into<String>, opacity: f64) -> Self {
        let color = color.into();
        Self {
            position: math::clamp_or(position, 0.0, 100.0, 0.0),
            color: opaque_hex(&color),
            opacity: math::clamp_or(opacity, 0.0, 100.0, 100.0),
        }
    }

    fn rgb(&self) -> Rgb {
        color::parse_hex(&self.color)
            .map(|c| c.rgb())
            .unwrap_or(Rgb::new(0xD9, 0xD9, 0xD9))
    }

    /// `rgba(r, g, b, a) p%`
    pub fn to_css(&self) -> String {
        format!(
            "{} {}%",
            color::rgba_css(self.rgb(), self.opacity / 100.0),
            self.position
        )
    }
}

/// Uppercase `#RRGGBB`, dropping any alpha digits.
fn opaque_hex(hex: &str) -> String {
    match color::parse_hex(hex) {
        Ok(rgba) => color::rgb_alpha_to_hex(rgba.rgb(), 1.0),
        Err(_) => color::FALLBACK_HEX.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientType,
    pub angle: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub stops: Vec<GradientStop>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            kind: GradientType::Linear,
            angle: 0.0,
            center_x: 50.0,
            center_y: 50.0,
            stops: vec![
                GradientStop::new(0.0, "#D9D9D9", 100.0),
                GradientStop::new(100.0, "#737373", 100.0),
            ],
        }
    }
}

impl Gradient {
    /// Insert a stop and re-sort. Returns the index the new stop landed at.
    pub fn add_stop(&mut self, position: f64, color: &str, opacity: f64) -> usize {
        self.stops.push(GradientStop::new(position, color, opacity));
        let new_index = self.stops.len() - 1;
        self.sort_stops(new_index)
    }

    /// Insert a stop at `position` colored like the gradient already is there.
    pub fn add_stop_at(&mut self, position: f64) -> usize {
        let (rgb, opacity) = self.color_at(position);
        let hex = color::rgb_alpha_to_hex(rgb, 1.0);
        self.add_stop(position, &hex, opacity)
    }

    /// Remove the stop at `index`. Refused (returns `false`) when that would
    /// leave fewer than [`MIN_STOPS`] stops or the index does not exist.
    pub fn remove_stop(&mut self, index: usize) -> bool {
        if self.stops.len() <= MIN_STOPS || index >= self.stops.len() {
            return false;
        }
        self.stops.remove(index);
        true
    }

    /// Mirror every stop (`p → 100 − p`) and re-sort. Returns where the
    /// stop that was at `tracked` ended up; stops sharing a position keep
    /// their relative order, so this is not simply the reversed index.
    pub fn flip(&mut self, tracked: usize) -> usize {
        for stop in &mut self.stops {
            stop.position = 100.0 - stop.position;
        }
        self.sort_stops(tracked)
    }

    /// Move a stop while it is being dragged. Order is left alone until
    /// [`Gradient::sort_stops`] runs at the end of the drag, so indices stay
    /// stable under the pointer.
    pub fn drag_stop(&mut self, index: usize, position: f64) {
        if let Some(stop) = self.stops.get_mut(index) {
            stop.position = math::clamp_or(position, 0.0, 100.0, stop.position);
        }
    }

    /// Stable sort by position. Returns where the stop that was at
    /// `tracked` ended up.
    pub fn sort_stops(&mut self, tracked: usize) -> usize {
        let mut order: Vec<usize> = (0..self.stops.len()).collect();
        order.sort_by(|&a, &b| {
            self.stops[a]
                .position
                .total_cmp(&self.stops[b].position)
        });
        let new_index = order.iter().position(|&i| i == tracked).unwrap_or(0);
        let mut old = std::mem::take(&mut self.stops).into_iter().map(Some).collect::<Vec<_>>();
        self.stops = order.iter().filter_map(|&i| old[i].take()).collect();
        new_index
    }

    pub fn is_sorted(&self) -> bool {
        self.stops
            .windows(2)
            .all(|pair| pair[0].position <= pair[1].position)
    }

    /// Set a stop's color from hex. An 8-digit hex also sets its opacity.
    pub fn set_stop_color(&mut self, index: usize, hex: &str) -> bool {
        let Some(stop) = self.stops.get_mut(index) else {
            return false;
        };
        let Ok(rgba) = color::parse_hex(hex) else {
            return false;
        };
        stop.color = color::rgb_alpha_to_hex(rgba.rgb(), 1.0);
        if hex.trim().trim_start_matches('#').len() == 8 {
            stop.opacity = (rgba.a * 100.0).round();
        }
        true
    }

    pub fn set_stop_opacity(&mut self, index: usize, opacity: f64) {
        if let Some(stop) = self.stops.get_mut(index) {
            stop.opacity = math::clamp_or(opacity, 0.0, 100.0, stop.opacity);
        }
    }

    /// Space the stops evenly from 0% to 100%, keeping their order.
    pub fn redistribute(&mut self) {
        self.sort_stops(0);
        let last = (self.stops.len() - 1).max(1) as f64;
        for (i, stop) in self.stops.iter_mut().enumerate() {
            stop.position = (i as f64 / last * 100.0 * 100.0).round() / 100.0;
        }
    }

    /// Angle as shown by the angle widget (0° = right).
    pub fn picker_angle(&self) -> f64 {
        (self.angle - PICKER_ANGLE_OFFSET).rem_euclid(360.0)
    }

    /// Store an angle coming from the angle widget.
    pub fn set_picker_angle(&mut self, degrees: f64) {
        if degrees.is_finite() {
            self.angle = (degrees + PICKER_ANGLE_OFFSET).rem_euclid(360.0);
        }
    }

    pub fn set_center(&mut self, x: f64, y: f64) {
        self.center_x = math::clamp_or(x, 0.0, 100.0, 50.0);
        self.center_y = math::clamp_or(y, 0.0, 100.0, 50.0);
    }

    /// Interpolated color and opacity at `position` (0–100).
    pub fn color_at(&self, position: f64) -> (Rgb, f64) {
        let mut sorted: Vec<&GradientStop> = self.stops.iter().collect();
        sorted.sort_by(|a, b| a.position.total_cmp(&b.position));

        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            return (Rgb::new(0xD9, 0xD9, 0xD9), 100.0);
        };
        if position <= first.position {
            return (first.rgb(), first.opacity);
        }
        if position >= last.position {
            return (last.rgb(), last.opacity);
        }
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if position >= a.position && position <= b.position {
                let span = b.position - a.position;
                let t = if span > 0.0 { (position - a.position) / span } else { 0.0 };
                let (ca, cb) = (a.rgb(), b.rgb());
                let rgb = Rgb::from_f64(
                    math::lerp(ca.r as f64, cb.r as f64, t),
                    math::lerp(ca.g as f64, cb.g as f64, t),
                    math::lerp(ca.b as f64, cb.b as f64, t),
                );
                return (rgb, math::lerp(a.opacity, b.opacity, t).round());
            }
        }
        (last.rgb(), last.opacity)
    }

    /// CSS `linear-gradient` / `radial-gradient` / `conic-gradient`.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stops = self
            .stops
            .iter()
            .map(GradientStop::to_css)
            .collect::<Vec<_>>()
            .join(", ");
        match self.kind {
            GradientType::Linear => write!(f, "linear-gradient({}deg, {stops})", self.angle),
            GradientType::Radial => write!(
                f,
                "radial-gradient(circle at {}% {}%, {stops})",
                self.center_x, self.center_y
            ),
            GradientType::Angular => write!(
                f,
                "conic-gradient(from {}deg, {stops})",
                self.angle + PICKER_ANGLE_OFFSET
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_css() {
        let g = Gradient::default();
        assert_eq!(
            g.to_css(),
            "linear-gradient(0deg, rgba(217, 217, 217, 1) 0%, rgba(115, 115, 115, 1) 100%)"
        );
    }

    #[test]
    fn test_radial_and_angular_css() {
        let mut g = Gradient::default();
        g.kind = GradientType::Radial;
        g.set_center(25.0, 75.0);
        assert!(g.to_css().starts_with("radial-gradient(circle at 25% 75%, "));

        g.kind = GradientType::Angular;
        g.angle = 45.0;
        assert!(g.to_css().starts_with("conic-gradient(from 135deg, "));
    }

    #[test]
    fn test_stop_css_uses_opacity_fraction() {
        let stop = GradientStop::new(30.0, "#ff0000", 50.0);
        assert_eq!(stop.to_css(), "rgba(255, 0, 0, 0.5) 30%");
    }

    #[test]
    fn test_add_stop_sorts_and_reports_index() {
        let mut g = Gradient::default();
        let index = g.add_stop(50.0, "#00FF00", 100.0);
        assert_eq!(index, 1);
        assert_eq!(g.stops.len(), 3);
        assert_eq!(g.stops[1].color, "#00FF00");
        assert!(g.is_sorted());
    }

    #[test]
    fn test_remove_refused_at_two_stops() {
        let mut g = Gradient::default();
        assert!(!g.remove_stop(0));
        assert_eq!(g.stops.len(), 2);

        g.add_stop(50.0, "#00FF00", 100.0);
        assert!(g.remove_stop(0));
        assert!(!g.remove_stop(0));
        assert_eq!(g.stops.len(), 2);
        assert!(!g.remove_stop(9));
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let mut g = Gradient::default();
        g.add_stop(12.5, "#123456", 40.0);
        g.add_stop(70.0, "#654321", 90.0);
        let original = g.clone();
        g.flip(0);
        assert!(g.is_sorted());
        assert_eq!(g.stops[0].color, "#737373");
        g.flip(0);
        for (a, b) in g.stops.iter().zip(&original.stops) {
            assert!((a.position - b.position).abs() < 1e-9);
            assert_eq!(a.color, b.color);
        }
    }

    #[test]
    fn test_drag_defers_sort_until_commit() {
        let mut g = Gradient::default();
        g.drag_stop(0, 80.0);
        g.drag_stop(1, 10.0);
        assert_eq!(g.stops[0].position, 80.0);
        assert!(!g.is_sorted());
        g.drag_stop(0, 140.0);
        assert_eq!(g.stops[0].position, 100.0);

        let moved = g.sort_stops(0);
        assert_eq!(moved, 1);
        assert_eq!(g.stops[1].color, "#D9D9D9");
    }

    #[test]
    fn test_set_stop_color_with_alpha() {
        let mut g = Gradient::default();
        assert!(g.set_stop_color(1, "#ff000080"));
        assert_eq!(g.stops[1].color, "#FF0000");
        assert_eq!(g.stops[1].opacity, 50.0);
        assert!(!g.set_stop_color(1, "bogus"));
        assert!(!g.set_stop_color(7, "#000000"));
    }

    #[test]
    fn test_picker_angle_offset() {
        let mut g = Gradient::default();
        assert_eq!(g.picker_angle(), 270.0);
        g.set_picker_angle(0.0);
        assert_eq!(g.angle, 90.0);
        g.set_picker_angle(300.0);
        assert_eq!(g.angle, 30.0);
        assert_eq!(g.picker_angle(), 300.0);
    }

    #[test]
    fn test_redistribute() {
        let mut g = Gradient::default();
        g.add_stop(10.0, "#FF0000", 100.0);
        g.add_stop(20.0, "#00FF00", 100.0);
        g.redistribute();
        let positions: Vec<f64> = g.stops.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.0, 33.33, 66.67, 100.0]);
    }

    #[test]
    fn test_color_at_interpolates() {
        let g = Gradient {
            stops: vec![
                GradientStop::new(0.0, "#000000", 0.0),
                GradientStop::new(100.0, "#FFFFFF", 100.0),
            ],
            ..Gradient::default()
        };
        let (rgb, opacity) = g.color_at(50.0);
        assert_eq!(rgb, Rgb::new(128, 128, 128));
        assert_eq!(opacity, 50.0);
        assert_eq!(g.color_at(-5.0).0, Rgb::new(0, 0, 0));
    }
}
