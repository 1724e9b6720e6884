//! Normalized color math. Every function here works on f64 in 0.0–1.0;
//! the public `color` module scales to degrees/percentages/bytes.

/// HSV → RGB.
pub(crate) fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s <= 0.0 {
        return (v, v, v);
    }
    let h6 = (h * 6.0).rem_euclid(6.0);
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// RGB → HSV. Hue is 0.0 for achromatic input.
pub(crate) fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    (h, s, max)
}

/// HSL → RGB.
pub(crate) fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let v = l + s * l.min(1.0 - l);
    let s_hsv = if v == 0.0 { 0.0 } else { 2.0 * (1.0 - l / v) };
    hsv_to_rgb(h, s_hsv, v)
}

/// Linear interpolation between `a` and `b`.
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamp, mapping NaN to `fallback` instead of propagating it.
pub(crate) fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Snap `value` to the nearest multiple of `step` measured from `origin`.
pub(crate) fn snap(value: f64, origin: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    origin + ((value - origin) / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_primary_sectors() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (1.0, 0.0, 0.0));
        let (r, g, b) = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(r.abs() < EPSILON && (g - 1.0).abs() < EPSILON && b.abs() < EPSILON);
        // A full turn wraps back to sector 0.
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_achromatic_has_zero_hue() {
        let (h, s, v) = rgb_to_hsv(0.4, 0.4, 0.4);
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((v - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_hsl_midpoint_is_pure_hue() {
        let (r, g, b) = hsl_to_rgb(2.0 / 3.0, 1.0, 0.5);
        assert!(r.abs() < EPSILON && g.abs() < EPSILON && (b - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_snap() {
        assert_eq!(snap(44.0, 0.0, 45.0), 45.0);
        assert!((snap(0.26, 0.0, 0.1) - 0.3).abs() < EPSILON);
        assert_eq!(snap(7.0, 0.0, 0.0), 7.0);
    }

    #[test]
    fn test_clamp_or_nan() {
        assert_eq!(clamp_or(f64::NAN, 0.0, 1.0, 0.5), 0.5);
        assert_eq!(clamp_or(3.0, 0.0, 1.0, 0.5), 1.0);
    }
}
