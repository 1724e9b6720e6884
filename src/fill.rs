//! The fill value: which kind of paint is active, plus the last-edited
//! state of every kind so that switching between them loses nothing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::color::{self, Hsva};
use crate::error::FillError;
use crate::gradient::{Gradient, GradientStop, GradientType, MIN_STOPS};
use crate::math;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillType {
    #[default]
    Solid,
    Gradient,
    Image,
    Video,
    Webcam,
}

impl FillType {
    pub const ALL: [FillType; 5] = [
        Self::Solid,
        Self::Gradient,
        Self::Image,
        Self::Video,
        Self::Webcam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::Image => "image",
            Self::Video => "video",
            Self::Webcam => "webcam",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Gradient => "Gradient",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Webcam => "Webcam",
        }
    }
}

impl fmt::Display for FillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillType {
    type Err = FillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| FillError::UnknownFillType(s.to_string()))
    }
}

/// How image and video media cover the filled area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Fill,
    Fit,
    Crop,
    Tile,
}

impl ScaleMode {
    pub const IMAGE: [ScaleMode; 4] = [Self::Fill, Self::Fit, Self::Crop, Self::Tile];
    pub const VIDEO: [ScaleMode; 3] = [Self::Fill, Self::Fit, Self::Crop];

    pub fn label(self) -> &'static str {
        match self {
            Self::Fill => "Fill",
            Self::Fit => "Fit",
            Self::Crop => "Crop",
            Self::Tile => "Tile",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "fill" => Some(Self::Fill),
            "fit" => Some(Self::Fit),
            "crop" => Some(Self::Crop),
            "tile" => Some(Self::Tile),
            _ => None,
        }
    }

    /// CSS `background-size` / `background-position` for this mode.
    pub fn background_sizing(self, scale: f64) -> (String, &'static str) {
        match self {
            Self::Fill | Self::Crop => ("cover".to_string(), "center"),
            Self::Fit => ("contain".to_string(), "center"),
            Self::Tile => (format!("{scale}%"), "top left"),
        }
    }
}

pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 200.0;

/// An image or video fill. `scale` only matters for [`ScaleMode::Tile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFill {
    pub url: Option<String>,
    pub scale_mode: ScaleMode,
    pub scale: f64,
    pub opacity: f64,
}

impl Default for MediaFill {
    fn default() -> Self {
        Self {
            url: None,
            scale_mode: ScaleMode::Fill,
            scale: 50.0,
            opacity: 1.0,
        }
    }
}

impl MediaFill {
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = math::clamp_or(scale, MIN_SCALE, MAX_SCALE, self.scale);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebcamFill {
    pub snapshot: Option<String>,
}

/// What a host sees: only the active kind, never the stored inactive ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FillProjection {
    Solid {
        color: String,
        alpha: f64,
        opacity: f64,
        hsv: Hsva,
    },
    Gradient {
        gradient: Gradient,
        css: String,
    },
    Image {
        image: MediaFill,
    },
    Video {
        video: MediaFill,
    },
    Webcam {
        webcam: WebcamFill,
    },
}

impl FillProjection {
    pub fn kind(&self) -> FillType {
        match self {
            Self::Solid { .. } => FillType::Solid,
            Self::Gradient { .. } => FillType::Gradient,
            Self::Image { .. } => FillType::Image,
            Self::Video { .. } => FillType::Video,
            Self::Webcam { .. } => FillType::Webcam,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Swatch preview of a fill, as CSS background properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ChitBackground {
    pub background: String,
    pub size: String,
    pub position: &'static str,
    /// Only solid fills carry a separate alpha.
    pub alpha: Option<f64>,
}

/// Every fill kind's state plus which one is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FillState {
    pub kind: FillType,
    pub color: Hsva,
    pub gradient: Gradient,
    pub image: MediaFill,
    pub video: MediaFill,
    pub webcam: WebcamFill,
}

impl FillState {
    /// Parse a serialized value on top of the defaults.
    pub fn parse(raw: &str) -> Result<Self, FillError> {
        let mut state = Self::default();
        state.apply_serialized(raw)?;
        Ok(state)
    }

    /// Merge a serialized value into this state.
    ///
    /// Accepts the JSON projection (partial objects merge over what is
    /// already stored) or a bare `#RRGGBB[AA]` solid shorthand. On error
    /// nothing is modified.
    pub fn apply_serialized(&mut self, raw: &str) -> Result<(), FillError> {
        let raw = raw.trim();
        if raw.starts_with('#') {
            self.color = Hsva::from_hex(raw)?;
            self.kind = FillType::Solid;
            return Ok(());
        }

        let parsed: RawFill = serde_json::from_str(raw)?;
        let kind = parsed.kind.as_deref().map(str::parse::<FillType>).transpose()?;

        let mut next = self.clone();
        if let Some(kind) = kind {
            next.kind = kind;
        }
        next.merge_color(&parsed)?;
        if let Some(gradient) = &parsed.gradient {
            gradient.merge_into(&mut next.gradient);
        }
        if let Some(image) = &parsed.image {
            image.merge_into(&mut next.image, &ScaleMode::IMAGE);
        }
        if let Some(video) = &parsed.video {
            video.merge_into(&mut next.video, &ScaleMode::VIDEO);
        }
        if let Some(webcam) = &parsed.webcam {
            if let Some(snapshot) = &webcam.snapshot {
                next.webcam.snapshot = snapshot.clone();
            }
        }
        *self = next;
        Ok(())
    }

    fn merge_color(&mut self, parsed: &RawFill) -> Result<(), FillError> {
        match &parsed.color {
            Some(RawColor::Hex(hex)) => self.color = Hsva::from_hex(hex)?,
            Some(RawColor::Hsv(hsv)) => hsv.merge_into(&mut self.color),
            None => {}
        }
        if let Some(hsv) = &parsed.hsv {
            hsv.merge_into(&mut self.color);
        }
        // An exact alpha beats the rounded opacity percentage.
        if let Some(alpha) = parsed.alpha {
            self.color.a = alpha.clamp(0.0, 1.0);
        } else if let Some(opacity) = parsed.opacity {
            self.color.a = (opacity / 100.0).clamp(0.0, 1.0);
        }
        Ok(())
    }

    pub fn projection(&self) -> FillProjection {
        match self.kind {
            FillType::Solid => FillProjection::Solid {
                color: self.color.to_hex(),
                alpha: self.color.a,
                opacity: self.color.opacity(),
                hsv: self.color,
            },
            FillType::Gradient => FillProjection::Gradient {
                gradient: self.gradient.clone(),
                css: self.gradient.to_css(),
            },
            FillType::Image => FillProjection::Image {
                image: self.image.clone(),
            },
            FillType::Video => FillProjection::Video {
                video: self.video.clone(),
            },
            FillType::Webcam => FillProjection::Webcam {
                webcam: self.webcam.clone(),
            },
        }
    }

    pub fn to_json(&self) -> String {
        self.projection().to_json()
    }

    pub fn media(&self, kind: FillType) -> Option<&MediaFill> {
        match kind {
            FillType::Image => Some(&self.image),
            FillType::Video => Some(&self.video),
            _ => None,
        }
    }

    pub fn media_mut(&mut self, kind: FillType) -> Option<&mut MediaFill> {
        match kind {
            FillType::Image => Some(&mut self.image),
            FillType::Video => Some(&mut self.video),
            _ => None,
        }
    }

    /// Swatch background for the active kind.
    pub fn chit(&self) -> ChitBackground {
        let cover = |background: String| ChitBackground {
            background,
            size: "cover".to_string(),
            position: "center",
            alpha: None,
        };
        match self.kind {
            FillType::Solid => ChitBackground {
                alpha: Some(self.color.a),
                ..cover(self.color.to_hex())
            },
            FillType::Gradient => cover(self.gradient.to_css()),
            FillType::Image | FillType::Video => {
                let media = if self.kind == FillType::Image {
                    &self.image
                } else {
                    &self.video
                };
                match &media.url {
                    Some(url) => {
                        let (size, position) = media.scale_mode.background_sizing(media.scale);
                        ChitBackground {
                            background: format!("url({url})"),
                            size,
                            position,
                            alpha: None,
                        }
                    }
                    None => cover(String::new()),
                }
            }
            FillType::Webcam => match &self.webcam.snapshot {
                Some(snapshot) => cover(format!("url({snapshot})")),
                None => cover(String::new()),
            },
        }
    }
}

// ── Lenient wire format ─────────────────────────────────────────────

/// A number, or a string holding one (`"50"`, `"50%"`). Anything else is
/// treated as absent so the stored value survives.
fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Distinguishes an explicit `null` (clear) from a missing field (keep).
fn nullable<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(d).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFill {
    #[serde(rename = "type")]
    kind: Option<String>,
    color: Option<RawColor>,
    hsv: Option<RawHsv>,
    #[serde(deserialize_with = "lenient_number")]
    alpha: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    opacity: Option<f64>,
    gradient: Option<RawGradient>,
    image: Option<RawMedia>,
    video: Option<RawMedia>,
    webcam: Option<RawWebcam>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColor {
    Hex(String),
    Hsv(RawHsv),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHsv {
    #[serde(deserialize_with = "lenient_number")]
    h: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    s: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    v: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    a: Option<f64>,
}

impl RawHsv {
    fn merge_into(&self, color: &mut Hsva) {
        *color = Hsva::new(
            self.h.unwrap_or(color.h),
            self.s.unwrap_or(color.s),
            self.v.unwrap_or(color.v),
            self.a.unwrap_or(color.a),
        );
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawGradient {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    angle: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    center_x: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    center_y: Option<f64>,
    stops: Option<Vec<RawStop>>,
}

impl RawGradient {
    fn merge_into(&self, gradient: &mut Gradient) {
        if let Some(kind) = self.kind.as_deref().and_then(parse_gradient_type) {
            gradient.kind = kind;
        }
        if let Some(angle) = self.angle {
            gradient.angle = angle.rem_euclid(360.0);
        }
        gradient.set_center(
            self.center_x.unwrap_or(gradient.center_x),
            self.center_y.unwrap_or(gradient.center_y),
        );
        if let Some(stops) = &self.stops {
            if stops.len() >= MIN_STOPS {
                gradient.stops = stops
                    .iter()
                    .map(|stop| {
                        GradientStop::new(
                            stop.position.unwrap_or(0.0),
                            stop.color.as_deref().unwrap_or(color::FALLBACK_HEX),
                            stop.opacity.unwrap_or(100.0),
                        )
                    })
                    .collect();
                gradient.sort_stops(0);
            } else {
                tracing::warn!(
                    count = stops.len(),
                    "ignoring gradient with fewer than {MIN_STOPS} stops"
                );
            }
        }
    }
}

fn parse_gradient_type(s: &str) -> Option<GradientType> {
    GradientType::ALL
        .into_iter()
        .find(|kind| kind.label().eq_ignore_ascii_case(s.trim()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStop {
    #[serde(deserialize_with = "lenient_number")]
    position: Option<f64>,
    color: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    opacity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMedia {
    #[serde(deserialize_with = "nullable")]
    url: Option<Option<String>>,
    scale_mode: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    scale: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    opacity: Option<f64>,
}

impl RawMedia {
    fn merge_into(&self, media: &mut MediaFill, allowed: &[ScaleMode]) {
        if let Some(url) = &self.url {
            media.url = url.clone();
        }
        if let Some(mode) = self.scale_mode.as_deref().and_then(ScaleMode::parse) {
            media.scale_mode = if allowed.contains(&mode) {
                mode
            } else {
                ScaleMode::Fill
            };
        }
        if let Some(scale) = self.scale {
            media.set_scale(scale);
        }
        if let Some(opacity) = self.opacity {
            media.opacity = opacity.clamp(0.0, 1.0);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWebcam {
    #[serde(deserialize_with = "nullable")]
    snapshot: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_hex_with_alpha() {
        let state = FillState::parse("#FF000080").unwrap();
        assert_eq!(state.kind, FillType::Solid);
        match state.projection() {
            FillProjection::Solid {
                color,
                alpha,
                opacity,
                ..
            } => {
                assert_eq!(color, "#FF0000");
                assert!((alpha - 128.0 / 255.0).abs() < 1e-9);
                assert_eq!(opacity, 50.0);
            }
            other => panic!("expected solid, got {other:?}"),
        }
    }

    #[test]
    fn test_opacity_field_sets_alpha() {
        let state = FillState::parse(r##"{"type":"solid","color":"#00FF00","opacity":25}"##).unwrap();
        assert_eq!(state.color.a, 0.25);
        assert_eq!(state.color.to_hex(), "#00FF00");
    }

    #[test]
    fn test_partial_gradient_merges_over_defaults() {
        let state =
            FillState::parse(r#"{"type":"gradient","gradient":{"type":"radial","centerX":"20"}}"#)
                .unwrap();
        assert_eq!(state.kind, FillType::Gradient);
        assert_eq!(state.gradient.kind, GradientType::Radial);
        assert_eq!(state.gradient.center_x, 20.0);
        assert_eq!(state.gradient.center_y, 50.0);
        assert_eq!(state.gradient.stops.len(), 2);
    }

    #[test]
    fn test_single_stop_gradient_keeps_previous_stops() {
        let state = FillState::parse(
            r##"{"type":"gradient","gradient":{"stops":[{"position":10,"color":"#000000"}]}}"##,
        )
        .unwrap();
        assert_eq!(state.gradient, Gradient::default());
    }

    #[test]
    fn test_stops_are_sorted_and_clamped() {
        let state = FillState::parse(
            r##"{"gradient":{"stops":[
                {"position":150,"color":"#FFFFFF","opacity":"x"},
                {"position":-4,"color":"#000000","opacity":20}
            ]}}"##,
        )
        .unwrap();
        let stops = &state.gradient.stops;
        assert_eq!(stops[0].position, 0.0);
        assert_eq!(stops[0].opacity, 20.0);
        assert_eq!(stops[1].position, 100.0);
        assert_eq!(stops[1].opacity, 100.0);
    }

    #[test]
    fn test_malformed_input_leaves_state_untouched() {
        let mut state = FillState::parse("#123456").unwrap();
        let before = state.clone();
        assert!(state.apply_serialized("{not json").is_err());
        assert!(state.apply_serialized(r#"{"type":"plaid"}"#).is_err());
        assert!(state.apply_serialized("#12345").is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_projection_round_trip() {
        let mut state = FillState::default();
        state.kind = FillType::Gradient;
        state.gradient.add_stop(40.0, "#336699", 70.0);
        state.gradient.angle = 45.0;
        let json = state.to_json();
        let back = FillState::parse(&json).unwrap();
        assert_eq!(back.projection(), state.projection());

        state.kind = FillType::Solid;
        state.color = Hsva::new(210.0, 40.0, 60.0, 0.3);
        let back = FillState::parse(&state.to_json()).unwrap();
        assert_eq!(back.projection(), state.projection());
    }

    #[test]
    fn test_projection_hides_inactive_variants() {
        let mut state = FillState::default();
        state.kind = FillType::Image;
        state.image.url = Some("data:image/png;base64,AAAA".into());
        let json: Value = serde_json::from_str(&state.to_json()).unwrap();
        assert_eq!(json["type"], "image");
        assert!(json.get("gradient").is_none());
        assert!(json.get("color").is_none());
        assert_eq!(json["image"]["scaleMode"], "fill");
    }

    #[test]
    fn test_media_url_null_clears_and_video_rejects_tile() {
        let mut state = FillState::default();
        state.video.url = Some("blob:video".into());
        state
            .apply_serialized(r#"{"type":"video","video":{"url":null,"scaleMode":"tile","scale":900}}"#)
            .unwrap();
        assert_eq!(state.video.url, None);
        assert_eq!(state.video.scale_mode, ScaleMode::Fill);
        assert_eq!(state.video.scale, MAX_SCALE);
    }

    #[test]
    fn test_chit_background() {
        let mut state = FillState::default();
        assert_eq!(state.chit().background, "#D9D9D9");
        assert_eq!(state.chit().alpha, Some(1.0));

        state.kind = FillType::Image;
        assert_eq!(state.chit().background, "");
        state.image.url = Some("a.png".into());
        state.image.scale_mode = ScaleMode::Tile;
        state.image.scale = 25.0;
        let chit = state.chit();
        assert_eq!(chit.background, "url(a.png)");
        assert_eq!(chit.size, "25%");
        assert_eq!(chit.position, "top left");
        assert_eq!(chit.alpha, None);
    }

    #[test]
    fn test_fill_type_from_str() {
        assert_eq!("webcam".parse::<FillType>().unwrap(), FillType::Webcam);
        assert!("".parse::<FillType>().is_err());
    }
}
