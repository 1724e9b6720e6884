//! Sizing, color, and styling constants for the fill picker views.

use floem::peniko::Color;

/// Panel width; the panel height follows its content.
pub const PANEL_WIDTH: f32 = 240.0;

/// Height of the saturation/value square
pub const SV_HEIGHT: f32 = 180.0;

/// 1D slider track height
pub const SLIDER_HEIGHT: f32 = 16.0;

/// Gradient bar height (stop handles hang below the track)
pub const GRADIENT_BAR_HEIGHT: f32 = 28.0;

/// Angle dial diameter
pub const DIAL_SIZE: f32 = 28.0;

/// Cursor circle radius on the 2D square
pub const CURSOR_RADIUS: f64 = 6.0;

/// Thumb radius on 1D sliders and the inset that keeps it inside the track
pub const THUMB_RADIUS: f64 = 7.0;

/// Half width of a gradient stop handle, also its hit radius
pub const STOP_HANDLE: f64 = 6.0;

/// Border radius for tracks and swatches
pub const RADIUS: f32 = 4.0;

/// Gap between picker rows
pub const GAP: f32 = 8.0;

/// Padding around panel content
pub const PADDING: f32 = 12.0;

/// Header height; the header doubles as the panel drag handle
pub const HEADER_HEIGHT: f32 = 36.0;

/// Trigger chit size
pub const CHIT_SIZE: f32 = 24.0;

/// Numeric input width
pub const INPUT_WIDTH: f32 = 36.0;

/// Hex input field width
pub const HEX_INPUT_WIDTH: f32 = 72.0;

/// Input font size
pub const INPUT_FONT: f32 = 11.0;

/// Label font size
pub const LABEL_FONT: f32 = 10.0;

/// Checkerboard cell size (for alpha backgrounds)
pub const CHECKER_CELL: f64 = 4.0;

pub const PANEL_BG: Color = Color::rgb8(250, 250, 250);
pub const BORDER: Color = Color::rgb8(200, 200, 200);
pub const MUTED: Color = Color::rgb8(120, 120, 120);
pub const HOVER: Color = Color::rgb8(230, 230, 230);
pub const ACCENT: Color = Color::rgb8(13, 153, 255);
pub const OUTLINE: Color = Color::rgba8(0, 0, 0, 40);
pub const SHADOW: Color = Color::rgba8(0, 0, 0, 80);
