//! # floem-fill
//!
//! A fill picker widget for [Floem](https://github.com/lapce/floem).
//!
//! One control edits a *fill*: a solid color, a linear/radial/angular
//! gradient, an image, a video or a webcam snapshot. The picker keeps the
//! state of every fill kind while you switch between them and reports only
//! the active one.
//!
//! The engine ([`FillPickerController`] and the types it works on) is plain
//! Rust with no windowing; the views on top of it talk to it through a
//! [`FillPicker`] handle.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use floem::prelude::*;
//! use floem_fill::{fill_dialog, FillPicker, PickerConfig};
//!
//! let picker = FillPicker::new(PickerConfig::default()).with_value("#3B82F6");
//! picker.on_change(|fill| println!("{}", fill.to_json()));
//! // Use `fill_dialog(picker)` in your Floem view tree.
//! ```

mod angle_dial;
mod checkerboard;
mod color;
mod config;
mod constants;
mod controller;
mod dialog;
mod error;
#[cfg(all(feature = "eyedropper", target_os = "macos"))]
mod eyedropper;
mod fill;
mod gradient;
mod gradient_bar;
mod inputs;
mod math;
mod media;
mod picker;
mod placement;
mod slider;
mod surface;
mod sv_square;

pub use color::{
    hex_to_hsv, hsv_to_hex, hsv_to_rgb, normalize_hex, parse_color, parse_color_string, parse_hex,
    rgb_alpha_to_hex, rgb_to_hsv, rgba_css, Hsv, Hsva, Rgb, Rgba, FALLBACK_HEX,
};
pub use config::PickerConfig;
pub use controller::{FillPickerController, PickerEvent};
pub use error::{CaptureError, FillError};
pub use fill::{
    ChitBackground, FillProjection, FillState, FillType, MediaFill, ScaleMode, WebcamFill,
};
pub use gradient::{Gradient, GradientStop, GradientType, MIN_STOPS};
pub use media::{
    CameraDevice, CameraProvider, CaptureStream, HostResource, ResourceGuard, WebcamSession,
    WebcamStatus,
};
pub use picker::FillPicker;
pub use placement::{compute_position, PanelPlacement, PlacementOptions};
pub use surface::{
    hit_test_stop, AngleDial, DragOutcome, DragTracker, KeyModifiers, LinearSlider,
    PickingSurface, PointerId, PointerSample, SvSquare,
};

use std::sync::Once;

use floem::prelude::*;
use floem::text::FONT_SYSTEM;

static LOAD_LUCIDE_FONT: Once = Once::new();

fn load_fonts() {
    LOAD_LUCIDE_FONT.call_once(|| {
        FONT_SYSTEM
            .lock()
            .db_mut()
            .load_font_data(lucide_icons::LUCIDE_FONT_BYTES.to_vec());
    });
}

/// The picker panel on its own, for embedding inline.
///
/// Edits go through `picker`; register `on_input` / `on_change` on it to
/// observe them.
pub fn fill_picker(picker: FillPicker) -> impl IntoView {
    load_fonts();
    picker::panel(&picker)
}

/// A swatch that opens the picker panel as a floating dialog.
///
/// The returned view fills its parent: the panel is positioned inside it and
/// kept within its bounds. Closing the panel (the swatch again, the close
/// button or Escape) commits the edit and fires `on_change` once.
pub fn fill_dialog(picker: FillPicker) -> impl IntoView {
    load_fonts();
    dialog::dialog(&picker)
}
