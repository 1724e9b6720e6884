//! Screen color sampling on macOS through `NSColorSampler`.
//!
//! The sampler is asynchronous: macOS shows its magnifier overlay and calls
//! back once the user clicks a pixel, or never if they press Esc.

use std::cell::Cell;

use block2::RcBlock;
use objc2::rc::{Allocated, Id};
use objc2::runtime::{AnyClass, AnyObject};
use objc2::{msg_send, msg_send_id};

use floem::prelude::*;

use crate::color::Rgb;
use crate::inputs::icon_button;
use crate::picker::FillPicker;

/// Start the system sampler. `on_pick` receives the sampled pixel in sRGB;
/// the sampled alpha is ignored. Must run on the main thread.
fn sample_color(on_pick: impl FnOnce(Rgb) + 'static) {
    let Some(cls) = AnyClass::get("NSColorSampler") else {
        tracing::warn!("NSColorSampler unavailable");
        return;
    };

    let sampler: Allocated<AnyObject> = unsafe { msg_send_id![cls, alloc] };
    let sampler: Id<AnyObject> = unsafe { msg_send_id![sampler, init] };

    let callback: Cell<Option<Box<dyn FnOnce(Rgb)>>> = Cell::new(Some(Box::new(on_pick)));

    let block = RcBlock::new(move |color_ptr: *mut AnyObject| {
        if color_ptr.is_null() {
            tracing::debug!("eyedropper cancelled");
            return;
        }
        let Some(space_cls) = AnyClass::get("NSColorSpace") else {
            return;
        };
        unsafe {
            let srgb: *const AnyObject = msg_send![space_cls, sRGBColorSpace];
            if srgb.is_null() {
                return;
            }
            let srgb_color: *const AnyObject =
                msg_send![&*color_ptr, colorUsingColorSpace: &*srgb];
            if srgb_color.is_null() {
                return;
            }
            let (mut r, mut g, mut b, mut a) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
            let _: () = msg_send![
                &*srgb_color,
                getRed: &mut r,
                green: &mut g,
                blue: &mut b,
                alpha: &mut a
            ];
            if let Some(pick) = callback.take() {
                pick(Rgb::from_f64(r * 255.0, g * 255.0, b * 255.0));
            }
        }
    });

    unsafe {
        let _: () = msg_send![&*sampler, showSamplerWithSelectionHandler: &*block];
    }
}

/// Samples a screen pixel into the solid color, keeping its alpha. A pick
/// is a complete edit: it commits immediately.
pub(crate) fn eyedropper_button(picker: FillPicker) -> impl IntoView {
    icon_button(lucide_icons::Icon::Pipette, || true, move || {
        let picker = picker.clone();
        sample_color(move |rgb| {
            picker.update(|c| {
                c.pick_color(rgb);
                c.commit();
            });
        });
    })
}
