//! Horizontal 1D sliders: hue and opacity.
//!
//! The hue track is rasterized once per physical size. The opacity track
//! paints a checkerboard and a transparent-to-opaque gradient of the current
//! color on top of it; the gradient goes through a path so the vello
//! renderer takes its general fill route.

use std::sync::Arc;

use floem::kurbo::{Circle, Rect, Shape, Stroke};
use floem::peniko::{self, Blob, Color, Gradient};
use floem::reactive::create_effect;
use floem::views::Decorators;
use floem::{
    context::{ComputeLayoutCx, EventCx, PaintCx, UpdateCx},
    event::{Event, EventPropagation},
    View, ViewId,
};
use floem_renderer::Renderer;

use crate::checkerboard;
use crate::color::{Hsva, Rgb};
use crate::constants;
use crate::controller::FillPickerController;
use crate::math;
use crate::picker::FillPicker;
use crate::surface::{DragOutcome, DragTracker, LinearSlider, PointerId, PointerSample};

/// Rasterize the hue spectrum left to right.
fn rasterize_hue(width: u32, height: u32) -> Vec<u8> {
    let mut buf = vec![0u8; (width * height * 4) as usize];
    for px in 0..width {
        let t = px as f64 / (width - 1).max(1) as f64;
        let (r, g, b) = math::hsv_to_rgb(t, 1.0, 1.0);
        let rgba = [
            (r * 255.0 + 0.5) as u8,
            (g * 255.0 + 0.5) as u8,
            (b * 255.0 + 0.5) as u8,
            255,
        ];
        for py in 0..height {
            let offset = ((py * width + px) * 4) as usize;
            buf[offset..offset + 4].copy_from_slice(&rgba);
        }
    }
    buf
}

#[derive(Clone, Copy, PartialEq)]
enum Track {
    Hue,
    Opacity(Rgb),
}

struct SliderUpdate {
    value: f64,
    track: Track,
}

type Edit = fn(&mut FillPickerController, f64);

pub(crate) struct Slider {
    id: ViewId,
    picker: FillPicker,
    tracker: DragTracker<LinearSlider>,
    edit: Edit,
    value: f64,
    track: Track,
    size: floem::taffy::prelude::Size<f32>,
    img: Option<peniko::Image>,
    img_hash: Vec<u8>,
    cached_dims: (u32, u32),
}

fn slider(
    picker: FillPicker,
    surface: LinearSlider,
    read: fn(&Hsva) -> SliderUpdate,
    edit: Edit,
) -> Slider {
    let id = ViewId::new();

    let source = picker.clone();
    create_effect(move |_| {
        let update = source.read(|c| read(&c.color()));
        id.update_state(update);
    });

    let initial = picker.read_untracked(|c| read(&c.color()));
    Slider {
        id,
        picker,
        tracker: DragTracker::new(surface.with_inset(constants::THUMB_RADIUS)),
        edit,
        value: initial.value,
        track: initial.track,
        size: Default::default(),
        img: None,
        img_hash: Vec::new(),
        cached_dims: (0, 0),
    }
    .style(|s| {
        s.width_full()
            .height(constants::SLIDER_HEIGHT)
            .border_radius(constants::THUMB_RADIUS as f32)
            .cursor(floem::style::CursorStyle::Pointer)
    })
}

/// Hue, 0–360.
pub(crate) fn hue_slider(picker: FillPicker) -> Slider {
    slider(
        picker,
        LinearSlider::hue(),
        |color| SliderUpdate {
            value: color.h,
            track: Track::Hue,
        },
        |c, h| c.set_hue(h),
    )
}

/// Opacity of the solid color, 0–100.
pub(crate) fn opacity_slider(picker: FillPicker) -> Slider {
    slider(
        picker,
        LinearSlider::opacity(),
        |color| SliderUpdate {
            value: color.a * 100.0,
            track: Track::Opacity(color.rgb()),
        },
        |c, opacity| c.set_opacity(opacity),
    )
}

impl Slider {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width as f64, self.size.height as f64)
    }

    fn ensure_hue_image(&mut self, scale: f64) {
        let pw = (self.size.width as f64 * scale.max(1.0)).round() as u32;
        let ph = (self.size.height as f64 * scale.max(1.0)).round() as u32;
        if pw == 0 || ph == 0 || self.cached_dims == (pw, ph) {
            return;
        }
        let blob = Blob::new(Arc::new(rasterize_hue(pw, ph)));
        self.img_hash = blob.id().to_le_bytes().to_vec();
        self.img = Some(peniko::Image::new(blob, peniko::Format::Rgba8, pw, ph));
        self.cached_dims = (pw, ph);
    }

    fn sample(&self, pos: floem::kurbo::Point, modifiers: floem::keyboard::Modifiers) -> PointerSample {
        PointerSample::new(pos).with_modifiers(modifiers)
    }
}

impl View for Slider {
    fn id(&self) -> ViewId {
        self.id
    }

    fn update(&mut self, _cx: &mut UpdateCx, state: Box<dyn std::any::Any>) {
        if let Ok(update) = state.downcast::<SliderUpdate>() {
            self.value = update.value;
            self.track = update.track;
            self.id.request_layout();
        }
    }

    fn event_before_children(&mut self, cx: &mut EventCx, event: &Event) -> EventPropagation {
        let bounds = self.bounds();
        let outcome = match event {
            Event::PointerDown(e) => {
                let sample = self.sample(e.pos, e.modifiers);
                let outcome = self.tracker.pointer_down(sample, bounds);
                if outcome.value().is_some() {
                    cx.update_active(self.id());
                }
                outcome
            }
            Event::PointerMove(e) => {
                let sample = self.sample(e.pos, e.modifiers);
                self.tracker.pointer_move(sample, bounds)
            }
            Event::PointerUp(_) => self.tracker.pointer_up(PointerId::PRIMARY),
            Event::FocusLost => self.tracker.cancel(),
            _ => return EventPropagation::Continue,
        };
        if matches!(outcome, DragOutcome::Ignored) {
            return EventPropagation::Continue;
        }
        let edit = self.edit;
        self.picker.update(|c| c.apply_drag(outcome, edit));
        EventPropagation::Stop
    }

    fn compute_layout(&mut self, _cx: &mut ComputeLayoutCx) -> Option<Rect> {
        let layout = self.id.get_layout().unwrap_or_default();
        self.size = layout.size;
        None
    }

    fn paint(&mut self, cx: &mut PaintCx) {
        let rect = self.bounds();
        if rect.is_zero_area() {
            return;
        }
        let (w, h) = (rect.width(), rect.height());
        let rrect = rect.to_rounded_rect(constants::THUMB_RADIUS);

        cx.save();
        cx.clip(&rrect);
        match self.track {
            Track::Hue => {
                self.ensure_hue_image(cx.scale());
                if let Some(ref img) = self.img {
                    cx.draw_img(
                        floem_renderer::Img {
                            img: img.clone(),
                            hash: &self.img_hash,
                        },
                        rect,
                    );
                }
            }
            Track::Opacity(rgb) => {
                checkerboard::paint_checkerboard(cx, rect);
                let transparent = Color::rgba8(rgb.r, rgb.g, rgb.b, 0);
                let solid = Color::rgb8(rgb.r, rgb.g, rgb.b);
                let gradient = Gradient::new_linear((0.0, h / 2.0), (w, h / 2.0))
                    .with_stops([transparent, solid]);
                cx.fill(&rect.to_path(0.1), &gradient, 0.0);
            }
        }
        cx.restore();

        cx.stroke(&rrect, constants::OUTLINE, &Stroke::new(1.0));

        let radius = constants::THUMB_RADIUS;
        let thumb = (self.tracker.surface().thumb_x(self.value, rect), h / 2.0);
        cx.stroke(&Circle::new(thumb, radius), constants::SHADOW, &Stroke::new(1.0));
        cx.stroke(&Circle::new(thumb, radius - 1.5), Color::WHITE, &Stroke::new(2.0));
        cx.stroke(&Circle::new(thumb, radius - 3.0), constants::SHADOW, &Stroke::new(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_raster_ends_red() {
        let buf = rasterize_hue(7, 2);
        assert_eq!(&buf[0..4], &[255, 0, 0, 255]);
        assert_eq!(&buf[6 * 4..7 * 4], &[255, 0, 0, 255]);
        // Second row repeats the first.
        assert_eq!(&buf[7 * 4..8 * 4], &[255, 0, 0, 255]);
        // One third of the way is green.
        assert_eq!(&buf[2 * 4..3 * 4], &[0, 255, 0, 255]);
    }
}
