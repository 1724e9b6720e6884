//! Saturation/value square for the solid tab.
//!
//! Saturation grows to the right, value grows upward. The square for the
//! current hue is rasterized to an RGBA8 pixel buffer and only redrawn when
//! the hue or the physical size changes.

use std::sync::Arc;

use floem::kurbo::{Circle, Rect, Stroke};
use floem::peniko::{self, Blob, Color};
use floem::reactive::create_effect;
use floem::views::Decorators;
use floem::{
    context::{ComputeLayoutCx, EventCx, PaintCx, UpdateCx},
    event::{Event, EventPropagation},
    View, ViewId,
};
use floem_renderer::Renderer;

use crate::color::Hsva;
use crate::constants;
use crate::math;
use crate::picker::FillPicker;
use crate::surface::{DragOutcome, DragTracker, PointerId, PointerSample, SvSquare};

/// Rasterize the square for `hue` (0–360).
fn rasterize_square(width: u32, height: u32, hue: f64) -> Vec<u8> {
    let mut buf = vec![0u8; (width * height * 4) as usize];
    let h = hue / 360.0;
    let max_x = (width - 1).max(1) as f64;
    let max_y = (height - 1).max(1) as f64;
    for py in 0..height {
        let v = 1.0 - py as f64 / max_y;
        let row = (py * width * 4) as usize;
        for px in 0..width {
            let s = px as f64 / max_x;
            let (r, g, b) = math::hsv_to_rgb(h, s, v);
            let offset = row + (px * 4) as usize;
            buf[offset] = (r * 255.0 + 0.5) as u8;
            buf[offset + 1] = (g * 255.0 + 0.5) as u8;
            buf[offset + 2] = (b * 255.0 + 0.5) as u8;
            buf[offset + 3] = 255;
        }
    }
    buf
}

struct ColorUpdate(Hsva);

pub(crate) struct SvSquareView {
    id: ViewId,
    picker: FillPicker,
    tracker: DragTracker<SvSquare>,
    color: Hsva,
    size: floem::taffy::prelude::Size<f32>,
    img: Option<peniko::Image>,
    img_hash: Vec<u8>,
    cached: (u32, u32, u32),
}

pub(crate) fn sv_square(picker: FillPicker) -> SvSquareView {
    let id = ViewId::new();

    let source = picker.clone();
    create_effect(move |_| {
        let color = source.read(|c| c.color());
        id.update_state(ColorUpdate(color));
    });

    SvSquareView {
        id,
        color: picker.read_untracked(|c| c.color()),
        picker,
        tracker: DragTracker::new(SvSquare),
        size: Default::default(),
        img: None,
        img_hash: Vec::new(),
        cached: (u32::MAX, 0, 0),
    }
    .style(|s| {
        s.width_full()
            .height(constants::SV_HEIGHT)
            .border_radius(constants::RADIUS)
            .cursor(floem::style::CursorStyle::Default)
    })
}

impl SvSquareView {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width as f64, self.size.height as f64)
    }

    fn ensure_image(&mut self, scale: f64) {
        let pw = (self.size.width as f64 * scale.max(1.0)).round() as u32;
        let ph = (self.size.height as f64 * scale.max(1.0)).round() as u32;
        if pw == 0 || ph == 0 {
            return;
        }
        let key = (self.color.h.round() as u32, pw, ph);
        if self.cached == key {
            return;
        }
        let pixels = rasterize_square(pw, ph, self.color.h);
        let blob = Blob::new(Arc::new(pixels));
        self.img_hash = blob.id().to_le_bytes().to_vec();
        self.img = Some(peniko::Image::new(blob, peniko::Format::Rgba8, pw, ph));
        self.cached = key;
    }
}

impl View for SvSquareView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn update(&mut self, _cx: &mut UpdateCx, state: Box<dyn std::any::Any>) {
        if let Ok(update) = state.downcast::<ColorUpdate>() {
            self.color = update.0;
            self.id.request_layout();
        }
    }

    fn event_before_children(&mut self, cx: &mut EventCx, event: &Event) -> EventPropagation {
        let bounds = self.bounds();
        let outcome = match event {
            Event::PointerDown(e) => {
                let outcome = self
                    .tracker
                    .pointer_down(PointerSample::new(e.pos).with_modifiers(e.modifiers), bounds);
                if outcome.value().is_some() {
                    cx.update_active(self.id());
                }
                outcome
            }
            Event::PointerMove(e) => self
                .tracker
                .pointer_move(PointerSample::new(e.pos).with_modifiers(e.modifiers), bounds),
            Event::PointerUp(_) => self.tracker.pointer_up(PointerId::PRIMARY),
            Event::FocusLost => self.tracker.cancel(),
            _ => return EventPropagation::Continue,
        };
        if matches!(outcome, DragOutcome::Ignored) {
            return EventPropagation::Continue;
        }
        self.picker
            .update(|c| c.apply_drag(outcome, |c, (s, v)| c.set_saturation_value(s, v)));
        EventPropagation::Stop
    }

    fn compute_layout(&mut self, _cx: &mut ComputeLayoutCx) -> Option<Rect> {
        let layout = self.id.get_layout().unwrap_or_default();
        self.size = layout.size;
        None
    }

    fn paint(&mut self, cx: &mut PaintCx) {
        let bounds = self.bounds();
        if bounds.is_zero_area() {
            return;
        }
        let rrect = bounds.to_rounded_rect(constants::RADIUS as f64);

        cx.save();
        cx.clip(&rrect);
        self.ensure_image(cx.scale());
        if let Some(ref img) = self.img {
            cx.draw_img(
                floem_renderer::Img {
                    img: img.clone(),
                    hash: &self.img_hash,
                },
                bounds,
            );
        }
        cx.restore();
        cx.stroke(&rrect, constants::OUTLINE, &Stroke::new(1.0));

        let handle = SvSquare::handle_position(self.color.s, self.color.v, bounds);
        let rgb = self.color.rgb();
        let cursor = Circle::new(handle, constants::CURSOR_RADIUS);
        cx.fill(&cursor, Color::rgb8(rgb.r, rgb.g, rgb.b), 0.0);
        cx.stroke(
            &Circle::new(handle, constants::CURSOR_RADIUS + 1.0),
            constants::SHADOW,
            &Stroke::new(1.0),
        );
        cx.stroke(&cursor, Color::WHITE, &Stroke::new(2.0));
    }
}
