//! Gradient preview bar with draggable stop handles.
//!
//! Pressing on a handle selects that stop and drags it; pressing on empty
//! track inserts a stop there (colored like the gradient at that point) and
//! drags the new one. Stops keep their indices while dragging and are
//! re-sorted when the drag is committed.

use std::sync::Arc;

use floem::kurbo::{Rect, Stroke};
use floem::peniko::{self, Blob, Color};
use floem::reactive::create_effect;
use floem::views::Decorators;
use floem::{
    context::{ComputeLayoutCx, EventCx, PaintCx, UpdateCx},
    event::{Event, EventPropagation},
    View, ViewId,
};
use floem_renderer::Renderer;

use crate::checkerboard;
use crate::constants;
use crate::gradient::Gradient;
use crate::picker::FillPicker;
use crate::surface::{self, DragOutcome, DragTracker, LinearSlider, PointerId, PointerSample};

const TRACK_HEIGHT: f64 = 16.0;

/// Rasterize the gradient's colors left to right, with stop opacity in the
/// alpha channel. Angle and shape are ignored: the bar is always linear.
pub(crate) fn rasterize_gradient(gradient: &Gradient, width: u32, height: u32) -> Vec<u8> {
    let mut buf = vec![0u8; (width * height * 4) as usize];
    for px in 0..width {
        let position = px as f64 / (width - 1).max(1) as f64 * 100.0;
        let (rgb, opacity) = gradient.color_at(position);
        let rgba = [
            rgb.r,
            rgb.g,
            rgb.b,
            (opacity / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8,
        ];
        for py in 0..height {
            let offset = ((py * width + px) * 4) as usize;
            buf[offset..offset + 4].copy_from_slice(&rgba);
        }
    }
    buf
}

struct BarUpdate {
    gradient: Gradient,
    selected: usize,
}

pub(crate) struct GradientBar {
    id: ViewId,
    picker: FillPicker,
    tracker: DragTracker<LinearSlider>,
    dragging: Option<usize>,
    gradient: Gradient,
    selected: usize,
    size: floem::taffy::prelude::Size<f32>,
    img: Option<peniko::Image>,
    img_hash: Vec<u8>,
    cached: (String, u32, u32),
}

pub(crate) fn gradient_bar(picker: FillPicker) -> GradientBar {
    let id = ViewId::new();

    let source = picker.clone();
    create_effect(move |_| {
        let update = source.read(|c| BarUpdate {
            gradient: c.state().gradient.clone(),
            selected: c.selected_stop(),
        });
        id.update_state(update);
    });

    let (gradient, selected) =
        picker.read_untracked(|c| (c.state().gradient.clone(), c.selected_stop()));
    GradientBar {
        id,
        picker,
        tracker: DragTracker::new(LinearSlider::stop_track().with_inset(constants::STOP_HANDLE)),
        dragging: None,
        gradient,
        selected,
        size: Default::default(),
        img: None,
        img_hash: Vec::new(),
        cached: (String::new(), 0, 0),
    }
    .style(|s| {
        s.width_full()
            .height(constants::GRADIENT_BAR_HEIGHT)
            .cursor(floem::style::CursorStyle::Pointer)
    })
}

impl GradientBar {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width as f64, self.size.height as f64)
    }

    fn track_rect(&self) -> Rect {
        let b = self.bounds();
        Rect::new(
            b.x0 + constants::STOP_HANDLE,
            0.0,
            b.x1 - constants::STOP_HANDLE,
            TRACK_HEIGHT.min(b.height()),
        )
    }

    /// Select the stop under `x`, or insert one there. Returns its index.
    fn grab(&mut self, x: f64) -> usize {
        let bounds = self.bounds();
        let track = *self.tracker.surface();
        let hit = surface::hit_test_stop(
            &self.gradient.stops,
            x,
            &track,
            bounds,
            constants::STOP_HANDLE,
        );
        match hit {
            Some(index) => {
                self.picker.update(|c| c.select_stop(index));
                index
            }
            None => {
                let position = track.value_at_x(x, bounds);
                self.picker.update(|c| c.add_stop_at(position))
            }
        }
    }

    fn ensure_image(&mut self, scale: f64) {
        let track = self.track_rect();
        let pw = (track.width() * scale.max(1.0)).round() as u32;
        let ph = (track.height() * scale.max(1.0)).round() as u32;
        if pw == 0 || ph == 0 {
            return;
        }
        let css = self.gradient.to_css();
        if self.cached.0 == css && (self.cached.1, self.cached.2) == (pw, ph) {
            return;
        }
        let blob = Blob::new(Arc::new(rasterize_gradient(&self.gradient, pw, ph)));
        self.img_hash = blob.id().to_le_bytes().to_vec();
        self.img = Some(peniko::Image::new(blob, peniko::Format::Rgba8, pw, ph));
        self.cached = (css, pw, ph);
    }
}

impl View for GradientBar {
    fn id(&self) -> ViewId {
        self.id
    }

    fn update(&mut self, _cx: &mut UpdateCx, state: Box<dyn std::any::Any>) {
        if let Ok(update) = state.downcast::<BarUpdate>() {
            self.gradient = update.gradient;
            self.selected = update.selected;
            self.id.request_layout();
        }
    }

    fn event_before_children(&mut self, cx: &mut EventCx, event: &Event) -> EventPropagation {
        let bounds = self.bounds();
        let outcome = match event {
            Event::PointerDown(e) => {
                if self.tracker.is_dragging() || bounds.is_zero_area() {
                    return EventPropagation::Continue;
                }
                let index = self.grab(e.pos.x);
                let sample = PointerSample::new(e.pos).with_modifiers(e.modifiers);
                let outcome = self.tracker.pointer_down(sample, bounds);
                if outcome.value().is_some() {
                    self.dragging = Some(index);
                    cx.update_active(self.id());
                }
                outcome
            }
            Event::PointerMove(e) => self.tracker.pointer_move(
                PointerSample::new(e.pos).with_modifiers(e.modifiers),
                bounds,
            ),
            Event::PointerUp(_) => self.tracker.pointer_up(PointerId::PRIMARY),
            Event::FocusLost => self.tracker.cancel(),
            _ => return EventPropagation::Continue,
        };
        let Some(index) = self.dragging else {
            return EventPropagation::Continue;
        };
        if matches!(outcome, DragOutcome::Ignored) {
            return EventPropagation::Continue;
        }
        if !self.tracker.is_dragging() {
            self.dragging = None;
        }
        self.picker
            .update(|c| c.apply_drag(outcome, |c, position| c.drag_stop(index, position)));
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
        let track = self.track_rect();
        let rrect = track.to_rounded_rect(constants::RADIUS as f64);

        cx.save();
        cx.clip(&rrect);
        checkerboard::paint_checkerboard(cx, track);
        self.ensure_image(cx.scale());
        if let Some(ref img) = self.img {
            cx.draw_img(
                floem_renderer::Img {
                    img: img.clone(),
                    hash: &self.img_hash,
                },
                track,
            );
        }
        cx.restore();
        cx.stroke(&rrect, constants::OUTLINE, &Stroke::new(1.0));

        let surface = *self.tracker.surface();
        for (i, stop) in self.gradient.stops.iter().enumerate() {
            let x = surface.thumb_x(stop.position, bounds);
            let handle = Rect::new(
                x - constants::STOP_HANDLE,
                TRACK_HEIGHT - 2.0,
                x + constants::STOP_HANDLE,
                bounds.y1,
            )
            .to_rounded_rect(2.0);
            let rgb = crate::color::parse_hex(&stop.color)
                .map(|c| c.rgb())
                .unwrap_or(crate::color::Rgb::new(0xD9, 0xD9, 0xD9));
            cx.fill(&handle, Color::rgb8(rgb.r, rgb.g, rgb.b), 0.0);
            let (ring, width) = if i == self.selected {
                (constants::ACCENT, 2.0)
            } else {
                (Color::WHITE, 1.5)
            };
            cx.stroke(&handle, ring, &Stroke::new(width));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::GradientStop;

    #[test]
    fn test_raster_follows_stops() {
        let gradient = Gradient {
            stops: vec![
                GradientStop::new(0.0, "#000000", 0.0),
                GradientStop::new(100.0, "#FFFFFF", 100.0),
            ],
            ..Gradient::default()
        };
        let buf = rasterize_gradient(&gradient, 3, 1);
        assert_eq!(&buf[0..4], &[0, 0, 0, 0]);
        assert_eq!(&buf[4..8], &[128, 128, 128, 128]);
        assert_eq!(&buf[8..12], &[255, 255, 255, 255]);
    }
}
