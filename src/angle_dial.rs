//! Circular angle control for linear and angular gradients.
//! Dragging anywhere on the dial points it at the pointer; Shift snaps.

use floem::kurbo::{Circle, Line, Rect, Stroke};
use floem::peniko::Color;
use floem::reactive::create_effect;
use floem::views::Decorators;
use floem::{
    context::{ComputeLayoutCx, EventCx, PaintCx, UpdateCx},
    event::{Event, EventPropagation},
    View, ViewId,
};
use floem_renderer::Renderer;

use crate::constants;
use crate::picker::FillPicker;
use crate::surface::{AngleDial, DragOutcome, DragTracker, PointerId, PointerSample};

struct AngleUpdate(f64);

pub(crate) struct AngleDialView {
    id: ViewId,
    picker: FillPicker,
    tracker: DragTracker<AngleDial>,
    degrees: f64,
    size: floem::taffy::prelude::Size<f32>,
}

pub(crate) fn angle_dial(picker: FillPicker) -> AngleDialView {
    let id = ViewId::new();

    let source = picker.clone();
    create_effect(move |_| {
        let degrees = source.read(|c| c.state().gradient.picker_angle());
        id.update_state(AngleUpdate(degrees));
    });

    AngleDialView {
        id,
        degrees: picker.read_untracked(|c| c.state().gradient.picker_angle()),
        picker,
        tracker: DragTracker::new(AngleDial::default()),
        size: Default::default(),
    }
    .style(|s| {
        s.size(constants::DIAL_SIZE, constants::DIAL_SIZE)
            .cursor(floem::style::CursorStyle::Pointer)
    })
}

impl AngleDialView {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width as f64, self.size.height as f64)
    }
}

impl View for AngleDialView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn update(&mut self, _cx: &mut UpdateCx, state: Box<dyn std::any::Any>) {
        if let Ok(update) = state.downcast::<AngleUpdate>() {
            self.degrees = update.0;
            self.id.request_layout();
        }
    }

    fn event_before_children(&mut self, cx: &mut EventCx, event: &Event) -> EventPropagation {
        let bounds = self.bounds();
        let outcome = match event {
            Event::PointerDown(e) => {
                let sample = PointerSample::new(e.pos).with_modifiers(e.modifiers);
                let outcome = self.tracker.pointer_down(sample, bounds);
                if outcome.value().is_some() {
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
        if matches!(outcome, DragOutcome::Ignored) {
            return EventPropagation::Continue;
        }
        self.picker
            .update(|c| c.apply_drag(outcome, |c, degrees| c.set_gradient_angle(degrees)));
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
        let center = bounds.center();
        let radius = bounds.width().min(bounds.height()) / 2.0 - 1.0;
        let rim = Circle::new(center, radius);
        cx.fill(&rim, Color::WHITE, 0.0);
        cx.stroke(&rim, constants::BORDER, &Stroke::new(1.0));

        let inner = bounds.inset(-4.0);
        let tip = AngleDial::handle_position(self.degrees, inner);
        cx.stroke(&Line::new(center, tip), constants::MUTED, &Stroke::new(1.5));
        cx.fill(&Circle::new(tip, 2.5), constants::ACCENT, 0.0);
    }
}
