//! Picking surfaces: controls that turn a pointer position into a model
//! parameter, and the drag state machine shared by all of them.
//!
//! A surface is pure geometry ([`PickingSurface::value_at`]). The
//! [`DragTracker`] wrapped around it owns the pointer capture for one drag
//! and reports each pointer event as a [`DragOutcome`]: `Input` for live
//! ticks, exactly one `Change` on release, `Cancelled` on interruption.
//! Bounds are passed in on every event, so a control that is resized
//! mid-drag picks up its new geometry on the next move.

use std::fmt;

use floem::kurbo::{Point, Rect};

use crate::gradient::GradientStop;
use crate::math;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

impl PointerId {
    pub const PRIMARY: PointerId = PointerId(0);
}

/// Modifier keys as they were when the event was dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub alt: bool,
}

impl From<floem::keyboard::Modifiers> for KeyModifiers {
    fn from(modifiers: floem::keyboard::Modifiers) -> Self {
        Self {
            shift: modifiers.shift(),
            alt: modifiers.alt(),
        }
    }
}

/// One pointer event, in the same coordinate space as the surface bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer: PointerId,
    pub pos: Point,
    pub modifiers: KeyModifiers,
}

impl PointerSample {
    pub fn new(pos: impl Into<Point>) -> Self {
        Self {
            pointer: PointerId::PRIMARY,
            pos: pos.into(),
            modifiers: KeyModifiers::default(),
        }
    }

    pub fn with_pointer(mut self, pointer: PointerId) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.modifiers.shift = shift;
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl Into<KeyModifiers>) -> Self {
        self.modifiers = modifiers.into();
        self
    }
}

pub trait PickingSurface {
    type Value: Copy + PartialEq + fmt::Debug;

    /// Map a pointer position to a value. Positions outside `bounds` clamp
    /// to the nearest edge.
    fn value_at(&self, pos: Point, bounds: Rect, modifiers: KeyModifiers) -> Self::Value;
}

/// The 2D saturation (x) / value (y) square.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvSquare;

impl SvSquare {
    /// Where the handle sits for a given saturation/value.
    pub fn handle_position(s: f64, v: f64, bounds: Rect) -> Point {
        Point::new(
            bounds.x0 + s / 100.0 * bounds.width(),
            bounds.y0 + (100.0 - v) / 100.0 * bounds.height(),
        )
    }
}

impl PickingSurface for SvSquare {
    type Value = (f64, f64);

    fn value_at(&self, pos: Point, bounds: Rect, _modifiers: KeyModifiers) -> (f64, f64) {
        let (w, h) = (bounds.width(), bounds.height());
        if w <= 0.0 || h <= 0.0 {
            return (0.0, 0.0);
        }
        let x = (pos.x - bounds.x0).clamp(0.0, w);
        let y = (pos.y - bounds.y0).clamp(0.0, h);
        let s = (x / w * 100.0).clamp(0.0, 100.0);
        let v = (100.0 - y / h * 100.0).clamp(0.0, 100.0);
        (s, v)
    }
}

/// A horizontal 1D control mapping x linearly onto `min..=max`.
///
/// `inset` keeps the thumb fully inside the track: the usable length is
/// the width minus `inset` on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSlider {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
    pub inset: f64,
    pub reversed: bool,
}

impl LinearSlider {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: None,
            inset: 0.0,
            reversed: false,
        }
    }

    pub fn hue() -> Self {
        Self::new(0.0, 360.0).with_step(1.0)
    }

    pub fn opacity() -> Self {
        Self::new(0.0, 100.0).with_step(0.1)
    }

    /// Gradient stop positions, in percent.
    pub fn stop_track() -> Self {
        Self::new(0.0, 100.0)
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_inset(mut self, inset: f64) -> Self {
        self.inset = inset;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    fn usable(&self, bounds: Rect) -> f64 {
        bounds.width() - 2.0 * self.inset
    }

    /// Value under a horizontal position, ignoring the vertical axis.
    pub fn value_at_x(&self, x: f64, bounds: Rect) -> f64 {
        self.value_at(Point::new(x, bounds.y0), bounds, KeyModifiers::default())
    }

    /// Horizontal position of the thumb for `value`.
    pub fn thumb_x(&self, value: f64, bounds: Rect) -> f64 {
        let span = self.max - self.min;
        let mut t = if span == 0.0 {
            0.0
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        };
        if self.reversed {
            t = 1.0 - t;
        }
        bounds.x0 + self.inset + t * self.usable(bounds).max(0.0)
    }
}

impl PickingSurface for LinearSlider {
    type Value = f64;

    fn value_at(&self, pos: Point, bounds: Rect, _modifiers: KeyModifiers) -> f64 {
        let usable = self.usable(bounds);
        if usable <= 0.0 {
            return self.min;
        }
        let mut t = ((pos.x - bounds.x0 - self.inset) / usable).clamp(0.0, 1.0);
        if self.reversed {
            t = 1.0 - t;
        }
        let mut value = math::lerp(self.min, self.max, t);
        if let Some(step) = self.step {
            value = math::snap(value, self.min, step);
        }
        value.clamp(self.min.min(self.max), self.min.max(self.max))
    }
}

/// A circular angle control: 0° points right, angles grow clockwise.
/// Holding Shift snaps to `snap` degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDial {
    pub snap: f64,
}

impl Default for AngleDial {
    fn default() -> Self {
        Self { snap: 45.0 }
    }
}

impl AngleDial {
    /// Point on the dial's rim for `degrees`.
    pub fn handle_position(degrees: f64, bounds: Rect) -> Point {
        let center = bounds.center();
        let radius = bounds.width().min(bounds.height()) / 2.0;
        let radians = degrees.to_radians();
        Point::new(
            center.x + radians.cos() * radius,
            center.y + radians.sin() * radius,
        )
    }
}

impl PickingSurface for AngleDial {
    type Value = f64;

    fn value_at(&self, pos: Point, bounds: Rect, modifiers: KeyModifiers) -> f64 {
        let center = bounds.center();
        let mut degrees = (pos.y - center.y)
            .atan2(pos.x - center.x)
            .to_degrees()
            .rem_euclid(360.0);
        if modifiers.shift {
            degrees = math::snap(degrees, 0.0, self.snap).rem_euclid(360.0);
        }
        degrees
    }
}

/// What a pointer event did to a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome<T> {
    /// Not for this surface (outside it, another pointer, or no drag).
    Ignored,
    /// Live edit.
    Input(T),
    /// The drag ended normally; carries the final value.
    Change(T),
    /// The drag was interrupted; nothing should be committed.
    Cancelled,
}

impl<T> DragOutcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Input(v) | Self::Change(v) => Some(v),
            Self::Ignored | Self::Cancelled => None,
        }
    }
}

/// Pointer capture for one drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pointer: PointerId,
}

impl DragSession {
    pub fn pointer(&self) -> PointerId {
        self.pointer
    }
}

/// `idle → dragging → idle` around a [`PickingSurface`].
#[derive(Debug, Clone)]
pub struct DragTracker<S: PickingSurface> {
    surface: S,
    session: Option<DragSession>,
    last: Option<S::Value>,
}

impl<S: PickingSurface> DragTracker<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            session: None,
            last: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<DragSession> {
        self.session
    }

    /// Start a drag if the pointer went down inside `bounds`.
    pub fn pointer_down(&mut self, sample: PointerSample, bounds: Rect) -> DragOutcome<S::Value> {
        if self.session.is_some() || !contains(bounds, sample.pos) {
            return DragOutcome::Ignored;
        }
        self.session = Some(DragSession {
            pointer: sample.pointer,
        });
        self.track(sample, bounds)
    }

    /// Recompute the value while the captured pointer moves, wherever it is.
    pub fn pointer_move(&mut self, sample: PointerSample, bounds: Rect) -> DragOutcome<S::Value> {
        if !self.owns(sample.pointer) {
            return DragOutcome::Ignored;
        }
        self.track(sample, bounds)
    }

    /// Finish the drag: one `Change` with the last tracked value.
    pub fn pointer_up(&mut self, pointer: PointerId) -> DragOutcome<S::Value> {
        if !self.owns(pointer) {
            return DragOutcome::Ignored;
        }
        self.session = None;
        match self.last.take() {
            Some(value) => DragOutcome::Change(value),
            None => DragOutcome::Cancelled,
        }
    }

    /// Abort the drag without committing.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> DragOutcome<S::Value> {
        if !self.owns(pointer) {
            return DragOutcome::Ignored;
        }
        self.cancel()
    }

    /// Abort whatever drag is active (focus loss, teardown).
    pub fn cancel(&mut self) -> DragOutcome<S::Value> {
        self.last = None;
        match self.session.take() {
            Some(_) => DragOutcome::Cancelled,
            None => DragOutcome::Ignored,
        }
    }

    fn owns(&self, pointer: PointerId) -> bool {
        self.session.is_some_and(|s| s.pointer == pointer)
    }

    fn track(&mut self, sample: PointerSample, bounds: Rect) -> DragOutcome<S::Value> {
        let value = self.surface.value_at(sample.pos, bounds, sample.modifiers);
        self.last = Some(value);
        DragOutcome::Input(value)
    }
}

fn contains(bounds: Rect, pos: Point) -> bool {
    pos.x >= bounds.x0 && pos.x <= bounds.x1 && pos.y >= bounds.y0 && pos.y <= bounds.y1
}

/// Index of the stop handle under `x`, if any is within `radius`.
/// The closest handle wins; on a tie the later (top-drawn) one does.
pub fn hit_test_stop(
    stops: &[GradientStop],
    x: f64,
    track: &LinearSlider,
    bounds: Rect,
    radius: f64,
) -> Option<usize> {
    stops
        .iter()
        .enumerate()
        .map(|(i, stop)| (i, (track.thumb_x(stop.position, bounds) - x).abs()))
        .filter(|&(_, distance)| distance <= radius)
        .fold(None, |best: Option<(usize, f64)>, (i, distance)| match best {
            Some((_, best_distance)) if best_distance < distance => best,
            _ => Some((i, distance)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Rect {
        Rect::new(10.0, 20.0, 210.0, 220.0)
    }

    #[test]
    fn test_sv_square_mapping() {
        let sv = SvSquare;
        let m = KeyModifiers::default();
        assert_eq!(sv.value_at(Point::new(10.0, 20.0), square(), m), (0.0, 100.0));
        assert_eq!(sv.value_at(Point::new(210.0, 220.0), square(), m), (100.0, 0.0));
        assert_eq!(sv.value_at(Point::new(110.0, 70.0), square(), m), (50.0, 75.0));
        // Outside the square clamps.
        assert_eq!(sv.value_at(Point::new(-500.0, 900.0), square(), m), (0.0, 0.0));
        let handle = SvSquare::handle_position(50.0, 75.0, square());
        assert_eq!(handle, Point::new(110.0, 70.0));
    }

    #[test]
    fn test_slider_steps_and_clamps() {
        let bounds = Rect::new(0.0, 0.0, 200.0, 16.0);
        let m = KeyModifiers::default();
        let hue = LinearSlider::hue();
        assert_eq!(hue.value_at(Point::new(100.0, 8.0), bounds, m), 180.0);
        assert_eq!(hue.value_at(Point::new(100.3, 8.0), bounds, m), 181.0);
        assert_eq!(hue.value_at(Point::new(999.0, 8.0), bounds, m), 360.0);

        let inset = LinearSlider::new(0.0, 1.0).with_inset(10.0);
        assert_eq!(inset.value_at(Point::new(5.0, 0.0), bounds, m), 0.0);
        assert_eq!(inset.value_at(Point::new(100.0, 0.0), bounds, m), 0.5);
        assert_eq!(inset.thumb_x(1.0, bounds), 190.0);

        let reversed = LinearSlider::new(0.0, 100.0).reversed();
        assert_eq!(reversed.value_at(Point::new(0.0, 0.0), bounds, m), 100.0);
        assert_eq!(reversed.thumb_x(100.0, bounds), 0.0);
    }

    #[test]
    fn test_angle_dial_snaps_only_with_shift() {
        let dial = AngleDial::default();
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let below_right = Point::new(90.0, 60.0);
        let free = dial.value_at(below_right, bounds, KeyModifiers::default());
        assert!((free - 14.036).abs() < 0.01);
        let snapped = dial.value_at(
            below_right,
            bounds,
            KeyModifiers {
                shift: true,
                alt: false,
            },
        );
        assert_eq!(snapped, 0.0);
        let up = dial.value_at(Point::new(50.0, 0.0), bounds, KeyModifiers::default());
        assert_eq!(up, 270.0);
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut tracker = DragTracker::new(SvSquare);
        assert!(!tracker.is_dragging());

        let down = tracker.pointer_down(PointerSample::new((110.0, 120.0)), square());
        assert_eq!(down, DragOutcome::Input((50.0, 50.0)));
        assert!(tracker.is_dragging());

        // Capture keeps routing moves outside the bounds.
        let out = tracker.pointer_move(PointerSample::new((400.0, 120.0)), square());
        assert_eq!(out, DragOutcome::Input((100.0, 50.0)));

        assert_eq!(
            tracker.pointer_up(PointerId::PRIMARY),
            DragOutcome::Change((100.0, 50.0))
        );
        assert!(!tracker.is_dragging());
        assert_eq!(
            tracker.pointer_move(PointerSample::new((20.0, 20.0)), square()),
            DragOutcome::Ignored
        );
        assert_eq!(tracker.pointer_up(PointerId::PRIMARY), DragOutcome::Ignored);
    }

    #[test]
    fn test_down_outside_and_foreign_pointer_ignored() {
        let mut tracker = DragTracker::new(SvSquare);
        let outside = tracker.pointer_down(PointerSample::new((0.0, 0.0)), square());
        assert_eq!(outside, DragOutcome::Ignored);

        tracker.pointer_down(
            PointerSample::new((50.0, 50.0)).with_pointer(PointerId(7)),
            square(),
        );
        assert_eq!(
            tracker.pointer_move(PointerSample::new((60.0, 60.0)), square()),
            DragOutcome::Ignored
        );
        assert_eq!(tracker.pointer_up(PointerId(3)), DragOutcome::Ignored);
        assert!(tracker.is_dragging());
        assert_eq!(tracker.session().map(|s| s.pointer()), Some(PointerId(7)));
    }

    #[test]
    fn test_cancel_does_not_commit() {
        let mut tracker = DragTracker::new(LinearSlider::opacity());
        let bounds = Rect::new(0.0, 0.0, 100.0, 10.0);
        tracker.pointer_down(PointerSample::new((30.0, 5.0)), bounds);
        assert_eq!(tracker.pointer_cancel(PointerId::PRIMARY), DragOutcome::Cancelled);
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.pointer_up(PointerId::PRIMARY), DragOutcome::Ignored);
        assert_eq!(tracker.cancel(), DragOutcome::Ignored);
    }

    #[test]
    fn test_modifiers_sampled_per_move() {
        let mut tracker = DragTracker::new(AngleDial::default());
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let p = (90.0, 60.0);
        tracker.pointer_down(PointerSample::new(p).with_shift(true), bounds);
        let free = tracker.pointer_move(PointerSample::new(p), bounds);
        assert!(matches!(free, DragOutcome::Input(a) if a > 1.0));
        let snapped = tracker.pointer_move(PointerSample::new(p).with_shift(true), bounds);
        assert_eq!(snapped, DragOutcome::Input(0.0));
    }

    #[test]
    fn test_hit_test_stop() {
        let stops = vec![
            GradientStop::new(0.0, "#000000", 100.0),
            GradientStop::new(50.0, "#777777", 100.0),
            GradientStop::new(52.0, "#888888", 100.0),
            GradientStop::new(100.0, "#FFFFFF", 100.0),
        ];
        let track = LinearSlider::stop_track().with_inset(5.0);
        let bounds = Rect::new(0.0, 0.0, 110.0, 24.0);
        assert_eq!(hit_test_stop(&stops, 6.0, &track, bounds, 6.0), Some(0));
        assert_eq!(hit_test_stop(&stops, 55.4, &track, bounds, 6.0), Some(1));
        assert_eq!(hit_test_stop(&stops, 56.6, &track, bounds, 6.0), Some(2));
        assert_eq!(hit_test_stop(&stops, 30.0, &track, bounds, 6.0), None);
    }
}
