use std::cell::RefCell;
use std::rc::Rc;

use floem::kurbo::{Point, Rect, Size};
use floem_fill::{
    compute_position, DragTracker, FillPicker, FillProjection, FillType, GradientType,
    PickerConfig, PlacementOptions, PointerId, PointerSample, SvSquare,
};
use pretty_assertions::assert_eq;

const EPSILON: f64 = 1e-9;

/// Records every event delivered to the host listeners, in order.
#[derive(Default)]
struct Log {
    events: RefCell<Vec<(&'static str, FillProjection)>>,
}

impl Log {
    fn attach(picker: &FillPicker) -> Rc<Log> {
        let log = Rc::new(Log::default());
        let input = Rc::clone(&log);
        picker.on_input(move |p| input.events.borrow_mut().push(("input", p.clone())));
        let change = Rc::clone(&log);
        picker.on_change(move |p| change.events.borrow_mut().push(("change", p.clone())));
        log
    }

    fn kinds(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|(k, _)| *k).collect()
    }

    fn count(&self, kind: &str) -> usize {
        self.events.borrow().iter().filter(|(k, _)| *k == kind).count()
    }
}

#[test]
fn test_hex_with_alpha_projects_solid() {
    let picker = FillPicker::default();
    assert!(picker.set_value("#FF000080"));
    let opened = picker.update(|c| {
        c.open(
            Rect::new(10.0, 10.0, 34.0, 34.0),
            Size::new(240.0, 320.0),
            Size::new(800.0, 600.0),
        )
    });
    assert!(opened.is_some());

    match picker.value() {
        FillProjection::Solid {
            color,
            alpha,
            opacity,
            ..
        } => {
            assert_eq!(color, "#FF0000");
            assert!((alpha - 128.0 / 255.0).abs() < EPSILON);
            assert_eq!(opacity, 50.0);
        }
        other => panic!("expected a solid fill, got {other:?}"),
    }
}

#[test]
fn test_stop_count_never_drops_below_two() {
    let picker = FillPicker::default();
    picker.update(|c| c.switch_tab(FillType::Gradient));
    picker.update(|c| c.add_stop(50.0, "#00FF00", 100.0));
    assert_eq!(picker.read_untracked(|c| c.state().gradient.stops.len()), 3);

    assert!(picker.update(|c| c.remove_stop(0)));
    assert!(!picker.update(|c| c.remove_stop(0)));

    let stops = picker.read_untracked(|c| c.state().gradient.stops.clone());
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0].color, "#00FF00");
}

#[test]
fn test_switching_tabs_preserves_solid_color() {
    let picker = FillPicker::default().with_value("#3B82F6");
    picker.update(|c| c.switch_tab(FillType::Gradient));
    picker.update(|c| c.set_gradient_type(GradientType::Radial));
    picker.update(|c| c.switch_tab(FillType::Solid));

    assert_eq!(picker.read_untracked(|c| c.color().to_hex()), "#3B82F6");
    assert_eq!(
        picker.read_untracked(|c| c.state().gradient.kind),
        GradientType::Radial
    );
}

#[test]
fn test_programmatic_set_is_silent() {
    let picker = FillPicker::default();
    let log = Log::attach(&picker);

    assert!(picker.set_value(r##"{"type":"gradient","gradient":{"type":"angular","angle":45}}"##));
    assert!(!picker.set_value("{not json"));
    assert!(!picker.set_value(r#"{"type":"hologram"}"#));

    assert!(log.kinds().is_empty());
    assert_eq!(picker.value().kind(), FillType::Gradient);
    assert!(
        (picker.read_untracked(|c| c.state().gradient.angle) - 45.0).abs() < EPSILON
    );
}

#[test]
fn test_drag_emits_inputs_then_one_change() {
    let picker = FillPicker::default();
    let log = Log::attach(&picker);
    let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
    let mut tracker = DragTracker::new(SvSquare);

    for (x, y) in [(10.0, 10.0), (50.0, 40.0), (150.0, 90.0)] {
        let sample = PointerSample::new((x, y));
        let outcome = if tracker.is_dragging() {
            tracker.pointer_move(sample, bounds)
        } else {
            tracker.pointer_down(sample, bounds)
        };
        picker.update(|c| c.apply_drag(outcome, |c, (s, v)| c.set_saturation_value(s, v)));
    }
    let outcome = tracker.pointer_up(PointerId::PRIMARY);
    picker.update(|c| c.apply_drag(outcome, |c, (s, v)| c.set_saturation_value(s, v)));

    assert_eq!(log.kinds(), vec!["input", "input", "input", "change"]);
    let color = picker.read_untracked(|c| c.color());
    assert!((color.s - 75.0).abs() < EPSILON);
    assert!((color.v - 10.0).abs() < EPSILON);

    // The committed projection is the final dragged value.
    let events = log.events.borrow();
    assert_eq!(events.last().map(|(_, p)| p.clone()), Some(picker.value()));
}

#[test]
fn test_cancelled_drag_emits_no_change() {
    let picker = FillPicker::default();
    let log = Log::attach(&picker);
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
    let mut tracker = DragTracker::new(SvSquare);

    let outcome = tracker.pointer_down(PointerSample::new((20.0, 20.0)), bounds);
    picker.update(|c| c.apply_drag(outcome, |c, (s, v)| c.set_saturation_value(s, v)));
    let outcome = tracker.cancel();
    picker.update(|c| c.apply_drag(outcome, |c, (s, v)| c.set_saturation_value(s, v)));

    assert!(log.count("input") >= 1);
    assert_eq!(log.count("change"), 0);
    assert!(!tracker.is_dragging());
}

#[test]
fn test_close_fires_change_once() {
    let picker = FillPicker::default();
    let log = Log::attach(&picker);
    let trigger = Rect::new(10.0, 10.0, 34.0, 34.0);

    picker.update(|c| c.open(trigger, Size::new(240.0, 320.0), Size::new(800.0, 600.0)));
    picker.update(|c| c.set_hue(180.0));
    picker.update(|c| c.close());
    picker.update(|c| c.close());

    assert_eq!(log.kinds(), vec!["input", "change"]);
}

#[test]
fn test_disabled_picker_stays_closed() {
    let picker = FillPicker::new(PickerConfig::from_attributes(None, None, Some("")));
    let log = Log::attach(&picker);
    let trigger = Rect::new(10.0, 10.0, 34.0, 34.0);

    let opened = picker.update(|c| c.open(trigger, Size::new(240.0, 320.0), Size::new(800.0, 600.0)));
    picker.update(|c| c.close());

    assert_eq!(opened, None);
    assert!(!picker.read_untracked(|c| c.is_open()));
    assert!(log.kinds().is_empty());
}

#[test]
fn test_mode_locked_picker_ignores_other_values() {
    let picker = FillPicker::new(PickerConfig::locked(FillType::Gradient));
    picker.set_value("#FF0000");

    assert_eq!(picker.value().kind(), FillType::Gradient);
    assert!(!picker.update(|c| c.switch_tab(FillType::Solid)));
}

#[test]
fn test_placement_stays_in_viewport() {
    let viewport = Size::new(800.0, 600.0);
    let panel = Size::new(240.0, 320.0);
    let opts = PlacementOptions::default();
    let pad = opts.viewport_padding;

    for tx in (0..=800).step_by(40) {
        for ty in (0..=600).step_by(40) {
            let trigger = Rect::from_origin_size((tx as f64, ty as f64), (24.0, 24.0));
            let Point { x, y } = compute_position(trigger, panel, viewport, opts);
            assert!(x >= pad && x + panel.width <= viewport.width - pad, "x={x} for {trigger:?}");
            assert!(y >= pad && y + panel.height <= viewport.height - pad, "y={y} for {trigger:?}");
        }
    }
}
