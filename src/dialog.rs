//! The trigger chit and the floating panel it opens.
//!
//! The chit paints a preview of the current fill. Clicking it opens the
//! panel next to it (below if there is room, otherwise above, always inside
//! the window) and clicking it again closes the panel, which commits the
//! edit session. The empty part of the panel header is a drag strip; once
//! the panel has been dragged it stays put until the next open.

use std::sync::Arc;

use floem::event::{Event, EventListener, EventPropagation};
use floem::kurbo::{Point, Rect, Size, Stroke};
use floem::peniko::{self, Blob, Color};
use floem::prelude::*;
use floem::reactive::{create_effect, RwSignal, SignalGet, SignalUpdate};
use floem::{
    context::{ComputeLayoutCx, EventCx, PaintCx, UpdateCx},
    View, ViewId,
};
use floem_renderer::Renderer;

use crate::checkerboard;
use crate::color::Rgb;
use crate::constants;
use crate::fill::{FillState, FillType};
use crate::gradient::Gradient;
use crate::gradient_bar::rasterize_gradient;
use crate::picker::{self, FillPicker};

/// What the chit shows.
#[derive(Debug, Clone, PartialEq)]
enum Swatch {
    Solid(Rgb, f64),
    Gradient(Gradient),
    /// Media fills show a flat tile; `true` once media is attached.
    Media(bool),
}

impl Swatch {
    fn of(state: &FillState) -> Self {
        match state.kind {
            FillType::Solid => Swatch::Solid(state.color.rgb(), state.color.a),
            FillType::Gradient => Swatch::Gradient(state.gradient.clone()),
            FillType::Image | FillType::Video => {
                Swatch::Media(state.media(state.kind).is_some_and(|m| m.url.is_some()))
            }
            FillType::Webcam => Swatch::Media(state.webcam.snapshot.is_some()),
        }
    }
}

struct Chit {
    id: ViewId,
    swatch: Swatch,
    size: floem::taffy::prelude::Size<f32>,
    img: Option<peniko::Image>,
    img_hash: Vec<u8>,
    cached: Option<(Gradient, u32, u32)>,
}

fn chit(picker: &FillPicker) -> Chit {
    let id = ViewId::new();
    let source = picker.clone();
    create_effect(move |_| {
        let swatch = source.read(|c| Swatch::of(c.state()));
        id.update_state(swatch);
    });

    Chit {
        id,
        swatch: picker.read_untracked(|c| Swatch::of(c.state())),
        size: Default::default(),
        img: None,
        img_hash: Vec::new(),
        cached: None,
    }
}

impl Chit {
    fn ensure_image(&mut self, gradient: &Gradient, rect: Rect, scale: f64) {
        let pw = (rect.width() * scale.max(1.0)).round() as u32;
        let ph = (rect.height() * scale.max(1.0)).round() as u32;
        if pw == 0 || ph == 0 {
            return;
        }
        if let Some((cached, w, h)) = &self.cached {
            if cached == gradient && (*w, *h) == (pw, ph) {
                return;
            }
        }
        let blob = Blob::new(Arc::new(rasterize_gradient(gradient, pw, ph)));
        self.img_hash = blob.id().to_le_bytes().to_vec();
        self.img = Some(peniko::Image::new(blob, peniko::Format::Rgba8, pw, ph));
        self.cached = Some((gradient.clone(), pw, ph));
    }
}

impl View for Chit {
    fn id(&self) -> ViewId {
        self.id
    }

    fn update(&mut self, _cx: &mut UpdateCx, state: Box<dyn std::any::Any>) {
        if let Ok(swatch) = state.downcast::<Swatch>() {
            self.swatch = *swatch;
            self.id.request_layout();
        }
    }

    fn compute_layout(&mut self, _cx: &mut ComputeLayoutCx) -> Option<Rect> {
        let layout = self.id.get_layout().unwrap_or_default();
        self.size = layout.size;
        None
    }

    fn paint(&mut self, cx: &mut PaintCx) {
        let rect = Rect::new(0.0, 0.0, self.size.width as f64, self.size.height as f64);
        if rect.is_zero_area() {
            return;
        }
        let rrect = rect.to_rounded_rect(constants::RADIUS as f64);

        cx.save();
        cx.clip(&rrect);
        match self.swatch.clone() {
            Swatch::Solid(rgb, a) => {
                checkerboard::paint_checkerboard(cx, rect);
                let alpha = (a * 255.0).round().clamp(0.0, 255.0) as u8;
                cx.fill(&rect, Color::rgba8(rgb.r, rgb.g, rgb.b, alpha), 0.0);
            }
            Swatch::Gradient(gradient) => {
                checkerboard::paint_checkerboard(cx, rect);
                self.ensure_image(&gradient, rect, cx.scale());
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
            Swatch::Media(attached) => {
                let tint = if attached { constants::ACCENT } else { constants::HOVER };
                cx.fill(&rect, tint, 0.0);
            }
        }
        cx.restore();
        cx.stroke(&rrect, constants::OUTLINE, &Stroke::new(1.0));
    }
}

/// Empty header space that moves the open panel.
///
/// Positions are reported as panel origin plus the local pointer; the
/// constant offset of the strip inside the panel cancels out of the drag.
struct DragStrip {
    id: ViewId,
    picker: FillPicker,
    held: bool,
}

pub(crate) fn drag_strip(picker: &FillPicker) -> impl IntoView {
    DragStrip {
        id: ViewId::new(),
        picker: picker.clone(),
        held: false,
    }
    .style(|s| {
        s.flex_grow(1.0)
            .height_full()
            .cursor(floem::style::CursorStyle::Default)
    })
}

impl DragStrip {
    fn pointer(&self, local: Point) -> Option<Point> {
        let origin = self
            .picker
            .read_untracked(|c| c.placement().map(|p| p.origin))?;
        Some(origin + local.to_vec2())
    }
}

impl View for DragStrip {
    fn id(&self) -> ViewId {
        self.id
    }

    fn event_before_children(&mut self, cx: &mut EventCx, event: &Event) -> EventPropagation {
        match event {
            Event::PointerDown(e) => {
                let Some(pointer) = self.pointer(e.pos) else {
                    return EventPropagation::Continue;
                };
                self.held = true;
                cx.update_active(self.id());
                self.picker.update(|c| c.begin_panel_drag(pointer));
            }
            Event::PointerMove(e) if self.held => {
                if let Some(pointer) = self.pointer(e.pos) {
                    self.picker.update(|c| c.drag_panel(pointer));
                }
            }
            Event::PointerUp(_) | Event::FocusLost if self.held => {
                self.held = false;
                self.picker.update(|c| c.end_panel_drag());
            }
            _ => return EventPropagation::Continue,
        }
        EventPropagation::Stop
    }

    fn paint(&mut self, _cx: &mut PaintCx) {}
}

/// Chit plus floating panel, laid out over the whole window.
pub(crate) fn dialog(picker: &FillPicker) -> impl IntoView {
    let viewport = RwSignal::new(Size::ZERO);
    let root_origin = RwSignal::new(Point::ZERO);
    let trigger_origin = RwSignal::new(Point::ZERO);
    let trigger_size = RwSignal::new(Size::new(
        constants::CHIT_SIZE as f64,
        constants::CHIT_SIZE as f64,
    ));
    let panel_size = RwSignal::new(Size::new(constants::PANEL_WIDTH as f64, 320.0));

    // Trigger bounds in the dialog's own coordinates, which is also the
    // panel's frame.
    let trigger_rect = move || {
        let origin = (trigger_origin.get_untracked() - root_origin.get_untracked()).to_point();
        Rect::from_origin_size(origin, trigger_size.get_untracked())
    };

    {
        let picker = picker.clone();
        create_effect(move |_| {
            let (panel, view) = (panel_size.get(), viewport.get());
            if picker.read_untracked(|c| c.is_open()) {
                picker.update(|c| c.relayout(trigger_rect(), panel, view));
            }
        });
    }

    let disabled = picker.read_untracked(|c| c.config().disabled);
    let toggle = picker.clone();
    let trigger = chit(picker)
        .style(move |s| {
            let cursor = if disabled {
                floem::style::CursorStyle::Default
            } else {
                floem::style::CursorStyle::Pointer
            };
            s.size(constants::CHIT_SIZE, constants::CHIT_SIZE).cursor(cursor)
        })
        .on_move(move |origin| trigger_origin.set(origin))
        .on_resize(move |rect| trigger_size.set(rect.size()))
        .on_event_stop(EventListener::PointerUp, move |_| {
            if toggle.read_untracked(|c| c.config().disabled) {
                return;
            }
            toggle.update(|c| {
                if c.is_open() {
                    c.close();
                } else {
                    c.open(trigger_rect(), panel_size.get_untracked(), viewport.get_untracked());
                }
            });
        });

    let placed = picker.clone();
    let panel = picker::panel(picker)
        .on_resize(move |rect| {
            if panel_size.get_untracked() != rect.size() {
                panel_size.set(rect.size());
            }
        })
        .style(move |s| {
            let origin = placed.read(|c| c.placement().map(|p| p.origin));
            match origin {
                Some(origin) => s
                    .absolute()
                    .inset_left(origin.x)
                    .inset_top(origin.y)
                    .box_shadow_blur(12.0)
                    .box_shadow_color(constants::SHADOW),
                None => s.absolute().hide(),
            }
        });

    let escape = picker.clone();
    container(stack((trigger, panel)).style(|s| s.size_full()))
        .on_resize(move |rect| viewport.set(rect.size()))
        .on_move(move |origin| root_origin.set(origin))
        .on_event(EventListener::KeyDown, move |e| {
            let is_escape = matches!(
                e,
                Event::KeyDown(ke)
                    if ke.key.logical_key
                        == floem::keyboard::Key::Named(floem::keyboard::NamedKey::Escape)
            );
            if is_escape && escape.read_untracked(|c| c.is_open()) {
                escape.update(|c| c.close());
                return EventPropagation::Stop;
            }
            EventPropagation::Continue
        })
        .style(|s| s.size_full())
}
