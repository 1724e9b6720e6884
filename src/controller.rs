//! The fill picker's single writer.
//!
//! [`FillPickerController`] owns the [`FillState`] and every resource that
//! hangs off it. Views never mutate the fill directly: they call one of the
//! edit methods here, which changes the state and queues an event. The
//! queue is drained with [`FillPickerController::take_events`] once the
//! edit has returned, so listeners never observe a half-applied edit.
//!
//! Live edits queue [`PickerEvent::Input`]; the end of an edit session
//! ([`commit`](FillPickerController::commit) or
//! [`close`](FillPickerController::close)) queues exactly one
//! [`PickerEvent::Change`]. Programmatic assignment through
//! [`set_value`](FillPickerController::set_value) queues nothing.

use floem::kurbo::{Point, Rect, Size};

use crate::color::{self, Hsva, Rgb};
use crate::config::PickerConfig;
use crate::fill::{ChitBackground, FillProjection, FillState, FillType, ScaleMode};
use crate::gradient::GradientType;
use crate::media::{CameraProvider, MediaResources, ResourceGuard, WebcamSession};
use crate::placement::{compute_position, PanelPlacement};
use crate::surface::DragOutcome;

#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    /// Continuous, fired on every live edit.
    Input(FillProjection),
    /// Committed, fired once per edit session.
    Change(FillProjection),
}

impl PickerEvent {
    pub fn projection(&self) -> &FillProjection {
        match self {
            Self::Input(p) | Self::Change(p) => p,
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Change(_))
    }
}

#[derive(Debug)]
pub struct FillPickerController {
    state: FillState,
    config: PickerConfig,
    placement: Option<PanelPlacement>,
    webcam: WebcamSession,
    media: MediaResources,
    selected_stop: usize,
    outbox: Vec<PickerEvent>,
}

impl FillPickerController {
    pub fn new(config: PickerConfig) -> Self {
        let mut state = FillState::default();
        if let Some(mode) = config.mode {
            state.kind = mode;
        }
        Self {
            state,
            config,
            placement: None,
            webcam: WebcamSession::default(),
            media: MediaResources::default(),
            selected_stop: 0,
            outbox: Vec::new(),
        }
    }

    pub fn with_camera(mut self, provider: Box<dyn CameraProvider>) -> Self {
        self.webcam.set_provider(provider);
        self
    }

    pub fn set_camera_provider(&mut self, provider: Box<dyn CameraProvider>) {
        self.webcam.set_provider(provider);
    }

    // ── Read side ───────────────────────────────────────────────────

    pub fn state(&self) -> &FillState {
        &self.state
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn kind(&self) -> FillType {
        self.state.kind
    }

    pub fn color(&self) -> Hsva {
        self.state.color
    }

    /// The active kind's projection.
    pub fn value(&self) -> FillProjection {
        self.state.projection()
    }

    pub fn serialized(&self) -> String {
        self.state.to_json()
    }

    pub fn chit(&self) -> ChitBackground {
        self.state.chit()
    }

    pub fn is_open(&self) -> bool {
        self.placement.is_some()
    }

    pub fn placement(&self) -> Option<&PanelPlacement> {
        self.placement.as_ref()
    }

    pub fn webcam(&self) -> &WebcamSession {
        &self.webcam
    }

    pub fn selected_stop(&self) -> usize {
        self.selected_stop
    }

    pub fn is_locked(&self) -> bool {
        self.config.mode.is_some()
    }

    /// Drain queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<PickerEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ── Host surface ────────────────────────────────────────────────

    /// Programmatic assignment. Updates state without queueing any event.
    /// Malformed input is logged and the previous value kept.
    pub fn set_value(&mut self, raw: &str) -> bool {
        match self.state.apply_serialized(raw) {
            Ok(()) => {
                self.enforce_mode();
                self.clamp_selected_stop();
                true
            }
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed fill value");
                false
            }
        }
    }

    /// Open the panel anchored to `trigger`. Returns the panel origin, or
    /// `None` when the picker is disabled.
    pub fn open(&mut self, trigger: Rect, panel: Size, viewport: Size) -> Option<Point> {
        if self.config.disabled {
            tracing::debug!("fill picker is disabled; not opening");
            return None;
        }
        self.enforce_mode();
        let origin = compute_position(trigger, panel, viewport, self.config.placement);
        self.placement = Some(PanelPlacement::anchored(origin));
        if self.state.kind == FillType::Webcam {
            self.webcam.ensure_started();
        }
        tracing::debug!(kind = %self.state.kind, ?origin, "fill picker opened");
        Some(origin)
    }

    /// Recompute the anchored position once the panel has been measured.
    /// Has no effect after the user dragged the panel.
    pub fn relayout(&mut self, trigger: Rect, panel: Size, viewport: Size) -> Option<Point> {
        let origin = compute_position(trigger, panel, viewport, self.config.placement);
        let placement = self.placement.as_mut()?;
        placement.reanchor(origin);
        Some(placement.origin)
    }

    pub fn begin_panel_drag(&mut self, pointer: Point) {
        if let Some(placement) = self.placement.as_mut() {
            placement.begin_drag(pointer);
        }
    }

    pub fn drag_panel(&mut self, pointer: Point) -> Option<Point> {
        let placement = self.placement.as_mut()?;
        placement.drag_to(pointer).then_some(placement.origin)
    }

    pub fn end_panel_drag(&mut self) {
        if let Some(placement) = self.placement.as_mut() {
            placement.end_drag();
        }
    }

    /// Close the panel and commit. Does nothing if it is not open.
    pub fn close(&mut self) {
        if self.placement.take().is_none() {
            return;
        }
        self.webcam.stop();
        self.emit_change();
        tracing::debug!("fill picker closed");
    }

    /// Release every host resource. The value itself is kept.
    pub fn disconnect(&mut self) {
        self.placement = None;
        self.webcam.stop();
        self.media.release_all();
    }

    /// Change the active fill kind; every other kind's state is kept.
    /// Refused while locked to another kind.
    pub fn switch_tab(&mut self, kind: FillType) -> bool {
        if !self.config.allows(kind) {
            tracing::debug!(%kind, "tab switch refused by mode lock");
            return false;
        }
        if self.state.kind == kind {
            return true;
        }
        if self.state.kind == FillType::Webcam {
            self.webcam.stop();
        }
        self.state.kind = kind;
        if kind == FillType::Webcam && self.is_open() {
            self.webcam.ensure_started();
        }
        tracing::debug!(%kind, "switched fill tab");
        self.emit_input();
        true
    }

    // ── Solid ───────────────────────────────────────────────────────

    pub fn set_saturation_value(&mut self, s: f64, v: f64) {
        let c = self.state.color;
        self.state.color = Hsva::new(c.h, s, v, c.a);
        self.emit_input();
    }

    pub fn set_hue(&mut self, h: f64) {
        let c = self.state.color;
        self.state.color = Hsva::new(h, c.s, c.v, c.a);
        self.emit_input();
    }

    /// `opacity` in percent.
    pub fn set_opacity(&mut self, opacity: f64) {
        let c = self.state.color;
        self.state.color = Hsva::new(c.h, c.s, c.v, opacity / 100.0);
        self.emit_input();
    }

    /// Apply typed color text (hex, or an `rgb()`/`hsl()` string). Alpha
    /// digits are honored only when alpha is enabled. Unparseable text is
    /// rejected without touching the color.
    pub fn set_hex(&mut self, text: &str) -> bool {
        let rgba = match color::parse_color(text) {
            Ok(rgba) => rgba,
            Err(err) => {
                tracing::debug!(%err, "rejected typed color");
                return false;
            }
        };
        let mut next = Hsva::from_rgba(rgba);
        if !self.config.alpha || !carries_alpha(text) {
            next.a = self.state.color.a;
        }
        self.state.color = next;
        self.emit_input();
        true
    }

    /// A color sampled from the screen. Alpha is kept.
    pub fn pick_color(&mut self, rgb: Rgb) {
        let hsv = color::rgb_to_hsv(rgb.r, rgb.g, rgb.b);
        self.state.color = self.state.color.with_hsv(hsv);
        self.emit_input();
    }

    // ── Gradient ────────────────────────────────────────────────────

    pub fn set_gradient_type(&mut self, kind: GradientType) {
        self.state.gradient.kind = kind;
        self.emit_input();
    }

    /// `degrees` as shown on the angle dial.
    pub fn set_gradient_angle(&mut self, degrees: f64) {
        self.state.gradient.set_picker_angle(degrees);
        self.emit_input();
    }

    pub fn set_gradient_center(&mut self, x: f64, y: f64) {
        self.state.gradient.set_center(x, y);
        self.emit_input();
    }

    pub fn flip_gradient(&mut self) {
        self.selected_stop = self.state.gradient.flip(self.selected_stop);
        self.emit_input();
    }

    pub fn select_stop(&mut self, index: usize) {
        if index < self.state.gradient.stops.len() {
            self.selected_stop = index;
        }
    }

    /// Add a stop and select it. Returns its index.
    pub fn add_stop(&mut self, position: f64, color: &str, opacity: f64) -> usize {
        self.selected_stop = self.state.gradient.add_stop(position, color, opacity);
        self.emit_input();
        self.selected_stop
    }

    /// Add a stop colored like the gradient at `position` and select it.
    pub fn add_stop_at(&mut self, position: f64) -> usize {
        self.selected_stop = self.state.gradient.add_stop_at(position);
        self.emit_input();
        self.selected_stop
    }

    /// Remove a stop. Refused below two stops.
    pub fn remove_stop(&mut self, index: usize) -> bool {
        if !self.state.gradient.remove_stop(index) {
            return false;
        }
        if index < self.selected_stop {
            self.selected_stop -= 1;
        }
        self.clamp_selected_stop();
        self.emit_input();
        true
    }

    /// Move a stop during a drag. Order is restored on [`Self::commit`].
    pub fn drag_stop(&mut self, index: usize, position: f64) {
        if index >= self.state.gradient.stops.len() {
            return;
        }
        self.state.gradient.drag_stop(index, position);
        self.selected_stop = index;
        self.emit_input();
    }

    /// Set a stop's position from a text field; re-sorts immediately.
    pub fn set_stop_position(&mut self, index: usize, position: f64) {
        if index >= self.state.gradient.stops.len() {
            return;
        }
        self.state.gradient.drag_stop(index, position);
        self.selected_stop = self.state.gradient.sort_stops(index);
        self.emit_input();
    }

    pub fn set_stop_color(&mut self, index: usize, hex: &str) -> bool {
        if !self.state.gradient.set_stop_color(index, hex) {
            return false;
        }
        self.emit_input();
        true
    }

    pub fn set_stop_opacity(&mut self, index: usize, opacity: f64) {
        if index >= self.state.gradient.stops.len() {
            return;
        }
        self.state.gradient.set_stop_opacity(index, opacity);
        self.emit_input();
    }

    pub fn redistribute_stops(&mut self) {
        self.state.gradient.redistribute();
        self.emit_input();
    }

    // ── Image / video / webcam ──────────────────────────────────────

    /// Video has no tile mode; asking for it is refused.
    pub fn set_scale_mode(&mut self, kind: FillType, mode: ScaleMode) -> bool {
        let allowed: &[ScaleMode] = match kind {
            FillType::Image => &ScaleMode::IMAGE,
            FillType::Video => &ScaleMode::VIDEO,
            _ => return false,
        };
        if !allowed.contains(&mode) {
            return false;
        }
        let Some(media) = self.state.media_mut(kind) else {
            return false;
        };
        media.scale_mode = mode;
        self.emit_input();
        true
    }

    pub fn set_scale(&mut self, kind: FillType, scale: f64) {
        let Some(media) = self.state.media_mut(kind) else {
            return;
        };
        media.set_scale(scale);
        self.emit_input();
    }

    /// Replace the media behind an image or video fill. The previous
    /// resource, if any, is released.
    pub fn set_media(&mut self, kind: FillType, url: Option<String>, guard: Option<ResourceGuard>) -> bool {
        let Some(media) = self.state.media_mut(kind) else {
            return false;
        };
        media.url = url;
        self.media.replace(kind, guard);
        self.emit_input();
        true
    }

    /// Restart the camera on another device. The value is unchanged, so no
    /// event is queued.
    pub fn select_camera(&mut self, device: &str) {
        self.webcam.start(Some(device));
    }

    /// Ask for the camera from the webcam tab, e.g. after access was
    /// granted. Queues no event.
    pub fn start_camera(&mut self) -> bool {
        if self.state.kind != FillType::Webcam {
            return false;
        }
        self.webcam.ensure_started();
        self.webcam.is_live()
    }

    /// Capture a frame into the webcam snapshot and the image fill, then show
    /// it on the image tab. Returns `false` if no stream is live or the
    /// capture failed.
    pub fn capture_snapshot(&mut self) -> bool {
        let frame = match self.webcam.capture() {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => {
                tracing::warn!(%err, "snapshot capture failed");
                return false;
            }
            None => return false,
        };
        self.state.webcam.snapshot = Some(frame.clone());
        self.state.image.url = Some(frame);
        self.media.replace(FillType::Image, None);
        if self.config.allows(FillType::Image) {
            self.webcam.stop();
            self.state.kind = FillType::Image;
        }
        self.emit_input();
        true
    }

    // ── Edit sessions ───────────────────────────────────────────────

    /// End an edit session: restore stop order and queue one change.
    pub fn commit(&mut self) {
        self.settle_stops();
        self.emit_change();
    }

    /// Route a drag outcome. `edit` runs for live ticks; the release
    /// commits; a cancel settles stop order without committing.
    pub fn apply_drag<T>(&mut self, outcome: DragOutcome<T>, edit: impl FnOnce(&mut Self, T)) {
        match outcome {
            DragOutcome::Input(value) => edit(self, value),
            DragOutcome::Change(_) => {
                tracing::debug!("drag committed");
                self.commit();
            }
            DragOutcome::Cancelled => self.settle_stops(),
            DragOutcome::Ignored => {}
        }
    }

    fn settle_stops(&mut self) {
        if !self.state.gradient.is_sorted() {
            self.selected_stop = self.state.gradient.sort_stops(self.selected_stop);
        }
    }

    fn enforce_mode(&mut self) {
        if let Some(mode) = self.config.mode {
            self.state.kind = mode;
        }
    }

    fn clamp_selected_stop(&mut self) {
        let last = self.state.gradient.stops.len().saturating_sub(1);
        self.selected_stop = self.selected_stop.min(last);
    }

    fn emit_input(&mut self) {
        self.outbox.push(PickerEvent::Input(self.state.projection()));
    }

    fn emit_change(&mut self) {
        self.outbox.push(PickerEvent::Change(self.state.projection()));
    }
}

impl Default for FillPickerController {
    fn default() -> Self {
        Self::new(PickerConfig::default())
    }
}

fn carries_alpha(text: &str) -> bool {
    let text = text.trim();
    match text.strip_prefix('#') {
        Some(hex) => hex.len() == 8,
        None if text.starts_with("rgba") || text.starts_with("hsla") => true,
        None => text.len() == 8 && text.chars().all(|c| c.is_ascii_hexdigit()),
    }
}
