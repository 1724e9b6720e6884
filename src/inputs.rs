//! Text fields and small buttons shared by the picker tabs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use floem::event::{Event, EventListener, EventPropagation};
use floem::keyboard::{Key, NamedKey};
use floem::prelude::*;
use floem::reactive::{create_effect, RwSignal, SignalGet, SignalUpdate};

use crate::color;
use crate::constants;

fn is_enter(event: &Event) -> bool {
    matches!(event, Event::KeyDown(ke) if ke.key.logical_key == Key::Named(NamedKey::Enter))
}

/// A number typed by hand: surrounding whitespace and a trailing `%` are
/// ignored. Non-finite results are rejected.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn format_number(value: f64) -> String {
    format!("{}", value.round() as i64)
}

/// The typed number, if it parses and differs from what the field shows
/// for `current`.
fn number_changed(raw: &str, current: f64) -> Option<f64> {
    parse_number(raw).filter(|n| *n != current.round())
}

/// Whether the typed text names a color other than `current`.
/// Unparseable text is never a change.
fn hex_changed(raw: &str, current: &str) -> bool {
    let Ok(typed) = color::parse_color(raw) else {
        return false;
    };
    color::rgb_alpha_to_hex(typed.rgb(), typed.a).trim_start_matches('#')
        != color::normalize_hex(current)
}

fn field_style(s: floem::style::Style, width: f32) -> floem::style::Style {
    s.width(width)
        .padding(2.0)
        .font_size(constants::INPUT_FONT)
        .font_family("monospace".to_string())
        .background(Color::WHITE)
        .border(1.0)
        .border_color(constants::BORDER)
        .border_radius(3.0)
}

/// A numeric field showing `value()` rounded, with an optional unit label.
///
/// A typed number that differs from the shown one is handed to `on_commit`
/// on Enter or focus loss; the receiver clamps it. Anything else snaps back
/// to the current value.
pub(crate) fn number_field(
    unit: &'static str,
    value: impl Fn() -> f64 + 'static,
    on_commit: impl Fn(f64) + 'static,
) -> impl IntoView {
    let value = Rc::new(value);
    let text = RwSignal::new(String::new());

    {
        let value = Rc::clone(&value);
        create_effect(move |_| {
            let display = format_number(value());
            if text.get_untracked() != display {
                text.set(display);
            }
        });
    }

    let commit = Rc::new(move || {
        let raw = text.get_untracked();
        match number_changed(&raw, value()) {
            Some(number) => on_commit(number),
            None => tracing::trace!(%raw, "number field unchanged"),
        }
        let display = format_number(value());
        if text.get_untracked() != display {
            text.set(display);
        }
    });
    let commit_on_enter = Rc::clone(&commit);

    h_stack((
        text_input(text)
            .style(|s| field_style(s, constants::INPUT_WIDTH))
            .on_event_stop(EventListener::FocusLost, move |_| commit())
            .on_event(EventListener::KeyDown, move |e| {
                if is_enter(e) {
                    commit_on_enter();
                    EventPropagation::Stop
                } else {
                    EventPropagation::Continue
                }
            }),
        label(move || unit).style(|s| {
            s.font_size(constants::LABEL_FONT)
                .color(constants::MUTED)
        }),
    ))
    .style(|s| s.items_center().gap(2.0))
}

/// A hex field. Every keystroke that forms a complete 6- or 8-digit hex is
/// applied live through `on_input`. Enter or focus loss hands the text to
/// `on_commit` if it changes the color or live edits are pending, then snaps
/// the field to the normalized current value.
pub(crate) fn hex_field(
    value: impl Fn() -> String + 'static,
    on_input: impl Fn(&str) + 'static,
    on_commit: impl Fn(&str) + 'static,
) -> impl IntoView {
    let value = Rc::new(value);
    let text = RwSignal::new(String::new());

    {
        let value = Rc::clone(&value);
        create_effect(move |_| {
            let current = value().trim_start_matches('#').to_string();
            let typed = text.get_untracked();
            if typed.trim_start_matches('#').to_uppercase() != current {
                text.set(current);
            }
        });
    }

    // Set while live edits have not been committed yet.
    let pending = Rc::new(Cell::new(false));

    {
        let value = Rc::clone(&value);
        let pending = Rc::clone(&pending);
        // Last text handed to `on_input`; re-runs caused by our own edit
        // must not apply it again.
        let sent = RefCell::new(String::new());
        create_effect(move |_| {
            let raw = text.get();
            let digits = raw.trim().trim_start_matches('#');
            let complete =
                matches!(digits.len(), 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit());
            if !complete || *sent.borrow() == raw {
                return;
            }
            if value().trim_start_matches('#').eq_ignore_ascii_case(digits) {
                return;
            }
            sent.replace(raw.clone());
            pending.set(true);
            on_input(&raw);
        });
    }

    let commit = Rc::new(move || {
        let raw = text.get_untracked();
        if pending.replace(false) || hex_changed(&raw, &value()) {
            on_commit(&raw);
        }
        let normalized = color::normalize_hex(&value());
        if text.get_untracked() != normalized {
            text.set(normalized);
        }
    });
    let commit_on_enter = Rc::clone(&commit);

    h_stack((
        label(|| "#").style(|s| {
            s.font_size(constants::INPUT_FONT)
                .font_family("monospace".to_string())
                .color(constants::MUTED)
        }),
        text_input(text)
            .style(|s| field_style(s, constants::HEX_INPUT_WIDTH))
            .on_event_stop(EventListener::FocusLost, move |_| commit())
            .on_event(EventListener::KeyDown, move |e| {
                if is_enter(e) {
                    commit_on_enter();
                    EventPropagation::Stop
                } else {
                    EventPropagation::Continue
                }
            }),
    ))
    .style(|s| s.items_center().gap(1.0))
}

/// A lucide glyph button.
pub(crate) fn icon_button(
    icon: lucide_icons::Icon,
    enabled: impl Fn() -> bool + 'static,
    on_click: impl Fn() + 'static,
) -> impl IntoView {
    let pressed = RwSignal::new(false);
    let enabled = Rc::new(enabled);
    let enabled_for_click = Rc::clone(&enabled);
    container(label(move || icon.unicode().to_string()).style(move |s| {
        let c = if !enabled() {
            constants::BORDER
        } else if pressed.get() {
            Color::rgb8(80, 80, 80)
        } else {
            constants::MUTED
        };
        s.font_size(14.0).font_family("lucide".to_string()).color(c)
    }))
    .style(|s| {
        s.size(22.0, 22.0)
            .items_center()
            .justify_center()
            .border_radius(3.0)
            .cursor(floem::style::CursorStyle::Pointer)
            .hover(|s| s.background(constants::HOVER))
    })
    .on_event_stop(EventListener::PointerDown, move |_| {
        pressed.set(true);
    })
    .on_event_stop(EventListener::PointerUp, move |_| {
        pressed.set(false);
        if enabled_for_click() {
            on_click();
        }
    })
}

/// One segment of a segmented control.
pub(crate) fn choice_button(
    text: &'static str,
    selected: impl Fn() -> bool + 'static,
    on_click: impl Fn() + 'static,
) -> impl IntoView {
    label(move || text)
        .style(move |s| {
            let on = selected();
            s.padding_horiz(6.0)
                .padding_vert(3.0)
                .font_size(constants::INPUT_FONT)
                .border_radius(3.0)
                .cursor(floem::style::CursorStyle::Pointer)
                .color(if on { Color::WHITE } else { Color::rgb8(60, 60, 60) })
                .background(if on { constants::ACCENT } else { Color::TRANSPARENT })
                .apply_if(!on, |s| s.hover(|s| s.background(constants::HOVER)))
        })
        .on_event_stop(EventListener::PointerUp, move |_| on_click())
}

/// Copies the result of `get_text` to the clipboard.
pub(crate) fn copy_button(get_text: impl Fn() -> String + 'static) -> impl IntoView {
    icon_button(lucide_icons::Icon::Copy, || true, move || copy_to_clipboard(&get_text()))
}

fn copy_to_clipboard(text: &str) {
    let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
    if let Err(err) = result {
        tracing::warn!(%err, "clipboard unavailable");
    }
}
