//! The host-facing handle and the picker panel.
//!
//! A [`FillPicker`] is a cheap clonable handle around one
//! [`FillPickerController`]. Every view of the panel holds a clone, reads
//! through [`FillPicker::read`] (which subscribes to the handle's revision
//! signal) and writes through [`FillPicker::update`], the single mutation
//! entry point. `update` runs the edit, drains the controller's events,
//! bumps the revision and only then notifies the host listeners, so a
//! listener can read or even edit the picker without re-entering a borrow.

use std::cell::RefCell;
use std::rc::Rc;

use floem::prelude::*;
use floem::reactive::{RwSignal, SignalGet, SignalUpdate};

use crate::angle_dial::angle_dial;
use crate::config::PickerConfig;
use crate::constants;
use crate::controller::{FillPickerController, PickerEvent};
#[cfg(all(feature = "eyedropper", target_os = "macos"))]
use crate::eyedropper::eyedropper_button;
use crate::fill::{ChitBackground, FillProjection, FillType, ScaleMode};
use crate::gradient::GradientType;
use crate::gradient_bar::gradient_bar;
use crate::inputs::{choice_button, copy_button, hex_field, icon_button, number_field};
use crate::media::{CameraProvider, ResourceGuard};
use crate::slider::{hue_slider, opacity_slider};
use crate::sv_square::sv_square;

type Listener = Rc<dyn Fn(&FillProjection)>;

#[derive(Default)]
struct Listeners {
    input: Vec<Listener>,
    change: Vec<Listener>,
}

struct Shared {
    controller: RefCell<FillPickerController>,
    revision: RwSignal<u64>,
    listeners: RefCell<Listeners>,
}

/// Handle to a fill picker.
#[derive(Clone)]
pub struct FillPicker {
    shared: Rc<Shared>,
}

impl FillPicker {
    pub fn new(config: PickerConfig) -> Self {
        Self::from_controller(FillPickerController::new(config))
    }

    pub fn from_controller(controller: FillPickerController) -> Self {
        Self {
            shared: Rc::new(Shared {
                controller: RefCell::new(controller),
                revision: RwSignal::new(0),
                listeners: RefCell::new(Listeners::default()),
            }),
        }
    }

    /// Builder form of [`FillPicker::set_value`].
    pub fn with_value(self, raw: &str) -> Self {
        self.set_value(raw);
        self
    }

    /// Called with the current projection on every live edit.
    pub fn on_input(&self, listener: impl Fn(&FillProjection) + 'static) -> &Self {
        self.shared.listeners.borrow_mut().input.push(Rc::new(listener));
        self
    }

    /// Called with the current projection once per committed edit.
    pub fn on_change(&self, listener: impl Fn(&FillProjection) + 'static) -> &Self {
        self.shared.listeners.borrow_mut().change.push(Rc::new(listener));
        self
    }

    /// Assign a serialized value (JSON or `#RRGGBB[AA]`). Updates every view
    /// but notifies no listener. Malformed input keeps the previous value and
    /// returns `false`.
    pub fn set_value(&self, raw: &str) -> bool {
        self.update(|c| c.set_value(raw))
    }

    pub fn value(&self) -> FillProjection {
        self.read_untracked(|c| c.value())
    }

    pub fn serialized(&self) -> String {
        self.read_untracked(|c| c.serialized())
    }

    pub fn chit(&self) -> ChitBackground {
        self.read_untracked(|c| c.chit())
    }

    pub fn set_camera_provider(&self, provider: Box<dyn CameraProvider>) {
        self.update(|c| c.set_camera_provider(provider));
    }

    /// Hand the picker media the user chose for an image or video fill. The
    /// guard, if any, is released when the media is replaced or the picker
    /// disconnects.
    pub fn set_media(&self, kind: FillType, url: impl Into<String>, guard: Option<ResourceGuard>) -> bool {
        let url = url.into();
        self.update(|c| {
            let applied = c.set_media(kind, Some(url), guard);
            if applied {
                c.commit();
            }
            applied
        })
    }

    /// Release every host resource held by the picker.
    pub fn disconnect(&self) {
        self.update(|c| c.disconnect());
    }

    /// Read the controller and subscribe the running effect to changes.
    pub fn read<R>(&self, f: impl FnOnce(&FillPickerController) -> R) -> R {
        self.shared.revision.get();
        self.read_untracked(f)
    }

    pub fn read_untracked<R>(&self, f: impl FnOnce(&FillPickerController) -> R) -> R {
        f(&self.shared.controller.borrow())
    }

    /// Run an edit, then notify views and listeners.
    pub fn update<R>(&self, edit: impl FnOnce(&mut FillPickerController) -> R) -> R {
        let (result, events) = {
            let mut controller = self.shared.controller.borrow_mut();
            let result = edit(&mut controller);
            (result, controller.take_events())
        };
        self.shared.revision.update(|r| *r += 1);
        self.dispatch(&events);
        result
    }

    fn dispatch(&self, events: &[PickerEvent]) {
        for event in events {
            let listeners: Vec<Listener> = {
                let all = self.shared.listeners.borrow();
                match event {
                    PickerEvent::Input(_) => all.input.clone(),
                    PickerEvent::Change(_) => all.change.clone(),
                }
            };
            for listener in listeners {
                listener(event.projection());
            }
        }
    }
}

impl Default for FillPicker {
    fn default() -> Self {
        Self::new(PickerConfig::default())
    }
}

// ── Panel ───────────────────────────────────────────────────────────

fn spacer() -> impl IntoView {
    empty().style(|s| s.flex_grow(1.0))
}

fn caption(text: impl Fn() -> String + 'static) -> Label {
    label(text).style(|s| s.font_size(constants::LABEL_FONT).color(constants::MUTED))
}

/// Show `view` only while `kind` is the active fill.
fn tab(picker: &FillPicker, kind: FillType, view: impl IntoView + 'static) -> impl IntoView {
    let picker = picker.clone();
    container(view).style(move |s| {
        let active = picker.read(|c| c.kind()) == kind;
        s.width_full().apply_if(!active, |s| s.hide())
    })
}

fn header(picker: &FillPicker) -> impl IntoView {
    let locked = picker.read_untracked(|c| c.config().mode);
    let switcher = {
        let picker = picker.clone();
        h_stack_from_iter(FillType::ALL.into_iter().map(move |kind| {
            let (read, write) = (picker.clone(), picker.clone());
            choice_button(
                kind.label(),
                move || read.read(|c| c.kind()) == kind,
                move || {
                    write.update(|c| c.switch_tab(kind));
                },
            )
        }))
        .style(move |s| s.gap(2.0).apply_if(locked.is_some(), |s| s.hide()))
    };
    let locked_label = label(move || locked.map(|k| k.label()).unwrap_or_default()).style(
        move |s| {
            s.font_size(constants::INPUT_FONT)
                .font_weight(floem::text::Weight::BOLD)
                .apply_if(locked.is_none(), |s| s.hide())
        },
    );
    let close = {
        let picker = picker.clone();
        icon_button(lucide_icons::Icon::X, || true, move || picker.update(|c| c.close()))
    };

    h_stack((switcher, locked_label, crate::dialog::drag_strip(picker), close)).style(|s| {
        s.width_full()
            .height(constants::HEADER_HEIGHT)
            .items_center()
            .padding_horiz(constants::PADDING)
            .border_bottom(1.0)
            .border_color(constants::BORDER)
            .cursor(floem::style::CursorStyle::Default)
    })
}

fn solid_tab(picker: &FillPicker) -> impl IntoView {
    let alpha = picker.read_untracked(|c| c.config().alpha);
    let hex_of = |c: &FillPickerController| {
        if c.config().alpha {
            c.color().to_hex_alpha()
        } else {
            c.color().to_hex()
        }
    };

    let sliders = v_stack((
        hue_slider(picker.clone()),
        opacity_slider(picker.clone()).style(move |s| s.apply_if(!alpha, |s| s.hide())),
    ))
    .style(|s| s.flex_grow(1.0).gap(constants::GAP));

    let hex = {
        let (read, input, commit) = (picker.clone(), picker.clone(), picker.clone());
        hex_field(
            move || read.read(hex_of),
            move |text| {
                input.update(|c| c.set_hex(text));
            },
            move |text| {
                commit.update(|c| {
                    c.set_hex(text);
                    c.commit();
                });
            },
        )
    };
    let opacity = {
        let (read, write) = (picker.clone(), picker.clone());
        number_field(
            "%",
            move || read.read(|c| c.color().opacity()),
            move |opacity| {
                write.update(|c| {
                    c.set_opacity(opacity);
                    c.commit();
                });
            },
        )
        .style(move |s| s.apply_if(!alpha, |s| s.hide()))
    };
    let copy = {
        let picker = picker.clone();
        copy_button(move || picker.read_untracked(hex_of))
    };

    v_stack((
        sv_square(picker.clone()),
        h_stack((sliders, sampler(picker)))
        .style(|s| s.items_center().gap(constants::GAP)),
        h_stack((hex, opacity, spacer(), copy)).style(|s| s.items_center().gap(constants::GAP)),
    ))
    .style(|s| s.width_full().gap(constants::GAP))
}

#[cfg(all(feature = "eyedropper", target_os = "macos"))]
fn sampler(picker: &FillPicker) -> impl IntoView {
    eyedropper_button(picker.clone())
}

#[cfg(not(all(feature = "eyedropper", target_os = "macos")))]
fn sampler(_picker: &FillPicker) -> impl IntoView {
    empty()
}

fn stop_row(picker: &FillPicker, index: usize) -> impl IntoView {
    let stop = move |c: &FillPickerController| c.state().gradient.stops.get(index).cloned();

    let position = {
        let (read, write) = (picker.clone(), picker.clone());
        number_field(
            "%",
            move || read.read(|c| stop(c).map_or(0.0, |s| s.position)),
            move |p| {
                write.update(|c| {
                    c.set_stop_position(index, p);
                    c.commit();
                });
            },
        )
    };
    let swatch = {
        let (read, write) = (picker.clone(), picker.clone());
        empty()
            .style(move |s| {
                let rgb = read
                    .read(|c| stop(c))
                    .and_then(|s| crate::color::parse_hex(&s.color).ok())
                    .map(|c| c.rgb())
                    .unwrap_or(crate::color::Rgb::new(0xD9, 0xD9, 0xD9));
                s.size(16.0, 16.0)
                    .border(1.0)
                    .border_color(constants::BORDER)
                    .border_radius(3.0)
                    .background(Color::rgb8(rgb.r, rgb.g, rgb.b))
            })
            .on_event_stop(floem::event::EventListener::PointerUp, move |_| {
                write.update(|c| c.select_stop(index));
            })
    };
    let hex = {
        let (read, input, commit) = (picker.clone(), picker.clone(), picker.clone());
        hex_field(
            move || read.read(|c| stop(c).map(|s| s.color).unwrap_or_default()),
            move |text| {
                input.update(|c| c.set_stop_color(index, text));
            },
            move |text| {
                commit.update(|c| {
                    c.set_stop_color(index, text);
                    c.commit();
                });
            },
        )
    };
    let opacity = {
        let (read, write) = (picker.clone(), picker.clone());
        number_field(
            "%",
            move || read.read(|c| stop(c).map_or(100.0, |s| s.opacity)),
            move |o| {
                write.update(|c| {
                    c.set_stop_opacity(index, o);
                    c.commit();
                });
            },
        )
    };
    let remove = {
        let (read, write) = (picker.clone(), picker.clone());
        icon_button(
            lucide_icons::Icon::Minus,
            move || read.read(|c| c.state().gradient.stops.len() > crate::gradient::MIN_STOPS),
            move || {
                write.update(|c| c.remove_stop(index));
            },
        )
    };

    let selected = picker.clone();
    h_stack((position, swatch, hex, opacity, spacer(), remove)).style(move |s| {
        let on = selected.read(|c| c.selected_stop()) == index;
        s.width_full()
            .items_center()
            .gap(4.0)
            .padding(2.0)
            .border_radius(3.0)
            .apply_if(on, |s| s.background(constants::HOVER))
    })
}

fn gradient_tab(picker: &FillPicker) -> impl IntoView {
    let kinds = {
        let picker = picker.clone();
        h_stack_from_iter(GradientType::ALL.into_iter().map(move |kind| {
            let (read, write) = (picker.clone(), picker.clone());
            choice_button(
                kind.label(),
                move || read.read(|c| c.state().gradient.kind) == kind,
                move || write.update(|c| c.set_gradient_type(kind)),
            )
        }))
        .style(|s| s.gap(2.0))
    };

    let uses_angle = {
        let picker = picker.clone();
        move || picker.read(|c| c.state().gradient.kind.uses_angle())
    };
    let angle = {
        let (read, write) = (picker.clone(), picker.clone());
        let uses_angle = uses_angle.clone();
        h_stack((
            angle_dial(picker.clone()),
            number_field(
                "°",
                move || read.read(|c| c.state().gradient.picker_angle()),
                move |degrees| {
                    write.update(|c| {
                        c.set_gradient_angle(degrees);
                        c.commit();
                    });
                },
            ),
        ))
        .style(move |s| s.items_center().gap(4.0).apply_if(!uses_angle(), |s| s.hide()))
    };
    let center = {
        let (read_x, read_y) = (picker.clone(), picker.clone());
        let (write_x, write_y) = (picker.clone(), picker.clone());
        h_stack((
            caption(|| "X".to_string()),
            number_field(
                "%",
                move || read_x.read(|c| c.state().gradient.center_x),
                move |x| {
                    write_x.update(|c| {
                        let y = c.state().gradient.center_y;
                        c.set_gradient_center(x, y);
                        c.commit();
                    });
                },
            ),
            caption(|| "Y".to_string()),
            number_field(
                "%",
                move || read_y.read(|c| c.state().gradient.center_y),
                move |y| {
                    write_y.update(|c| {
                        let x = c.state().gradient.center_x;
                        c.set_gradient_center(x, y);
                        c.commit();
                    });
                },
            ),
        ))
        .style(move |s| s.items_center().gap(4.0).apply_if(uses_angle(), |s| s.hide()))
    };
    let flip = {
        let picker = picker.clone();
        icon_button(lucide_icons::Icon::ArrowLeftRight, || true, move || {
            picker.update(|c| c.flip_gradient())
        })
    };

    let add = {
        let picker = picker.clone();
        icon_button(lucide_icons::Icon::Plus, || true, move || {
            picker.update(|c| {
                c.add_stop_at(50.0);
            })
        })
    };
    let redistribute = {
        let picker = picker.clone();
        icon_button(
            lucide_icons::Icon::AlignHorizontalDistributeCenter,
            || true,
            move || picker.update(|c| c.redistribute_stops()),
        )
    };

    let rows = {
        let (count, rows) = (picker.clone(), picker.clone());
        dyn_container(
            move || count.read(|c| c.state().gradient.stops.len()),
            move |len| v_stack_from_iter((0..len).map(|i| stop_row(&rows, i))).style(|s| s.width_full().gap(2.0)),
        )
        .style(|s| s.width_full())
    };

    v_stack((
        h_stack((kinds, spacer(), flip)).style(|s| s.width_full().items_center()),
        h_stack((angle, center)).style(|s| s.items_center()),
        gradient_bar(picker.clone()),
        h_stack((caption(|| "Stops".to_string()), spacer(), redistribute, add))
            .style(|s| s.width_full().items_center()),
        rows,
    ))
    .style(|s| s.width_full().gap(constants::GAP))
}

fn media_tab(picker: &FillPicker, kind: FillType) -> impl IntoView {
    let modes: &'static [ScaleMode] = if kind == FillType::Video {
        &ScaleMode::VIDEO
    } else {
        &ScaleMode::IMAGE
    };

    let status = {
        let picker = picker.clone();
        caption(move || {
            picker.read(|c| {
                c.state()
                    .media(kind)
                    .and_then(|m| m.url.clone())
                    .unwrap_or_else(|| format!("No {} selected", kind.as_str()))
            })
        })
        .style(|s| s.width_full().text_ellipsis())
    };
    let mode_buttons = {
        let picker = picker.clone();
        h_stack_from_iter(modes.iter().copied().map(move |mode| {
            let (read, write) = (picker.clone(), picker.clone());
            choice_button(
                mode.label(),
                move || read.read(|c| c.state().media(kind).map(|m| m.scale_mode)) == Some(mode),
                move || {
                    write.update(|c| c.set_scale_mode(kind, mode));
                },
            )
        }))
        .style(|s| s.gap(2.0))
    };
    let scale = {
        let (read, write, visible) = (picker.clone(), picker.clone(), picker.clone());
        h_stack((
            caption(|| "Scale".to_string()),
            number_field(
                "%",
                move || read.read(|c| c.state().media(kind).map_or(50.0, |m| m.scale)),
                move |scale| {
                    write.update(|c| {
                        c.set_scale(kind, scale);
                        c.commit();
                    });
                },
            ),
        ))
        .style(move |s| {
            let tiled = visible.read(|c| c.state().media(kind).map(|m| m.scale_mode))
                == Some(ScaleMode::Tile);
            s.items_center().gap(4.0).apply_if(!tiled, |s| s.hide())
        })
    };

    v_stack((status, mode_buttons, scale)).style(|s| s.width_full().gap(constants::GAP))
}

fn webcam_tab(picker: &FillPicker) -> impl IntoView {
    let status = {
        let picker = picker.clone();
        caption(move || {
            picker.read(|c| {
                c.webcam()
                    .status()
                    .message()
                    .unwrap_or_else(|| "Camera live".to_string())
            })
        })
    };
    let cameras = {
        let (list, select) = (picker.clone(), picker.clone());
        dyn_container(
            move || {
                list.read(|c| {
                    if c.webcam().offers_camera_choice() {
                        c.webcam().cameras().to_vec()
                    } else {
                        Vec::new()
                    }
                })
            },
            move |cameras| {
                let select = select.clone();
                v_stack_from_iter(cameras.into_iter().enumerate().map(move |(i, camera)| {
                    let (read, write) = (select.clone(), select.clone());
                    let id = camera.id.clone();
                    let current = camera.id.clone();
                    label(move || camera.display_label(i))
                        .style(move |s| {
                            let on = read.read(|c| c.webcam().device().map(str::to_owned))
                                == Some(current.clone());
                            s.font_size(constants::INPUT_FONT)
                                .padding(2.0)
                                .cursor(floem::style::CursorStyle::Pointer)
                                .apply_if(on, |s| s.color(constants::ACCENT))
                        })
                        .on_event_stop(floem::event::EventListener::PointerUp, move |_| {
                            write.update(|c| c.select_camera(&id));
                        })
                }))
            },
        )
    };
    // Captures while live; otherwise asks for the camera again.
    let capture = {
        let write = picker.clone();
        icon_button(lucide_icons::Icon::Camera, || true, move || {
            write.update(|c| {
                if c.webcam().is_live() {
                    c.capture_snapshot();
                } else {
                    c.start_camera();
                }
            });
        })
    };

    v_stack((status, cameras, h_stack((spacer(), capture)).style(|s| s.width_full())))
        .style(|s| s.width_full().gap(constants::GAP))
}

/// The picker panel: header plus one tab per fill kind.
pub(crate) fn panel(picker: &FillPicker) -> Stack {
    v_stack((
        header(picker),
        v_stack((
            tab(picker, FillType::Solid, solid_tab(picker)),
            tab(picker, FillType::Gradient, gradient_tab(picker)),
            tab(picker, FillType::Image, media_tab(picker, FillType::Image)),
            tab(picker, FillType::Video, media_tab(picker, FillType::Video)),
            tab(picker, FillType::Webcam, webcam_tab(picker)),
        ))
        .style(|s| s.width_full().padding(constants::PADDING)),
    ))
    .style(|s| {
        s.width(constants::PANEL_WIDTH)
            .background(constants::PANEL_BG)
            .border(1.0)
            .border_color(constants::BORDER)
            .border_radius(constants::RADIUS * 2.0)
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_listeners_run_after_edit() {
        let picker = FillPicker::default();
        let inputs = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(String::new()));
        {
            let (inputs, seen, reader) = (Rc::clone(&inputs), Rc::clone(&seen), picker.clone());
            picker.on_input(move |projection| {
                inputs.set(inputs.get() + 1);
                // Reading back inside a listener must not hit a live borrow.
                let current = reader.serialized();
                assert_eq!(current, projection.to_json());
                seen.replace(current);
            });
        }
        picker.update(|c| c.set_hex("#FF0000"));
        assert_eq!(inputs.get(), 1);
        assert!(seen.borrow().contains("#FF0000"));
    }

    #[test]
    fn test_set_value_notifies_nobody() {
        let picker = FillPicker::default();
        let calls = Rc::new(Cell::new(0));
        {
            let calls = Rc::clone(&calls);
            picker.on_input(move |_| calls.set(calls.get() + 1));
        }
        {
            let calls = Rc::clone(&calls);
            picker.on_change(move |_| calls.set(calls.get() + 1));
        }
        assert!(picker.set_value(r##"{"type":"solid","color":"#00FF00"}"##));
        assert!(!picker.set_value("nonsense"));
        assert_eq!(calls.get(), 0);
        assert_eq!(picker.value().kind(), FillType::Solid);
    }

    #[test]
    fn test_listener_may_edit() {
        let picker = FillPicker::default();
        let changes = Rc::new(Cell::new(0));
        {
            let (changes, editor) = (Rc::clone(&changes), picker.clone());
            picker.on_input(move |_| {
                if changes.get() == 0 {
                    changes.set(1);
                    editor.update(|c| c.commit());
                }
            });
        }
        {
            let changes = Rc::clone(&changes);
            picker.on_change(move |_| changes.set(changes.get() + 1));
        }
        picker.update(|c| c.set_hue(120.0));
        assert_eq!(changes.get(), 2);
    }
}
