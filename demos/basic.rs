//! Standalone demo: a window with a fill swatch that opens the picker.

use floem::prelude::*;
use floem::window::WindowConfig;
use floem_fill::{fill_dialog, FillPicker, PickerConfig};

fn main() {
    let picker = FillPicker::new(PickerConfig::default())
        .with_value(r##"{"type":"gradient","gradient":{"type":"linear","angle":90,"stops":[{"position":0,"color":"#3B82F6","opacity":100},{"position":100,"color":"#F43F5E","opacity":100}]}}"##);

    let committed = RwSignal::new(picker.serialized());
    picker.on_change(move |fill| committed.set(fill.to_json()));

    floem::Application::new()
        .window(
            move |_| {
                v_stack((
                    label(move || committed.get()).style(|s| s.font_size(11.0).padding(8.0)),
                    fill_dialog(picker.clone()).style(|s| s.flex_grow(1.0).padding(16.0)),
                ))
                .style(|s| s.size_full())
                .on_event_stop(floem::event::EventListener::WindowClosed, |_| {
                    floem::quit_app()
                })
            },
            Some(
                WindowConfig::default()
                    .size((520.0, 640.0))
                    .title("floem-fill"),
            ),
        )
        .run();
}
