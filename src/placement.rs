//! Floating panel placement relative to the trigger that opened it.

use floem::kurbo::{Point, Rect, Size, Vec2};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementOptions {
    /// Gap between trigger and panel.
    pub padding: f64,
    /// Minimum distance between the panel and the viewport edges.
    pub viewport_padding: f64,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            padding: 8.0,
            viewport_padding: 16.0,
        }
    }
}

/// Top-left corner for a panel of `panel` size anchored to `trigger`.
///
/// Prefers opening below the trigger, left-aligned with it. The result is
/// always at least `viewport_padding` from the top and left edges, and from
/// the bottom and right edges too whenever the panel fits at all.
pub fn compute_position(trigger: Rect, panel: Size, viewport: Size, opts: PlacementOptions) -> Point {
    let pad = opts.viewport_padding;
    let space_below = viewport.height - trigger.y1 - pad;
    let space_above = trigger.y0 - pad;

    let top = if space_below >= panel.height || space_below >= space_above {
        trigger.y1 + opts.padding
    } else {
        trigger.y0 - panel.height - opts.padding
    };

    let mut left = trigger.x0;
    if left + panel.width > viewport.width - pad {
        left = viewport.width - panel.width - pad;
    }

    let position = Point::new(
        clamp_pinned(left, pad, viewport.width - panel.width - pad),
        clamp_pinned(top, pad, viewport.height - panel.height - pad),
    );
    tracing::debug!(?trigger, ?panel, ?viewport, ?position, "placed fill panel");
    position
}

/// Clamp into `[min, max]`; if the range is empty the `min` edge wins.
fn clamp_pinned(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Free drag of the panel by its header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelDrag {
    offset: Vec2,
}

impl PanelDrag {
    pub fn begin(panel_origin: Point, pointer: Point) -> Self {
        Self {
            offset: pointer - panel_origin,
        }
    }

    pub fn position(&self, pointer: Point) -> Point {
        pointer - self.offset
    }
}

/// Where the open panel currently sits. Once the user has dragged it,
/// automatic placement is not applied again until the next open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPlacement {
    pub origin: Point,
    pub dragged: bool,
    drag: Option<PanelDrag>,
}

impl PanelPlacement {
    pub fn anchored(origin: Point) -> Self {
        Self {
            origin,
            dragged: false,
            drag: None,
        }
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        self.drag = Some(PanelDrag::begin(self.origin, pointer));
    }

    /// Follow the pointer. Returns `false` if no header drag is active.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        match self.drag {
            Some(drag) => {
                self.origin = drag.position(pointer);
                self.dragged = true;
                true
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Re-anchor after a layout change, unless the user moved the panel.
    pub fn reanchor(&mut self, origin: Point) {
        if !self.dragged {
            self.origin = origin;
        }
    }
}
