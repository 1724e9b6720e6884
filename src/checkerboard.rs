//! Checkerboard backdrop for anything that shows transparency: the opacity
//! slider, the gradient bar and translucent swatches.

use floem::context::PaintCx;
use floem::kurbo::Rect;
use floem::peniko::Color;
use floem_renderer::Renderer;

use crate::constants;

const LIGHT: Color = Color::rgb8(255, 255, 255);
const DARK: Color = Color::rgb8(204, 204, 204);

/// Rects of the dark cells covering `rect`, clipped to it.
fn dark_cells(rect: Rect, cell: f64) -> impl Iterator<Item = Rect> {
    let cols = (rect.width() / cell).ceil().max(0.0) as usize;
    let rows = (rect.height() / cell).ceil().max(0.0) as usize;
    (0..rows)
        .flat_map(move |row| (0..cols).map(move |col| (row, col)))
        .filter(|(row, col)| (row + col) % 2 == 1)
        .map(move |(row, col)| {
            let x = rect.x0 + col as f64 * cell;
            let y = rect.y0 + row as f64 * cell;
            Rect::new(x, y, (x + cell).min(rect.x1), (y + cell).min(rect.y1))
        })
}

pub(crate) fn paint_checkerboard(cx: &mut PaintCx, rect: Rect) {
    cx.fill(&rect, LIGHT, 0.0);
    for cell in dark_cells(rect, constants::CHECKER_CELL) {
        cx.fill(&cell, DARK, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_cells_alternate_and_clip() {
        let cells: Vec<Rect> = dark_cells(Rect::new(0.0, 0.0, 10.0, 4.0), 4.0).collect();
        assert_eq!(cells, vec![Rect::new(4.0, 0.0, 8.0, 4.0)]);
        let cells: Vec<Rect> = dark_cells(Rect::new(0.0, 0.0, 10.0, 8.0), 4.0).collect();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[2], Rect::new(8.0, 4.0, 10.0, 8.0));
    }
}
