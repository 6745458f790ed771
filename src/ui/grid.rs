/// Terminal board: a rows × cols grid of boxes laid out on screen.
///
/// Cell index is row-major: `index = row * cols + col`.
/// The board only knows where the goblin is drawn and which terminal
/// position belongs to which cell. Layout is recomputed by the renderer
/// whenever the terminal is resized.

use crate::domain::board::{Board, ClickTarget};

/// Blank columns / rows between neighbouring cells.
const GAP_X: usize = 1;
const GAP_Y: usize = 1;

/// Cell box size bounds, in terminal cells.
const MAX_CELL_W: usize = 12;
const MAX_CELL_H: usize = 5;
const MIN_CELL_W: usize = 4;
const MIN_CELL_H: usize = 1;

/// A left-button press at a terminal position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MouseClick {
    pub column: u16,
    pub row: u16,
}

/// Where the grid sits on screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridLayout {
    pub origin_x: usize,
    pub origin_y: usize,
    pub cell_w: usize,
    pub cell_h: usize,
}

impl GridLayout {
    /// Fit a rows × cols grid into the `area_w` × `area_h` rectangle at
    /// (`left`, `top`), centered horizontally.
    pub fn fit(rows: usize, cols: usize, left: usize, top: usize, area_w: usize, area_h: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let cell_w = (area_w.saturating_sub((cols - 1) * GAP_X) / cols).clamp(MIN_CELL_W, MAX_CELL_W);
        let cell_h = (area_h.saturating_sub((rows - 1) * GAP_Y) / rows).clamp(MIN_CELL_H, MAX_CELL_H);

        let grid_w = cols * cell_w + (cols - 1) * GAP_X;
        GridLayout {
            origin_x: left + area_w.saturating_sub(grid_w) / 2,
            origin_y: top,
            cell_w,
            cell_h,
        }
    }
}

pub struct TerminalBoard {
    rows: usize,
    cols: usize,
    target: Option<usize>,
    layout: GridLayout,
}

impl TerminalBoard {
    pub fn new(rows: usize, cols: usize) -> Self {
        TerminalBoard {
            rows,
            cols,
            target: None,
            layout: GridLayout::fit(rows, cols, 0, 0, 80, 24),
        }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn target(&self) -> Option<usize> { self.target }
    pub fn layout(&self) -> GridLayout { self.layout }

    pub fn set_layout(&mut self, layout: GridLayout) {
        self.layout = layout;
    }

    /// Top-left corner of cell `index` on screen.
    pub fn cell_origin(&self, index: usize) -> (usize, usize) {
        let l = self.layout;
        let (r, c) = (index / self.cols.max(1), index % self.cols.max(1));
        (
            l.origin_x + c * (l.cell_w + GAP_X),
            l.origin_y + r * (l.cell_h + GAP_Y),
        )
    }

    /// Cell under a terminal position. Gaps and the area outside the grid
    /// belong to no cell.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<usize> {
        let l = self.layout;
        if x < l.origin_x || y < l.origin_y {
            return None;
        }
        let (dx, dy) = (x - l.origin_x, y - l.origin_y);
        let (stride_x, stride_y) = (l.cell_w + GAP_X, l.cell_h + GAP_Y);
        let (c, r) = (dx / stride_x, dy / stride_y);
        if c >= self.cols || r >= self.rows {
            return None;
        }
        if dx % stride_x >= l.cell_w || dy % stride_y >= l.cell_h {
            return None;
        }
        Some(r * self.cols + c)
    }
}

impl Board for TerminalBoard {
    type Input = MouseClick;

    fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    fn place_target_at(&mut self, index: usize) {
        self.target = Some(index);
    }

    fn remove_target(&mut self) {
        self.target = None;
    }

    fn resolve_click(&self, input: &MouseClick) -> ClickTarget {
        match self.cell_at(input.column as usize, input.row as usize) {
            Some(cell) => ClickTarget::cell(cell, self.target == Some(cell)),
            None => ClickTarget::outside(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> TerminalBoard {
        let mut b = TerminalBoard::new(4, 4);
        b.set_layout(GridLayout { origin_x: 10, origin_y: 2, cell_w: 6, cell_h: 3 });
        b
    }

    fn click(column: u16, row: u16) -> MouseClick {
        MouseClick { column, row }
    }

    #[test]
    fn maps_positions_row_major() {
        let b = board();
        assert_eq!(b.cell_at(10, 2), Some(0));
        assert_eq!(b.cell_at(15, 4), Some(0));
        assert_eq!(b.cell_at(17, 2), Some(1));
        assert_eq!(b.cell_at(10, 6), Some(4));
        assert_eq!(b.cell_at(31, 16), Some(15));
        assert_eq!(b.cell_origin(5), (17, 6));
    }

    #[test]
    fn gaps_and_margins_are_outside() {
        let b = board();
        assert_eq!(b.cell_at(9, 2), None);
        assert_eq!(b.cell_at(16, 2), None);   // column gap
        assert_eq!(b.cell_at(10, 5), None);   // row gap
        assert_eq!(b.cell_at(10, 1), None);
        assert_eq!(b.cell_at(38, 2), None);   // past the last column
        assert_eq!(b.cell_at(10, 17), None);  // past the last row
    }

    #[test]
    fn resolve_reports_target_cell() {
        let mut b = board();
        b.place_target_at(1);
        assert_eq!(b.resolve_click(&click(18, 3)), ClickTarget::cell(1, true));
        assert_eq!(b.resolve_click(&click(11, 3)), ClickTarget::cell(0, false));
        assert_eq!(b.resolve_click(&click(0, 0)), ClickTarget::outside());

        b.remove_target();
        b.remove_target();
        assert_eq!(b.resolve_click(&click(18, 3)), ClickTarget::cell(1, false));
    }

    #[test]
    fn fit_centers_and_clamps() {
        let l = GridLayout::fit(4, 4, 0, 2, 80, 20);
        assert_eq!(l.cell_w, MAX_CELL_W);
        assert_eq!(l.cell_h, 4);   // (20 - 3) / 4
        assert_eq!(l.origin_x, (80 - (4 * 12 + 3)) / 2);
        assert_eq!(l.origin_y, 2);

        let tiny = GridLayout::fit(4, 4, 0, 0, 10, 3);
        assert_eq!(tiny.cell_w, MIN_CELL_W);
        assert_eq!(tiny.cell_h, MIN_CELL_H);
    }

    #[test]
    fn cell_origins_round_trip_through_cell_at() {
        let b = board();
        for i in 0..b.cell_count() {
            let (x, y) = b.cell_origin(i);
            assert_eq!(b.cell_at(x, y), Some(i));
        }
    }
}
