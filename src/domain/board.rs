/// Board capability consumed by the game core.
///
/// A board owns `cell_count()` addressable cells and one movable target.
/// It never touches game state; the core tells it where the target is and
/// asks it to translate raw input into a cell.

/// What a raw input event landed on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ClickTarget {
    /// Cell under the pointer, or `None` for clicks outside the grid.
    pub cell: Option<usize>,
    /// Whether that cell currently holds the target.
    pub is_target_cell: bool,
}

impl ClickTarget {
    pub fn outside() -> Self {
        ClickTarget { cell: None, is_target_cell: false }
    }

    pub fn cell(index: usize, is_target_cell: bool) -> Self {
        ClickTarget { cell: Some(index), is_target_cell }
    }
}

pub trait Board {
    /// Raw event type this board knows how to resolve (mouse position, test id, ...).
    type Input;

    /// Total addressable cells. Fixed for the session.
    fn cell_count(&self) -> usize;

    /// Show the target at `index`, implicitly removing it from any previous cell.
    fn place_target_at(&mut self, index: usize);

    /// Hide the target. Idempotent.
    fn remove_target(&mut self);

    /// Map a raw event to a cell and whether that cell holds the target.
    fn resolve_click(&self, input: &Self::Input) -> ClickTarget;
}
