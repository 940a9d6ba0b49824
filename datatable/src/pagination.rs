//! Pagination controller.
//!
//! Turns the current page index/size into bounds-checked navigation commands.
//! A command is the next [`PaginationState`]; `None` means "nothing to do",
//! either because the move is blocked at a boundary or because there is at
//! most one page and the controls are not shown.

use crate::state::PaginationState;

/// Pagination controls for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationController {
    state: PaginationState,
    page_count: usize,
    total_items: Option<usize>,
    /// Rows the item range is measured against, when fewer than the total.
    filtered_items: Option<usize>,
    page_size_options: Vec<usize>,
}

/// What the pagination bar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_items: Option<usize>,
    /// One-based "current / total" label, e.g. `"1 / 3"`.
    pub label: String,
    pub can_previous: bool,
    pub can_next: bool,
    pub page_size_options: Vec<usize>,
    /// One-based first and last item shown, when the total is known.
    pub item_range: Option<(usize, usize)>,
}

impl PaginationController {
    pub fn new(state: PaginationState, page_count: usize, total_items: Option<usize>) -> Self {
        Self {
            state,
            page_count,
            total_items,
            filtered_items: None,
            page_size_options: Vec::new(),
        }
    }

    /// Measure the item range against the rows left after filtering.
    pub fn with_filtered_items(mut self, filtered_items: usize) -> Self {
        self.filtered_items = Some(filtered_items);
        self
    }

    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    /// Check if there is more than one page to navigate.
    pub fn is_active(&self) -> bool {
        self.page_count > 1
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    fn last_index(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    fn command(&self, page_index: usize) -> Option<PaginationState> {
        if !self.is_active() || page_index == self.state.page_index {
            return None;
        }
        Some(PaginationState::new(page_index, self.state.page_size))
    }

    /// Jump to a page, clamping out-of-range indices into `[0, page_count)`.
    pub fn go_to_page(&self, page: i64) -> Option<PaginationState> {
        let clamped = page.clamp(0, self.last_index() as i64) as usize;
        self.command(clamped)
    }

    /// Advance one page. No-op on the last page.
    pub fn next_page(&self) -> Option<PaginationState> {
        if self.state.page_index >= self.last_index() {
            return None;
        }
        self.command(self.state.page_index + 1)
    }

    /// Go back one page. No-op on the first page.
    pub fn previous_page(&self) -> Option<PaginationState> {
        let previous = self.state.page_index.checked_sub(1)?;
        self.command(previous.min(self.last_index()))
    }

    pub fn first_page(&self) -> Option<PaginationState> {
        self.command(0)
    }

    pub fn last_page(&self) -> Option<PaginationState> {
        self.command(self.last_index())
    }

    /// Change the page size. Always returns to the first page.
    pub fn set_page_size(&self, page_size: usize) -> Option<PaginationState> {
        if !self.is_active() || page_size == 0 {
            return None;
        }
        if page_size == self.state.page_size && self.state.page_index == 0 {
            return None;
        }
        Some(PaginationState::first(page_size))
    }

    /// The pagination bar, or `None` when it is hidden.
    pub fn view(&self) -> Option<PaginationView> {
        if !self.is_active() {
            return None;
        }
        let index = self.state.page_index.min(self.last_index());
        let item_range = self.filtered_items.or(self.total_items).and_then(|total| {
            let range = PaginationState::new(index, self.state.page_size).row_range(total);
            (!range.is_empty()).then(|| (range.start + 1, range.end))
        });
        Some(PaginationView {
            page_index: index,
            page_size: self.state.page_size,
            page_count: self.page_count,
            total_items: self.total_items,
            label: format!("{} / {}", index + 1, self.page_count),
            can_previous: index > 0,
            can_next: index < self.last_index(),
            page_size_options: self.page_size_options.clone(),
            item_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(page_index: usize, page_count: usize) -> PaginationController {
        PaginationController::new(PaginationState::new(page_index, 10), page_count, Some(page_count * 10))
    }

    #[test]
    fn test_single_page_signals_nothing() {
        let c = controller(0, 1);
        assert!(c.view().is_none());
        assert!(c.go_to_page(3).is_none());
        assert!(c.set_page_size(20).is_none());
    }

    #[test]
    fn test_previous_at_start_is_noop() {
        assert!(controller(0, 3).previous_page().is_none());
        assert_eq!(controller(2, 3).previous_page().map(|s| s.page_index), Some(1));
    }

    #[test]
    fn test_view_label() {
        let view = controller(1, 3).view().unwrap();
        assert_eq!(view.label, "2 / 3");
        assert_eq!(view.item_range, Some((11, 20)));
        assert!(view.can_previous && view.can_next);
    }

    #[test]
    fn test_item_range_uses_filtered_rows() {
        let view = PaginationController::new(PaginationState::new(3, 5), 4, Some(100))
            .with_filtered_items(19)
            .view()
            .unwrap();
        assert_eq!(view.total_items, Some(100));
        assert_eq!(view.item_range, Some((16, 19)));
    }
}
