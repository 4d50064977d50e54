use serde::{Deserialize, Serialize};

/// Page sizes offered when the embedding caller configures none.
pub const DEFAULT_PAGE_SIZES: [usize; 4] = [5, 10, 25, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub current_page: usize,
    pub items_per_page: usize,
}

impl PageWindow {
    /// `current_page` and `items_per_page` are floored at 1.
    pub fn new(current_page: usize, items_per_page: usize) -> Self {
        Self {
            current_page: current_page.max(1),
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.current_page - 1).saturating_mul(self.items_per_page)
    }

    /// Same page size, page clamped into range for `total_count` rows.
    pub fn clamped(&self, total_count: usize) -> Self {
        let last = total_pages(total_count, self.items_per_page).max(1);
        Self {
            current_page: self.current_page.clamp(1, last),
            items_per_page: self.items_per_page,
        }
    }
}

/// `ceil(total_count / items_per_page)`, zero when there are no rows.
pub fn total_pages(total_count: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        return 0;
    }
    total_count.div_ceil(items_per_page)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_count: usize,
}

impl Pagination {
    pub fn new(window: PageWindow, total_count: usize) -> Self {
        let window = window.clamped(total_count);
        Self {
            current_page: window.current_page,
            items_per_page: window.items_per_page,
            total_count,
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.current_page, self.items_per_page)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.items_per_page)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        let pages = self.total_pages();
        pages != 0 && self.current_page < pages
    }

    pub fn absolute_index(&self, row_index: usize) -> usize {
        self.window().offset() + row_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn window_clamps_past_last_page() {
        let window = PageWindow::new(7, 5).clamped(12);
        assert_eq!(window.current_page, 3);

        let empty = PageWindow::new(4, 5).clamped(0);
        assert_eq!(empty.current_page, 1);
    }

    #[test]
    fn pagination_flags_follow_page_bounds() {
        let pagination = Pagination::new(PageWindow::new(2, 10), 25);
        assert!(pagination.has_previous());
        assert!(pagination.has_next());
        assert_eq!(pagination.absolute_index(3), 13);

        let empty = Pagination::new(PageWindow::new(1, 10), 0);
        assert!(!empty.has_previous());
        assert!(!empty.has_next());
        assert_eq!(empty.total_pages(), 0);
    }
}
