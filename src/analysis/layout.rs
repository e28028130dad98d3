//! Subplot grid layout and pagination.
//!
//! Panels fill rows left to right with at most `max_cols` columns. When there
//! are more rows than fit on one page, the grid is split into pages of
//! `rows_per_page` rows. Every panel appears on exactly one page.

/// Position of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSlot {
    /// Index into the panel list (selection order).
    pub index: usize,
    pub page: usize,
    /// Row within its page.
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubplotGrid {
    pub panels: usize,
    pub cols: usize,
    /// Total rows across all pages.
    pub rows: usize,
    pub rows_per_page: usize,
}

impl SubplotGrid {
    pub fn new(panels: usize, max_cols: usize, rows_per_page: usize) -> Self {
        let cols = max_cols.max(1).min(panels.max(1));
        let rows = panels.div_ceil(cols);
        Self {
            panels,
            cols,
            rows,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn page_count(&self) -> usize {
        self.rows.div_ceil(self.rows_per_page).max(1)
    }

    pub fn panels_per_page(&self) -> usize {
        self.cols * self.rows_per_page
    }

    /// Rows actually used on `page` (the last page may be shorter).
    pub fn rows_on_page(&self, page: usize) -> usize {
        let first_row = page * self.rows_per_page;
        self.rows.saturating_sub(first_row).min(self.rows_per_page)
    }

    pub fn slot(&self, index: usize) -> Option<PanelSlot> {
        if index >= self.panels {
            return None;
        }
        let global_row = index / self.cols;
        Some(PanelSlot {
            index,
            page: global_row / self.rows_per_page,
            row: global_row % self.rows_per_page,
            col: index % self.cols,
        })
    }

    /// Slots on `page`, in panel order.
    pub fn page(&self, page: usize) -> Vec<PanelSlot> {
        let per_page = self.panels_per_page();
        let start = page * per_page;
        let end = (start + per_page).min(self.panels);
        (start..end).filter_map(|i| self.slot(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_panels_fill_a_four_by_three_page() {
        let grid = SubplotGrid::new(12, 4, 3);
        assert_eq!((grid.cols, grid.rows), (4, 3));
        assert_eq!(grid.page_count(), 1);
        assert_eq!(grid.page(0).len(), 12);
        assert_eq!(grid.slot(5), Some(PanelSlot { index: 5, page: 0, row: 1, col: 1 }));
    }

    #[test]
    fn few_panels_shrink_columns() {
        let grid = SubplotGrid::new(3, 4, 3);
        assert_eq!((grid.cols, grid.rows), (3, 1));
    }

    #[test]
    fn paginates_by_rows() {
        let grid = SubplotGrid::new(10, 2, 2);
        assert_eq!(grid.rows, 5);
        assert_eq!(grid.page_count(), 3);
        assert_eq!(grid.rows_on_page(2), 1);
        let last = grid.page(2);
        assert_eq!(last.iter().map(|s| s.index).collect::<Vec<_>>(), vec![8, 9]);
        assert!(grid.page(3).is_empty());
    }

    #[test]
    fn every_panel_lands_on_exactly_one_page() {
        for n in 1..=12 {
            for cols in 1..=4 {
                for rows in 1..=3 {
                    let grid = SubplotGrid::new(n, cols, rows);
                    let total: usize = (0..grid.page_count()).map(|p| grid.page(p).len()).sum();
                    assert_eq!(total, n, "n={n} cols={cols} rows={rows}");
                }
            }
        }
    }

    #[test]
    fn zero_panels_is_one_empty_page() {
        let grid = SubplotGrid::new(0, 4, 3);
        assert_eq!(grid.page_count(), 1);
        assert!(grid.page(0).is_empty());
    }
}
