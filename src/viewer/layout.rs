//! Vertical layout of pages as one continuous strip of rows
//!
//! Every page gets a one-row header followed by its canvas. A page is
//! `ceil(height_pt / points_per_row)` rows tall (page width when rotated
//! sideways).

use crate::document::PdfDocument;
use crate::engine::{PercentRect, Rotation, rotate_rect};
use ratatui::layout::Rect;

/// Header row drawn above each page
pub const PAGE_HEADER_ROWS: usize = 1;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLayout {
    /// First canvas row of each page (the header sits just above it)
    page_tops: Vec<usize>,
    page_rows: Vec<u16>,
    total_rows: usize,
}

impl PageLayout {
    pub fn compute(document: &PdfDocument, rotation: Rotation, points_per_row: f32) -> Self {
        let mut page_tops = Vec::with_capacity(document.page_count());
        let mut page_rows = Vec::with_capacity(document.page_count());
        let mut cursor = 0usize;

        for page in document.pages() {
            let extent = if rotation.is_sideways() {
                page.width_pt
            } else {
                page.height_pt
            };
            let rows = (extent / points_per_row).ceil().clamp(1.0, f32::from(u16::MAX)) as u16;
            cursor += PAGE_HEADER_ROWS;
            page_tops.push(cursor);
            page_rows.push(rows);
            cursor += usize::from(rows);
        }

        Self {
            page_tops,
            page_rows,
            total_rows: cursor,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn page_count(&self) -> usize {
        self.page_tops.len()
    }

    pub fn page_top(&self, page: usize) -> Option<usize> {
        self.page_tops.get(page).copied()
    }

    pub fn page_rows(&self, page: usize) -> Option<u16> {
        self.page_rows.get(page).copied()
    }

    /// Document row of a percentage rectangle's first cell
    pub fn rect_row(
        &self,
        page: usize,
        rect: &PercentRect,
        rotation: Rotation,
        width: u16,
    ) -> Option<usize> {
        let top = self.page_top(page)?;
        let rows = self.page_rows(page)?;
        let cells = rotate_rect(rect, rotation).to_cells(Rect::new(0, 0, width.max(1), rows));
        Some(top + usize::from(cells.y))
    }

    /// Page whose header or canvas contains `row`
    pub fn page_at_row(&self, row: usize) -> Option<usize> {
        if self.page_tops.is_empty() || row >= self.total_rows {
            return None;
        }
        let idx = self
            .page_tops
            .partition_point(|&top| top.saturating_sub(PAGE_HEADER_ROWS) <= row);
        Some(idx.saturating_sub(1))
    }

    /// Pages that intersect rows `[first, first + count)`
    pub fn visible_pages(&self, first: usize, count: usize) -> impl Iterator<Item = usize> + '_ {
        let last = first.saturating_add(count);
        (0..self.page_tops.len()).filter(move |&p| {
            let start = self.page_tops[p] - PAGE_HEADER_ROWS;
            let end = self.page_tops[p] + usize::from(self.page_rows[p]);
            start < last && end > first
        })
    }
}
