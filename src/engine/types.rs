//! Geometry records shared between the viewer and its highlight plugins.
//!
//! Every rectangle here is expressed in percentages of the page box, so the
//! same record stays valid regardless of zoom, terminal size or rotation.

use ratatui::layout::Rect;

/// A rectangle on a page in percentage coordinates (0.0..=100.0)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PercentRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PercentRect {
    #[must_use]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Smallest rectangle covering both `self` and `other`
    #[must_use]
    pub fn union(&self, other: &PercentRect) -> PercentRect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        PercentRect::new(left, top, right - left, bottom - top)
    }

    /// Map the rectangle onto a grid of terminal cells.
    ///
    /// The result always covers at least one cell and never leaves `canvas`.
    #[must_use]
    pub fn to_cells(&self, canvas: Rect) -> Rect {
        if canvas.width == 0 || canvas.height == 0 {
            return Rect::new(canvas.x, canvas.y, 0, 0);
        }
        let w = f32::from(canvas.width);
        let h = f32::from(canvas.height);

        let x0 = ((self.left.clamp(0.0, 100.0) / 100.0) * w).floor() as u16;
        let y0 = ((self.top.clamp(0.0, 100.0) / 100.0) * h).floor() as u16;
        let x1 = ((self.right().clamp(0.0, 100.0) / 100.0) * w).ceil() as u16;
        let y1 = ((self.bottom().clamp(0.0, 100.0) / 100.0) * h).ceil() as u16;

        let x0 = x0.min(canvas.width - 1);
        let y0 = y0.min(canvas.height - 1);
        let width = x1.saturating_sub(x0).max(1).min(canvas.width - x0);
        let height = y1.saturating_sub(y0).max(1).min(canvas.height - y0);

        Rect::new(canvas.x + x0, canvas.y + y0, width, height)
    }
}

/// Placement of one page's cell grid on screen.
///
/// A page is usually taller than the viewport, so its top row may lie
/// above the screen (`top < visible.y`). Everything drawn for the page
/// must be clipped to `visible`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCanvas {
    pub x: u16,
    /// Screen row of the page's first row; may be negative
    pub top: i32,
    pub width: u16,
    pub height: u16,
    /// Part of the page that is on screen
    pub visible: Rect,
}

impl PageCanvas {
    /// The page grid in page-local cells
    pub fn local(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Screen row of a page-local row
    pub fn screen_row(&self, local_row: u16) -> i32 {
        self.top + i32::from(local_row)
    }

    /// Convert page-local cells to screen cells, clipped to `visible`
    pub fn local_to_screen(&self, cells: Rect) -> Option<Rect> {
        let y0 = self.screen_row(cells.y).max(i32::from(self.visible.y));
        let y1 = self
            .screen_row(cells.y.saturating_add(cells.height))
            .min(i32::from(self.visible.bottom()));
        let x0 = self.x.saturating_add(cells.x).max(self.visible.x);
        let x1 = self
            .x
            .saturating_add(cells.x.saturating_add(cells.width))
            .min(self.visible.right());
        if y1 <= y0 || x1 <= x0 {
            return None;
        }
        Some(Rect::new(x0, y0 as u16, x1 - x0, (y1 - y0) as u16))
    }

    /// Place a percentage rectangle on screen, clipped to `visible`
    pub fn place(&self, rect: &PercentRect) -> Option<Rect> {
        self.local_to_screen(rect.to_cells(self.local()))
    }

    /// Screen position just below `rect`: `(column, row)`
    pub fn anchor_below(&self, rect: &PercentRect) -> (u16, i32) {
        let cells = rect.to_cells(self.local());
        (
            self.x.saturating_add(cells.x),
            self.screen_row(cells.y.saturating_add(cells.height)),
        )
    }
}

/// Where a selection visually appears on one page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightArea {
    pub page_index: usize,
    pub rect: PercentRect,
}

impl HighlightArea {
    #[must_use]
    pub fn new(page_index: usize, rect: PercentRect) -> Self {
        Self { page_index, rect }
    }
}

/// Bounding box of the current selection on the page where it starts
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionRegion {
    pub page_index: usize,
    pub rect: PercentRect,
}

/// Everything the engine knows about a finished selection
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionData {
    pub highlight_areas: Vec<HighlightArea>,
    pub selected_text: String,
    pub selection_region: SelectionRegion,
}

/// Clockwise page rotation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Rotation::None => Rotation::Cw90,
            Rotation::Cw90 => Rotation::Cw180,
            Rotation::Cw180 => Rotation::Cw270,
            Rotation::Cw270 => Rotation::None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Quarter turns swap the page's width and height
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

/// Positionable box for a highlight once rotation has been applied
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaStyle {
    pub rect: PercentRect,
}

/// Rotate a page-relative rectangle into display coordinates.
pub fn rotate_rect(rect: &PercentRect, rotation: Rotation) -> PercentRect {
    let PercentRect {
        left,
        top,
        width,
        height,
    } = *rect;
    match rotation {
        Rotation::None => *rect,
        Rotation::Cw90 => PercentRect::new(100.0 - top - height, left, height, width),
        Rotation::Cw180 => PercentRect::new(100.0 - left - width, 100.0 - top - height, width, height),
        Rotation::Cw270 => PercentRect::new(top, 100.0 - left - width, height, width),
    }
}

/// Style function handed to overlay renderers.
pub fn get_css_properties(area: &HighlightArea, rotation: Rotation) -> AreaStyle {
    AreaStyle {
        rect: rotate_rect(&area.rect, rotation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &PercentRect, b: &PercentRect) -> bool {
        (a.left - b.left).abs() < 1e-4
            && (a.top - b.top).abs() < 1e-4
            && (a.width - b.width).abs() < 1e-4
            && (a.height - b.height).abs() < 1e-4
    }

    #[test]
    fn test_rotation_keeps_unrotated_rect() {
        let rect = PercentRect::new(10.0, 20.0, 30.0, 5.0);
        assert_eq!(rotate_rect(&rect, Rotation::None), rect);
    }

    #[test]
    fn test_quarter_turn_moves_top_left_corner_to_top_right() {
        let rect = PercentRect::new(0.0, 0.0, 50.0, 10.0);
        let rotated = rotate_rect(&rect, Rotation::Cw90);
        assert!(approx(&rotated, &PercentRect::new(90.0, 0.0, 10.0, 50.0)));
    }

    #[test]
    fn test_four_quarter_turns_are_identity() {
        let rect = PercentRect::new(12.5, 40.0, 20.0, 3.0);
        let mut r = rect;
        let mut rotation = Rotation::None;
        for _ in 0..4 {
            rotation = rotation.next();
            r = rotate_rect(&r, Rotation::Cw90);
        }
        assert_eq!(rotation, Rotation::None);
        assert!(approx(&r, &rect));
    }

    #[test]
    fn test_half_turn_mirrors_both_axes() {
        let rect = PercentRect::new(10.0, 20.0, 30.0, 5.0);
        let rotated = rotate_rect(&rect, Rotation::Cw180);
        assert!(approx(&rotated, &PercentRect::new(60.0, 75.0, 30.0, 5.0)));
    }

    #[test]
    fn test_to_cells_covers_at_least_one_cell() {
        let canvas = Rect::new(5, 3, 40, 20);
        let tiny = PercentRect::new(50.0, 50.0, 0.1, 0.1);
        let cells = tiny.to_cells(canvas);
        assert_eq!(cells, Rect::new(25, 13, 1, 1));
    }

    #[test]
    fn test_to_cells_stays_inside_canvas() {
        let canvas = Rect::new(0, 0, 10, 10);
        let overflow = PercentRect::new(95.0, 95.0, 40.0, 40.0);
        let cells = overflow.to_cells(canvas);
        assert!(cells.right() <= canvas.right());
        assert!(cells.bottom() <= canvas.bottom());
        assert_eq!(cells.width, 1);
    }

    #[test]
    fn test_canvas_clips_rows_above_screen() {
        let canvas = PageCanvas {
            x: 2,
            top: -10,
            width: 50,
            height: 40,
            visible: Rect::new(2, 0, 50, 20),
        };
        // local rows 8..12 straddle the top edge of the screen
        let placed = canvas.local_to_screen(Rect::new(5, 8, 10, 4)).unwrap();
        assert_eq!(placed, Rect::new(7, 0, 10, 2));

        // entirely scrolled away
        assert!(canvas.local_to_screen(Rect::new(0, 0, 10, 5)).is_none());
    }

    #[test]
    fn test_anchor_below_is_row_after_rect() {
        let canvas = PageCanvas {
            x: 0,
            top: 3,
            width: 100,
            height: 50,
            visible: Rect::new(0, 3, 100, 50),
        };
        let rect = PercentRect::new(10.0, 20.0, 30.0, 2.0);
        assert_eq!(canvas.anchor_below(&rect), (10, 3 + 11));
    }

    #[test]
    fn test_union_spans_both_rects() {
        let a = PercentRect::new(10.0, 10.0, 10.0, 2.0);
        let b = PercentRect::new(5.0, 14.0, 30.0, 2.0);
        let u = a.union(&b);
        assert!(approx(&u, &PercentRect::new(5.0, 10.0, 30.0, 6.0)));
    }
}
