//! Frame rendering for the viewer

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};

use super::{LineRef, PAGE_HEADER_ROWS, PdfViewer, PopupState};
use crate::engine::{
    HighlightArea, HighlightPlugin, PageCanvas, RenderHighlightsProps, get_css_properties,
    rotate_rect,
};
use crate::theme::Base16Palette;
use unicode_width::UnicodeWidthStr;

impl PdfViewer {
    /// Draw visible pages, the plugin's highlights and any pending popup.
    ///
    /// Plugin actions requested while rendering are queued and only take
    /// effect on the next [`PdfViewer::process_commands`].
    pub fn render(
        &mut self,
        plugin: &dyn HighlightPlugin,
        area: Rect,
        buf: &mut Buffer,
        palette: &Base16Palette,
    ) {
        let resized = self.viewport != area;
        self.viewport = area;
        if resized {
            self.ensure_cursor_visible();
        }
        self.scroll = self.scroll.min(self.max_scroll());

        buf.set_style(area, Style::default().bg(palette.base_00).fg(palette.base_05));

        let visible: Vec<usize> = self
            .layout
            .visible_pages(self.scroll, usize::from(area.height))
            .collect();

        for page_index in visible {
            self.render_page_header(page_index, buf, palette);

            let Some(canvas) = self.page_canvas(page_index) else {
                continue;
            };
            if canvas.visible.is_empty() {
                continue;
            }

            self.render_page_text(page_index, &canvas, buf, palette);

            plugin.render_highlights(
                &RenderHighlightsProps {
                    page_index,
                    rotation: self.rotation,
                    canvas,
                    get_css_properties: &get_css_properties,
                },
                buf,
            );

            self.render_selection(page_index, &canvas, buf, palette);
            self.render_cursor(page_index, &canvas, buf, palette);
        }

        match &self.popup {
            PopupState::Target(selection) => {
                plugin.render_highlight_target(&self.target_props(selection), buf);
            }
            PopupState::Open(selection) => {
                plugin.render_highlight_content(&self.content_props(selection), buf);
            }
            PopupState::Idle | PopupState::Selecting { .. } => {}
        }
    }

    fn render_page_header(&self, page_index: usize, buf: &mut Buffer, palette: &Base16Palette) {
        let Some(top) = self.layout.page_top(page_index) else {
            return;
        };
        let header_row = top - PAGE_HEADER_ROWS;
        if header_row < self.scroll || header_row >= self.scroll + usize::from(self.viewport.height)
        {
            return;
        }
        let y = self.viewport.y + (header_row - self.scroll) as u16;
        let row = Rect::new(self.viewport.x, y, self.viewport.width, 1);
        let style = Style::default().fg(palette.base_03).bg(palette.base_01);
        buf.set_style(row, style);

        let label = format!(
            " Page {} / {} ",
            page_index + 1,
            self.document.page_count()
        );
        let label_width = label.width() as u16;
        let x = self.viewport.x + self.viewport.width.saturating_sub(label_width) / 2;
        buf.set_stringn(x, y, &label, usize::from(self.viewport.width), style);
    }

    fn render_page_text(
        &self,
        page_index: usize,
        canvas: &PageCanvas,
        buf: &mut Buffer,
        palette: &Base16Palette,
    ) {
        let Some(page) = self.document.page(page_index) else {
            return;
        };
        let style = Style::default().fg(palette.base_05);
        for line in &page.lines {
            let cells = rotate_rect(&line.rect, self.rotation).to_cells(canvas.local());
            let row = canvas.screen_row(cells.y);
            if row < i32::from(canvas.visible.y) || row >= i32::from(canvas.visible.bottom()) {
                continue;
            }
            let max_width = usize::from(canvas.width.saturating_sub(cells.x));
            buf.set_stringn(
                canvas.x + cells.x,
                row as u16,
                line.text.trim_end(),
                max_width,
                style,
            );
        }
    }

    fn render_selection(
        &self,
        page_index: usize,
        canvas: &PageCanvas,
        buf: &mut Buffer,
        palette: &Base16Palette,
    ) {
        let style = Style::default().bg(palette.base_0d).fg(palette.base_00);
        let areas: Vec<HighlightArea> = match (&self.popup, self.selecting_range()) {
            (_, Some((start, end))) => self.areas_between(start, end),
            (popup, None) => popup
                .selection()
                .map(|s| s.highlight_areas.clone())
                .unwrap_or_default(),
        };

        for area in areas.iter().filter(|a| a.page_index == page_index) {
            if let Some(cells) = canvas.place(&rotate_rect(&area.rect, self.rotation)) {
                buf.set_style(cells, style);
            }
        }
    }

    fn render_cursor(
        &self,
        page_index: usize,
        canvas: &PageCanvas,
        buf: &mut Buffer,
        palette: &Base16Palette,
    ) {
        let Some(cursor) = self.cursor.filter(|c| c.page == page_index) else {
            return;
        };
        let Some(line) = self
            .document
            .page(page_index)
            .and_then(|p| p.lines.get(cursor.line))
        else {
            return;
        };
        let mut cells = rotate_rect(&line.rect, self.rotation).to_cells(canvas.local());
        cells.height = 1;
        if let Some(screen) = canvas.local_to_screen(cells) {
            buf.set_style(
                screen,
                Style::default()
                    .fg(palette.base_06)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            );
        }
    }

    fn areas_between(&self, start: LineRef, end: LineRef) -> Vec<HighlightArea> {
        super::build_selection(&self.document, start, end)
            .map(|s| s.highlight_areas)
            .unwrap_or_default()
    }
}
