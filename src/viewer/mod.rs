//! Text-mode PDF viewer that drives highlight plugins
//!
//! The viewer lays pages out as character canvases, keeps a line cursor,
//! turns visual line selections into [`SelectionData`] and calls the
//! plugin's render callbacks. Plugins talk back through
//! [`EngineActions`], whose commands are applied by
//! [`PdfViewer::process_commands`].

mod layout;
mod rendering;

pub use layout::{PAGE_HEADER_ROWS, PageLayout};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use flume::Receiver;
use log::{debug, info};
use ratatui::layout::{Position, Rect};

use crate::document::PdfDocument;
use crate::engine::{
    EngineActions, EngineCommand, HighlightArea, HighlightPlugin, InputOutcome, PageCanvas,
    RenderHighlightContentProps, RenderHighlightTargetProps, Rotation, SelectionData,
    SelectionRegion,
};

/// Rows kept above a jump target
const JUMP_MARGIN_ROWS: usize = 2;
const SCROLL_WHEEL_ROWS: usize = 3;
const DEFAULT_VIEWPORT: Rect = Rect::new(0, 0, 80, 24);

/// A text line in the document: `(page, line index on page)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineRef {
    pub page: usize,
    pub line: usize,
}

impl LineRef {
    pub fn new(page: usize, line: usize) -> Self {
        Self { page, line }
    }
}

/// Content editor lifecycle
#[derive(Clone, Debug, PartialEq)]
pub enum PopupState {
    Idle,
    /// Visual line selection in progress, anchored at a line
    Selecting { anchor: LineRef },
    /// Selection finished; target affordance shown
    Target(SelectionData),
    /// Content editor open
    Open(SelectionData),
}

impl PopupState {
    pub fn selection(&self) -> Option<&SelectionData> {
        match self {
            PopupState::Target(sel) | PopupState::Open(sel) => Some(sel),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PopupState::Open(_))
    }
}

/// Result of routing an event to the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerInput {
    Handled,
    Ignored,
}

pub struct PdfViewer {
    document: PdfDocument,
    layout: PageLayout,
    points_per_row: f32,
    rotation: Rotation,
    scroll: usize,
    cursor: Option<LineRef>,
    popup: PopupState,
    actions: EngineActions,
    commands: Receiver<EngineCommand>,
    viewport: Rect,
}

impl PdfViewer {
    pub fn new(document: PdfDocument, points_per_row: f32) -> Self {
        let (actions, commands) = EngineActions::channel();
        let layout = PageLayout::compute(&document, Rotation::None, points_per_row);
        let cursor = first_line(&document);
        Self {
            document,
            layout,
            points_per_row,
            rotation: Rotation::None,
            scroll: 0,
            cursor,
            popup: PopupState::Idle,
            actions,
            commands,
            viewport: DEFAULT_VIEWPORT,
        }
    }

    pub fn document(&self) -> &PdfDocument {
        &self.document
    }

    /// Handle for plugins and other views to request viewer actions
    pub fn actions(&self) -> &EngineActions {
        &self.actions
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    pub fn cursor(&self) -> Option<LineRef> {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Page shown at the top of the viewport
    pub fn current_page(&self) -> usize {
        self.layout.page_at_row(self.scroll).unwrap_or(0)
    }

    /// Whether key input should bypass global shortcuts
    pub fn captures_input(&self) -> bool {
        self.popup.is_open()
    }

    /// Apply queued plugin commands. Returns true if anything changed.
    pub fn process_commands(&mut self) -> bool {
        let mut changed = false;
        while let Ok(command) = self.commands.try_recv() {
            changed = true;
            match command {
                EngineCommand::Toggle => {
                    let popup = std::mem::replace(&mut self.popup, PopupState::Idle);
                    self.popup = match popup {
                        PopupState::Target(sel) => PopupState::Open(sel),
                        PopupState::Open(_) => PopupState::Idle,
                        other => other,
                    };
                }
                EngineCommand::Cancel => {
                    self.popup = PopupState::Idle;
                }
                EngineCommand::JumpToHighlightArea(area) => {
                    self.jump_to_highlight_area(&area);
                }
            }
        }
        changed
    }

    /// Scroll so `area` is near the top of the viewport and put the cursor
    /// on the closest line.
    pub fn jump_to_highlight_area(&mut self, area: &HighlightArea) {
        let page = area.page_index.min(self.layout.page_count().saturating_sub(1));
        let Some(row) = self
            .layout
            .rect_row(page, &area.rect, self.rotation, self.page_width())
        else {
            return;
        };
        info!("Jumping to highlight on page {}", page + 1);

        self.popup = PopupState::Idle;
        self.scroll = row.saturating_sub(JUMP_MARGIN_ROWS).min(self.max_scroll());

        if let Some(doc_page) = self.document.page(page) {
            let closest = doc_page
                .lines
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    (a.rect.top - area.rect.top)
                        .abs()
                        .total_cmp(&(b.rect.top - area.rect.top).abs())
                })
                .map(|(i, _)| LineRef::new(page, i));
            if closest.is_some() {
                self.cursor = closest;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, plugin: &mut dyn HighlightPlugin) -> ViewerInput {
        let result = match self.popup.clone() {
            PopupState::Open(selection) => {
                let props = self.content_props(&selection);
                if plugin.on_content_key(key, &props) == InputOutcome::Ignored
                    && key.code == KeyCode::Esc
                {
                    self.popup = PopupState::Idle;
                }
                // the editor is modal
                ViewerInput::Handled
            }
            PopupState::Target(selection) => {
                let props = self.target_props(&selection);
                if plugin.on_target_key(key, &props) == InputOutcome::Consumed {
                    ViewerInput::Handled
                } else if key.code == KeyCode::Esc {
                    self.popup = PopupState::Idle;
                    ViewerInput::Handled
                } else {
                    let handled = self.handle_navigation_key(key);
                    if handled == ViewerInput::Handled {
                        self.popup = PopupState::Idle;
                    }
                    handled
                }
            }
            PopupState::Selecting { anchor } => match key.code {
                KeyCode::Esc | KeyCode::Char('v') => {
                    self.popup = PopupState::Idle;
                    ViewerInput::Handled
                }
                KeyCode::Enter => {
                    self.finish_selection(anchor);
                    ViewerInput::Handled
                }
                _ => self.handle_navigation_key(key),
            },
            PopupState::Idle => match key.code {
                KeyCode::Char('v') => {
                    if let Some(cursor) = self.cursor {
                        self.popup = PopupState::Selecting { anchor: cursor };
                    }
                    ViewerInput::Handled
                }
                KeyCode::Enter => {
                    if let Some(cursor) = self.cursor {
                        self.finish_selection(cursor);
                    }
                    ViewerInput::Handled
                }
                KeyCode::Char('r') => {
                    self.rotate();
                    ViewerInput::Handled
                }
                _ => self.handle_navigation_key(key),
            },
        };
        self.process_commands();
        result
    }

    pub fn handle_mouse(
        &mut self,
        mouse: MouseEvent,
        plugin: &mut dyn HighlightPlugin,
    ) -> ViewerInput {
        let pos = Position::new(mouse.column, mouse.row);
        if !self.viewport.contains(pos) {
            return ViewerInput::Ignored;
        }
        let result = match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.scroll = (self.scroll + SCROLL_WHEEL_ROWS).min(self.max_scroll());
                ViewerInput::Handled
            }
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(SCROLL_WHEEL_ROWS);
                ViewerInput::Handled
            }
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(pos, plugin),
            _ => ViewerInput::Ignored,
        };
        self.process_commands();
        result
    }

    fn handle_click(&mut self, pos: Position, plugin: &mut dyn HighlightPlugin) -> ViewerInput {
        if self.popup.is_open() {
            return ViewerInput::Handled;
        }
        if let PopupState::Target(selection) = self.popup.clone() {
            let props = self.target_props(&selection);
            if plugin
                .target_area(&props)
                .is_some_and(|area| area.contains(pos))
            {
                // a click activates the affordance the same way Enter does
                plugin.on_target_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &props);
                return ViewerInput::Handled;
            }
            self.popup = PopupState::Idle;
        }

        let row = self.scroll + usize::from(pos.y - self.viewport.y);
        if let Some(line) = self.line_at_row(row) {
            self.cursor = Some(line);
        }
        ViewerInput::Handled
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> ViewerInput {
        let half_page = usize::from(self.viewport.height / 2).max(1);
        match (key.code, key.modifiers) {
            (KeyCode::Char('j') | KeyCode::Down, _) => self.move_cursor(1),
            (KeyCode::Char('k') | KeyCode::Up, _) => self.move_cursor(-1),
            (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
                self.move_cursor(half_page as isize)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
                self.move_cursor(-(half_page as isize))
            }
            (KeyCode::Char('g') | KeyCode::Home, _) => {
                self.cursor = first_line(&self.document);
                self.scroll = 0;
            }
            (KeyCode::Char('G') | KeyCode::End, _) => {
                self.cursor = last_line(&self.document);
                self.scroll = self.max_scroll();
            }
            (KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right, _) => {
                self.goto_page(self.current_page() + 1)
            }
            (KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left, _) => {
                self.goto_page(self.current_page().saturating_sub(1))
            }
            _ => return ViewerInput::Ignored,
        }
        self.ensure_cursor_visible();
        ViewerInput::Handled
    }

    fn rotate(&mut self) {
        self.rotation = self.rotation.next();
        debug!("Rotation set to {} degrees", self.rotation.degrees());
        self.layout = PageLayout::compute(&self.document, self.rotation, self.points_per_row);
        self.scroll = self.scroll.min(self.max_scroll());
        self.ensure_cursor_visible();
    }

    fn goto_page(&mut self, page: usize) {
        let page = page.min(self.layout.page_count().saturating_sub(1));
        if let Some(top) = self.layout.page_top(page) {
            self.scroll = top
                .saturating_sub(PAGE_HEADER_ROWS)
                .min(self.max_scroll());
        }
        let first_on_page = (page..self.document.page_count())
            .find(|&p| self.document.page(p).is_some_and(|pg| !pg.lines.is_empty()))
            .map(|p| LineRef::new(p, 0));
        if first_on_page.is_some() {
            self.cursor = first_on_page;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let Some(mut cursor) = self.cursor else {
            return;
        };
        let step = if delta >= 0 { next_line } else { prev_line };
        for _ in 0..delta.unsigned_abs() {
            match step(&self.document, cursor) {
                Some(line) => cursor = line,
                None => break,
            }
        }
        self.cursor = Some(cursor);
    }

    fn ensure_cursor_visible(&mut self) {
        let Some(row) = self.cursor.and_then(|c| self.line_row(c)) else {
            return;
        };
        let height = usize::from(self.viewport.height).max(1);
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn max_scroll(&self) -> usize {
        self.layout
            .total_rows()
            .saturating_sub(usize::from(self.viewport.height))
    }

    fn page_width(&self) -> u16 {
        self.viewport.width.max(1)
    }

    /// Document row a text line is drawn on
    pub fn line_row(&self, line: LineRef) -> Option<usize> {
        let text_line = self.document.page(line.page)?.lines.get(line.line)?;
        self.layout
            .rect_row(line.page, &text_line.rect, self.rotation, self.page_width())
    }

    fn line_at_row(&self, row: usize) -> Option<LineRef> {
        let page = self.layout.page_at_row(row)?;
        let lines = &self.document.page(page)?.lines;
        (0..lines.len())
            .map(|i| LineRef::new(page, i))
            .find(|&l| self.line_row(l) == Some(row))
    }

    fn finish_selection(&mut self, anchor: LineRef) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let (start, end) = if anchor <= cursor {
            (anchor, cursor)
        } else {
            (cursor, anchor)
        };
        match build_selection(&self.document, start, end) {
            Some(selection) => {
                debug!(
                    "Selection finished: {} areas, {} chars",
                    selection.highlight_areas.len(),
                    selection.selected_text.chars().count()
                );
                self.popup = PopupState::Target(selection);
            }
            None => self.popup = PopupState::Idle,
        }
    }

    /// Lines covered by the selection in progress, if any
    pub fn selecting_range(&self) -> Option<(LineRef, LineRef)> {
        let PopupState::Selecting { anchor } = self.popup else {
            return None;
        };
        let cursor = self.cursor?;
        Some(if anchor <= cursor {
            (anchor, cursor)
        } else {
            (cursor, anchor)
        })
    }

    /// On-screen placement of a page for the current viewport
    pub fn page_canvas(&self, page: usize) -> Option<PageCanvas> {
        let top = self.layout.page_top(page)?;
        let rows = self.layout.page_rows(page)?;
        let screen_top = i32::from(self.viewport.y) + top as i32 - self.scroll as i32;

        let vis_top = screen_top.max(i32::from(self.viewport.y));
        let vis_bottom = (screen_top + i32::from(rows)).min(i32::from(self.viewport.bottom()));
        let visible = if vis_bottom > vis_top {
            Rect::new(
                self.viewport.x,
                vis_top as u16,
                self.viewport.width,
                (vis_bottom - vis_top) as u16,
            )
        } else {
            Rect::new(self.viewport.x, self.viewport.y, 0, 0)
        };

        Some(PageCanvas {
            x: self.viewport.x,
            top: screen_top,
            width: self.page_width(),
            height: rows,
            visible,
        })
    }

    fn target_props<'a>(&'a self, selection: &SelectionData) -> RenderHighlightTargetProps<'a> {
        RenderHighlightTargetProps {
            selection_region: selection.selection_region,
            rotation: self.rotation,
            canvas: self.selection_canvas(selection),
            viewport: self.viewport,
            actions: &self.actions,
        }
    }

    fn content_props<'a>(&'a self, selection: &'a SelectionData) -> RenderHighlightContentProps<'a> {
        RenderHighlightContentProps {
            selection,
            rotation: self.rotation,
            canvas: self.selection_canvas(selection),
            viewport: self.viewport,
            actions: &self.actions,
        }
    }

    fn selection_canvas(&self, selection: &SelectionData) -> PageCanvas {
        self.page_canvas(selection.selection_region.page_index)
            .unwrap_or(PageCanvas {
                x: self.viewport.x,
                top: i32::from(self.viewport.y),
                width: self.page_width(),
                height: self.viewport.height,
                visible: self.viewport,
            })
    }
}

fn first_line(document: &PdfDocument) -> Option<LineRef> {
    document
        .pages()
        .iter()
        .position(|p| !p.lines.is_empty())
        .map(|page| LineRef::new(page, 0))
}

fn last_line(document: &PdfDocument) -> Option<LineRef> {
    document
        .pages()
        .iter()
        .rposition(|p| !p.lines.is_empty())
        .map(|page| LineRef::new(page, document.pages()[page].lines.len() - 1))
}

fn next_line(document: &PdfDocument, at: LineRef) -> Option<LineRef> {
    let page = document.page(at.page)?;
    if at.line + 1 < page.lines.len() {
        return Some(LineRef::new(at.page, at.line + 1));
    }
    (at.page + 1..document.page_count())
        .find(|&p| document.page(p).is_some_and(|pg| !pg.lines.is_empty()))
        .map(|p| LineRef::new(p, 0))
}

fn prev_line(document: &PdfDocument, at: LineRef) -> Option<LineRef> {
    if at.line > 0 {
        return Some(LineRef::new(at.page, at.line - 1));
    }
    (0..at.page)
        .rev()
        .find(|&p| document.page(p).is_some_and(|pg| !pg.lines.is_empty()))
        .map(|p| LineRef::new(p, document.pages()[p].lines.len() - 1))
}

/// Selection over every line from `start` to `end` inclusive
pub fn build_selection(
    document: &PdfDocument,
    start: LineRef,
    end: LineRef,
) -> Option<SelectionData> {
    let mut highlight_areas = Vec::new();
    let mut texts = Vec::new();

    for page_index in start.page..=end.page {
        let Some(page) = document.page(page_index) else {
            continue;
        };
        let first = if page_index == start.page { start.line } else { 0 };
        let last = if page_index == end.page {
            end.line.min(page.lines.len().saturating_sub(1))
        } else {
            page.lines.len().saturating_sub(1)
        };
        for line in page.lines.iter().skip(first).take((last + 1).saturating_sub(first)) {
            highlight_areas.push(HighlightArea::new(page_index, line.rect));
            texts.push(line.text.trim());
        }
    }

    let first = highlight_areas.first()?;
    let region_rect = highlight_areas
        .iter()
        .filter(|a| a.page_index == first.page_index)
        .fold(first.rect, |acc, a| acc.union(&a.rect));

    Some(SelectionData {
        selection_region: SelectionRegion {
            page_index: first.page_index,
            rect: region_rect,
        },
        highlight_areas,
        selected_text: texts.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PageText, TextLine};
    use crate::engine::PercentRect;

    fn line(text: &str, top: f32) -> TextLine {
        TextLine::new(text, PercentRect::new(10.0, top, 50.0, 1.5))
    }

    /// Two 240pt pages (20 rows each at 12pt/row) and an empty third page
    fn sample_document() -> PdfDocument {
        PdfDocument::from_pages(
            Some("Sample".to_string()),
            vec![
                PageText::new(
                    600.0,
                    240.0,
                    vec![
                        line("alpha", 10.0),
                        line("beta", 30.0),
                        line("gamma", 50.0),
                    ],
                ),
                PageText::new(600.0, 240.0, vec![line("delta", 20.0), line("epsilon", 80.0)]),
                PageText::new(600.0, 240.0, Vec::new()),
            ],
        )
    }

    struct NullPlugin;

    impl HighlightPlugin for NullPlugin {
        fn render_highlight_target(
            &self,
            _props: &RenderHighlightTargetProps<'_>,
            _buf: &mut ratatui::buffer::Buffer,
        ) {
        }
        fn render_highlight_content(
            &self,
            _props: &RenderHighlightContentProps<'_>,
            _buf: &mut ratatui::buffer::Buffer,
        ) {
        }
        fn render_highlights(
            &self,
            _props: &crate::engine::RenderHighlightsProps<'_>,
            _buf: &mut ratatui::buffer::Buffer,
        ) {
        }
        fn on_target_key(
            &mut self,
            key: KeyEvent,
            props: &RenderHighlightTargetProps<'_>,
        ) -> InputOutcome {
            if key.code == KeyCode::Enter {
                props.actions.toggle();
                InputOutcome::Consumed
            } else {
                InputOutcome::Ignored
            }
        }
    }

    /// Target affordance fixed at one screen rectangle
    struct FixedTarget(Rect);

    impl HighlightPlugin for FixedTarget {
        fn render_highlight_target(
            &self,
            _props: &RenderHighlightTargetProps<'_>,
            _buf: &mut ratatui::buffer::Buffer,
        ) {
        }
        fn render_highlight_content(
            &self,
            _props: &RenderHighlightContentProps<'_>,
            _buf: &mut ratatui::buffer::Buffer,
        ) {
        }
        fn render_highlights(
            &self,
            _props: &crate::engine::RenderHighlightsProps<'_>,
            _buf: &mut ratatui::buffer::Buffer,
        ) {
        }
        fn on_target_key(
            &mut self,
            key: KeyEvent,
            props: &RenderHighlightTargetProps<'_>,
        ) -> InputOutcome {
            NullPlugin.on_target_key(key, props)
        }
        fn target_area(&self, _props: &RenderHighlightTargetProps<'_>) -> Option<Rect> {
            Some(self.0)
        }
    }

    fn click(viewer: &mut PdfViewer, plugin: &mut dyn HighlightPlugin, column: u16, row: u16) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        viewer.handle_mouse(mouse, plugin);
    }

    fn press(viewer: &mut PdfViewer, code: KeyCode) {
        viewer.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &mut NullPlugin);
    }

    #[test]
    fn test_cursor_starts_on_first_line_and_crosses_pages() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        assert_eq!(viewer.cursor(), Some(LineRef::new(0, 0)));

        for _ in 0..3 {
            press(&mut viewer, KeyCode::Char('j'));
        }
        assert_eq!(viewer.cursor(), Some(LineRef::new(1, 0)));

        press(&mut viewer, KeyCode::Char('k'));
        assert_eq!(viewer.cursor(), Some(LineRef::new(0, 2)));

        press(&mut viewer, KeyCode::Char('G'));
        assert_eq!(viewer.cursor(), Some(LineRef::new(1, 1)));
        press(&mut viewer, KeyCode::Char('j'));
        assert_eq!(viewer.cursor(), Some(LineRef::new(1, 1)));
    }

    #[test]
    fn test_visual_selection_builds_areas_and_text() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        press(&mut viewer, KeyCode::Char('j'));
        press(&mut viewer, KeyCode::Char('v'));
        press(&mut viewer, KeyCode::Char('j'));
        press(&mut viewer, KeyCode::Char('j'));
        assert_eq!(
            viewer.selecting_range(),
            Some((LineRef::new(0, 1), LineRef::new(1, 0)))
        );
        press(&mut viewer, KeyCode::Enter);

        let selection = viewer.popup().selection().cloned().unwrap();
        assert_eq!(selection.selected_text, "beta\ngamma\ndelta");
        let pages: Vec<_> = selection.highlight_areas.iter().map(|a| a.page_index).collect();
        assert_eq!(pages, vec![0, 0, 1]);
        assert_eq!(selection.selection_region.page_index, 0);
        assert_eq!(selection.selection_region.rect.top, 30.0);
        assert_eq!(selection.selection_region.rect.bottom(), 51.5);
    }

    #[test]
    fn test_backwards_selection_is_normalised() {
        let document = sample_document();
        let forward = build_selection(&document, LineRef::new(0, 0), LineRef::new(0, 2));
        let mut viewer = PdfViewer::new(document, 12.0);
        press(&mut viewer, KeyCode::Char('j'));
        press(&mut viewer, KeyCode::Char('j'));
        press(&mut viewer, KeyCode::Char('v'));
        press(&mut viewer, KeyCode::Char('k'));
        press(&mut viewer, KeyCode::Char('k'));
        press(&mut viewer, KeyCode::Enter);
        assert_eq!(viewer.popup().selection(), forward.as_ref());
    }

    #[test]
    fn test_popup_state_machine() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        press(&mut viewer, KeyCode::Enter);
        assert!(matches!(viewer.popup(), PopupState::Target(_)));

        // plugin toggles on Enter
        press(&mut viewer, KeyCode::Enter);
        assert!(viewer.popup().is_open());

        // unhandled Esc closes the editor
        press(&mut viewer, KeyCode::Esc);
        assert_eq!(viewer.popup(), &PopupState::Idle);

        press(&mut viewer, KeyCode::Char('v'));
        press(&mut viewer, KeyCode::Esc);
        assert_eq!(viewer.popup(), &PopupState::Idle);
    }

    #[test]
    fn test_click_on_target_opens_editor() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        let mut plugin = FixedTarget(Rect::new(10, 4, 16, 1));
        press(&mut viewer, KeyCode::Enter);

        click(&mut viewer, &mut plugin, 12, 4);
        assert!(viewer.popup().is_open());
        assert_eq!(viewer.cursor(), Some(LineRef::new(0, 0)));
    }

    #[test]
    fn test_click_outside_target_drops_selection() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        let mut plugin = FixedTarget(Rect::new(10, 4, 16, 1));
        press(&mut viewer, KeyCode::Enter);
        assert!(matches!(viewer.popup(), PopupState::Target(_)));

        // "gamma" is drawn on row 11: page header, then 50% of 20 rows
        click(&mut viewer, &mut plugin, 5, 11);
        assert_eq!(viewer.popup(), &PopupState::Idle);
        assert_eq!(viewer.cursor(), Some(LineRef::new(0, 2)));
    }

    #[test]
    fn test_navigation_dismisses_target() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        press(&mut viewer, KeyCode::Enter);
        press(&mut viewer, KeyCode::Char('j'));
        assert_eq!(viewer.popup(), &PopupState::Idle);
        assert_eq!(viewer.cursor(), Some(LineRef::new(0, 1)));
    }

    #[test]
    fn test_cancel_command_closes_editor() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        press(&mut viewer, KeyCode::Enter);
        press(&mut viewer, KeyCode::Enter);
        viewer.actions().cancel();
        assert!(viewer.process_commands());
        assert_eq!(viewer.popup(), &PopupState::Idle);
        assert!(!viewer.process_commands());
    }

    #[test]
    fn test_jump_moves_scroll_and_cursor() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        let area = HighlightArea::new(1, PercentRect::new(10.0, 80.0, 50.0, 1.5));
        viewer.actions().jump_to_highlight_area(area);
        viewer.process_commands();

        assert_eq!(viewer.cursor(), Some(LineRef::new(1, 1)));
        // page 1 starts at row 22; 80% of 20 rows is row 16
        let row = viewer.line_row(LineRef::new(1, 1)).unwrap();
        assert_eq!(row, 38);
        assert_eq!(viewer.scroll(), (row - JUMP_MARGIN_ROWS).min(viewer.max_scroll()));
    }

    #[test]
    fn test_page_keys_skip_empty_pages_for_cursor() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        press(&mut viewer, KeyCode::Char('n'));
        assert_eq!(viewer.cursor(), Some(LineRef::new(1, 0)));
        press(&mut viewer, KeyCode::Char('n'));
        assert_eq!(viewer.cursor(), Some(LineRef::new(1, 0)));
        assert_eq!(viewer.current_page(), 1);
    }

    #[test]
    fn test_rotation_relayouts_pages() {
        let mut viewer = PdfViewer::new(sample_document(), 12.0);
        assert_eq!(viewer.layout().page_rows(0), Some(20));
        press(&mut viewer, KeyCode::Char('r'));
        assert_eq!(viewer.rotation(), Rotation::Cw90);
        assert_eq!(viewer.layout().page_rows(0), Some(50));
    }

    #[test]
    fn test_empty_document_has_no_cursor() {
        let mut viewer = PdfViewer::new(PdfDocument::from_pages(None, Vec::new()), 12.0);
        assert_eq!(viewer.cursor(), None);
        press(&mut viewer, KeyCode::Enter);
        press(&mut viewer, KeyCode::Char('j'));
        assert_eq!(viewer.popup(), &PopupState::Idle);
    }
}
