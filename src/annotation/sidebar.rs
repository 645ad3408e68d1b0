//! Note list shown beside the document
//!
//! Notes appear in the order they were added. Choosing one asks the viewer
//! to jump to the note's first highlight.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::state::Note;
use crate::engine::EngineActions;
use crate::theme::Base16Palette;

const EMPTY_MESSAGE: &str = "There is no note";
const QUOTE_BAR: &str = "│ ";

#[derive(Debug, Default)]
pub struct NoteSidebar {
    selected: usize,
    /// Screen rows of each rendered note: `(first_row, last_row_exclusive, index)`
    hit_rows: Vec<(u16, u16, usize)>,
    inner_area: Rect,
}

impl NoteSidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize, note_count: usize) {
        self.selected = index.min(note_count.saturating_sub(1));
    }

    /// Ask the viewer to show the note's first highlight
    pub fn jump_to(&self, note: &Note, actions: &EngineActions) {
        if let Some(area) = note.first_area() {
            log::debug!("Sidebar jump to note {}", note.id);
            actions.jump_to_highlight_area(*area);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, notes: &[Note], actions: &EngineActions) -> bool {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select(self.selected + 1, notes.len());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select(self.selected.saturating_sub(1), notes.len());
            }
            KeyCode::Char('g') | KeyCode::Home => self.select(0, notes.len()),
            KeyCode::Char('G') | KeyCode::End => self.select(usize::MAX, notes.len()),
            KeyCode::Enter => {
                if let Some(note) = notes.get(self.selected) {
                    self.jump_to(note, actions);
                }
            }
            _ => return false,
        }
        true
    }

    pub fn handle_mouse(
        &mut self,
        mouse: MouseEvent,
        notes: &[Note],
        actions: &EngineActions,
    ) -> bool {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let pos = Position::new(mouse.column, mouse.row);
        if !self.inner_area.contains(pos) {
            return false;
        }
        let hit = self
            .hit_rows
            .iter()
            .find(|(start, end, _)| (*start..*end).contains(&pos.y))
            .map(|(_, _, index)| *index);
        match hit.and_then(|i| notes.get(i).map(|n| (i, n))) {
            Some((index, note)) => {
                self.selected = index;
                self.jump_to(note, actions);
                true
            }
            None => false,
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        notes: &[Note],
        focused: bool,
        palette: &Base16Palette,
    ) {
        let border_color = if focused {
            palette.base_0d
        } else {
            palette.base_03
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Notes ({}) ", notes.len()))
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(palette.base_00));
        let inner = block.inner(area);
        f.render_widget(block, area);
        self.inner_area = inner;
        self.hit_rows.clear();

        if notes.is_empty() {
            let message = Paragraph::new(Line::from(Span::styled(
                EMPTY_MESSAGE,
                Style::default().fg(palette.base_03),
            )))
            .alignment(Alignment::Center);
            f.render_widget(message, inner);
            return;
        }
        self.selected = self.selected.min(notes.len() - 1);

        let width = usize::from(inner.width.max(3));
        let mut lines: Vec<Line> = Vec::new();
        let mut spans: Vec<(usize, usize)> = Vec::with_capacity(notes.len());
        for (index, note) in notes.iter().enumerate() {
            let start = lines.len();
            lines.extend(note_lines(
                note,
                width,
                focused && index == self.selected,
                palette,
            ));
            spans.push((start, lines.len()));
        }

        let height = usize::from(inner.height);
        let (sel_start, sel_end) = spans[self.selected];
        let offset = if sel_end > height {
            sel_start.min(sel_end - height)
        } else {
            0
        };

        for (index, (start, end)) in spans.iter().enumerate() {
            let first = (*start).max(offset) - offset;
            let last = end.saturating_sub(offset).min(height);
            if first < last {
                self.hit_rows.push((
                    inner.y + first as u16,
                    inner.y + last as u16,
                    index,
                ));
            }
        }

        f.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), inner);
    }
}

fn note_lines(
    note: &Note,
    width: usize,
    selected: bool,
    palette: &Base16Palette,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let row_bg = if selected {
        palette.base_02
    } else {
        palette.base_00
    };

    let quote_style = Style::default()
        .fg(palette.base_04)
        .bg(row_bg)
        .add_modifier(Modifier::ITALIC);
    let bar_style = Style::default().fg(palette.base_03).bg(row_bg);
    let quote_width = width.saturating_sub(QUOTE_BAR.chars().count()).max(1);
    for para in note.quote.lines() {
        for wrapped in textwrap::wrap(para, quote_width) {
            lines.push(Line::from(vec![
                Span::styled(QUOTE_BAR, bar_style),
                Span::styled(wrapped.into_owned(), quote_style),
            ]));
        }
    }

    let body_style = Style::default().fg(palette.base_05).bg(row_bg);
    for para in note.content.lines() {
        if para.is_empty() {
            lines.push(Line::styled(String::new(), body_style));
            continue;
        }
        for wrapped in textwrap::wrap(para, width) {
            lines.push(Line::styled(wrapped.into_owned(), body_style));
        }
    }

    let page = note
        .first_area()
        .map(|a| format!("p.{}", a.page_index + 1))
        .unwrap_or_default();
    lines.push(Line::styled(
        format!("{} · {} · {}", note.id, page, note.created_at.format("%H:%M")),
        Style::default().fg(palette.base_03).bg(row_bg),
    ));
    lines.push(Line::styled(
        "─".repeat(width),
        Style::default().fg(palette.base_02),
    ));
    lines
}
