//! Note editor popup
//!
//! Keys go to a [`TextArea`], whose text is mirrored into the draft held by
//! [`AnnotationState`]. `Ctrl+S` adds the note and closes the popup; `Esc`
//! closes it without adding anything. Adding with an empty draft does
//! nothing and the popup stays open.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};
use tui_textarea::TextArea;

use super::state::AnnotationState;
use crate::engine::{InputOutcome, RenderHighlightContentProps, rotate_rect};
use crate::theme::Base16Palette;

const EDITOR_WIDTH: u16 = 44;
const TEXT_ROWS: u16 = 3;
/// Text rows, the button row and two border rows
const EDITOR_HEIGHT: u16 = TEXT_ROWS + 3;
const PLACEHOLDER: &str = "Type your note here...";

/// Empty editor for a new note
pub(super) fn new_editor(palette: &Base16Palette) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(PLACEHOLDER);
    textarea.set_placeholder_style(Style::default().fg(palette.base_03));
    textarea.set_style(Style::default().fg(palette.base_05).bg(palette.base_01));
    textarea.set_cursor_line_style(Style::default());
    textarea
}

pub(super) fn handle_key(
    state: &mut AnnotationState,
    editor: &mut TextArea<'static>,
    key: KeyEvent,
    props: &RenderHighlightContentProps<'_>,
) -> InputOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => {
            if state.commit_note(props.selection).is_some() {
                props.actions.cancel();
            }
        }
        KeyCode::Esc => props.actions.cancel(),
        _ => {
            if editor.input(key) {
                state.set_pending_text(editor.lines().join("\n"));
            }
        }
    }
    // the editor is modal, so motions it does not bind are swallowed too
    InputOutcome::Consumed
}

/// Popup rectangle below the selection, or above it when there is no room
pub(super) fn area(props: &RenderHighlightContentProps<'_>) -> Rect {
    let viewport = props.viewport;
    let width = EDITOR_WIDTH.min(viewport.width);
    let height = EDITOR_HEIGHT.min(viewport.height);

    let region = rotate_rect(&props.selection.selection_region.rect, props.rotation);
    let (x, below) = props.canvas.anchor_below(&region);
    let above = props.canvas.place(&region).map_or(below, |r| i32::from(r.y)) - i32::from(height);

    let fits_below = below + i32::from(height) <= i32::from(viewport.bottom());
    let y = if fits_below || above < i32::from(viewport.y) {
        below
    } else {
        above
    };

    let max_x = viewport.right().saturating_sub(width);
    let max_y = i32::from(viewport.bottom().saturating_sub(height));
    Rect::new(
        x.clamp(viewport.x, max_x),
        y.clamp(i32::from(viewport.y), max_y) as u16,
        width,
        height,
    )
}

pub(super) fn render(
    editor: &TextArea<'static>,
    props: &RenderHighlightContentProps<'_>,
    buf: &mut Buffer,
    palette: &Base16Palette,
) {
    let rect = area(props);
    if rect.width < 4 || rect.height < 3 {
        return;
    }
    Clear.render(rect, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Note ")
        .border_style(Style::default().fg(palette.base_0d))
        .style(Style::default().bg(palette.base_01).fg(palette.base_05));
    let inner = block.inner(rect);
    block.render(rect, buf);

    let text_rows = inner.height.saturating_sub(1).min(TEXT_ROWS);
    let text_area = Rect::new(inner.x, inner.y, inner.width, text_rows);
    editor.render(text_area, buf);

    if inner.height > text_rows {
        let buttons = Line::from(vec![
            Span::styled(
                " Add ^S ",
                Style::default()
                    .fg(palette.base_00)
                    .bg(palette.base_0d)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                " Cancel Esc ",
                Style::default().fg(palette.base_05).bg(palette.base_02),
            ),
        ]);
        let button_row = Rect::new(inner.x, inner.y + text_rows, inner.width, 1);
        Paragraph::new(buttons).render(button_row, buf);
    }
}
