//! "Add a note" affordance shown under a finished selection

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};

use crate::engine::{RenderHighlightTargetProps, rotate_rect};
use crate::theme::Base16Palette;
use unicode_width::UnicodeWidthStr;

const LABEL: &str = " [+] Add a note ";

pub(super) fn is_activation(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Char('a'))
        && !key.modifiers.contains(KeyModifiers::CONTROL)
}

/// One row directly below the selection, kept inside the viewport
pub(super) fn area(props: &RenderHighlightTargetProps<'_>) -> Option<Rect> {
    let viewport = props.viewport;
    if viewport.is_empty() {
        return None;
    }
    let region = rotate_rect(&props.selection_region.rect, props.rotation);
    let (x, row) = props.canvas.anchor_below(&region);

    let width = (LABEL.width() as u16).min(viewport.width);
    let max_x = viewport.right().saturating_sub(width);
    let x = x.clamp(viewport.x, max_x);
    let y = row.clamp(i32::from(viewport.y), i32::from(viewport.bottom()) - 1) as u16;

    Some(Rect::new(x, y, width, 1))
}

pub(super) fn render(
    props: &RenderHighlightTargetProps<'_>,
    buf: &mut Buffer,
    palette: &Base16Palette,
) {
    let Some(rect) = area(props) else {
        return;
    };
    let style = Style::default()
        .fg(palette.base_00)
        .bg(palette.base_07)
        .add_modifier(Modifier::BOLD);
    buf.set_style(rect, style);
    buf.set_stringn(rect.x, rect.y, LABEL, usize::from(rect.width), style);
}
