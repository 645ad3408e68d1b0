//! Note annotations for the PDF viewer
//!
//! [`AnnotationComponent`] owns the session's notes and plugs into the
//! viewer as a [`HighlightPlugin`]: it draws the "Add a note" affordance,
//! the note editor popup and the highlight overlay. The note list is a
//! separate view, [`NoteSidebar`].

mod content;
mod overlay;
mod sidebar;
mod state;
mod target;

pub use sidebar::NoteSidebar;
pub use state::{AnnotationState, Note, NoteId, StateChange};

use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect, style::Color};
use tui_textarea::TextArea;

use crate::engine::{
    HighlightPlugin, InputOutcome, RenderHighlightContentProps, RenderHighlightTargetProps,
    RenderHighlightsProps,
};
use crate::theme::Base16Palette;

/// Highlight colour and opacity used by the overlay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightStyle {
    pub color: Color,
    pub opacity: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Color::Rgb(0xFF, 0xFF, 0x00),
            opacity: 0.4,
        }
    }
}

pub struct AnnotationComponent {
    state: AnnotationState,
    /// Editor behind the content popup, replaced each time it opens
    editor: TextArea<'static>,
    highlight: HighlightStyle,
    palette: &'static Base16Palette,
}

impl AnnotationComponent {
    pub fn new(highlight: HighlightStyle, palette: &'static Base16Palette) -> Self {
        Self {
            state: AnnotationState::new(),
            editor: content::new_editor(palette),
            highlight,
            palette,
        }
    }

    pub fn state(&self) -> &AnnotationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AnnotationState {
        &mut self.state
    }
}

impl HighlightPlugin for AnnotationComponent {
    fn render_highlight_target(&self, props: &RenderHighlightTargetProps<'_>, buf: &mut Buffer) {
        target::render(props, buf, self.palette);
    }

    fn render_highlight_content(&self, props: &RenderHighlightContentProps<'_>, buf: &mut Buffer) {
        content::render(&self.editor, props, buf, self.palette);
    }

    fn render_highlights(&self, props: &RenderHighlightsProps<'_>, buf: &mut Buffer) {
        overlay::render(&self.state, props, buf, &self.highlight, self.palette);
    }

    fn on_target_key(
        &mut self,
        key: KeyEvent,
        props: &RenderHighlightTargetProps<'_>,
    ) -> InputOutcome {
        if target::is_activation(&key) {
            // start every note from an empty editor
            self.editor = content::new_editor(self.palette);
            self.state.set_pending_text("");
            props.actions.toggle();
            InputOutcome::Consumed
        } else {
            InputOutcome::Ignored
        }
    }

    fn on_content_key(
        &mut self,
        key: KeyEvent,
        props: &RenderHighlightContentProps<'_>,
    ) -> InputOutcome {
        content::handle_key(&mut self.state, &mut self.editor, key, props)
    }

    fn target_area(&self, props: &RenderHighlightTargetProps<'_>) -> Option<Rect> {
        target::area(props)
    }
}
