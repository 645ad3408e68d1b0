//! Callback contract between the viewer and a highlight plugin.
//!
//! The viewer owns selection detection, page layout and navigation. A
//! plugin only draws into the areas the viewer hands it and asks for
//! visibility changes through [`EngineActions`].

use crossterm::event::KeyEvent;
use flume::{Receiver, Sender};
use ratatui::{buffer::Buffer, layout::Rect};

use super::types::{
    AreaStyle, HighlightArea, PageCanvas, Rotation, SelectionData, SelectionRegion,
};

/// Requests a plugin can make of the viewer
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCommand {
    /// Open the content editor for the current selection
    Toggle,
    /// Close the content editor and drop the selection
    Cancel,
    /// Scroll so the given area is visible
    JumpToHighlightArea(HighlightArea),
}

/// Cloneable handle for queuing [`EngineCommand`]s.
///
/// Commands are applied by the viewer between frames, so calling these
/// from inside a render callback never re-enters the viewer.
#[derive(Clone, Debug)]
pub struct EngineActions {
    tx: Sender<EngineCommand>,
}

impl EngineActions {
    pub fn channel() -> (Self, Receiver<EngineCommand>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    pub fn toggle(&self) {
        self.send(EngineCommand::Toggle);
    }

    pub fn cancel(&self) {
        self.send(EngineCommand::Cancel);
    }

    pub fn jump_to_highlight_area(&self, area: HighlightArea) {
        self.send(EngineCommand::JumpToHighlightArea(area));
    }

    fn send(&self, command: EngineCommand) {
        if let Err(e) = self.tx.send(command) {
            log::warn!("Viewer is gone, dropping command: {:?}", e.into_inner());
        }
    }
}

/// Input for [`HighlightPlugin::render_highlight_target`]
pub struct RenderHighlightTargetProps<'a> {
    pub selection_region: SelectionRegion,
    pub rotation: Rotation,
    /// Page the selection starts on
    pub canvas: PageCanvas,
    /// Whole viewer area; transient UI may leave the page but not this
    pub viewport: Rect,
    pub actions: &'a EngineActions,
}

/// Input for [`HighlightPlugin::render_highlight_content`]
pub struct RenderHighlightContentProps<'a> {
    pub selection: &'a SelectionData,
    pub rotation: Rotation,
    pub canvas: PageCanvas,
    pub viewport: Rect,
    pub actions: &'a EngineActions,
}

/// Input for [`HighlightPlugin::render_highlights`]
pub struct RenderHighlightsProps<'a> {
    pub page_index: usize,
    pub rotation: Rotation,
    pub canvas: PageCanvas,
    pub get_css_properties: &'a dyn Fn(&HighlightArea, Rotation) -> AreaStyle,
}

/// Whether a plugin consumed an input event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Consumed,
    Ignored,
}

/// Render callbacks a highlight plugin supplies to the viewer.
pub trait HighlightPlugin {
    /// Floating affordance shown while a selection is pending
    fn render_highlight_target(&self, props: &RenderHighlightTargetProps<'_>, buf: &mut Buffer);

    /// Popup shown after the target was toggled open
    fn render_highlight_content(&self, props: &RenderHighlightContentProps<'_>, buf: &mut Buffer);

    /// Persistent highlights for one page
    fn render_highlights(&self, props: &RenderHighlightsProps<'_>, buf: &mut Buffer);

    /// Key pressed while the target affordance is shown
    fn on_target_key(
        &mut self,
        _key: KeyEvent,
        _props: &RenderHighlightTargetProps<'_>,
    ) -> InputOutcome {
        InputOutcome::Ignored
    }

    /// Key pressed while the content popup is open
    fn on_content_key(
        &mut self,
        _key: KeyEvent,
        _props: &RenderHighlightContentProps<'_>,
    ) -> InputOutcome {
        InputOutcome::Ignored
    }

    /// Screen area of the target affordance, used for mouse hit testing
    fn target_area(&self, _props: &RenderHighlightTargetProps<'_>) -> Option<Rect> {
        None
    }
}
