//! Highlight engine contract: geometry records, actions and plugin callbacks

mod plugin;
mod types;

pub use plugin::{
    EngineActions, EngineCommand, HighlightPlugin, InputOutcome, RenderHighlightContentProps,
    RenderHighlightTargetProps, RenderHighlightsProps,
};
pub use types::{
    AreaStyle, HighlightArea, PageCanvas, PercentRect, Rotation, SelectionData, SelectionRegion,
    get_css_properties, rotate_rect,
};
