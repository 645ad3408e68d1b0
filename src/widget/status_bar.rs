//! Bottom status line: key hints plus a short-lived message

use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Base16Palette;

pub const MESSAGE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct HudMessage {
    pub message: String,
    pub expires_at: Instant,
}

impl HudMessage {
    pub fn new(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: Instant::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct StatusBar {
    hud: Option<HudMessage>,
}

impl StatusBar {
    pub fn show(&mut self, message: impl Into<String>) {
        self.hud = Some(HudMessage::new(message, MESSAGE_DURATION));
    }

    pub fn message(&self) -> Option<&str> {
        self.hud.as_ref().map(|h| h.message.as_str())
    }

    /// Drop an expired message. Returns true if the bar changed.
    pub fn tick(&mut self) -> bool {
        if self.hud.as_ref().is_some_and(HudMessage::is_expired) {
            self.hud = None;
            return true;
        }
        false
    }

    pub fn render(&self, hints: &str, area: Rect, buf: &mut Buffer, palette: &Base16Palette) {
        let base = Style::default().fg(palette.base_04).bg(palette.base_01);
        buf.set_style(area, base);
        Paragraph::new(Line::from(Span::styled(format!(" {hints}"), base))).render(area, buf);

        if let Some(hud) = &self.hud {
            let style = Style::default()
                .fg(palette.base_06)
                .bg(palette.base_02)
                .add_modifier(Modifier::BOLD);
            Paragraph::new(Line::from(Span::styled(format!(" {} ", hud.message), style)))
                .alignment(Alignment::Right)
                .render(area, buf);
        }
    }
}
