use std::time::Duration;

use anyhow::Result;
use flume::Receiver;
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::annotation::{AnnotationComponent, HighlightStyle, NoteSidebar, StateChange};
use crate::document::PdfDocument;
use crate::event_source::{Event, EventSource, KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use crate::settings::Settings;
use crate::theme::{Base16Palette, current_theme};
use crate::viewer::{PdfViewer, PopupState};
use crate::widget::StatusBar;

const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusedPanel {
    Document,
    Notes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Redraw,
    None,
}

pub struct App {
    pub viewer: PdfViewer,
    pub annotations: AnnotationComponent,
    pub sidebar: NoteSidebar,
    pub focused_panel: FocusedPanel,
    status: StatusBar,
    changes: Receiver<StateChange>,
    sidebar_width_percent: u16,
    palette: &'static Base16Palette,
}

impl App {
    pub fn new(document: PdfDocument, settings: &Settings) -> Self {
        let palette = current_theme();
        let mut annotations = AnnotationComponent::new(
            HighlightStyle {
                color: settings.highlight_color(),
                opacity: settings.highlight_opacity(),
            },
            palette,
        );
        let changes = annotations.state_mut().subscribe();

        info!(
            "Mounted viewer for \"{}\" ({} pages)",
            document.display_title(),
            document.page_count()
        );

        Self {
            viewer: PdfViewer::new(document, settings.points_per_row()),
            annotations,
            sidebar: NoteSidebar::new(),
            focused_panel: FocusedPanel::Document,
            status: StatusBar::default(),
            changes,
            sidebar_width_percent: settings.sidebar_width_percent(),
            palette,
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.message()
    }

    /// React to annotation state changes. Returns true if a redraw is needed.
    pub fn drain_state_changes(&mut self) -> bool {
        let mut changed = false;
        while let Ok(change) = self.changes.try_recv() {
            changed = true;
            if let StateChange::NoteAdded(id) = change {
                let state = self.annotations.state();
                let count = state.len();
                let page = state
                    .note(id)
                    .and_then(|note| note.first_area())
                    .map(|area| area.page_index + 1);
                self.sidebar.select(count.saturating_sub(1), count);
                match page {
                    Some(page) => self.status.show(format!("Note {id} added on page {page}")),
                    None => self.status.show(format!("Note {id} added")),
                }
            }
        }
        changed
    }

    pub fn tick(&mut self) -> bool {
        self.status.tick()
    }

    pub fn handle_event(&mut self, event: &Event) -> AppAction {
        let action = match event {
            Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                self.handle_key(*key)
            }
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            Event::Resize(..) => AppAction::Redraw,
            _ => AppAction::None,
        };
        if self.viewer.process_commands() && action == AppAction::None {
            return AppAction::Redraw;
        }
        action
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return AppAction::Quit;
        }

        if self.viewer.captures_input() {
            self.viewer.handle_key(key, &mut self.annotations);
            return AppAction::Redraw;
        }

        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Tab => {
                self.focused_panel = match self.focused_panel {
                    FocusedPanel::Document => FocusedPanel::Notes,
                    FocusedPanel::Notes => FocusedPanel::Document,
                };
                debug!("Focus moved to {:?}", self.focused_panel);
                return AppAction::Redraw;
            }
            _ => {}
        }

        let handled = match self.focused_panel {
            FocusedPanel::Document => {
                self.viewer.handle_key(key, &mut self.annotations)
                    == crate::viewer::ViewerInput::Handled
            }
            FocusedPanel::Notes => self.sidebar.handle_key(
                key,
                self.annotations.state().list_notes(),
                self.viewer.actions(),
            ),
        };
        if handled {
            AppAction::Redraw
        } else {
            AppAction::None
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> AppAction {
        if !self.viewer.captures_input()
            && self.sidebar.handle_mouse(
                mouse,
                self.annotations.state().list_notes(),
                self.viewer.actions(),
            )
        {
            self.focused_panel = FocusedPanel::Notes;
            return AppAction::Redraw;
        }
        match self.viewer.handle_mouse(mouse, &mut self.annotations) {
            crate::viewer::ViewerInput::Handled => {
                if !self.viewer.captures_input() {
                    self.focused_panel = FocusedPanel::Document;
                }
                AppAction::Redraw
            }
            crate::viewer::ViewerInput::Ignored => AppAction::None,
        }
    }

    fn key_hints(&self) -> &'static str {
        match (self.viewer.popup(), self.focused_panel) {
            (PopupState::Open(_), _) => "Type your note · Ctrl+S add · Esc cancel",
            (PopupState::Target(_), _) => "Enter/a add a note · Esc clear selection",
            (PopupState::Selecting { .. }, _) => "j/k extend · Enter finish · Esc cancel",
            (PopupState::Idle, FocusedPanel::Notes) => "j/k choose · Enter jump · Tab document · q quit",
            (PopupState::Idle, FocusedPanel::Document) => {
                "v select · Enter select line · r rotate · Tab notes · q quit"
            }
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let [title_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(f.area());
        let [sidebar_area, document_area] = Layout::horizontal([
            Constraint::Percentage(self.sidebar_width_percent),
            Constraint::Min(10),
        ])
        .areas(body_area);

        self.draw_title(f, title_area);

        self.sidebar.render(
            f,
            sidebar_area,
            self.annotations.state().list_notes(),
            self.focused_panel == FocusedPanel::Notes,
            self.palette,
        );

        let border_color = if self.focused_panel == FocusedPanel::Document {
            self.palette.base_0d
        } else {
            self.palette.base_03
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.viewer.document().display_title()))
            .border_style(Style::default().fg(border_color));
        let viewer_area = block.inner(document_area);
        f.render_widget(block, document_area);
        self.viewer
            .render(&self.annotations, viewer_area, f.buffer_mut(), self.palette);

        self.status
            .render(self.key_hints(), status_area, f.buffer_mut(), self.palette);
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let page_count = self.viewer.document().page_count();
        let page = if page_count == 0 {
            "no pages".to_string()
        } else {
            format!("page {} / {}", self.viewer.current_page() + 1, page_count)
        };
        let line = Line::from(vec![
            Span::styled(
                " pdfnotes ",
                Style::default()
                    .fg(self.palette.base_00)
                    .bg(self.palette.base_0d)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {page} · {} notes", self.annotations.state().len()),
                Style::default().fg(self.palette.base_04),
            ),
        ]);
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(self.palette.base_01)),
            area,
        );
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut needs_redraw = true;
    loop {
        if app.drain_state_changes() {
            needs_redraw = true;
        }
        if app.tick() {
            needs_redraw = true;
        }
        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
            needs_redraw = false;
        }

        if event_source.poll(TICK_RATE)? {
            let event = event_source.read()?;
            match app.handle_event(&event) {
                AppAction::Quit => {
                    info!("Quit requested");
                    break;
                }
                AppAction::Redraw => needs_redraw = true,
                AppAction::None => {}
            }
        }
    }
    Ok(())
}
