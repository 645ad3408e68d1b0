//! Note collection and draft text for the current session
//!
//! Notes live only in memory. Every mutation is published to subscribers
//! so views know when to redraw.

use chrono::{DateTime, Local};
use flume::{Receiver, Sender};
use log::{debug, info};

use crate::engine::{HighlightArea, SelectionData};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u64);

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    /// Never empty
    pub highlight_areas: Vec<HighlightArea>,
    pub quote: String,
    pub created_at: DateTime<Local>,
}

impl Note {
    pub fn first_area(&self) -> Option<&HighlightArea> {
        self.highlight_areas.first()
    }
}

/// What changed in an [`AnnotationState`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateChange {
    DraftChanged,
    NoteAdded(NoteId),
}

#[derive(Debug)]
pub struct AnnotationState {
    notes: Vec<Note>,
    pending_text: String,
    next_id: u64,
    subscribers: Vec<Sender<StateChange>>,
}

impl Default for AnnotationState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationState {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            pending_text: String::new(),
            next_id: 1,
            subscribers: Vec::new(),
        }
    }

    /// Register for change notifications
    pub fn subscribe(&mut self) -> Receiver<StateChange> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, change: StateChange) {
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    /// Replace the draft typed into the note editor
    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        self.pending_text = text.into();
        self.publish(StateChange::DraftChanged);
    }

    /// Turn the draft and `selection` into a note.
    ///
    /// Returns `None` without touching state when the draft is empty or the
    /// selection has no highlight areas.
    pub fn commit_note(&mut self, selection: &SelectionData) -> Option<NoteId> {
        if self.pending_text.is_empty() {
            debug!("Ignoring note commit with empty draft");
            return None;
        }
        if selection.highlight_areas.is_empty() {
            debug!("Ignoring note commit without highlight areas");
            return None;
        }

        let id = NoteId(self.next_id);
        self.next_id += 1;

        let note = Note {
            id,
            content: std::mem::take(&mut self.pending_text),
            highlight_areas: selection.highlight_areas.clone(),
            quote: selection.selected_text.clone(),
            created_at: Local::now(),
        };
        info!(
            "Added note {} on page {} ({} areas)",
            id,
            note.highlight_areas[0].page_index + 1,
            note.highlight_areas.len()
        );
        self.notes.push(note);

        self.publish(StateChange::NoteAdded(id));
        Some(id)
    }

    /// Notes in insertion order
    pub fn list_notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Every `(note, area)` pair on `page_index`, in note order then area order
    pub fn highlights_for_page(
        &self,
        page_index: usize,
    ) -> impl Iterator<Item = (&Note, &HighlightArea)> + '_ {
        self.notes.iter().flat_map(move |note| {
            note.highlight_areas
                .iter()
                .filter(move |area| area.page_index == page_index)
                .map(move |area| (note, area))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PercentRect, SelectionRegion};

    fn area(page: usize, top: f32) -> HighlightArea {
        HighlightArea::new(page, PercentRect::new(10.0, top, 40.0, 2.0))
    }

    fn selection(quote: &str, areas: Vec<HighlightArea>) -> SelectionData {
        let first = areas.first().copied().unwrap_or(area(0, 0.0));
        SelectionData {
            selection_region: SelectionRegion {
                page_index: first.page_index,
                rect: first.rect,
            },
            highlight_areas: areas,
            selected_text: quote.to_string(),
        }
    }

    fn pairs(state: &AnnotationState, page: usize) -> Vec<(NoteId, HighlightArea)> {
        state
            .highlights_for_page(page)
            .map(|(note, area)| (note.id, *area))
            .collect()
    }

    #[test]
    fn test_single_note_scenario() {
        let mut state = AnnotationState::new();
        state.set_pending_text("Check this claim");
        let id = state.commit_note(&selection("the error rate was 2%", vec![area(0, 20.0)]));

        assert_eq!(id, Some(NoteId(1)));
        let notes = state.list_notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "Check this claim");
        assert_eq!(notes[0].quote, "the error rate was 2%");
        assert_eq!(pairs(&state, 0).len(), 1);
        assert!(pairs(&state, 1).is_empty());

        let note = state.note(NoteId(1)).unwrap();
        assert_eq!(note.first_area(), Some(&area(0, 20.0)));
        assert!(state.note(NoteId(2)).is_none());
    }

    #[test]
    fn test_empty_draft_is_silent_noop() {
        let mut state = AnnotationState::new();
        state.set_pending_text("");
        assert_eq!(state.commit_note(&selection("quote", vec![area(0, 5.0)])), None);
        assert!(state.list_notes().is_empty());

        state.set_pending_text("first");
        state.commit_note(&selection("quote", vec![area(0, 5.0)]));
        state.set_pending_text("");
        state.commit_note(&selection("quote", vec![area(0, 9.0)]));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_selection_without_areas_is_rejected() {
        let mut state = AnnotationState::new();
        state.set_pending_text("text");
        assert_eq!(state.commit_note(&selection("quote", Vec::new())), None);
        assert!(state.is_empty());
        assert_eq!(state.pending_text(), "text");
    }

    #[test]
    fn test_commits_grow_list_in_call_order() {
        let mut state = AnnotationState::new();
        for i in 0..5 {
            let before = state.len();
            state.set_pending_text(format!("note {i}"));
            state.commit_note(&selection("q", vec![area(i % 2, i as f32)]));
            assert_eq!(state.len(), before + 1);
        }
        let contents: Vec<_> = state.list_notes().iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["note 0", "note 1", "note 2", "note 3", "note 4"]);
        assert!(state.list_notes().iter().all(|n| !n.highlight_areas.is_empty()));
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let mut state = AnnotationState::new();
        let mut ids = Vec::new();
        for _ in 0..4 {
            state.set_pending_text("x");
            ids.extend(state.commit_note(&selection("q", vec![area(0, 1.0)])));
            state.set_pending_text("");
            state.commit_note(&selection("q", vec![area(0, 1.0)]));
        }
        assert_eq!(ids, vec![NoteId(1), NoteId(2), NoteId(3), NoteId(4)]);
    }

    #[test]
    fn test_commit_clears_draft() {
        let mut state = AnnotationState::new();
        state.set_pending_text("draft");
        state.commit_note(&selection("q", vec![area(0, 1.0)]));
        assert_eq!(state.pending_text(), "");
    }

    #[test]
    fn test_highlights_for_page_filters_across_notes() {
        let mut state = AnnotationState::new();
        state.set_pending_text("spans pages");
        state.commit_note(&selection("q", vec![area(0, 90.0), area(1, 2.0), area(1, 4.0)]));
        state.set_pending_text("page two only");
        state.commit_note(&selection("q", vec![area(2, 50.0)]));

        assert_eq!(
            pairs(&state, 1),
            vec![(NoteId(1), area(1, 2.0)), (NoteId(1), area(1, 4.0))]
        );
        assert_eq!(pairs(&state, 2), vec![(NoteId(2), area(2, 50.0))]);
        assert!(pairs(&state, 7).is_empty());
    }

    #[test]
    fn test_two_notes_on_same_page_in_commit_order() {
        let mut state = AnnotationState::new();
        state.set_pending_text("first");
        state.commit_note(&selection("a", vec![area(3, 60.0)]));
        state.set_pending_text("second");
        state.commit_note(&selection("b", vec![area(3, 10.0)]));

        let ids: Vec<_> = pairs(&state, 3).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![NoteId(1), NoteId(2)]);
    }

    #[test]
    fn test_highlights_for_page_is_repeatable() {
        let mut state = AnnotationState::new();
        state.set_pending_text("n");
        state.commit_note(&selection("q", vec![area(0, 1.0), area(0, 3.0)]));
        assert_eq!(pairs(&state, 0), pairs(&state, 0));
    }

    #[test]
    fn test_highlights_reflect_new_notes() {
        let mut state = AnnotationState::new();
        assert!(pairs(&state, 0).is_empty());
        state.set_pending_text("n");
        state.commit_note(&selection("q", vec![area(0, 1.0)]));
        assert_eq!(pairs(&state, 0).len(), 1);
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let mut state = AnnotationState::new();
        let rx = state.subscribe();

        state.set_pending_text("hello");
        state.commit_note(&selection("q", vec![area(0, 1.0)]));
        state.commit_note(&selection("q", vec![area(0, 1.0)]));

        let changes: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            changes,
            vec![StateChange::DraftChanged, StateChange::NoteAdded(NoteId(1))]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut state = AnnotationState::new();
        let rx = state.subscribe();
        drop(rx);
        state.set_pending_text("x");
        assert!(state.subscribers.is_empty());
    }
}
