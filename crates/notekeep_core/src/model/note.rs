//! Note domain model.
//!
//! # Responsibility
//! - Define the note record shared by storage backends and the controller.
//! - Provide validation and the placeholder/seed constructors used by the
//!   list/detail flow.
//!
//! # Invariants
//! - `id` is `None` until a storage backend assigns one, and never changes
//!   afterwards.
//! - Persisted notes always carry a non-blank `title` and `subtitle`.
//! - The placeholder note has no id and empty text.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned note identifier.
pub type NoteId = i64;

/// Title/subtitle pairs of the notes a fresh relational store starts with.
const SEED_NOTES: [(&str, &str); 5] = [
    ("title 1", "subtitle for title 1"),
    ("title 2", "subtitle for title 1"),
    ("title 3", "subtitle for title 3"),
    ("title 4", "subtitle for title 4"),
    ("title 5", "subtitle for title 5"),
];

/// Validation failures for note writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    EmptySubtitle,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::EmptySubtitle => write!(f, "note subtitle must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Title/subtitle record, optionally identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Absent for notes that were never persisted.
    pub id: Option<NoteId>,
    pub title: String,
    pub subtitle: String,
    /// Unix epoch milliseconds of the last successful write, `0` if unsaved.
    #[serde(default)]
    pub updated_at: i64,
}

impl Note {
    /// Creates an unsaved note.
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            subtitle: subtitle.into(),
            updated_at: 0,
        }
    }

    /// Creates a note bound to an existing identity.
    ///
    /// Used by edit flows that replace the text of an already persisted note.
    pub fn with_id(id: NoteId, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::new(title, subtitle)
        }
    }

    /// Returns the empty note handed out when a lookup misses.
    pub fn placeholder() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Returns whether this note is the lookup-miss placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_none() && self.title.is_empty() && self.subtitle.is_empty()
    }

    /// Checks write-time invariants.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptySubtitle` when the field is empty or whitespace.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        if self.subtitle.trim().is_empty() {
            return Err(NoteValidationError::EmptySubtitle);
        }
        Ok(())
    }
}

/// Unsaved notes written into a newly created relational store.
pub fn seed_notes() -> Vec<Note> {
    SEED_NOTES
        .iter()
        .map(|(title, subtitle)| Note::new(*title, *subtitle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{seed_notes, Note, NoteValidationError};

    #[test]
    fn placeholder_is_empty_and_unidentified() {
        let note = Note::placeholder();
        assert!(note.is_placeholder());
        assert_eq!(note.id, None);
        assert!(note.title.is_empty());
        assert!(note.subtitle.is_empty());
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert_eq!(
            Note::new("  ", "body").validate(),
            Err(NoteValidationError::EmptyTitle)
        );
        assert_eq!(
            Note::new("title", "\n").validate(),
            Err(NoteValidationError::EmptySubtitle)
        );
        assert!(Note::new("title", "body").validate().is_ok());
    }

    #[test]
    fn seed_list_has_five_ordered_notes() {
        let seeds = seed_notes();
        assert_eq!(seeds.len(), 5);
        assert_eq!(seeds[0].title, "title 1");
        assert_eq!(seeds[1].subtitle, "subtitle for title 1");
        assert_eq!(seeds[4].subtitle, "subtitle for title 5");
        assert!(seeds.iter().all(|note| note.id.is_none()));
    }
}
