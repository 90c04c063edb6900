//! Domain model for the notes list/detail flow.
//!
//! # Responsibility
//! - Define canonical data structures shared by storage and the controller.
//!
//! # Invariants
//! - Every persisted note is identified by a storage-assigned `NoteId`.

pub mod note;
