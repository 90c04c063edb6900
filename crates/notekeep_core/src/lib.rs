//! Note list/detail state management.
//!
//! `NotesController` owns the observable note list and routes create, update
//! and delete calls to the active storage backend (SQLite or a JSON document
//! collection).

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod observable;
pub mod route;
pub mod storage;

pub use config::{ConfigError, LoggingConfig, NotesConfig, StorageConfig};
pub use controller::{ControllerError, ControllerResult, NotesController};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{seed_notes, Note, NoteId, NoteValidationError};
pub use observable::{Observable, SubscriptionId};
pub use route::Route;
pub use storage::{
    BackendType, DefaultStorageFactory, DocumentNoteStorage, NoteStorage, SqliteNoteStorage,
    StorageError, StorageFactory, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
