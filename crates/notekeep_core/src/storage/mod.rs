//! Note storage contracts and backend selection.
//!
//! # Responsibility
//! - Define the collaborator interface the notes controller depends on.
//! - Name the closed set of storage backends and open them from config.
//!
//! # Invariants
//! - Write paths call `Note::validate()` before persisting anything.
//! - `read_all` returns notes in creation order (ascending id).
//! - Asking the factory for an unknown backend name fails immediately.

use crate::config::StorageConfig;
use crate::db::DbError;
use crate::model::note::{Note, NoteId, NoteValidationError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod document;
pub mod sqlite;

pub use document::DocumentNoteStorage;
pub use sqlite::SqliteNoteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer failure.
#[derive(Debug)]
pub enum StorageError {
    Validation(NoteValidationError),
    Db(DbError),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// Persisted data violates note invariants.
    InvalidData(String),
    /// Factory was asked for a backend name outside the known set.
    UnknownBackend(String),
    /// A previous writer panicked while holding the storage lock.
    Poisoned(&'static str),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "storage io failure: {err}"),
            Self::Serialization(err) => write!(f, "document serialization failure: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::UnknownBackend(name) => write!(f, "unknown storage backend: `{name}`"),
            Self::Poisoned(backend) => write!(f, "{backend} storage lock poisoned"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::UnknownBackend(_) | Self::Poisoned(_) => None,
        }
    }
}

impl From<NoteValidationError> for StorageError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Closed set of storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    /// Local relational store (SQLite).
    Relational,
    /// Document store holding one JSON document per note.
    RemoteDocument,
}

impl BackendType {
    pub const ALL: [BackendType; 2] = [BackendType::Relational, BackendType::RemoteDocument];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::RemoteDocument => "remote_document",
        }
    }

    /// Parses a selector, accepting surrounding whitespace and any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "relational" => Some(Self::Relational),
            "remote_document" => Some(Self::RemoteDocument),
            _ => None,
        }
    }
}

impl Display for BackendType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborator that persists and retrieves notes.
///
/// Implementations are blocking; callers on an async runtime move calls onto
/// the blocking pool.
pub trait NoteStorage: Send + Sync {
    /// Persists a new note and returns it with its assigned id.
    fn create(&self, note: &Note) -> StorageResult<Note>;
    /// Returns every stored note in creation order.
    fn read_all(&self) -> StorageResult<Vec<Note>>;
    /// Replaces title and subtitle of note `id`. Returns `false` when absent.
    fn update_by_id(&self, id: NoteId, note: &Note) -> StorageResult<bool>;
    /// Removes note `id`. Returns `false` when absent.
    fn delete_by_id(&self, id: NoteId) -> StorageResult<bool>;
}

/// Opens storage collaborators for the controller.
pub trait StorageFactory: Send + Sync {
    fn open(&self, backend: BackendType) -> StorageResult<Arc<dyn NoteStorage>>;
}

/// Factory backed by [`StorageConfig`] locations.
#[derive(Debug, Clone, Default)]
pub struct DefaultStorageFactory {
    config: StorageConfig,
}

impl DefaultStorageFactory {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Opens a backend by its selector name.
    ///
    /// # Errors
    /// - `UnknownBackend` when `name` is not one of the known selectors.
    pub fn open_named(&self, name: &str) -> StorageResult<Arc<dyn NoteStorage>> {
        match BackendType::parse(name) {
            Some(backend) => self.open(backend),
            None => {
                error!("event=storage_open module=storage status=error error_code=unknown_backend");
                Err(StorageError::UnknownBackend(name.trim().to_string()))
            }
        }
    }
}

impl StorageFactory for DefaultStorageFactory {
    fn open(&self, backend: BackendType) -> StorageResult<Arc<dyn NoteStorage>> {
        let storage: Arc<dyn NoteStorage> = match backend {
            BackendType::Relational => match self.config.relational_path.as_ref() {
                Some(path) => Arc::new(SqliteNoteStorage::open(path)?),
                None => Arc::new(SqliteNoteStorage::open_in_memory()?),
            },
            BackendType::RemoteDocument => match self.config.document_path.as_ref() {
                Some(path) => Arc::new(DocumentNoteStorage::open(path)?),
                None => Arc::new(DocumentNoteStorage::in_memory()),
            },
        };
        info!("event=storage_open module=storage status=ok backend={backend}");
        Ok(storage)
    }
}
