//! Notes state controller.
//!
//! # Responsibility
//! - Own the observable in-memory view of the note list.
//! - Track the active storage backend and route writes to it.
//! - Refresh the list from storage after every successful write.
//!
//! # Invariants
//! - The list is only ever replaced whole, never patched in place.
//! - A failed storage call leaves the list and backend selection untouched.
//! - A write that succeeded is never reported as a write failure: if only the
//!   follow-up refresh fails, the caller gets `RefreshFailed` with the stored
//!   note.
//! - Lookups never fail: a miss resolves to `Note::placeholder()`.
//! - Storage calls run on the blocking pool; callers await a future.

use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::observable::{Observable, SubscriptionId};
use crate::storage::{BackendType, NoteStorage, StorageError, StorageFactory, StorageResult};
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Recoverable failure reported to the view layer.
#[derive(Debug)]
pub enum ControllerError {
    /// Input rejected before reaching storage.
    Validation(NoteValidationError),
    /// The last selector was not a known backend.
    NoBackendSelected,
    /// Update targeted an id the active storage does not have.
    NoteNotFound(NoteId),
    Storage(StorageError),
    /// The blocking storage task panicked or was cancelled.
    Task(JoinError),
    /// The write was persisted but reloading the list afterwards failed.
    /// The published list still shows the state before the write.
    RefreshFailed {
        note: Note,
        source: Box<ControllerError>,
    },
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoBackendSelected => write!(f, "no storage backend selected"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Task(err) => write!(f, "storage task failed: {err}"),
            Self::RefreshFailed { note, source } => write!(
                f,
                "note {} saved but list refresh failed: {source}",
                note.id.unwrap_or_default()
            ),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Task(err) => Some(err),
            Self::RefreshFailed { source, .. } => Some(source.as_ref()),
            Self::NoBackendSelected | Self::NoteNotFound(_) => None,
        }
    }
}

impl From<NoteValidationError> for ControllerError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for ControllerError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<JoinError> for ControllerError {
    fn from(value: JoinError) -> Self {
        Self::Task(value)
    }
}

/// Single source of truth for the list/detail screens.
pub struct NotesController {
    factory: Arc<dyn StorageFactory>,
    storages: HashMap<BackendType, Arc<dyn NoteStorage>>,
    active: Option<BackendType>,
    notes: Observable<Vec<Note>>,
}

impl NotesController {
    /// Builds a controller on the default relational backend, loaded with
    /// whatever that backend stores (the seed notes for a new database).
    ///
    /// # Errors
    /// - `Storage` when the relational backend cannot be opened or read.
    pub async fn new(factory: Arc<dyn StorageFactory>) -> ControllerResult<Self> {
        let mut controller = Self {
            factory,
            storages: HashMap::new(),
            active: None,
            notes: Observable::new(Vec::new()),
        };
        controller.activate(BackendType::Relational).await?;
        Ok(controller)
    }

    /// Switches the backend serving future operations and resets the list.
    ///
    /// Unknown selectors clear the selection and publish an empty list; they
    /// are not an error. Returns the backend now active.
    ///
    /// # Errors
    /// - `Storage` when a known backend fails to open or load. Prior state is
    ///   kept.
    pub async fn select_backend(
        &mut self,
        selector: &str,
    ) -> ControllerResult<Option<BackendType>> {
        match BackendType::parse(selector) {
            Some(backend) => {
                self.activate(backend).await?;
                Ok(Some(backend))
            }
            None => {
                warn!("event=backend_select module=controller status=ignored reason=unknown_selector");
                self.active = None;
                self.notes.set(Vec::new());
                Ok(None)
            }
        }
    }

    pub fn active_backend(&self) -> Option<BackendType> {
        self.active
    }

    /// Latest published snapshot of the note list.
    pub fn current_notes(&self) -> Arc<Vec<Note>> {
        self.notes.get()
    }

    /// Number of list replacements published so far.
    pub fn notes_version(&self) -> u64 {
        self.notes.version()
    }

    /// Registers a listener fired synchronously after each list replacement.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&Arc<Vec<Note>>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.notes.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notes.unsubscribe(id)
    }

    /// Reloads the full list from the active backend.
    pub async fn refresh(&mut self) -> ControllerResult<Arc<Vec<Note>>> {
        let storage = self.active_storage()?;
        let started_at = Instant::now();
        let notes = run_storage(storage, |storage| storage.read_all()).await;
        let notes = log_outcome("notes_refresh", started_at, notes)?;
        info!("event=notes_refresh module=controller count={}", notes.len());
        self.notes.set(notes);
        Ok(self.notes.get())
    }

    /// Creates `note` when it has no id, otherwise replaces the stored note
    /// with the same id. Resolves after the list has been refreshed, with the
    /// stored version of the note.
    ///
    /// # Errors
    /// - `Validation` for blank title/subtitle.
    /// - `NoteNotFound` when updating an id the backend does not know.
    /// - `Storage` / `Task` for backend failures; the list is left unchanged.
    /// - `RefreshFailed` when the write landed but the reload did not.
    pub async fn create_or_update(&mut self, note: Note) -> ControllerResult<Note> {
        note.validate()?;
        let storage = self.active_storage()?;
        let started_at = Instant::now();

        let saved = match note.id {
            Some(id) => {
                let written = note.clone();
                let updated =
                    run_storage(storage, move |storage| storage.update_by_id(id, &written)).await;
                if !log_outcome("note_update", started_at, updated)? {
                    warn!("event=note_update module=controller status=not_found note_id={id}");
                    return Err(ControllerError::NoteNotFound(id));
                }
                note
            }
            None => {
                let created = run_storage(storage, move |storage| storage.create(&note)).await;
                let created = log_outcome("note_create", started_at, created)?;
                if created.id.is_none() {
                    return Err(
                        StorageError::InvalidData("created note has no id".to_string()).into(),
                    );
                }
                created
            }
        };

        self.refresh_after_write(&saved).await?;
        Ok(self.find_by_id(saved.id))
    }

    /// Deletes the stored note with `note.id`. Returns whether a note was
    /// removed; a missing or absent id is not an error.
    pub async fn delete(&mut self, note: &Note) -> ControllerResult<bool> {
        let storage = self.active_storage()?;
        let started_at = Instant::now();

        let removed = match note.id {
            Some(id) => {
                let removed = run_storage(storage, move |storage| storage.delete_by_id(id)).await;
                let removed = log_outcome("note_delete", started_at, removed)?;
                if !removed {
                    warn!("event=note_delete module=controller status=not_found note_id={id}");
                }
                removed
            }
            None => false,
        };

        self.refresh_after_write(note).await?;
        Ok(removed)
    }

    /// Looks up a note in the current list, falling back to the placeholder.
    pub fn find_by_id(&self, id: Option<NoteId>) -> Note {
        id.and_then(|id| {
            self.notes
                .get()
                .iter()
                .find(|note| note.id == Some(id))
                .cloned()
        })
        .unwrap_or_else(Note::placeholder)
    }

    /// Same as [`Self::find_by_id`], driven by a raw route parameter.
    pub fn find_by_param(&self, param: Option<&str>) -> Note {
        self.find_by_id(param.and_then(|value| value.trim().parse().ok()))
    }

    async fn refresh_after_write(&mut self, saved: &Note) -> ControllerResult<()> {
        match self.refresh().await {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(
                    "event=notes_refresh module=controller status=stale note_id={}",
                    saved.id.unwrap_or_default()
                );
                Err(ControllerError::RefreshFailed {
                    note: saved.clone(),
                    source: Box::new(err),
                })
            }
        }
    }

    async fn activate(&mut self, backend: BackendType) -> ControllerResult<()> {
        let started_at = Instant::now();
        let result = self.open_and_load(backend).await;
        let (storage, notes) = log_outcome("backend_select", started_at, result)?;

        info!(
            "event=backend_select module=controller backend={backend} count={}",
            notes.len()
        );
        self.storages.insert(backend, storage);
        self.active = Some(backend);
        self.notes.set(notes);
        Ok(())
    }

    /// Opens (or reuses) the backend and reads its initial list without
    /// touching controller state.
    async fn open_and_load(
        &self,
        backend: BackendType,
    ) -> ControllerResult<(Arc<dyn NoteStorage>, Vec<Note>)> {
        let storage = match self.storages.get(&backend) {
            Some(storage) => Arc::clone(storage),
            None => {
                let factory = Arc::clone(&self.factory);
                run_blocking(move || factory.open(backend)).await?
            }
        };

        let notes = match backend {
            BackendType::Relational => {
                run_storage(Arc::clone(&storage), |storage| storage.read_all()).await?
            }
            // Loaded on the first explicit refresh.
            BackendType::RemoteDocument => Vec::new(),
        };
        Ok((storage, notes))
    }

    fn active_storage(&self) -> ControllerResult<Arc<dyn NoteStorage>> {
        self.active
            .and_then(|backend| self.storages.get(&backend))
            .cloned()
            .ok_or(ControllerError::NoBackendSelected)
    }
}

async fn run_blocking<T, F>(op: F) -> ControllerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StorageResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(op).await?;
    Ok(result?)
}

async fn run_storage<T, F>(storage: Arc<dyn NoteStorage>, op: F) -> ControllerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn NoteStorage) -> StorageResult<T> + Send + 'static,
{
    run_blocking(move || op(&*storage)).await
}

fn log_outcome<T>(
    event: &'static str,
    started_at: Instant,
    result: ControllerResult<T>,
) -> ControllerResult<T> {
    match &result {
        Ok(_) => info!(
            "event={} module=controller status=ok duration_ms={}",
            event,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={} module=controller status=error duration_ms={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
