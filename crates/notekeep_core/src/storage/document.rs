//! Document-store note backend.
//!
//! # Responsibility
//! - Keep notes as one JSON document per id, the way a remote document
//!   collection would.
//! - Optionally mirror the collection to a snapshot file on every write.
//!
//! # Invariants
//! - Ids are allocated from a monotonic counter and never reused, even after
//!   deletes.
//! - Snapshot writes go to a sibling temp file first and are renamed into
//!   place, so a crash never leaves a half-written snapshot.
//! - In-memory state changes only after the snapshot write succeeded.

use crate::model::note::{Note, NoteId};
use crate::storage::{NoteStorage, StorageError, StorageResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

const SNAPSHOT_TMP_SUFFIX: &str = "tmp";

/// Stored body of one note document. The id lives in the collection key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NoteDocument {
    title: String,
    subtitle: String,
    updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Collection {
    next_id: NoteId,
    documents: BTreeMap<NoteId, NoteDocument>,
}

impl Collection {
    fn empty() -> Self {
        Self {
            next_id: 1,
            documents: BTreeMap::new(),
        }
    }

    fn to_note(id: NoteId, doc: &NoteDocument) -> Note {
        Note {
            id: Some(id),
            title: doc.title.clone(),
            subtitle: doc.subtitle.clone(),
            updated_at: doc.updated_at,
        }
    }
}

/// Document-collection backend, in memory or mirrored to a JSON file.
pub struct DocumentNoteStorage {
    snapshot_path: Option<PathBuf>,
    state: Mutex<Collection>,
}

impl DocumentNoteStorage {
    /// Creates an empty collection that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            snapshot_path: None,
            state: Mutex::new(Collection::empty()),
        }
    }

    /// Loads the collection snapshot at `path`, starting empty if it is absent.
    ///
    /// # Errors
    /// - `Io` when the file exists but cannot be read.
    /// - `Serialization` / `InvalidData` when the snapshot is malformed.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let collection = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let collection: Collection = serde_json::from_str(&raw)?;
            check_collection(&collection)?;
            collection
        } else {
            Collection::empty()
        };

        info!(
            "event=document_open module=storage status=ok documents={}",
            collection.documents.len()
        );
        Ok(Self {
            snapshot_path: Some(path),
            state: Mutex::new(collection),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Collection>> {
        self.state
            .lock()
            .map_err(|_| StorageError::Poisoned("remote_document"))
    }

    /// Persists `next` and swaps it in only when the write succeeded.
    fn commit(&self, state: &mut Collection, next: Collection) -> StorageResult<()> {
        if let Some(path) = self.snapshot_path.as_ref() {
            write_snapshot(path, &next)?;
            debug!(
                "event=document_flush module=storage status=ok documents={}",
                next.documents.len()
            );
        }
        *state = next;
        Ok(())
    }
}

impl NoteStorage for DocumentNoteStorage {
    fn create(&self, note: &Note) -> StorageResult<Note> {
        note.validate()?;

        let mut state = self.lock()?;
        let id = state.next_id;
        let doc = NoteDocument {
            title: note.title.clone(),
            subtitle: note.subtitle.clone(),
            updated_at: now_epoch_ms(),
        };
        let mut next = state.clone();
        next.next_id = id + 1;
        next.documents.insert(id, doc.clone());
        self.commit(&mut state, next)?;

        Ok(Collection::to_note(id, &doc))
    }

    fn read_all(&self) -> StorageResult<Vec<Note>> {
        let state = self.lock()?;
        Ok(state
            .documents
            .iter()
            .map(|(id, doc)| Collection::to_note(*id, doc))
            .collect())
    }

    fn update_by_id(&self, id: NoteId, note: &Note) -> StorageResult<bool> {
        note.validate()?;

        let mut state = self.lock()?;
        if !state.documents.contains_key(&id) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.documents.insert(
            id,
            NoteDocument {
                title: note.title.clone(),
                subtitle: note.subtitle.clone(),
                updated_at: now_epoch_ms(),
            },
        );
        self.commit(&mut state, next)?;
        Ok(true)
    }

    fn delete_by_id(&self, id: NoteId) -> StorageResult<bool> {
        let mut state = self.lock()?;
        if !state.documents.contains_key(&id) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.documents.remove(&id);
        self.commit(&mut state, next)?;
        Ok(true)
    }
}

fn check_collection(collection: &Collection) -> StorageResult<()> {
    for (id, doc) in &collection.documents {
        if *id >= collection.next_id {
            return Err(StorageError::InvalidData(format!(
                "document {id} is not below next_id {}",
                collection.next_id
            )));
        }
        Collection::to_note(*id, doc)
            .validate()
            .map_err(|err| StorageError::InvalidData(format!("document {id}: {err}")))?;
    }
    Ok(())
}

fn write_snapshot(path: &Path, collection: &Collection) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension(SNAPSHOT_TMP_SUFFIX);
    let body = serde_json::to_string_pretty(collection)?;
    std::fs::write(&tmp_path, body)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
