//! SQLite-backed relational note storage.
//!
//! # Responsibility
//! - Keep SQL details for the `notes` table inside the storage boundary.
//!
//! # Invariants
//! - The connection is migrated before the storage is constructed.
//! - Read paths reject rows that violate note invariants.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Note, NoteId};
use crate::storage::{NoteStorage, StorageError, StorageResult};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    subtitle,
    updated_at
FROM notes";

/// Relational backend owning one SQLite connection.
pub struct SqliteNoteStorage {
    conn: Mutex<Connection>,
}

impl SqliteNoteStorage {
    /// Opens (creating if needed) a notes database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory notes database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Poisoned("relational"))
    }
}

impl NoteStorage for SqliteNoteStorage {
    fn create(&self, note: &Note) -> StorageResult<Note> {
        note.validate()?;

        let conn = self.lock()?;
        let id = conn.query_row(
            "INSERT INTO notes (title, subtitle) VALUES (?1, ?2) RETURNING id;",
            params![note.title.as_str(), note.subtitle.as_str()],
            |row| row.get::<_, NoteId>(0),
        )?;
        load_note(&conn, id)?.ok_or_else(|| {
            StorageError::InvalidData(format!("created note {id} missing in read-back"))
        })
    }

    fn read_all(&self) -> StorageResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn update_by_id(&self, id: NoteId, note: &Note) -> StorageResult<bool> {
        note.validate()?;

        let changed = self.lock()?.execute(
            "UPDATE notes
             SET
                title = ?2,
                subtitle = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, note.title.as_str(), note.subtitle.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn delete_by_id(&self, id: NoteId) -> StorageResult<bool> {
        let changed = self
            .lock()?
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn load_note(conn: &Connection, id: NoteId) -> StorageResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_note_row(row)?)),
        None => Ok(None),
    }
}

fn parse_note_row(row: &Row<'_>) -> StorageResult<Note> {
    let note = Note {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        subtitle: row.get("subtitle")?,
        updated_at: row.get("updated_at")?,
    };
    note.validate().map_err(|err| {
        StorageError::InvalidData(format!("row {} in notes: {err}", note.id.unwrap_or_default()))
    })?;
    Ok(note)
}
