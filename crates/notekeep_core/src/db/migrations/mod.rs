//! SQLite migration registry and executor.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Seed rows are written by a migration, so each database receives them
//!   exactly once, at creation time. Deleting every note later never
//!   brings them back.

use crate::db::{DbError, DbResult};
use crate::model::note::seed_notes;
use log::info;
use rusqlite::{params, Connection, Transaction};

#[derive(Clone, Copy)]
enum Step {
    Sql(&'static str),
    Rust(fn(&Transaction<'_>) -> rusqlite::Result<()>),
}

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    step: Step,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        step: Step::Sql(include_str!("0001_notes.sql")),
    },
    Migration {
        version: 2,
        step: Step::Rust(insert_seed_notes),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        match migration.step {
            Step::Sql(sql) => tx.execute_batch(sql)?,
            Step::Rust(apply) => apply(&tx)?,
        }
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from={current_version} to={latest}");
    Ok(())
}

fn insert_seed_notes(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    for note in seed_notes() {
        tx.execute(
            "INSERT INTO notes (title, subtitle) VALUES (?1, ?2);",
            params![note.title, note.subtitle],
        )?;
    }
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
