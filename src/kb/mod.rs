//! Knowledge-base store: question/answer CRUD and the system prompt setting.
//!
//! The QA core reads through [`SqliteKnowledgeSource`], which opens a fresh
//! connection for every read and closes it before returning.

pub mod settings;
pub mod store;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use thiserror::Error;

use crate::qa::KnowledgeSource;
use types::KnowledgeEntry;

/// Failures surfaced by the write-side store operations.
#[derive(Debug, Error)]
pub enum KbError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("entry {0} not found")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// [`KnowledgeSource`] backed by the SQLite file at `db_path`.
#[derive(Debug, Clone)]
pub struct SqliteKnowledgeSource {
    db_path: PathBuf,
}

impl SqliteKnowledgeSource {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn connect(&self) -> Result<rusqlite::Connection> {
        // No create-on-open: a missing file reads as an unavailable store.
        let conn = rusqlite::Connection::open_with_flags(
            &self.db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl KnowledgeSource for SqliteKnowledgeSource {
    fn load_entries(&self) -> Result<Vec<KnowledgeEntry>> {
        let conn = self.connect()?;
        store::list_entries(&conn)
    }

    fn system_prompt(&self) -> Result<Option<String>> {
        let conn = self.connect()?;
        Ok(settings::latest_system_prompt(&conn)?.map(|s| s.system))
    }
}
