//! CRUD for the `qa_kb` table.
//!
//! Questions and answers are trimmed before they are written; blank values are
//! rejected with [`KbError::InvalidInput`].

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{EntryPage, KnowledgeEntry};
use super::KbError;

const DEFAULT_PAGE_SIZE: i64 = 10;

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    Ok(KnowledgeEntry {
        id: row.get(0)?,
        question: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        answer: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Every entry, newest id first.
pub fn list_entries(conn: &Connection) -> Result<Vec<KnowledgeEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, question, answer, created_at, updated_at FROM qa_kb ORDER BY id DESC",
    )?;
    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Paginated listing. A non-positive `limit` falls back to 10 and a negative
/// `offset` is treated as 0.
pub fn list_page(conn: &Connection, offset: i64, limit: i64) -> Result<EntryPage> {
    let limit = if limit <= 0 { DEFAULT_PAGE_SIZE } else { limit };
    let offset = offset.max(0);

    let total: i64 = conn.query_row("SELECT COUNT(*) FROM qa_kb", [], |r| r.get(0))?;
    let mut stmt = conn.prepare(
        "SELECT id, question, answer, created_at, updated_at FROM qa_kb \
         ORDER BY id DESC LIMIT ?1 OFFSET ?2",
    )?;
    let items = stmt
        .query_map(params![limit, offset], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EntryPage { items, total })
}

pub fn get_entry(conn: &Connection, id: i64) -> Result<Option<KnowledgeEntry>> {
    let entry = conn
        .query_row(
            "SELECT id, question, answer, created_at, updated_at FROM qa_kb WHERE id = ?1",
            params![id],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

fn validate<'a>(question: &'a str, answer: &'a str) -> Result<(&'a str, &'a str), KbError> {
    let (q, a) = (question.trim(), answer.trim());
    if q.is_empty() || a.is_empty() {
        return Err(KbError::InvalidInput("question and answer must not be empty"));
    }
    Ok((q, a))
}

/// Insert a new entry. Returns the assigned id.
pub fn create_entry(conn: &Connection, question: &str, answer: &str) -> Result<i64, KbError> {
    let (q, a) = validate(question, answer)?;
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO qa_kb (question, answer, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![q, a, now],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, "knowledge entry created");
    Ok(id)
}

pub fn update_entry(
    conn: &Connection,
    id: i64,
    question: &str,
    answer: &str,
) -> Result<(), KbError> {
    let (q, a) = validate(question, answer)?;
    let now = chrono::Utc::now().to_rfc3339();
    let changed = conn.execute(
        "UPDATE qa_kb SET question = ?1, answer = ?2, updated_at = ?3 WHERE id = ?4",
        params![q, a, now, id],
    )?;
    if changed == 0 {
        return Err(KbError::NotFound(id));
    }
    tracing::info!(id, "knowledge entry updated");
    Ok(())
}

pub fn delete_entry(conn: &Connection, id: i64) -> Result<(), KbError> {
    let changed = conn.execute("DELETE FROM qa_kb WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(KbError::NotFound(id));
    }
    tracing::info!(id, "knowledge entry deleted");
    Ok(())
}
