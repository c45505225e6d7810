//! The `ai_settings` table: a single active system prompt, newest row wins.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use super::types::SystemPromptSetting;
use super::KbError;

/// The newest system prompt, or `None` when the table is empty or the stored
/// prompt is blank.
pub fn latest_system_prompt(conn: &Connection) -> Result<Option<SystemPromptSetting>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT system_prompt, updated_at FROM ai_settings ORDER BY id DESC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(row.and_then(|(prompt, updated_at)| {
        let prompt = prompt.trim();
        (!prompt.is_empty()).then(|| SystemPromptSetting {
            system: prompt.to_string(),
            updated_at: Some(updated_at),
        })
    }))
}

/// Replace the active system prompt. Updates the newest row in place, or
/// inserts one when the table is empty.
pub fn set_system_prompt(conn: &Connection, prompt: &str) -> Result<(), KbError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(KbError::InvalidInput("system prompt must not be empty"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let changed = conn.execute(
        "UPDATE ai_settings SET system_prompt = ?1, updated_at = ?2 \
         WHERE id = (SELECT id FROM ai_settings ORDER BY id DESC LIMIT 1)",
        params![prompt, now],
    )?;
    if changed == 0 {
        conn.execute(
            "INSERT INTO ai_settings (system_prompt, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![prompt, now],
        )?;
    }
    tracing::info!(len = prompt.chars().count(), "system prompt updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations::SEED_SYSTEM_PROMPT, open_memory_database};

    #[test]
    fn seeded_prompt_is_returned() {
        let conn = open_memory_database().unwrap();
        let setting = latest_system_prompt(&conn).unwrap().unwrap();
        assert_eq!(setting.system, SEED_SYSTEM_PROMPT);
        assert!(setting.updated_at.is_some());
    }

    #[test]
    fn set_updates_in_place() {
        let conn = open_memory_database().unwrap();
        set_system_prompt(&conn, "  只用英文回答  ").unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM ai_settings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(
            latest_system_prompt(&conn).unwrap().unwrap().system,
            "只用英文回答"
        );
    }

    #[test]
    fn set_inserts_when_empty_and_rejects_blank() {
        let conn = open_memory_database().unwrap();
        conn.execute("DELETE FROM ai_settings", []).unwrap();
        assert!(latest_system_prompt(&conn).unwrap().is_none());

        assert!(matches!(
            set_system_prompt(&conn, "   "),
            Err(KbError::InvalidInput(_))
        ));
        set_system_prompt(&conn, "be brief").unwrap();
        assert_eq!(latest_system_prompt(&conn).unwrap().unwrap().system, "be brief");
    }
}
