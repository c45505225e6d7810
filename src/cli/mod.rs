pub mod ask;
pub mod doctor;
pub mod kb;
pub mod prompt;

use anyhow::Result;
use rusqlite::Connection;

use kbqa::config::KbqaConfig;

/// Open the configured database, creating it if needed.
fn open(config: &KbqaConfig) -> Result<Connection> {
    kbqa::db::open_database(config.resolved_db_path())
}

/// Truncate to `max_chars` characters, appending "..." if truncated.
fn truncate_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("short", 10), "short");
        assert_eq!(truncate_preview("abcdef", 3), "abc...");
        assert_eq!(truncate_preview("营业时间是什么", 4), "营业时间...");
    }
}
