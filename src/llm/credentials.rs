//! API key lookup: `DEEPSEEK_API_KEY` from the environment, then from the first
//! untracked dotenv-style file that defines it.

use std::path::{Path, PathBuf};

use crate::config::expand_tilde;

pub const API_KEY_VAR: &str = "DEEPSEEK_API_KEY";

/// Resolve the API key. `env_files` are probed in order; `~` is expanded and
/// relative paths resolve against the working directory.
pub fn resolve_api_key(env_files: &[String]) -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_VAR) {
        let key = key.trim();
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }
    let paths: Vec<PathBuf> = env_files.iter().map(|p| expand_tilde(p)).collect();
    read_key_from_files(&paths)
}

/// First non-empty `DEEPSEEK_API_KEY=` value across `paths`. Unreadable files
/// are skipped.
pub fn read_key_from_files(paths: &[PathBuf]) -> Option<String> {
    paths.iter().find_map(|p| read_key_from_file(p))
}

fn read_key_from_file(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    let key = text.lines().find_map(parse_key_line)?;
    tracing::debug!(path = %path.display(), "API key loaded from file");
    Some(key)
}

fn parse_key_line(line: &str) -> Option<String> {
    let value = line.trim().strip_prefix(API_KEY_VAR)?.strip_prefix('=')?;
    let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
    (!value.is_empty()).then(|| value.to_string())
}
