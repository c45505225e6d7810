use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KbqaConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Scoring knobs for the bigram retrieval pass and the answer composer.
///
/// `match_threshold` is compared against the bonus-inclusive score, so it keeps
/// the same pass/fail boundary whether or not a bonus applied.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub match_threshold: f64,
    pub exact_bonus: f64,
    pub substring_bonus: f64,
    pub min_generated_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Untracked dotenv-style files probed for `DEEPSEEK_API_KEY`, in order.
    pub env_files: Vec<String>,
}

impl Default for KbqaConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_kbqa_dir()
            .join("kbqa.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.05,
            exact_bonus: 0.2,
            substring_bonus: 0.1,
            min_generated_chars: 5,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.deepseek.com/v1".into(),
            model: "deepseek-chat".into(),
            temperature: 0.2,
            max_tokens: 1000,
            timeout_secs: 15,
            env_files: vec![
                ".env.local".into(),
                "../.env.local".into(),
                "~/.kbqa/.env.local".into(),
            ],
        }
    }
}

/// Returns `~/.kbqa/`
pub fn default_kbqa_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".kbqa")
}

/// Returns the default config file path: `~/.kbqa/config.toml`
pub fn default_config_path() -> PathBuf {
    default_kbqa_dir().join("config.toml")
}

impl KbqaConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            KbqaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (KBQA_DB, KBQA_LOG_LEVEL, DEEPSEEK_API_BASE, DEEPSEEK_MODEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KBQA_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("KBQA_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("DEEPSEEK_API_BASE") {
            self.llm.base_url = val;
        }
        if let Ok(val) = std::env::var("DEEPSEEK_MODEL") {
            self.llm.model = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
