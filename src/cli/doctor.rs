//! CLI `doctor` command — run database diagnostics and print a health report.

use anyhow::{Context, Result};

use kbqa::config::KbqaConfig;
use kbqa::db;
use kbqa::llm::credentials;

pub fn doctor(config: &KbqaConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `kbqa kb add` or `kbqa serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("kbqa Health Report");
    println!("==================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Row counts:");
    println!("  Entries:         {}", report.entry_count);
    println!("  Prompt rows:     {}", report.settings_count);
    println!();
    println!("Language model:");
    if !config.llm.enabled {
        println!("  Status:          disabled in config");
    } else if credentials::resolve_api_key(&config.llm.env_files).is_some() {
        println!("  Status:          key found ({} @ {})", config.llm.model, config.llm.base_url);
    } else {
        println!("  Status:          no {} (knowledge-base answers only)", credentials::API_KEY_VAR);
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
