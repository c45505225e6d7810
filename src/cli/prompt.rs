use anyhow::Result;

use kbqa::config::KbqaConfig;
use kbqa::kb::settings;
use kbqa::qa::answer::FALLBACK_SYSTEM_PROMPT;

pub fn show(config: &KbqaConfig) -> Result<()> {
    let conn = super::open(config)?;
    match settings::latest_system_prompt(&conn)? {
        Some(setting) => {
            println!("{}", setting.system);
            if let Some(updated) = setting.updated_at {
                println!("\n(updated {updated})");
            }
        }
        None => {
            println!("{FALLBACK_SYSTEM_PROMPT}");
            println!("\n(built-in default, nothing stored)");
        }
    }
    Ok(())
}

pub fn set(config: &KbqaConfig, text: &str) -> Result<()> {
    let conn = super::open(config)?;
    settings::set_system_prompt(&conn, text)?;
    println!("System prompt updated.");
    Ok(())
}
