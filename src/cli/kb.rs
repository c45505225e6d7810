use anyhow::Result;

use kbqa::config::KbqaConfig;
use kbqa::kb::store;

pub fn add(config: &KbqaConfig, question: &str, answer: &str) -> Result<()> {
    let conn = super::open(config)?;
    let id = store::create_entry(&conn, question, answer)?;
    println!("Added entry #{id}");
    Ok(())
}

pub fn list(config: &KbqaConfig, offset: i64, limit: i64) -> Result<()> {
    let conn = super::open(config)?;
    let page = store::list_page(&conn, offset, limit)?;

    if page.items.is_empty() {
        println!("No entries.");
        return Ok(());
    }

    println!("{} entr{} total\n", page.total, if page.total == 1 { "y" } else { "ies" });
    for entry in &page.items {
        println!("  #{} {}", entry.id, super::truncate_preview(&entry.question, 60));
        println!("     {}", super::truncate_preview(&entry.answer, 100));
        println!("     updated {}", entry.updated_at);
        println!();
    }
    Ok(())
}

pub fn update(config: &KbqaConfig, id: i64, question: &str, answer: &str) -> Result<()> {
    let conn = super::open(config)?;
    store::update_entry(&conn, id, question, answer)?;
    println!("Updated entry #{id}");
    Ok(())
}

pub fn remove(config: &KbqaConfig, id: i64) -> Result<()> {
    let conn = super::open(config)?;
    store::delete_entry(&conn, id)?;
    println!("Removed entry #{id}");
    Ok(())
}
