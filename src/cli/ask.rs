//! CLI `ask` command — answer one question from the terminal.

use anyhow::Result;

use kbqa::config::KbqaConfig;

/// Blocks on the optional model call; run off the async runtime.
pub fn ask(config: &KbqaConfig, question: &str, system: Option<&str>, json: bool) -> Result<()> {
    // The knowledge source opens without create; make sure the file and schema exist.
    drop(super::open(config)?);

    let qa = kbqa::server::build_qa_service(config, config.resolved_db_path());
    let result = qa.answer_question(question, system);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.answer);
    println!();
    match (result.matched_id, result.matched_question.as_deref()) {
        (Some(id), Some(q)) => println!("matched #{id}: {q} (score: {:.4})", result.score),
        _ => println!("no match (best score: {:.4})", result.score),
    }
    Ok(())
}
