mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kbqa::config;

#[derive(Parser)]
#[command(name = "kbqa", version, about = "Local knowledge-base question answering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Answer a question against the knowledge base
    Ask {
        question: String,
        /// System prompt for this question (defaults to the stored one)
        #[arg(long)]
        system: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage knowledge-base entries
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
    /// Show or change the system prompt
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },
    /// Check database health
    Doctor,
}

#[derive(Subcommand)]
enum KbAction {
    /// Add a question/answer pair
    Add { question: String, answer: String },
    /// List entries, newest first
    List {
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Replace an entry's question and answer
    Update {
        id: i64,
        question: String,
        answer: String,
    },
    /// Delete an entry
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum PromptAction {
    /// Print the active system prompt
    Show,
    /// Replace the system prompt
    Set { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::KbqaConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            kbqa::server::serve(config).await?;
        }
        Command::Ask {
            question,
            system,
            json,
        } => {
            // The model call uses a blocking HTTP client.
            tokio::task::spawn_blocking(move || {
                cli::ask::ask(&config, &question, system.as_deref(), json)
            })
            .await??;
        }
        Command::Kb { action } => match action {
            KbAction::Add { question, answer } => cli::kb::add(&config, &question, &answer)?,
            KbAction::List { offset, limit } => cli::kb::list(&config, offset, limit)?,
            KbAction::Update {
                id,
                question,
                answer,
            } => cli::kb::update(&config, id, &question, &answer)?,
            KbAction::Remove { id } => cli::kb::remove(&config, id)?,
        },
        Command::Prompt { action } => match action {
            PromptAction::Show => cli::prompt::show(&config)?,
            PromptAction::Set { text } => cli::prompt::set(&config, &text)?,
        },
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
