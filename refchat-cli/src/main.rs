//! refchat-cli - terminal client for the RefChat server
//!
//! # Subcommands
//! - `sessions`                  - list sessions
//! - `new`                       - create a session and print its id
//! - `show <id>`                 - print a session's messages
//! - `ask <id> <question>`       - send one question
//! - `delete <id> [--yes]`       - delete a session after confirmation
//! - `chat [<id>]`               - interactive chat, new session if no id

use std::io::Write;

use clap::{Parser, Subcommand};
use refchat_cli::render::{render_message, render_summary};
use refchat_cli::{
    ChatApi, ChatWindow, Completion, DeleteOutcome, HttpChatApi, SessionList, DEFAULT_SERVER,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "refchat-cli", version, about = "RefChat terminal client")]
struct Cli {
    /// RefChat server URL (overrides REFCHAT_API_URL env var)
    #[arg(long, env = "REFCHAT_API_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List chat sessions
    Sessions,

    /// Start a new chat session
    New,

    /// Print the full conversation of a session
    Show { id: String },

    /// Ask a single question in a session
    Ask {
        id: String,
        /// Question text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Delete a session
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Interactive chat; type /quit to leave
    Chat { id: Option<String> },
}

// ============================================================================
// Commands
// ============================================================================

async fn do_sessions(api: &dyn ChatApi) -> anyhow::Result<()> {
    let mut list = SessionList::new();
    list.refresh(api).await?;
    if list.sessions().is_empty() {
        println!("No sessions yet");
    }
    for s in list.sessions() {
        println!("{}", render_summary(s, false));
    }
    Ok(())
}

async fn do_new(api: &dyn ChatApi) -> anyhow::Result<()> {
    let created = api.create_session().await?;
    println!("{}", created.session_id);
    Ok(())
}

async fn do_show(api: &dyn ChatApi, id: &str) -> anyhow::Result<()> {
    let mut window = ChatWindow::new();
    window.load(api, id).await?;
    if window.messages().is_empty() {
        println!("Start a conversation by typing a message.");
    }
    for m in window.messages() {
        println!("{}\n", render_message(m));
    }
    Ok(())
}

async fn do_ask(api: &dyn ChatApi, id: &str, question: &str) -> anyhow::Result<()> {
    let mut window = ChatWindow::new();
    window.load(api, id).await?;
    match window.send(api, question).await? {
        Completion::Committed(reply) => {
            println!("{}", render_message(&reply));
            Ok(())
        }
        Completion::RolledBack(e) => Err(e.into()),
        Completion::Stale => Ok(()),
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn do_delete(api: &dyn ChatApi, id: &str, yes: bool) -> anyhow::Result<()> {
    let mut list = SessionList::new();
    let assume_yes = |_: &str| true;
    let ask = |p: &str| prompt_yes_no(p);
    let confirm: &dyn refchat_cli::Confirm = if yes { &assume_yes } else { &ask };

    match list.delete(api, id, confirm, None).await? {
        DeleteOutcome::Cancelled => println!("Cancelled"),
        DeleteOutcome::Deleted | DeleteOutcome::DeletedActive => {
            println!("{}", deletion_report(id, &list))
        }
    }
    Ok(())
}

/// Confirmation line for a delete. The remaining count is only shown from a fetched list.
fn deletion_report(id: &str, list: &SessionList) -> String {
    if list.is_loaded() {
        format!("Deleted {}\n{} session(s) left", id, list.sessions().len())
    } else {
        format!("Deleted {}\nSession list unavailable", id)
    }
}

async fn do_chat(api: &dyn ChatApi, id: Option<String>) -> anyhow::Result<()> {
    let id = match id {
        Some(id) => id,
        None => api.create_session().await?.session_id,
    };

    let mut window = ChatWindow::new();
    window.load(api, &id).await?;
    println!("Session {} - type /quit to leave", id);
    for m in window.messages() {
        println!("{}\n", render_message(m));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match window.send(api, line).await {
            Ok(Completion::Committed(reply)) => println!("{}\n", render_message(&reply)),
            Ok(Completion::RolledBack(e)) => eprintln!("refchat-cli: message not sent: {}", e),
            Ok(Completion::Stale) => {}
            Err(blocked) => eprintln!("refchat-cli: {}", blocked),
        }
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = match HttpChatApi::new(&cli.server) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("refchat-cli: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Sessions => do_sessions(&api).await,
        Commands::New => do_new(&api).await,
        Commands::Show { id } => do_show(&api, &id).await,
        Commands::Ask { id, question } => do_ask(&api, &id, &question.join(" ")).await,
        Commands::Delete { id, yes } => do_delete(&api, &id, yes).await,
        Commands::Chat { id } => do_chat(&api, id).await,
    };

    if let Err(e) = result {
        eprintln!("refchat-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
