//! Askdoc CLI - ask questions answered from your own documents.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Askdoc - upload documents, then ask questions answered from them
#[derive(Parser)]
#[command(name = "askdoc")]
#[command(version)]
#[command(about = "Ask questions answered from your own documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize askdoc (create config and database)
    Init,

    /// Ingest a document into the index
    Ingest {
        /// Path to the file to ingest (PDF, TXT, MD)
        path: std::path::PathBuf,

        /// Declared MIME type (detected from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,

        /// Emit progress as NDJSON events instead of human-readable output
        #[arg(long)]
        json: bool,
    },

    /// Ask a question answered from your documents
    Ask {
        /// Your question
        question: String,

        /// Continue an existing conversation
        #[arg(short, long)]
        conversation: Option<String>,

        /// Stream the response as it's generated
        #[arg(long)]
        stream: bool,

        /// Emit the turn as NDJSON events instead of human-readable output
        #[arg(long)]
        json: bool,
    },

    /// Manage ingested documents
    #[command(subcommand)]
    Docs(DocsCommands),

    /// Manage conversations
    #[command(subcommand)]
    Chats(ChatCommands),
}

#[derive(Subcommand)]
enum DocsCommands {
    /// List ingested documents
    List,

    /// Delete a document and its vectors
    Delete {
        /// Document ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ChatCommands {
    /// List conversations
    List,

    /// Show a conversation's messages
    Show {
        /// Conversation ID
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation ID
        id: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("askdoc=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("askdoc=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Ingest { path, mime, json } => commands::ingest::run(&path, mime, json).await,
        Commands::Ask {
            question,
            conversation,
            stream,
            json,
        } => commands::ask::run(&question, conversation, stream, json).await,
        Commands::Docs(cmd) => match cmd {
            DocsCommands::List => commands::docs::list(),
            DocsCommands::Delete { id } => commands::docs::delete(&id).await,
        },
        Commands::Chats(cmd) => match cmd {
            ChatCommands::List => commands::chats::list(),
            ChatCommands::Show { id } => commands::chats::show(&id),
            ChatCommands::Delete { id } => commands::chats::delete(&id),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
