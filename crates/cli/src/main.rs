mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use venti_core::{Program, Role};
use venti_service::default_db_path;
use venti_storage::Storage;

#[derive(Parser)]
#[command(name = "venti")]
#[command(about = "Breakup-recovery companion: function server and local session tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Bearer token of the account to act as.
#[derive(Args)]
struct TokenArg {
    #[arg(long, env = "VENTI_TOKEN", hide_env_values = true)]
    token: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP function server
    Serve {
        #[arg(short, long, default_value = "54321")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Create an account and print its token
    Signup {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Issue a fresh token for an existing account
    Login {
        #[arg(long)]
        email: String,
    },
    /// Set any role directly in the database, superadmin included
    SetRole { user_id: String, role: Role },
    /// Print the assembled user data as JSON
    Bundle {
        #[command(flatten)]
        auth: TokenArg,
    },
    /// Log a mood from 1 to 10
    Mood {
        #[command(flatten)]
        auth: TokenArg,
        mood: u8,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Complete today's program task
    Task {
        #[command(flatten)]
        auth: TokenArg,
    },
    /// Choose a 30-day program: healing, glow-up or no-contact
    Program {
        #[command(flatten)]
        auth: TokenArg,
        program: Program,
    },
    /// Write a journal entry
    Journal {
        #[command(flatten)]
        auth: TokenArg,
        content: String,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long, default_value = "5")]
        mood: u8,
    },
    /// Send one chat message to the companion
    Chat {
        #[command(flatten)]
        auth: TokenArg,
        message: String,
    },
    /// Summarize the last seven days
    Summary {
        #[command(flatten)]
        auth: TokenArg,
    },
    /// List every user (admins only)
    Users {
        #[command(flatten)]
        auth: TokenArg,
    },
    /// Delete the profile and everything it owns
    Reset {
        #[command(flatten)]
        auth: TokenArg,
    },
}

pub(crate) fn ensure_db_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub(crate) fn open_storage() -> Result<Arc<Storage>> {
    let db_path: PathBuf = default_db_path();
    ensure_db_dir(&db_path)?;
    Ok(Arc::new(Storage::new(&db_path)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await,
        Commands::Signup { email, id } => commands::accounts::signup(email, id),
        Commands::Login { email } => commands::accounts::login(&email),
        Commands::SetRole { user_id, role } => commands::accounts::set_role(&user_id, role),
        Commands::Bundle { auth } => commands::session::bundle(&auth.token).await,
        Commands::Mood { auth, mood, date } => commands::session::mood(&auth.token, mood, date).await,
        Commands::Task { auth } => commands::session::task(&auth.token).await,
        Commands::Program { auth, program } => {
            commands::session::program(&auth.token, program).await
        },
        Commands::Journal { auth, content, prompt, mood } => {
            commands::session::journal(&auth.token, &content, prompt, mood).await
        },
        Commands::Chat { auth, message } => commands::session::chat(&auth.token, &message).await,
        Commands::Summary { auth } => commands::session::summary(&auth.token).await,
        Commands::Users { auth } => commands::accounts::users(&auth.token).await,
        Commands::Reset { auth } => commands::session::reset(&auth.token).await,
    }
}
