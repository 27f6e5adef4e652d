//! `fumi`: command-line front end for the fumigation service.
//!
//! Every command runs through the role router; the interactive `shell` keeps a
//! session for the life of the process.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod context;
mod output;

use context::AppContext;

#[derive(Parser)]
#[command(name = "fumi")]
#[command(about = "Fumigation service client")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides FUMIGATION_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Run in quiet mode (no prompts, minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Keep the session only for this process
        #[arg(long)]
        temporary: bool,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user and their landing screen
    Whoami,

    /// Fumigation applications
    #[command(subcommand)]
    Applications(cmd::applications::ApplicationsCommand),

    /// Lots and their technicians
    #[command(subcommand)]
    Lots(cmd::lots::LotsCommand),

    /// User administration
    #[command(subcommand)]
    Users(cmd::users::UsersCommand),

    /// Fumigation and cleanup reports
    #[command(subcommand)]
    Reports(cmd::reports::ReportsCommand),

    /// Attach a signature image to a report
    Sign(cmd::reports::SignArgs),

    /// Admin overview
    Dashboard,

    /// Interactive menu
    Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,fumigation_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::new(cli.api_url, cli.quiet)
        .await
        .context("Failed to start session")?;

    let result = match cli.command {
        Some(Commands::Login { email, temporary }) => {
            cmd::auth::login(&ctx, email, !temporary).await
        }
        Some(Commands::Logout) => cmd::auth::logout(&ctx),
        Some(Commands::Whoami) => cmd::auth::whoami(&ctx),
        Some(Commands::Applications(cmd)) => cmd::applications::run(&ctx, cmd).await,
        Some(Commands::Lots(cmd)) => cmd::lots::run(&ctx, cmd).await,
        Some(Commands::Users(cmd)) => cmd::users::run(&ctx, cmd).await,
        Some(Commands::Reports(cmd)) => cmd::reports::run(&ctx, cmd).await,
        Some(Commands::Sign(args)) => cmd::reports::sign(&ctx, args).await,
        Some(Commands::Dashboard) => cmd::dashboard::show(&ctx).await,
        Some(Commands::Shell) | None => cmd::shell::run(&ctx).await,
    };

    ctx.session.teardown();
    result
}
