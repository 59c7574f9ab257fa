//! Kala Connect CLI - migrations, fixture seeding and a flow runner.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront migrations (snapshots, shared carts, sessions)
//! kc-cli migrate
//!
//! # Write fixture products, reels and demo accounts
//! kc-cli seed
//! kc-cli seed --force
//!
//! # Run one generation flow against Gemini
//! kc-cli generate seller-story --input story.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::generate::FlowName;

#[derive(Parser)]
#[command(name = "kc-cli")]
#[command(author, version, about = "Kala Connect CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed snapshot storage with fixtures
    Seed {
        /// Overwrite snapshots that already exist
        #[arg(long)]
        force: bool,
    },
    /// Run a generation flow and print its JSON output
    Generate {
        /// Flow to run
        #[arg(value_enum)]
        flow: FlowName,

        /// JSON file holding the flow input
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "kc_cli=info,kala_connect_storefront=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { force } => commands::seed::run(force).await?,
        Commands::Generate { flow, input } => commands::generate::run(flow, &input).await?,
    }
    Ok(())
}
