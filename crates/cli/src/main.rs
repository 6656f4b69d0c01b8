//! Bintrack CLI - database migrations and inventory tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bt-cli migrate
//!
//! # Insert demo items
//! bt-cli seed --count 24
//!
//! # Show what needs shipping
//! bt-cli ship-list --today 2026-03-10
//! ```
//!
//! All commands read `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bt-cli")]
#[command(author, version, about = "Bintrack CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo items
    Seed {
        /// Number of items to create
        #[arg(short, long, default_value_t = 16)]
        count: usize,
    },
    /// List sold items awaiting shipment
    ShipList {
        /// Date to measure deadlines from (`YYYY-MM-DD`)
        #[arg(short, long)]
        today: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { count } => commands::seed::demo_items(count).await?,
        Commands::ShipList { today } => commands::ship_list::run(today.as_deref()).await?,
    }
    Ok(())
}
