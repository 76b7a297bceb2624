//! Paygate CLI - database migrations and processor lookups.
//!
//! # Usage
//!
//! ```bash
//! # Create the auth_tokens and subscriptions tables
//! paygate-cli migrate
//!
//! # Show a coupon's terms as the checkout page would see them
//! paygate-cli coupon SPRING20
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "paygate-cli")]
#[command(author, version, about = "Paygate CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Look up a coupon at the payment processor
    Coupon {
        /// Coupon code as a customer would type it
        code: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Coupon { code } => commands::coupon::show(&code).await,
    }
}
