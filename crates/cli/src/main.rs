//! Pageturn CLI - Session store migrations and deep-link checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! pageturn-cli migrate
//!
//! # Check that a deep link resolves to an element within 2 seconds
//! pageturn-cli deeplink "http://localhost:3000/#latest-novels"
//!
//! # Same, with a custom schedule
//! pageturn-cli deeplink "http://localhost:3000/#sneak-peeks" --interval-ms 250 --timeout-ms 10000
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run session store migrations
//! - `deeplink` - Poll a page until the fragment target is present

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use clap::{Parser, Subcommand};

mod commands;

use commands::deeplink::DeeplinkOptions;

#[derive(Parser)]
#[command(name = "pageturn-cli")]
#[command(author, version, about = "Pageturn CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run session store migrations
    Migrate,
    /// Wait for the element named by a URL fragment to appear on the page
    Deeplink {
        /// Page URL including the `#fragment` to look for
        url: String,

        /// Milliseconds between attempts
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Milliseconds before giving up
        #[arg(long, default_value_t = 2000)]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Deeplink {
            url,
            interval_ms,
            timeout_ms,
        } => {
            let options = DeeplinkOptions {
                interval: Duration::from_millis(interval_ms),
                timeout: Duration::from_millis(timeout_ms),
            };
            let attempts = commands::deeplink::check(&url, options).await?;

            #[allow(clippy::print_stdout)]
            {
                println!("found after {attempts} attempt(s)");
            }
        }
    }
    Ok(())
}
