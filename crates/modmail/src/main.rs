// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modmail - Discord modmail relay.
//!
//! This is the binary entry point for the modmail bot.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;
mod transcript;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modmail_config::ModmailConfig;

/// Modmail - Discord modmail relay.
#[derive(Parser, Debug)]
#[command(name = "modmail", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to Discord and relay messages (default).
    Serve,
    /// Validate the configuration and exit.
    Check,
    /// Render an HTML transcript from a JSON message dump.
    Transcript {
        /// JSON file with `channel` metadata and `messages`.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the HTML document.
        #[arg(long)]
        output: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> ModmailConfig {
    let loaded = match path {
        Some(path) => modmail_config::load_and_validate_path(path),
        None => modmail_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            modmail_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(errors) = modmail_config::validate_for_serve(&config) {
                modmail_config::render_errors(&errors);
                std::process::exit(1);
            }
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Check => match modmail_config::validate_for_serve(&config) {
            Ok(()) => println!("modmail: configuration is valid"),
            Err(errors) => {
                modmail_config::render_errors(&errors);
                std::process::exit(1);
            }
        },
        Commands::Transcript { input, output } => {
            if let Err(e) = transcript::run_transcript(&config, &input, &output).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}
