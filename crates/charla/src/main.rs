// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Charla - a chat-network to Chatwoot synchronization bridge.
//!
//! This is the binary entry point for the bridge.

use clap::{Parser, Subcommand};

mod console;
mod serve;

/// Charla - a chat-network to Chatwoot synchronization bridge.
#[derive(Parser, Debug)]
#[command(name = "charla", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bridge: webhook server plus the provider event loop.
    Serve,
    /// Print the effective configuration with credentials redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match charla_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            charla_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(error) = serve::run_serve(config).await {
                eprintln!("charla serve failed: {error}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            print_config(config);
        }
        None => {
            println!("charla: use --help for available commands");
        }
    }
}

/// Prints the effective configuration as TOML, token redacted.
fn print_config(mut config: charla_config::model::CharlaConfig) {
    if config.chatwoot.api_access_token.is_some() {
        config.chatwoot.api_access_token = Some("<redacted>".to_string());
    }
    match toml::to_string_pretty(&config) {
        Ok(rendered) => print!("{rendered}"),
        Err(error) => eprintln!("could not render config: {error}"),
    }
}
