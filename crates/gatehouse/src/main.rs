// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gatehouse - per-actor admission limiting and short-term conversation memory.

mod serve;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gatehouse_config::{ConfigError, GatehouseConfig};

/// Gatehouse - per-actor admission limiting and short-term conversation memory.
#[derive(Parser, Debug)]
#[command(name = "gatehouse", version, about, long_about = None)]
struct Cli {
    /// Load this file instead of the standard config hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run maintenance and the metrics exporter until SIGINT/SIGTERM.
    Serve,
    /// Interactive session against an offline echo generator.
    Shell {
        /// Actor to act as.
        #[arg(long, default_value = "local")]
        actor: String,
        /// Scope to start in; omitted means unscoped.
        #[arg(long)]
        scope: Option<String>,
    },
    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the merged configuration as TOML.
    Show,
    /// Validate the configuration and exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            gatehouse_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell { actor, scope }) => shell::run_shell(config, actor, scope).await,
        Some(Commands::Config { action: ConfigAction::Show }) => {
            match toml::to_string_pretty(&config) {
                Ok(text) => {
                    print!("{text}");
                    Ok(())
                }
                Err(e) => Err(gatehouse_core::GatehouseError::Serialization { source: Box::new(e) }),
            }
        }
        Some(Commands::Config { action: ConfigAction::Check }) => {
            println!(
                "gatehouse: config ok (global {}/{}s, {} categories, memory {})",
                config.limiter.global.capacity,
                config.limiter.global.window_secs,
                config.limiter.categories.iter().count(),
                if config.memory.enabled { "on" } else { "off" },
            );
            Ok(())
        }
        None => {
            println!("gatehouse: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("gatehouse: {e}");
        std::process::exit(1);
    }
}

fn load(path: Option<&std::path::Path>) -> Result<GatehouseConfig, Vec<ConfigError>> {
    match path {
        Some(path) => gatehouse_config::load_and_validate_path(path),
        None => gatehouse_config::load_and_validate(),
    }
}
