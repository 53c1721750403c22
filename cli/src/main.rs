// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AEGIS Gateway CLI
//!
//! The `aegis-gateway` binary serves the message front door and posts
//! launch/cancel messages to a running gateway.
//!
//! ## Commands
//!
//! - `aegis-gateway serve` - Run the HTTP front door with the embedded engine
//! - `aegis-gateway launch --domain d --tree t | --name n` - Launch an execution
//! - `aegis-gateway cancel --exid x [--nid n]` - Cancel an execution or node
//! - `aegis-gateway executions` - List executions known to the gateway

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// AEGIS Gateway - workflow engine front door
#[derive(Parser)]
#[command(name = "aegis-gateway")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "AEGIS_GATEWAY_CONFIG",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Gateway base URL for client commands
    #[arg(
        long,
        global = true,
        env = "AEGIS_GATEWAY_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AEGIS_GATEWAY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the message front door
    Serve,

    /// Launch an execution
    Launch {
        /// Domain the execution is grouped under
        #[arg(long)]
        domain: String,

        /// Inline tree JSON, e.g. '["sequence", "stall", "stall"]'
        #[arg(long, conflicts_with = "name")]
        tree: Option<String>,

        /// Name of a tree registered in the gateway configuration
        #[arg(long)]
        name: Option<String>,
    },

    /// Cancel an execution or one of its nodes
    Cancel {
        /// Execution identifier
        #[arg(long)]
        exid: String,

        /// Node id inside the execution tree (defaults to the root)
        #[arg(long)]
        nid: Option<String>,
    },

    /// List executions known to the gateway
    Executions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    match cli.command {
        Commands::Serve => commands::serve::run(cli.config.as_deref()).await,
        Commands::Launch { domain, tree, name } => {
            commands::message::launch(&cli.url, &domain, tree.as_deref(), name.as_deref()).await
        }
        Commands::Cancel { exid, nid } => {
            commands::message::cancel(&cli.url, &exid, nid.as_deref()).await
        }
        Commands::Executions => commands::message::executions(&cli.url).await,
    }
}
