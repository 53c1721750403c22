// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Serve the gateway with the embedded in-process engine.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use aegis_gateway::bootstrap::Gateway;
use aegis_gateway::infrastructure::config::GatewayConfig;
use aegis_gateway::infrastructure::event_bus::EventBusError;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GatewayConfig::default(),
    };

    let gateway = Gateway::build(&config);

    // follow engine activity in the server log
    let mut events = gateway.event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(?event, "engine event"),
                Err(EventBusError::Lagged(_)) => continue,
                Err(EventBusError::Closed) => break,
            }
        }
    });

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, unit = %config.unit, "gateway listening");

    axum::serve(listener, gateway.router)
        .await
        .context("server error")?;

    Ok(())
}
