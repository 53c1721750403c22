// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Engine Collaborator Interfaces
//!
//! Contracts the gateway consumes from the workflow engine, defined in the
//! domain layer and implemented in `crate::infrastructure`:
//!
//! | Trait | Side | Description |
//! |-------|------|-------------|
//! | `EngineIntake` | write | Submit a message; synchronous acceptance only |
//! | `ExecutionRegistry` | read | Point-in-time snapshots of executions |
//!
//! `submit` returning `Ok` means the engine has queued the message, not that
//! it has acted on it. Registry snapshots go stale as the engine advances;
//! callers must not assume a looked-up node still exists by the time a
//! follow-up message is processed.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::execution::{Execution, Exid, Nid};
use crate::domain::tree::Tree;

/// A message submitted into the engine intake.
#[derive(Debug, Clone)]
pub enum IntakeMessage {
    Launch {
        exid: Exid,
        domain: String,
        tree: Option<Tree>,
        name: Option<String>,
        vars: Map<String, Value>,
    },
    Cancel {
        exid: Exid,
        nid: Nid,
    },
}

impl IntakeMessage {
    pub fn exid(&self) -> &Exid {
        match self {
            Self::Launch { exid, .. } | Self::Cancel { exid, .. } => exid,
        }
    }
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("engine rejected message: {0}")]
    Rejected(String),
    #[error("engine intake unavailable")]
    Unavailable,
}

/// Engine write side.
#[async_trait]
pub trait EngineIntake: Send + Sync {
    /// Submit a message for asynchronous processing. Returns once the engine
    /// has accepted the submission structurally; never waits for execution.
    async fn submit(&self, message: IntakeMessage) -> Result<(), IntakeError>;
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Engine read side: the pull-based registry view.
#[async_trait]
pub trait ExecutionRegistry: Send + Sync {
    /// Snapshot of one execution, if it currently exists.
    async fn find_by_exid(&self, exid: &Exid) -> Result<Option<Execution>, RegistryError>;

    /// Snapshots of all current executions.
    async fn list_all(&self) -> Result<Vec<Execution>, RegistryError>;
}
