// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::execution::{Exid, Nid};

/// Engine lifecycle events published on the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    ExecutionLaunched {
        exid: Exid,
        domain: String,
        launched_at: DateTime<Utc>,
    },
    NodeAdded {
        exid: Exid,
        nid: Nid,
        name: String,
        added_at: DateTime<Utc>,
    },
    NodeRemoved {
        exid: Exid,
        nid: Nid,
        removed_at: DateTime<Utc>,
    },
    ExecutionTerminated {
        exid: Exid,
        terminated_at: DateTime<Utc>,
    },
}

impl EngineEvent {
    pub fn exid(&self) -> &Exid {
        match self {
            Self::ExecutionLaunched { exid, .. }
            | Self::NodeAdded { exid, .. }
            | Self::NodeRemoved { exid, .. }
            | Self::ExecutionTerminated { exid, .. } => exid,
        }
    }
}
