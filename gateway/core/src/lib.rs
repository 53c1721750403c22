// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AEGIS Gateway Core
//!
//! Message-intake front door for the AEGIS workflow-execution engine: a
//! client posts a structured message (`launch` a new execution, `cancel` a
//! running one) and the gateway validates it, allocates or resolves engine
//! identifiers, forwards it into the engine intake and answers synchronously
//! while the engine acts asynchronously.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Validation, identifier allocation, cancellation resolution
//!   and dispatch between the HTTP surface and the engine intake.

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use bootstrap::Gateway;
