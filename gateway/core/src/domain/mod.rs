// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod engine;
pub mod events;
pub mod execution;
pub mod message;
pub mod tree;
