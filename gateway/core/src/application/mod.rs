// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod allocator;
pub mod dispatcher;
pub mod resolver;

pub use allocator::ExidAllocator;
pub use dispatcher::{MessageDispatcher, ResponseDescriptor};
pub use resolver::{CancelTarget, CancellationResolver, ResolveError};
