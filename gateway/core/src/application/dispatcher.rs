//! Message Dispatch
//!
//! Routes a validated message into the engine intake and classifies every
//! outcome into a response descriptor.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrate validation, identifier allocation,
//!   cancellation resolution and intake submission for one message
//!
//! Dispatch is synchronous end-to-end from the caller's perspective: all of
//! the above complete before a descriptor is produced, and none of them wait
//! for the engine to act. The engine's effects become observable later
//! through the registry view.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::allocator::ExidAllocator;
use crate::application::resolver::{CancellationResolver, ResolveError};
use crate::domain::engine::{EngineIntake, IntakeMessage};
use crate::domain::execution::Exid;
use crate::domain::message::{self, CancelMessage, LaunchMessage, Message, TreeSource};

/// Outcome of dispatching one message. Transient; the presentation layer
/// renders it into the response envelope.
#[derive(Debug, Clone)]
pub enum ResponseDescriptor {
    Created { exid: Exid, location: String },
    Accepted { location: String },
    ClientError { error: String },
    NotFound { error: String },
    EngineError { error: String },
}

pub struct MessageDispatcher {
    allocator: Arc<ExidAllocator>,
    resolver: CancellationResolver,
    intake: Arc<dyn EngineIntake>,
}

impl MessageDispatcher {
    pub fn new(
        allocator: Arc<ExidAllocator>,
        resolver: CancellationResolver,
        intake: Arc<dyn EngineIntake>,
    ) -> Self {
        Self {
            allocator,
            resolver,
            intake,
        }
    }

    /// Validate and dispatch one inbound message.
    pub async fn dispatch(&self, payload: &Value) -> ResponseDescriptor {
        let message = match message::validate(payload) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "rejecting malformed message");
                return ResponseDescriptor::ClientError {
                    error: e.to_string(),
                };
            }
        };

        match message {
            Message::Launch(launch) => self.dispatch_launch(launch).await,
            Message::Cancel(cancel) => self.dispatch_cancel(cancel).await,
        }
    }

    async fn dispatch_launch(&self, launch: LaunchMessage) -> ResponseDescriptor {
        let exid = self.allocator.allocate(&launch.domain);

        let (tree, name) = match launch.source {
            TreeSource::Tree(tree) => (Some(tree), None),
            TreeSource::Name(name) => (None, Some(name)),
        };

        let submission = IntakeMessage::Launch {
            exid: exid.clone(),
            domain: launch.domain.clone(),
            tree,
            name,
            vars: launch.vars,
        };

        match self.intake.submit(submission).await {
            Ok(()) => {
                info!(exid = %exid, domain = %launch.domain, "launch accepted");
                ResponseDescriptor::Created {
                    location: location(&exid),
                    exid,
                }
            }
            Err(e) => {
                warn!(exid = %exid, error = %e, "engine refused launch");
                ResponseDescriptor::EngineError {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn dispatch_cancel(&self, cancel: CancelMessage) -> ResponseDescriptor {
        let exid = Exid::new(cancel.exid);

        let target = match self.resolver.resolve(&exid, cancel.nid.as_ref()).await {
            Ok(target) => target,
            Err(e @ (ResolveError::MissingExecution | ResolveError::MissingNode)) => {
                debug!(exid = %exid, error = %e, "cancel target not found");
                return ResponseDescriptor::NotFound {
                    error: e.to_string(),
                };
            }
            Err(e) => {
                warn!(exid = %exid, error = %e, "registry lookup failed");
                return ResponseDescriptor::EngineError {
                    error: e.to_string(),
                };
            }
        };

        let submission = IntakeMessage::Cancel {
            exid: target.exid.clone(),
            nid: target.nid.clone(),
        };

        match self.intake.submit(submission).await {
            Ok(()) => {
                info!(exid = %target.exid, nid = %target.nid, "cancel accepted");
                ResponseDescriptor::Accepted {
                    location: location(&target.exid),
                }
            }
            Err(e) => {
                warn!(exid = %target.exid, error = %e, "engine refused cancel");
                ResponseDescriptor::EngineError {
                    error: e.to_string(),
                }
            }
        }
    }
}

fn location(exid: &Exid) -> String {
    format!("/executions/{exid}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::IntakeError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingIntake {
        accepted: Mutex<Vec<IntakeMessage>>,
        reject: bool,
    }

    #[async_trait]
    impl EngineIntake for RecordingIntake {
        async fn submit(&self, message: IntakeMessage) -> Result<(), IntakeError> {
            if self.reject {
                return Err(IntakeError::Rejected("intake closed".to_string()));
            }
            self.accepted.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn dispatcher(intake: Arc<RecordingIntake>) -> MessageDispatcher {
        let registry = Arc::new(crate::infrastructure::registry::InMemoryExecutionRegistry::new());
        MessageDispatcher::new(
            Arc::new(ExidAllocator::with_seed("u", 2000)),
            CancellationResolver::new(registry),
            intake,
        )
    }

    #[tokio::test]
    async fn launch_allocates_and_submits() {
        let intake = Arc::new(RecordingIntake::default());
        let dispatcher = dispatcher(intake.clone());

        let descriptor = dispatcher
            .dispatch(&json!({ "point": "launch", "domain": "org.example", "tree": "stall" }))
            .await;

        let ResponseDescriptor::Created { exid, location } = descriptor else {
            panic!("expected created")
        };
        assert!(exid.as_str().starts_with("org.example-u-2000."));
        assert_eq!(location, format!("/executions/{exid}"));

        let accepted = intake.accepted.lock().unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].exid(), &exid);
    }

    #[tokio::test]
    async fn malformed_message_becomes_a_client_error() {
        let dispatcher = dispatcher(Arc::new(RecordingIntake::default()));

        let descriptor = dispatcher.dispatch(&json!({ "point": "flip" })).await;

        let ResponseDescriptor::ClientError { error } = descriptor else {
            panic!("expected client error")
        };
        assert_eq!(error, "bad msg point \"flip\"");
    }

    #[tokio::test]
    async fn cancel_of_unknown_execution_is_not_found() {
        let dispatcher = dispatcher(Arc::new(RecordingIntake::default()));

        let descriptor = dispatcher
            .dispatch(&json!({ "point": "cancel", "exid": "org.example-u-1.xu" }))
            .await;

        let ResponseDescriptor::NotFound { error } = descriptor else {
            panic!("expected not found")
        };
        assert_eq!(error, "missing execution");
    }

    #[tokio::test]
    async fn engine_rejection_is_distinguishable() {
        let intake = Arc::new(RecordingIntake {
            reject: true,
            ..Default::default()
        });
        let dispatcher = dispatcher(intake);

        let descriptor = dispatcher
            .dispatch(&json!({ "point": "launch", "domain": "org.example", "tree": "stall" }))
            .await;

        assert!(matches!(descriptor, ResponseDescriptor::EngineError { .. }));
    }
}
