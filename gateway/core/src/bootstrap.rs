//! Gateway assembly.
//!
//! Wires configuration, engine, dispatcher and router into a runnable
//! gateway. Used by the embedded server and the integration tests.

use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;

use crate::application::allocator::ExidAllocator;
use crate::application::dispatcher::MessageDispatcher;
use crate::application::resolver::CancellationResolver;
use crate::domain::engine::{EngineIntake, ExecutionRegistry};
use crate::infrastructure::config::GatewayConfig;
use crate::infrastructure::engine::{EngineHandle, InProcessEngine};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::registry::InMemoryExecutionRegistry;
use crate::presentation::api::{app, AppState};

/// A fully wired gateway over the in-process engine.
pub struct Gateway {
    pub router: Router,
    pub engine: Arc<InProcessEngine>,
    pub intake: EngineHandle,
    pub registry: Arc<InMemoryExecutionRegistry>,
    pub event_bus: Arc<EventBus>,
    pub worker: JoinHandle<()>,
}

impl Gateway {
    /// Build a gateway from configuration. Must be called inside a tokio
    /// runtime; the engine worker is spawned immediately.
    pub fn build(config: &GatewayConfig) -> Self {
        let registry = Arc::new(InMemoryExecutionRegistry::new());
        let event_bus = Arc::new(EventBus::with_default_capacity());

        let (engine, intake, worker) =
            InProcessEngine::start(config.intake_capacity, registry.clone(), event_bus.clone());

        for (name, tree) in config.parsed_trees() {
            engine.register_tree(name, tree);
        }

        let allocator = Arc::new(ExidAllocator::new(config.unit.clone()));
        let registry_view: Arc<dyn ExecutionRegistry> = registry.clone();
        let resolver = CancellationResolver::new(registry_view.clone());
        let engine_intake: Arc<dyn EngineIntake> = Arc::new(intake.clone());
        let dispatcher = MessageDispatcher::new(allocator, resolver, engine_intake);

        let state = Arc::new(AppState {
            dispatcher,
            registry: registry_view,
        });

        Self {
            router: app(state),
            engine,
            intake,
            registry,
            event_bus,
            worker,
        }
    }
}
