//! In-Process Reference Engine
//!
//! The gateway treats the workflow engine as an external collaborator behind
//! the `EngineIntake` / `ExecutionRegistry` traits. This module is the
//! in-process implementation used by the embedded server and the test
//! suite: a bounded intake channel in front of a single worker task that
//! owns all execution state.
//!
//! # Interpretation
//!
//! Interpretation is deliberately small. A node with children runs them as
//! a sequence: the first child is activated on launch, and a completed or
//! canceled child hands over to its next sibling. The `stall` leaf never
//! completes; every other leaf completes as soon as it is activated. A
//! parent with no remaining children completes too, and root completion
//! terminates the execution. That is enough tree behavior to observe the
//! cancellation semantics end to end.
//!
//! # Concurrency
//!
//! `submit` returns once the message is queued; the worker applies messages
//! strictly in arrival order. A cancel may therefore target a node that was
//! present when the gateway resolved it but is gone by the time the worker
//! gets there; the worker treats that as a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::engine::{EngineIntake, IntakeError, IntakeMessage};
use crate::domain::events::EngineEvent;
use crate::domain::execution::{Execution, Exid, ExecutionStatus, Nid, NodeState};
use crate::domain::tree::Tree;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::registry::InMemoryExecutionRegistry;

const STALL: &str = "stall";

/// Clonable intake handle; the write side the dispatcher talks to.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<IntakeMessage>,
}

#[async_trait]
impl EngineIntake for EngineHandle {
    async fn submit(&self, message: IntakeMessage) -> Result<(), IntakeError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| IntakeError::Unavailable)
    }
}

pub struct InProcessEngine {
    registry: Arc<InMemoryExecutionRegistry>,
    event_bus: Arc<EventBus>,
    trees: RwLock<HashMap<String, Tree>>,
}

impl InProcessEngine {
    /// Spawn the engine worker. Returns the engine, the intake handle and
    /// the worker's join handle.
    pub fn start(
        capacity: usize,
        registry: Arc<InMemoryExecutionRegistry>,
        event_bus: Arc<EventBus>,
    ) -> (Arc<Self>, EngineHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(capacity);

        let engine = Arc::new(Self {
            registry,
            event_bus,
            trees: RwLock::new(HashMap::new()),
        });

        let worker = engine.clone();
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                worker.apply(message);
            }
            debug!("engine intake closed, worker stopping");
        });

        (engine, EngineHandle { tx }, handle)
    }

    /// Register a tree launchable by `name`.
    pub fn register_tree(&self, name: impl Into<String>, tree: Tree) {
        self.trees.write().insert(name.into(), tree);
    }

    fn apply(&self, message: IntakeMessage) {
        match message {
            IntakeMessage::Launch {
                exid,
                domain,
                tree,
                name,
                ..
            } => {
                let tree = match (tree, name) {
                    (Some(tree), _) => tree,
                    (None, Some(name)) => match self.trees.read().get(&name).cloned() {
                        Some(tree) => tree,
                        None => {
                            warn!(exid = %exid, name = %name, "unknown tree name, dropping launch");
                            return;
                        }
                    },
                    (None, None) => {
                        warn!(exid = %exid, "launch without tree or name, dropping");
                        return;
                    }
                };
                self.apply_launch(exid, domain, tree);
            }
            IntakeMessage::Cancel { exid, nid } => self.apply_cancel(exid, nid),
        }
    }

    fn apply_launch(&self, exid: Exid, domain: String, tree: Tree) {
        info!(exid = %exid, domain = %domain, "launching execution");

        let mut execution = Execution::new(exid.clone(), domain.clone(), tree.clone());
        self.event_bus.publish(EngineEvent::ExecutionLaunched {
            exid,
            domain,
            launched_at: Utc::now(),
        });

        self.activate(&mut execution, Nid::root(), &tree);
        self.registry.upsert(execution);
    }

    fn apply_cancel(&self, exid: Exid, nid: Nid) {
        let Some(mut execution) = self.registry.get(&exid) else {
            warn!(exid = %exid, "cancel for unknown execution, ignoring");
            return;
        };

        if !execution.has_node(&nid) {
            // resolved against an earlier snapshot; the node has since gone
            debug!(exid = %exid, nid = %nid, "cancel target already gone");
            return;
        }

        info!(exid = %exid, nid = %nid, "canceling node");

        if nid.is_root() {
            self.terminate(&mut execution);
        } else {
            self.remove_subtree(&mut execution, &nid);
            self.advance(&mut execution, &nid);
        }

        self.registry.upsert(execution);
    }

    /// Activate the node at `nid` according to its definition.
    fn activate(&self, execution: &mut Execution, nid: Nid, def: &Tree) {
        execution.nodes.insert(
            nid.as_str().to_string(),
            NodeState {
                name: def.name.clone(),
                parent: nid.parent(),
                created_at: Utc::now(),
            },
        );
        self.event_bus.publish(EngineEvent::NodeAdded {
            exid: execution.exid.clone(),
            nid: nid.clone(),
            name: def.name.clone(),
            added_at: Utc::now(),
        });

        if let Some(first) = def.children.first() {
            self.activate(execution, nid.child(0), first);
        } else if def.name != STALL {
            self.complete(execution, &nid);
        }
    }

    /// A node finished; retire it and hand over past it.
    fn complete(&self, execution: &mut Execution, nid: &Nid) {
        execution.nodes.shift_remove(nid.as_str());
        self.event_bus.publish(EngineEvent::NodeRemoved {
            exid: execution.exid.clone(),
            nid: nid.clone(),
            removed_at: Utc::now(),
        });
        self.advance(execution, nid);
    }

    /// Advance past `nid`: activate the next sibling if the tree defines
    /// one, otherwise the parent completes; past the root the execution is
    /// over.
    fn advance(&self, execution: &mut Execution, nid: &Nid) {
        if execution.status == ExecutionStatus::Terminated {
            return;
        }

        let Some(parent) = nid.parent() else {
            self.terminate(execution);
            return;
        };

        let next = parent.child(nid.last_index() + 1);
        let tree = execution.tree.clone();
        match tree.at(&next.path()) {
            Some(def) => self.activate(execution, next, def),
            None => self.complete(execution, &parent),
        }
    }

    fn remove_subtree(&self, execution: &mut Execution, nid: &Nid) {
        let doomed: Vec<String> = execution
            .nodes
            .keys()
            .filter(|key| {
                key.as_str() == nid.as_str()
                    || Nid::parse(key).is_some_and(|n| n.is_descendant_of(nid))
            })
            .cloned()
            .collect();

        for key in doomed {
            execution.nodes.shift_remove(&key);
            self.event_bus.publish(EngineEvent::NodeRemoved {
                exid: execution.exid.clone(),
                nid: Nid::parse(&key).unwrap_or_else(Nid::root),
                removed_at: Utc::now(),
            });
        }
    }

    fn terminate(&self, execution: &mut Execution) {
        execution.status = ExecutionStatus::Terminated;
        execution.nodes.clear();
        self.event_bus.publish(EngineEvent::ExecutionTerminated {
            exid: execution.exid.clone(),
            terminated_at: Utc::now(),
        });
    }
}
