use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::engine::{ExecutionRegistry, RegistryError};
use crate::domain::execution::{Execution, Exid};

/// In-memory execution registry.
///
/// The engine worker is the only writer; everything else reads clones
/// through the `ExecutionRegistry` view.
#[derive(Default)]
pub struct InMemoryExecutionRegistry {
    executions: DashMap<Exid, Execution>,
}

impl InMemoryExecutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an execution snapshot.
    pub fn upsert(&self, execution: Execution) {
        self.executions.insert(execution.exid.clone(), execution);
    }

    pub fn get(&self, exid: &Exid) -> Option<Execution> {
        self.executions.get(exid).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.executions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }
}

#[async_trait]
impl ExecutionRegistry for InMemoryExecutionRegistry {
    async fn find_by_exid(&self, exid: &Exid) -> Result<Option<Execution>, RegistryError> {
        Ok(self.get(exid))
    }

    async fn list_all(&self) -> Result<Vec<Execution>, RegistryError> {
        Ok(self
            .executions
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
