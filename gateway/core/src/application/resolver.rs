use std::sync::Arc;

use thiserror::Error;

use crate::domain::engine::{ExecutionRegistry, RegistryError};
use crate::domain::execution::{Exid, Nid};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("missing execution")]
    MissingExecution,
    #[error("missing execution node")]
    MissingNode,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Where a cancel message lands inside a running execution.
#[derive(Debug, Clone)]
pub struct CancelTarget {
    pub exid: Exid,
    pub nid: Nid,
}

/// Resolves cancel messages against the registry view.
///
/// Resolution reads a point-in-time snapshot. The engine keeps mutating the
/// tree after `resolve` returns; a target that vanishes in between is the
/// engine's no-op to make, not a resolver failure.
pub struct CancellationResolver {
    registry: Arc<dyn ExecutionRegistry>,
}

impl CancellationResolver {
    pub fn new(registry: Arc<dyn ExecutionRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve `exid` and the optional `nid`, defaulting to the tree root.
    pub async fn resolve(
        &self,
        exid: &Exid,
        nid: Option<&Nid>,
    ) -> Result<CancelTarget, ResolveError> {
        let execution = self
            .registry
            .find_by_exid(exid)
            .await?
            .ok_or(ResolveError::MissingExecution)?;

        let nid = nid.cloned().unwrap_or_else(Nid::root);
        if !execution.has_node(&nid) {
            return Err(ResolveError::MissingNode);
        }

        Ok(CancelTarget {
            exid: exid.clone(),
            nid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::{Execution, NodeState};
    use crate::domain::tree::Tree;
    use crate::infrastructure::registry::InMemoryExecutionRegistry;
    use chrono::Utc;

    fn registry_with_stalled_execution(exid: &Exid) -> Arc<InMemoryExecutionRegistry> {
        let registry = Arc::new(InMemoryExecutionRegistry::new());
        let mut execution = Execution::new(exid.clone(), "org.example", Tree::leaf("stall"));
        execution.nodes.insert(
            "0".to_string(),
            NodeState {
                name: "stall".to_string(),
                parent: None,
                created_at: Utc::now(),
            },
        );
        registry.upsert(execution);
        registry
    }

    #[tokio::test]
    async fn resolves_the_root_by_default() {
        let exid = Exid::new("org.example-u-7.bodefu");
        let resolver = CancellationResolver::new(registry_with_stalled_execution(&exid));

        let target = resolver.resolve(&exid, None).await.unwrap();
        assert_eq!(target.exid, exid);
        assert!(target.nid.is_root());
    }

    #[tokio::test]
    async fn reports_a_missing_execution() {
        let resolver = CancellationResolver::new(Arc::new(InMemoryExecutionRegistry::new()));

        let err = resolver
            .resolve(&Exid::new("org.example-u-7.bodefu"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing execution");
    }

    #[tokio::test]
    async fn reports_a_missing_node() {
        let exid = Exid::new("org.example-u-7.bodefu");
        let resolver = CancellationResolver::new(registry_with_stalled_execution(&exid));

        let nid = Nid::parse("0_1").unwrap();
        let err = resolver.resolve(&exid, Some(&nid)).await.unwrap_err();
        assert_eq!(err.to_string(), "missing execution node");
    }
}
