use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::tree::Tree;

/// Unique execution identifier: `<domain>-<unit>-<counter>.<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Exid(String);

impl Exid {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Exid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a node inside an execution tree.
///
/// The root is `"0"`; children extend the parent id (`0_0`, `0_1`, ...). A
/// nid addresses a position, not a node: whether it is valid for a given
/// execution depends on the execution's current `nodes` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nid(String);

impl Nid {
    pub const ROOT: &'static str = "0";

    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// A nid is a non-empty `_`-separated list of decimal indices.
    pub fn parse(s: &str) -> Option<Self> {
        let ok = !s.is_empty()
            && s.split('_')
                .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()));
        ok.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn child(&self, index: usize) -> Self {
        Self(format!("{}_{}", self.0, index))
    }

    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once('_').map(|(head, _)| Self(head.to_string()))
    }

    /// Index of this node among its siblings.
    pub fn last_index(&self) -> usize {
        self.0
            .rsplit('_')
            .next()
            .and_then(|seg| seg.parse().ok())
            .unwrap_or(0)
    }

    /// Child indices from the root down to this node.
    pub fn path(&self) -> Vec<usize> {
        self.0
            .split('_')
            .skip(1)
            .filter_map(|seg| seg.parse().ok())
            .collect()
    }

    pub fn is_descendant_of(&self, other: &Nid) -> bool {
        self.0.len() > other.0.len()
            && self.0.starts_with(other.0.as_str())
            && self.0.as_bytes()[other.0.len()] == b'_'
    }
}

impl std::fmt::Display for Nid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine-side lifecycle of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Active,
    Terminated,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Terminated => f.write_str("terminated"),
        }
    }
}

/// State of one node of a running execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeState {
    pub name: String,
    pub parent: Option<Nid>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of one execution.
///
/// Owned and mutated exclusively by the engine; the gateway core only ever
/// reads clones of it through the registry view. The `nodes` mapping is
/// insertion-ordered by node creation and changes as the engine advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub exid: Exid,
    pub domain: String,
    pub status: ExecutionStatus,
    pub nodes: IndexMap<String, NodeState>,
    pub tree: Tree,
    pub launched_at: DateTime<Utc>,
}

impl Execution {
    pub fn new(exid: Exid, domain: impl Into<String>, tree: Tree) -> Self {
        Self {
            exid,
            domain: domain.into(),
            status: ExecutionStatus::Active,
            nodes: IndexMap::new(),
            tree,
            launched_at: Utc::now(),
        }
    }

    pub fn has_node(&self, nid: &Nid) -> bool {
        self.nodes.contains_key(nid.as_str())
    }

    /// Current node ids, in creation order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nid_syntax() {
        assert!(Nid::parse("0").is_some());
        assert!(Nid::parse("0_0").is_some());
        assert!(Nid::parse("12_3_44").is_some());
        assert!(Nid::parse("").is_none());
        assert!(Nid::parse("0_").is_none());
        assert!(Nid::parse("_0").is_none());
        assert!(Nid::parse("0-1").is_none());
        assert!(Nid::parse("x_1").is_none());
    }

    #[test]
    fn nid_navigation() {
        let nid = Nid::parse("0_1_2").unwrap();
        assert_eq!(nid.parent(), Nid::parse("0_1"));
        assert_eq!(nid.last_index(), 2);
        assert_eq!(nid.path(), vec![1, 2]);
        assert!(Nid::root().parent().is_none());
        assert_eq!(Nid::root().child(1).as_str(), "0_1");
        assert!(Nid::root().path().is_empty());
    }

    #[test]
    fn nid_descendants() {
        let root = Nid::root();
        let child = Nid::parse("0_1").unwrap();
        let grandchild = Nid::parse("0_1_0").unwrap();
        let sibling = Nid::parse("0_10").unwrap();
        assert!(child.is_descendant_of(&root));
        assert!(grandchild.is_descendant_of(&child));
        assert!(!sibling.is_descendant_of(&child));
        assert!(!child.is_descendant_of(&child));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ExecutionStatus::Active).unwrap(),
            serde_json::json!("active")
        );
        assert_eq!(
            serde_json::to_value(ExecutionStatus::Terminated).unwrap(),
            serde_json::json!("terminated")
        );
    }
}
