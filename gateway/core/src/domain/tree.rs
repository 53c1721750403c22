//! Launch Tree Parsing
//!
//! This module provides the external JSON representation of a launch tree
//! and its translation into a domain object.
//!
//! # Tree Format
//!
//! A tree is plain JSON: a string is a leaf node, an array is a named node
//! followed by its children.
//!
//! ```json
//! ["sequence", "stall", ["sequence", "stall"]]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A node of a launch tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Tree>,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("bad launch tree")]
    Malformed,
}

impl Tree {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Parse a tree from its JSON representation.
    pub fn from_json(value: &Value) -> Result<Self, TreeError> {
        match value {
            Value::String(name) if !name.is_empty() => Ok(Self::leaf(name.clone())),
            Value::Array(items) => {
                let mut items = items.iter();
                let name = match items.next() {
                    Some(Value::String(name)) if !name.is_empty() => name.clone(),
                    _ => return Err(TreeError::Malformed),
                };
                let children = items.map(Self::from_json).collect::<Result<Vec<_>, _>>()?;
                Ok(Self { name, children })
            }
            _ => Err(TreeError::Malformed),
        }
    }

    /// Node definition at a path of child indices. The root is the empty
    /// path.
    pub fn at(&self, path: &[usize]) -> Option<&Tree> {
        let mut node = self;
        for &index in path {
            node = node.children.get(index)?;
        }
        Some(node)
    }
}
