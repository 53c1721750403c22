//! Inbound Message Validation
//!
//! The front door accepts a JSON object discriminated by `point` and turns
//! it into a typed message. Checks run in order and the first failure wins;
//! error strings are part of the wire contract and are echoed verbatim in
//! the response envelope.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::execution::Nid;
use crate::domain::tree::{Tree, TreeError};

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("missing msg point")]
    MissingPoint,
    #[error("bad msg point \"{0}\"")]
    BadPoint(String),
    #[error("missing domain")]
    MissingDomain,
    #[error("bad domain \"{0}\"")]
    BadDomain(String),
    #[error("missing \"tree\" or \"name\" in launch msg")]
    MissingTree,
    #[error("bad launch tree")]
    BadTree,
    #[error("missing exid")]
    MissingExid,
    #[error("bad nid \"{0}\"")]
    BadNid(String),
}

impl From<TreeError> for MessageError {
    fn from(_: TreeError) -> Self {
        Self::BadTree
    }
}

/// What a launch message executes: an inline tree, or a reference to a tree
/// registered under a name.
#[derive(Debug, Clone)]
pub enum TreeSource {
    Tree(Tree),
    Name(String),
}

#[derive(Debug, Clone)]
pub struct LaunchMessage {
    pub domain: String,
    pub source: TreeSource,
    pub vars: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct CancelMessage {
    pub exid: String,
    pub nid: Option<Nid>,
}

/// A structurally valid inbound message.
#[derive(Debug, Clone)]
pub enum Message {
    Launch(LaunchMessage),
    Cancel(CancelMessage),
}

impl Message {
    pub fn point(&self) -> &'static str {
        match self {
            Self::Launch(_) => "launch",
            Self::Cancel(_) => "cancel",
        }
    }
}

/// Validate an inbound message payload. Pure; no side effects.
pub fn validate(payload: &Value) -> Result<Message, MessageError> {
    let point = match payload.get("point") {
        None | Some(Value::Null) => return Err(MessageError::MissingPoint),
        Some(Value::String(point)) => point.as_str(),
        Some(other) => return Err(MessageError::BadPoint(other.to_string())),
    };

    match point {
        "launch" => validate_launch(payload),
        "cancel" => validate_cancel(payload),
        other => Err(MessageError::BadPoint(other.to_string())),
    }
}

fn validate_launch(payload: &Value) -> Result<Message, MessageError> {
    let domain = string_field(payload, "domain").ok_or(MessageError::MissingDomain)?;
    if !domain_is_valid(domain) {
        return Err(MessageError::BadDomain(domain.to_string()));
    }

    let source = match (field(payload, "tree"), string_field(payload, "name")) {
        (Some(tree), _) => TreeSource::Tree(Tree::from_json(tree)?),
        (None, Some(name)) => TreeSource::Name(name.to_string()),
        (None, None) => return Err(MessageError::MissingTree),
    };

    let vars = field(payload, "vars")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Ok(Message::Launch(LaunchMessage {
        domain: domain.to_string(),
        source,
        vars,
    }))
}

fn validate_cancel(payload: &Value) -> Result<Message, MessageError> {
    let exid = string_field(payload, "exid").ok_or(MessageError::MissingExid)?;

    let nid = match string_field(payload, "nid") {
        Some(s) => Some(Nid::parse(s).ok_or_else(|| MessageError::BadNid(s.to_string()))?),
        None => None,
    };

    Ok(Message::Cancel(CancelMessage {
        exid: exid.to_string(),
        nid,
    }))
}

fn field<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|v| !v.is_null())
}

fn string_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    field(payload, key).and_then(Value::as_str)
}

/// Domains are dotted names (`org.example`); each segment is alphanumeric
/// plus `_` / `-`.
fn domain_is_valid(domain: &str) -> bool {
    !domain.is_empty()
        && domain.split('.').all(|seg| {
            !seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn err(payload: Value) -> String {
        validate(&payload).unwrap_err().to_string()
    }

    #[test]
    fn rejects_missing_point() {
        assert_eq!(err(json!({})), "missing msg point");
        assert_eq!(err(json!({ "point": null })), "missing msg point");
    }

    #[test]
    fn rejects_unknown_point() {
        assert_eq!(err(json!({ "point": "flip" })), "bad msg point \"flip\"");
        assert_eq!(err(json!({ "point": 5 })), "bad msg point \"5\"");
    }

    #[test]
    fn rejects_launch_without_domain() {
        assert_eq!(err(json!({ "point": "launch" })), "missing domain");
    }

    #[test]
    fn rejects_launch_with_bad_domain() {
        assert_eq!(
            err(json!({ "point": "launch", "domain": "org..example" })),
            "bad domain \"org..example\""
        );
        assert_eq!(
            err(json!({ "point": "launch", "domain": "org example" })),
            "bad domain \"org example\""
        );
    }

    #[test]
    fn rejects_launch_without_tree_or_name() {
        assert_eq!(
            err(json!({ "point": "launch", "domain": "org.example" })),
            "missing \"tree\" or \"name\" in launch msg"
        );
    }

    #[test]
    fn rejects_launch_with_bad_tree() {
        assert_eq!(
            err(json!({ "point": "launch", "domain": "org.example", "tree": 42 })),
            "bad launch tree"
        );
    }

    #[test]
    fn accepts_launch_with_tree() {
        let msg = validate(&json!({
            "point": "launch",
            "domain": "org.example",
            "tree": ["sequence", "stall", "stall"],
            "vars": { "k": "v" },
        }))
        .unwrap();

        assert_eq!(msg.point(), "launch");
        let Message::Launch(launch) = msg else {
            panic!("expected launch")
        };
        assert_eq!(launch.domain, "org.example");
        assert_eq!(launch.vars.get("k"), Some(&json!("v")));
        let TreeSource::Tree(tree) = launch.source else {
            panic!("expected inline tree")
        };
        assert_eq!(tree.name, "sequence");
        assert_eq!(tree.children.len(), 2);
    }

    #[test]
    fn accepts_launch_with_name() {
        let msg = validate(&json!({
            "point": "launch", "domain": "org.example", "name": "two-stalls",
        }))
        .unwrap();

        let Message::Launch(launch) = msg else {
            panic!("expected launch")
        };
        let TreeSource::Name(name) = launch.source else {
            panic!("expected named tree")
        };
        assert_eq!(name, "two-stalls");
    }

    #[test]
    fn rejects_cancel_without_exid() {
        assert_eq!(err(json!({ "point": "cancel" })), "missing exid");
    }

    #[test]
    fn rejects_cancel_with_bad_nid() {
        assert_eq!(
            err(json!({ "point": "cancel", "exid": "org.example-u-7.xo", "nid": "0-1" })),
            "bad nid \"0-1\""
        );
    }

    #[test]
    fn accepts_cancel_without_nid() {
        let msg = validate(&json!({ "point": "cancel", "exid": "org.example-u-7.xo" })).unwrap();

        let Message::Cancel(cancel) = msg else {
            panic!("expected cancel")
        };
        assert_eq!(cancel.exid, "org.example-u-7.xo");
        assert!(cancel.nid.is_none());
    }

    #[test]
    fn accepts_cancel_with_nid() {
        let msg = validate(&json!({
            "point": "cancel", "exid": "org.example-u-7.xo", "nid": "0_1",
        }))
        .unwrap();

        let Message::Cancel(cancel) = msg else {
            panic!("expected cancel")
        };
        assert_eq!(cancel.nid.unwrap().as_str(), "0_1");
    }
}
