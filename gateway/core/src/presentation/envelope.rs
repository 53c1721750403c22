//! Response envelope rendering.
//!
//! Pure mapping from a response descriptor to a status class, an optional
//! `Location` header and a hypermedia JSON body carrying `_status`,
//! `_status_text` and `_links`. Every envelope includes a `self` link
//! describing the request that produced it.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::application::dispatcher::ResponseDescriptor;

/// Curie prefix for gateway link relations.
pub const LINK_NS: &str = "aegis";

/// A rendered response.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl Envelope {
    /// Render a dispatch outcome for the request that produced it.
    pub fn render(descriptor: &ResponseDescriptor, method: &str, path: &str) -> Self {
        match descriptor {
            ResponseDescriptor::Created { exid, location } => {
                let mut envelope = Self::base(StatusCode::CREATED, method, path);
                envelope.location = Some(location.clone());
                envelope.body["exid"] = json!(exid);
                envelope.body["_location"] = json!(location);
                let rel = format!("{LINK_NS}:forms/message-created");
                envelope.body["_links"][rel.as_str()] =
                    json!({ "href": location, "method": "GET" });
                envelope
            }
            ResponseDescriptor::Accepted { location } => {
                let mut envelope = Self::base(StatusCode::ACCEPTED, method, path);
                envelope.location = Some(location.clone());
                envelope.body["_location"] = json!(location);
                envelope
            }
            ResponseDescriptor::ClientError { error } => {
                Self::error(StatusCode::BAD_REQUEST, error, method, path)
            }
            ResponseDescriptor::NotFound { error } => {
                Self::error(StatusCode::NOT_FOUND, error, method, path)
            }
            ResponseDescriptor::EngineError { error } => {
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, error, method, path)
            }
        }
    }

    /// An error envelope outside the dispatch path (e.g. unknown resource).
    pub fn error(status: StatusCode, error: &str, method: &str, path: &str) -> Self {
        let mut envelope = Self::base(status, method, path);
        envelope.body["error"] = json!(error);
        envelope
    }

    fn base(status: StatusCode, method: &str, path: &str) -> Self {
        let body = json!({
            "_status": status.as_u16(),
            "_status_text": status.canonical_reason().unwrap_or(""),
            "_links": {
                "self": { "href": path, "method": method },
            },
        });
        Self {
            status,
            location: None,
            body,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(location) = self.location {
            if let Ok(value) = header::HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::Exid;

    #[test]
    fn renders_a_created_envelope() {
        let exid = Exid::new("org.example-u-2000.bidofu");
        let descriptor = ResponseDescriptor::Created {
            exid: exid.clone(),
            location: format!("/executions/{exid}"),
        };

        let envelope = Envelope::render(&descriptor, "POST", "/message");

        assert_eq!(envelope.status, StatusCode::CREATED);
        assert_eq!(envelope.location.as_deref(), Some("/executions/org.example-u-2000.bidofu"));
        assert_eq!(envelope.body["_status"], 201);
        assert_eq!(envelope.body["_status_text"], "Created");
        assert_eq!(envelope.body["exid"], "org.example-u-2000.bidofu");
        assert_eq!(envelope.body["_location"], "/executions/org.example-u-2000.bidofu");
        assert_eq!(
            envelope.body["_links"]["aegis:forms/message-created"]["href"],
            "/executions/org.example-u-2000.bidofu"
        );
        assert_eq!(envelope.body["_links"]["self"]["method"], "POST");
    }

    #[test]
    fn renders_an_accepted_envelope() {
        let descriptor = ResponseDescriptor::Accepted {
            location: "/executions/org.example-u-2000.bidofu".to_string(),
        };

        let envelope = Envelope::render(&descriptor, "POST", "/message");

        assert_eq!(envelope.status, StatusCode::ACCEPTED);
        assert_eq!(envelope.body["_status"], 202);
        assert_eq!(envelope.body["_status_text"], "Accepted");
        assert!(envelope.body.get("error").is_none());
    }

    #[test]
    fn renders_error_envelopes_with_the_verbatim_message() {
        let descriptor = ResponseDescriptor::ClientError {
            error: "bad msg point \"flip\"".to_string(),
        };

        let envelope = Envelope::render(&descriptor, "POST", "/message");

        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.body["_status_text"], "Bad Request");
        assert_eq!(envelope.body["error"], "bad msg point \"flip\"");
        assert!(envelope.location.is_none());
        assert_eq!(envelope.body["_links"]["self"]["href"], "/message");
    }

    #[test]
    fn distinguishes_not_found_from_engine_failure() {
        let not_found = Envelope::render(
            &ResponseDescriptor::NotFound {
                error: "missing execution".to_string(),
            },
            "POST",
            "/message",
        );
        let engine_error = Envelope::render(
            &ResponseDescriptor::EngineError {
                error: "engine intake unavailable".to_string(),
            },
            "POST",
            "/message",
        );

        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(engine_error.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
