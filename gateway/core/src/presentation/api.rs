use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::application::dispatcher::MessageDispatcher;
use crate::domain::engine::ExecutionRegistry;
use crate::domain::execution::Exid;
use crate::presentation::envelope::Envelope;

pub struct AppState {
    pub dispatcher: MessageDispatcher,
    pub registry: Arc<dyn ExecutionRegistry>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/message", post(intake_message))
        .route("/executions", get(list_executions))
        .route("/executions/{exid}", get(show_execution))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn intake_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let descriptor = state.dispatcher.dispatch(&payload).await;
    Envelope::render(&descriptor, "POST", "/message")
}

async fn list_executions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.registry.list_all().await {
        Ok(executions) => {
            Json(serde_json::json!({ "executions": executions })).into_response()
        }
        Err(e) => Envelope::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &e.to_string(),
            "GET",
            "/executions",
        )
        .into_response(),
    }
}

async fn show_execution(
    State(state): State<Arc<AppState>>,
    Path(exid): Path<String>,
) -> impl IntoResponse {
    let path = format!("/executions/{exid}");
    match state.registry.find_by_exid(&Exid::new(exid)).await {
        Ok(Some(execution)) => Json(execution).into_response(),
        Ok(None) => {
            Envelope::error(StatusCode::NOT_FOUND, "missing execution", "GET", &path)
                .into_response()
        }
        Err(e) => Envelope::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &e.to_string(),
            "GET",
            &path,
        )
        .into_response(),
    }
}
