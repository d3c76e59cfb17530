use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/ready", get(ready))
}

#[derive(Debug, Serialize)]
struct Readiness {
    status: &'static str,
    store: &'static str,
    audit_enabled: bool,
}

async fn health() -> &'static str {
    info!("GET /health - Health check");
    "OK"
}

async fn ready(State(state): State<AppState>) -> Json<Readiness> {
    Json(Readiness {
        status: "ready",
        store: state.accounts.backend_name(),
        audit_enabled: state.accounts.audit_enabled(),
    })
}
