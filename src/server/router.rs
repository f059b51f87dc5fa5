use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tabtrail_event_log::EventLogError;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument, warn};

use super::state::CollectorState;

/// Collector routes. `/log-visit` and `/visits` are the extension's names;
/// `/logs` serves both directions.
pub fn build_collector_router(state: CollectorState) -> Router {
    Router::new()
        .route("/log-visit", post(record_handler))
        .route("/logs", get(list_handler).post(record_handler))
        .route("/visits", get(list_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Serialize)]
struct RecordResponse {
    success: bool,
    status: &'static str,
    total: usize,
}

#[instrument(name = "tabtrail.collector.record", skip(state, payload))]
async fn record_handler(
    State(state): State<CollectorState>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    info!(payload = %payload, "received visit");
    match state.log().record(payload) {
        Ok(ack) => Json(RecordResponse {
            success: true,
            status: "saved",
            total: ack.total,
        })
        .into_response(),
        Err(EventLogError::Rejected(reason)) => {
            warn!(%reason, "visit rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "success": false,
                    "error": reason,
                })),
            )
                .into_response()
        }
    }
}

#[instrument(name = "tabtrail.collector.list", skip(state))]
async fn list_handler(State(state): State<CollectorState>) -> Json<Vec<Value>> {
    Json(state.log().list())
}

async fn health_handler(State(state): State<CollectorState>) -> Json<Value> {
    let log = state.log();
    Json(json!({
        "status": "ok",
        "total": log.len(),
        "strict": log.strictness().is_strict(),
    }))
}
