//! Common routes: health and version.

use crate::db::{do_query, QueryResult};
use crate::sql::QueryBuf;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    database_health: &'static str,
    status: u16,
}

/// Liveness plus a database round trip.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    let probe = QueryBuf::new("SELECT CURRENT_TIMESTAMP AS current_timestamp");
    match do_query(state.db.as_ref(), &probe).await {
        QueryResult::Success { .. } => (
            StatusCode::OK,
            Json(HealthBody {
                message: Some("OK"),
                database_health: "OK",
                status: StatusCode::OK.as_u16(),
            }),
        ),
        QueryResult::Failure { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthBody {
                message: None,
                database_health: "NOT OK",
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            }),
        ),
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /version.
pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}
