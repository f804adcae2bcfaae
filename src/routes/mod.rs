//! Router assembly: entity routes under the version prefix, common routes at the root, and the
//! middleware stack.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::{all_entity_routes, entity_routes};

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal server error".to_string()
    };
    AppError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message,
    }
    .into_response()
}

/// The full application. `version_prefix` is empty or `/segment...`.
pub fn app(state: AppState, version_prefix: &str) -> Router {
    let entities = all_entity_routes();
    let api = if version_prefix.is_empty() {
        entities
    } else {
        Router::new().nest(version_prefix, entities)
    };
    Router::new()
        .merge(common_routes())
        .merge(api)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}
