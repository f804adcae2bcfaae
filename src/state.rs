//! Shared application state for all routes.

use crate::db::QueryExecutor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Pool-backed in production, recording in tests.
    pub db: Arc<dyn QueryExecutor>,
    /// Schema every statement qualifies its tables with.
    pub schema: Arc<str>,
}

impl AppState {
    pub fn new(db: Arc<dyn QueryExecutor>, schema: impl Into<Arc<str>>) -> Self {
        AppState {
            db,
            schema: schema.into(),
        }
    }
}
