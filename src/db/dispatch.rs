//! The single chokepoint every service issues SQL through. Database errors stop here: they
//! are logged and folded into the result envelope instead of propagating.

use crate::db::{QueryExecutor, Row};
use crate::error::DbError;
use crate::sql::QueryBuf;
use serde::Serialize;

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERR: u16 = 500;

/// `{status, data}` on success, `{status, error}` on failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Success { status: u16, data: Vec<Row> },
    Failure { status: u16, error: String },
}

impl QueryResult {
    pub fn success(data: Vec<Row>) -> Self {
        QueryResult::Success { status: STATUS_OK, data }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        QueryResult::Failure {
            status: STATUS_ERR,
            error: error.to_string(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            QueryResult::Success { status, .. } | QueryResult::Failure { status, .. } => *status,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, QueryResult::Success { .. })
    }

    /// Rows on success, `None` on failure.
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryResult::Success { data, .. } => Some(data),
            QueryResult::Failure { .. } => None,
        }
    }
}

fn shape(outcome: Result<Vec<Row>, DbError>) -> QueryResult {
    match outcome {
        Ok(rows) => QueryResult::success(rows),
        Err(e) => {
            tracing::error!(error = %e, "error retrieving data");
            QueryResult::failure(e)
        }
    }
}

/// One acquire/execute/release cycle.
pub async fn do_query(db: &dyn QueryExecutor, query: &QueryBuf) -> QueryResult {
    shape(db.execute(query).await)
}

/// Several statements committed together; the envelope carries the last statement's rows.
pub async fn do_transaction(db: &dyn QueryExecutor, queries: &[QueryBuf]) -> QueryResult {
    shape(db.execute_all(queries).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::RecordingExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn success_wraps_rows_with_ok_status() {
        let db = RecordingExecutor::new();
        db.respond_rows(vec![json!({ "genre_id": 1, "name": "Comedy" })]);
        let result = do_query(&db, &QueryBuf::new("SELECT 1")).await;
        assert_eq!(result.status(), STATUS_OK);
        assert_eq!(result.rows().unwrap().len(), 1);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "status": 200, "data": [{ "genre_id": 1, "name": "Comedy" }] })
        );
    }

    #[tokio::test]
    async fn database_error_becomes_error_envelope() {
        let db = RecordingExecutor::new();
        db.respond_error("connection refused");
        let result = do_query(&db, &QueryBuf::new("SELECT 1")).await;
        assert!(!result.is_ok());
        assert_eq!(result.status(), STATUS_ERR);
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["status"], 500);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn transaction_is_one_executor_call() {
        let db = RecordingExecutor::new();
        let queries = [QueryBuf::new("DELETE FROM a"), QueryBuf::new("DELETE FROM b")];
        let result = do_transaction(&db, &queries).await;
        assert!(result.is_ok());
        assert_eq!(db.transactions().len(), 1);
        assert_eq!(db.transactions()[0].len(), 2);
    }
}
