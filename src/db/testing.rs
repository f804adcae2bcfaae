//! In-memory `QueryExecutor` that records statements and replays queued outcomes.

use crate::db::{QueryExecutor, Row};
use crate::error::DbError;
use crate::sql::QueryBuf;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Clone, Debug)]
pub enum Call {
    Single(QueryBuf),
    Transaction(Vec<QueryBuf>),
}

#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    outcomes: Mutex<VecDeque<Result<Vec<Row>, String>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue rows for the next call. Calls with nothing queued return no rows.
    pub fn respond_rows(&self, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .map(|v| match v {
                Value::Object(m) => m,
                other => panic!("row must be an object, got {}", other),
            })
            .collect();
        self.outcomes.lock().unwrap().push_back(Ok(rows));
    }

    pub fn respond_error(&self, message: &str) {
        self.outcomes.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Every statement in execution order, transactions flattened.
    pub fn statements(&self) -> Vec<QueryBuf> {
        self.calls()
            .into_iter()
            .flat_map(|c| match c {
                Call::Single(q) => vec![q],
                Call::Transaction(qs) => qs,
            })
            .collect()
    }

    pub fn transactions(&self) -> Vec<Vec<QueryBuf>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Transaction(qs) => Some(qs),
                Call::Single(_) => None,
            })
            .collect()
    }

    fn next_outcome(&self) -> Result<Vec<Row>, DbError> {
        match self.outcomes.lock().unwrap().pop_front() {
            None => Ok(Vec::new()),
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(DbError::Sqlx(sqlx::Error::Protocol(message))),
        }
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, query: &QueryBuf) -> Result<Vec<Row>, DbError> {
        self.calls.lock().unwrap().push(Call::Single(query.clone()));
        self.next_outcome()
    }

    async fn execute_all(&self, queries: &[QueryBuf]) -> Result<Vec<Row>, DbError> {
        self.calls.lock().unwrap().push(Call::Transaction(queries.to_vec()));
        self.next_outcome()
    }
}
