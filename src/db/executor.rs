//! Runs one statement (or one transaction of statements) on a pooled connection.

use crate::error::DbError;
use crate::sql::{PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnection, PgPool, PgRow};

/// One result row: column name to value, in select-list order.
pub type Row = Map<String, Value>;

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Check out a connection, run the statement, fetch every row, return the connection.
    async fn execute(&self, query: &QueryBuf) -> Result<Vec<Row>, DbError>;

    /// Run the statements in order inside one transaction. Returns the last statement's rows;
    /// any failure rolls the whole transaction back.
    async fn execute_all(&self, queries: &[QueryBuf]) -> Result<Vec<Row>, DbError>;
}

#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        PgExecutor { pool }
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn execute(&self, query: &QueryBuf) -> Result<Vec<Row>, DbError> {
        // Dropping the PoolConnection returns it to the pool on every path.
        let mut conn = self.pool.acquire().await.map_err(logged)?;
        run(&mut conn, query).await
    }

    async fn execute_all(&self, queries: &[QueryBuf]) -> Result<Vec<Row>, DbError> {
        let mut tx = self.pool.begin().await.map_err(logged)?;
        let mut rows = Vec::new();
        for query in queries {
            rows = run(&mut tx, query).await?;
        }
        tx.commit().await.map_err(logged)?;
        Ok(rows)
    }
}

fn logged(e: sqlx::Error) -> DbError {
    tracing::error!(error = %e, "query execution failed");
    DbError::Sqlx(e)
}

async fn run(conn: &mut PgConnection, query: &QueryBuf) -> Result<Vec<Row>, DbError> {
    let (sql, values) = query.params.resolve(&query.sql)?;
    tracing::debug!(sql = %sql, params = ?values, "query");
    let mut q = sqlx::query(&sql);
    for v in &values {
        q = q.bind(PgBindValue::from_json(v));
    }
    let rows = q.fetch_all(&mut *conn).await.map_err(logged)?;
    Ok(rows.iter().map(row_to_json).collect())
}

fn row_to_json(row: &PgRow) -> Row {
    use sqlx::Column;
    use sqlx::Row as _;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::{Row as _, TypeInfo, ValueRef};
    let type_name = match row.try_get_raw(name) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Err(_) => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
    };
    if let Ok(n) = row.try_get::<i16, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(n) = row.try_get::<i32, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(n) = row.try_get::<i64, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(n) = row.try_get::<f32, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(n) = row.try_get::<f64, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(b) = row.try_get::<bool, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(d) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDateTime, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDate, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(s) = row.try_get::<String, _>(name) {
        return Value::String(s);
    }
    if let Ok(j) = row.try_get::<Value, _>(name) {
        return j;
    }
    // Builder select lists cast to decodable types; only unmapped columns land here.
    tracing::warn!(column = name, pg_type = %type_name, "column type has no JSON decoding");
    Value::Null
}
