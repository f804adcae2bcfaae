//! CRUD and search for any entity descriptor. Each operation builds its statement(s) and hands
//! them to the dispatch helper; results come back as the `{status, data | error}` envelope.

use crate::db::{do_query, do_transaction, QueryExecutor, QueryResult};
use crate::error::AppError;
use crate::model::{EntityDef, InSearchRequest, KeyValue, SearchRequest, UpdateStrategy};
use crate::service::RequestValidator;
use crate::sql;
use serde_json::{Map, Value};

pub struct CrudService;

impl CrudService {
    /// Every row, unfiltered.
    pub async fn get_all(db: &dyn QueryExecutor, schema: &str, entity: &EntityDef) -> QueryResult {
        do_query(db, &sql::select_all(entity, schema)).await
    }

    /// Zero or one row; a missing id is a success with empty data.
    pub async fn get_by_id(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        key: KeyValue,
    ) -> Result<QueryResult, AppError> {
        let q = sql::select_by_key(entity, schema, key)?;
        Ok(do_query(db, &q).await)
    }

    /// Insert one row; the envelope carries the inserted row.
    pub async fn create(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        body: &Map<String, Value>,
    ) -> QueryResult {
        do_query(db, &sql::insert(entity, schema, body)).await
    }

    /// Full replace. Link tables delete the addressed row and insert the payload in one
    /// transaction; the replacement row always takes the database's `created_at`.
    pub async fn update(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        key: KeyValue,
        body: &Map<String, Value>,
    ) -> Result<QueryResult, AppError> {
        match entity.update {
            UpdateStrategy::InPlace => {
                let q = sql::update(entity, schema, key, body)?;
                Ok(do_query(db, &q).await)
            }
            UpdateStrategy::Replace => {
                let mut fresh = body.clone();
                fresh.remove("created_at");
                let queries = [sql::delete(entity, schema, key)?, sql::insert(entity, schema, &fresh)];
                Ok(do_transaction(db, &queries).await)
            }
        }
    }

    /// Delete by id, returning the removed row. Child rows referencing the parent are deleted
    /// first, in the same transaction.
    pub async fn delete(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        key: KeyValue,
    ) -> Result<QueryResult, AppError> {
        let parent = sql::delete(entity, schema, key)?;
        match key {
            KeyValue::Single(id) if !entity.children.is_empty() => {
                let mut queries: Vec<_> = entity
                    .children
                    .iter()
                    .map(|child| sql::delete_children(child, schema, id))
                    .collect();
                queries.push(parent);
                Ok(do_transaction(db, &queries).await)
            }
            _ => Ok(do_query(db, &parent).await),
        }
    }

    /// Remove every row of a movie-linked table for one movie.
    pub async fn delete_by_movie(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        movie_id: i64,
    ) -> Result<QueryResult, AppError> {
        let q = sql::delete_by_movie(entity, schema, movie_id)?;
        Ok(do_query(db, &q).await)
    }

    pub async fn search_exact(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        req: &SearchRequest,
    ) -> Result<QueryResult, AppError> {
        let pair = RequestValidator::search_pair(entity, req)?;
        let q = sql::select_where_eq(entity, schema, &pair.field, &pair.value)?;
        Ok(do_query(db, &q).await)
    }

    pub async fn search_like(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        req: &SearchRequest,
    ) -> Result<QueryResult, AppError> {
        let pair = RequestValidator::search_pair(entity, req)?;
        let q = sql::select_where_like(entity, schema, &pair.field, &pair.value)?;
        Ok(do_query(db, &q).await)
    }

    /// Matches rows whose field equals any of the values.
    pub async fn search_in(
        db: &dyn QueryExecutor,
        schema: &str,
        entity: &EntityDef,
        req: &InSearchRequest,
    ) -> Result<QueryResult, AppError> {
        RequestValidator::in_search(entity, req)?;
        let values: Vec<Value> = req.values.iter().map(|v| v.value.clone()).collect();
        let q = sql::select_where_in(entity, schema, &req.field, &values)?;
        Ok(do_query(db, &q).await)
    }
}
