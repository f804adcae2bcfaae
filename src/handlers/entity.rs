//! Entity handlers, generic over the `Entity` they serve: list, read, create, update, delete,
//! delete-by-movie, and the three searches.

use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath};
use crate::model::{payload_fields, Entity, InSearchRequest, SearchRequest};
use crate::response::{created, respond};
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

pub async fn list<E: Entity>(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    respond(CrudService::get_all(state.db.as_ref(), &state.schema, E::DEF).await)
}

pub async fn read<E: Entity>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<E::Id>,
) -> Result<impl IntoResponse, AppError> {
    respond(CrudService::get_by_id(state.db.as_ref(), &state.schema, E::DEF, id.into()).await?)
}

pub async fn create<E: Entity>(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<E::Payload>,
) -> Result<impl IntoResponse, AppError> {
    let body = payload_fields(&payload);
    created(CrudService::create(state.db.as_ref(), &state.schema, E::DEF, &body).await)
}

/// PUT: full replace; `created_at` is required except on link tables.
pub async fn update<E: Entity>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<E::Id>,
    ApiJson(payload): ApiJson<E::Payload>,
) -> Result<impl IntoResponse, AppError> {
    RequestValidator::full_replace(E::DEF, &payload)?;
    let body = payload_fields(&payload);
    respond(CrudService::update(state.db.as_ref(), &state.schema, E::DEF, id.into(), &body).await?)
}

pub async fn delete<E: Entity>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<E::Id>,
) -> Result<impl IntoResponse, AppError> {
    respond(CrudService::delete(state.db.as_ref(), &state.schema, E::DEF, id.into()).await?)
}

pub async fn delete_by_movie<E: Entity>(
    State(state): State<AppState>,
    ApiPath(movie_id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    respond(CrudService::delete_by_movie(state.db.as_ref(), &state.schema, E::DEF, movie_id).await?)
}

pub async fn search_exact<E: Entity>(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    respond(CrudService::search_exact(state.db.as_ref(), &state.schema, E::DEF, &req).await?)
}

pub async fn search_like<E: Entity>(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    respond(CrudService::search_like(state.db.as_ref(), &state.schema, E::DEF, &req).await?)
}

pub async fn search_in<E: Entity>(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InSearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    respond(CrudService::search_in(state.db.as_ref(), &state.schema, E::DEF, &req).await?)
}
