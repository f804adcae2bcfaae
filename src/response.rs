//! Turns dispatch envelopes into HTTP responses.

use crate::db::QueryResult;
use crate::error::AppError;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Body of a successful create: the row is not echoed.
#[derive(Debug, Serialize)]
pub struct CreatedBody {
    pub status: u16,
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn into_error(result: QueryResult) -> AppError {
    match result {
        QueryResult::Failure { status, error } => AppError::Status {
            status: status_code(status),
            message: error,
        },
        QueryResult::Success { status, .. } => AppError::Status {
            status: status_code(status),
            message: "unexpected success envelope".into(),
        },
    }
}

/// `{status, data}` with the envelope's status, or `{error}` with the failure status.
pub fn respond(result: QueryResult) -> Result<(StatusCode, Json<QueryResult>), AppError> {
    if !result.is_ok() {
        return Err(into_error(result));
    }
    Ok((status_code(result.status()), Json(result)))
}

/// 201 `{status: 201}` for a successful insert.
pub fn created(result: QueryResult) -> Result<(StatusCode, Json<CreatedBody>), AppError> {
    if !result.is_ok() {
        return Err(into_error(result));
    }
    Ok((
        StatusCode::CREATED,
        Json(CreatedBody {
            status: StatusCode::CREATED.as_u16(),
        }),
    ))
}
