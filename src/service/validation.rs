//! Request validation that typed payloads cannot express on their own.

use crate::error::AppError;
use crate::model::{EntityDef, FieldValue, HasCreatedAt, InSearchRequest, SearchRequest, UpdateStrategy};
use crate::sql::searchable_column;

pub struct RequestValidator;

impl RequestValidator {
    /// The pair exact/like search filters on. Only the first entry of `fields` is used; the
    /// rest are ignored (logged at debug).
    pub fn search_pair<'a>(entity: &EntityDef, req: &'a SearchRequest) -> Result<&'a FieldValue, AppError> {
        let first = req
            .fields
            .first()
            .ok_or_else(|| AppError::Validation("fields must contain at least one entry".into()))?;
        if req.fields.len() > 1 {
            tracing::debug!(
                entity = entity.path,
                ignored = req.fields.len() - 1,
                "search uses the first field only"
            );
        }
        searchable_column(entity, &first.field)?;
        validate_scalar(&first.field, &first.value)?;
        Ok(first)
    }

    pub fn in_search(entity: &EntityDef, req: &InSearchRequest) -> Result<(), AppError> {
        searchable_column(entity, &req.field)?;
        for item in &req.values {
            validate_scalar(&req.field, &item.value)?;
        }
        Ok(())
    }

    /// PUT replaces the whole row, so `created_at` must be supplied. Link tables are the
    /// exception: their replacement row takes the database default.
    pub fn full_replace<P: HasCreatedAt>(entity: &EntityDef, payload: &P) -> Result<(), AppError> {
        if entity.update == UpdateStrategy::Replace {
            return Ok(());
        }
        match payload.created_at() {
            Some(s) if !s.trim().is_empty() => Ok(()),
            _ => Err(AppError::Validation("created_at is required".into())),
        }
    }
}

fn validate_scalar(field: &str, v: &serde_json::Value) -> Result<(), AppError> {
    if v.is_string() || v.is_number() || v.is_boolean() {
        return Ok(());
    }
    Err(AppError::Validation(format!(
        "value for {} must be a string, number or boolean",
        field
    )))
}
