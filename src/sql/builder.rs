//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the entity descriptors.
//! Identifiers come only from descriptors; request-supplied field names are looked up in the
//! descriptor's column list and rejected when absent. Values are always bound.

use crate::error::AppError;
use crate::model::{ChildTable, ColumnDef, EntityDef, KeyShape, KeyValue};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// One statement ready for the executor.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: crate::sql::Params,
}

impl QueryBuf {
    pub fn new(sql: impl Into<String>) -> Self {
        QueryBuf {
            sql: sql.into(),
            params: crate::sql::Params::default(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: crate::sql::Params) -> Self {
        QueryBuf { sql: sql.into(), params }
    }

    /// Appends a value and returns its placeholder cast to `pg_type`: `$n` for positional
    /// parameters, a generated `:pn` name for named ones.
    fn push_param(&mut self, v: Value, pg_type: &str) -> String {
        match &mut self.params {
            crate::sql::Params::Positional(values) => {
                values.push(v);
                format!("${}::{}", values.len(), pg_type)
            }
            crate::sql::Params::Named(pairs) => {
                let name = format!("p{}", pairs.len() + 1);
                let ph = format!(":{}::{}", name, pg_type);
                pairs.push((name, v));
                ph
            }
        }
    }
}

/// Identifiers and integer search values compare as int8: an int4 column matches an int8
/// operand, and an out-of-range id finds nothing instead of failing the cast.
const KEY_TYPE: &str = "int8";

fn compare_type(pg_type: &'static str) -> &'static str {
    match pg_type {
        "int4" => KEY_TYPE,
        other => other,
    }
}

/// SELECT / RETURNING list. Numeric-like and text columns are cast to the type the row decoder
/// reads, so tables declared with `numeric`, `bigint`, `varchar` or an enum still decode.
fn column_list(entity: &EntityDef) -> String {
    entity
        .columns
        .iter()
        .map(|c| {
            let q = quoted(c.name);
            match c.pg_type {
                "float8" => format!("{}::float8 AS {}", q, q),
                "int4" => format!("{}::int8 AS {}", q, q),
                "text" => format!("{}::text AS {}", q, q),
                _ => q,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_order(entity: &EntityDef) -> String {
    match entity.key {
        KeyShape::Single(k) => quoted(k),
        KeyShape::Composite(a, b) => format!("{}, {}", quoted(a), quoted(b)),
    }
}

/// Column for a request-supplied field name; unknown names never reach SQL text.
pub fn searchable_column<'a>(entity: &'a EntityDef, field: &str) -> Result<&'a ColumnDef, AppError> {
    entity
        .column(field)
        .ok_or_else(|| AppError::Validation(format!("unknown field '{}' for {}", field, entity.path)))
}

fn composite_predicate(a: &str, b: &str) -> String {
    format!(
        "{} = :{}::{} AND {} = :{}::{}",
        quoted(a),
        a,
        KEY_TYPE,
        quoted(b),
        b,
        KEY_TYPE
    )
}

fn wrong_shape(entity: &EntityDef) -> AppError {
    AppError::BadRequest(format!("wrong identifier shape for {}", entity.path))
}

/// WHERE clause for the addressed row. Single keys bind positionally, composite keys by name.
fn key_predicate(entity: &EntityDef, key: KeyValue, q: &mut QueryBuf) -> Result<String, AppError> {
    match (entity.key, key) {
        (KeyShape::Single(col), KeyValue::Single(id)) => {
            let ph = q.push_param(Value::from(id), KEY_TYPE);
            Ok(format!("{} = {}", quoted(col), ph))
        }
        (KeyShape::Composite(a, b), KeyValue::Composite(first, second)) => {
            q.params = crate::sql::Params::Named(vec![
                (a.to_string(), Value::from(first)),
                (b.to_string(), Value::from(second)),
            ]);
            Ok(composite_predicate(a, b))
        }
        _ => Err(wrong_shape(entity)),
    }
}

/// SELECT every row, ordered by key.
pub fn select_all(entity: &EntityDef, schema: &str) -> QueryBuf {
    QueryBuf::new(format!(
        "SELECT {} FROM {} ORDER BY {}",
        column_list(entity),
        qualified_table(schema, entity.table),
        key_order(entity)
    ))
}

/// SELECT by identifier; zero or one row.
pub fn select_by_key(entity: &EntityDef, schema: &str, key: KeyValue) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new(String::new());
    let pred = key_predicate(entity, key, &mut q)?;
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        column_list(entity),
        qualified_table(schema, entity.table),
        pred
    );
    Ok(q)
}

/// INSERT one row RETURNING all columns. Generated keys are never inserted; columns with a
/// DB default are omitted when the body does not carry them; other missing columns bind NULL.
pub fn insert(entity: &EntityDef, schema: &str, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new(String::new());
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in entity.columns {
        if c.generated {
            continue;
        }
        let val = body.get(c.name).cloned();
        if val.is_none() && c.has_default {
            continue;
        }
        placeholders.push(q.push_param(val.unwrap_or(Value::Null), c.pg_type));
        cols.push(quoted(c.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(schema, entity.table),
        cols.join(", "),
        placeholders.join(", "),
        column_list(entity)
    );
    q
}

/// UPDATE by identifier, replacing every non-generated column (absent values become NULL).
pub fn update(entity: &EntityDef, schema: &str, key: KeyValue, body: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let sets: Vec<(&ColumnDef, Value)> = entity
        .columns
        .iter()
        .filter(|c| !c.generated)
        .map(|c| (c, body.get(c.name).cloned().unwrap_or(Value::Null)))
        .collect();

    let mut q = QueryBuf::new(String::new());
    let set_clause = match entity.key {
        KeyShape::Single(_) => sets
            .into_iter()
            .map(|(c, v)| format!("{} = {}", quoted(c.name), q.push_param(v, c.pg_type)))
            .collect::<Vec<_>>(),
        KeyShape::Composite(..) => {
            // Named binding: key columns may also be SET, so payload values get a prefix.
            let mut named = Vec::new();
            let clause = sets
                .into_iter()
                .map(|(c, v)| {
                    let slot = format!("new_{}", c.name);
                    let part = format!("{} = :{}::{}", quoted(c.name), slot, c.pg_type);
                    named.push((slot, v));
                    part
                })
                .collect::<Vec<_>>();
            q.params = crate::sql::Params::Named(named);
            clause
        }
    };
    let pred = match entity.key {
        KeyShape::Single(_) => key_predicate(entity, key, &mut q)?,
        KeyShape::Composite(a, b) => {
            let KeyValue::Composite(first, second) = key else {
                return Err(wrong_shape(entity));
            };
            if let crate::sql::Params::Named(named) = &mut q.params {
                named.push((a.to_string(), Value::from(first)));
                named.push((b.to_string(), Value::from(second)));
            }
            composite_predicate(a, b)
        }
    };
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        qualified_table(schema, entity.table),
        set_clause.join(", "),
        pred,
        column_list(entity)
    );
    Ok(q)
}

/// DELETE by identifier RETURNING the removed row.
pub fn delete(entity: &EntityDef, schema: &str, key: KeyValue) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new(String::new());
    let pred = key_predicate(entity, key, &mut q)?;
    q.sql = format!(
        "DELETE FROM {} WHERE {} RETURNING {}",
        qualified_table(schema, entity.table),
        pred,
        column_list(entity)
    );
    Ok(q)
}

/// DELETE child rows pointing at a parent. No RETURNING: only the parent row is reported.
pub fn delete_children(child: &ChildTable, schema: &str, parent_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new(String::new());
    let ph = q.push_param(Value::from(parent_id), KEY_TYPE);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        qualified_table(schema, child.table),
        quoted(child.foreign_key),
        ph
    );
    q
}

/// DELETE every row of a movie-linked table for one movie, RETURNING them.
pub fn delete_by_movie(entity: &EntityDef, schema: &str, movie_id: i64) -> Result<QueryBuf, AppError> {
    let col = entity
        .column("movie_id")
        .ok_or_else(|| AppError::BadRequest(format!("{} is not linked to movie", entity.path)))?;
    let mut q = QueryBuf::new(String::new());
    let ph = q.push_param(Value::from(movie_id), KEY_TYPE);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        qualified_table(schema, entity.table),
        quoted(col.name),
        ph,
        column_list(entity)
    );
    Ok(q)
}

/// Search values arrive as JSON scalars; bind their text form.
fn scalar_text(v: &Value) -> Result<Value, AppError> {
    match v {
        Value::String(_) => Ok(v.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        _ => Err(AppError::Validation("search values must be strings, numbers or booleans".into())),
    }
}

/// `WHERE field = value`.
pub fn select_where_eq(entity: &EntityDef, schema: &str, field: &str, value: &Value) -> Result<QueryBuf, AppError> {
    let col = searchable_column(entity, field)?;
    let mut q = QueryBuf::new(String::new());
    let ph = q.push_param(scalar_text(value)?, compare_type(col.pg_type));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} ORDER BY {}",
        column_list(entity),
        qualified_table(schema, entity.table),
        quoted(col.name),
        ph,
        key_order(entity)
    );
    Ok(q)
}

/// `WHERE field::text LIKE '%value%'`. `%` and `_` inside the value keep their LIKE meaning.
pub fn select_where_like(entity: &EntityDef, schema: &str, field: &str, value: &Value) -> Result<QueryBuf, AppError> {
    let col = searchable_column(entity, field)?;
    let text = match scalar_text(value)? {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let mut q = QueryBuf::new(String::new());
    let ph = q.push_param(Value::String(format!("%{}%", text)), "text");
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}::text LIKE {} ORDER BY {}",
        column_list(entity),
        qualified_table(schema, entity.table),
        quoted(col.name),
        ph,
        key_order(entity)
    );
    Ok(q)
}

/// `WHERE field IN (v1, v2, ...)`; an empty list matches nothing.
pub fn select_where_in(entity: &EntityDef, schema: &str, field: &str, values: &[Value]) -> Result<QueryBuf, AppError> {
    let col = searchable_column(entity, field)?;
    let table = qualified_table(schema, entity.table);
    let cols = column_list(entity);
    if values.is_empty() {
        return Ok(QueryBuf::new(format!("SELECT {} FROM {} WHERE 1 = 0", cols, table)));
    }
    let mut q = QueryBuf::new(String::new());
    let mut placeholders = Vec::with_capacity(values.len());
    for v in values {
        placeholders.push(q.push_param(scalar_text(v)?, compare_type(col.pg_type)));
    }
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {}",
        cols,
        table,
        quoted(col.name),
        placeholders.join(", "),
        key_order(entity)
    );
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GENRE, MOVIE, MOVIE_ACTOR, MOVIE_GENRE, MOVIE_REVIEW};
    use crate::sql::Params;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn select_all_lists_columns_in_table_order() {
        let q = select_all(&GENRE, "imdb");
        assert_eq!(
            q.sql,
            r#"SELECT "genre_id"::int8 AS "genre_id", "name"::text AS "name", "created_at" FROM "imdb"."genre" ORDER BY "genre_id""#
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn single_key_select_binds_positionally() {
        let q = select_by_key(&MOVIE, "public", KeyValue::Single(9999)).unwrap();
        assert!(q.sql.ends_with(r#"WHERE "movie_id" = $1::int8"#));
        assert_eq!(q.params, Params::Positional(vec![json!(9999)]));
    }

    #[test]
    fn ids_beyond_int4_range_compare_as_int8() {
        let q = select_by_key(&MOVIE, "public", KeyValue::Single(9_999_999_999)).unwrap();
        assert!(q.sql.ends_with(r#"WHERE "movie_id" = $1::int8"#));
        assert_eq!(q.params, Params::Positional(vec![json!(9_999_999_999i64)]));
        let q = delete(&GENRE, "public", KeyValue::Single(9_999_999_999)).unwrap();
        assert!(q.sql.contains(r#"WHERE "genre_id" = $1::int8 RETURNING"#));
        let q = delete_by_movie(&MOVIE_GENRE, "public", 9_999_999_999).unwrap();
        assert!(q.sql.contains(r#"WHERE "movie_id" = $1::int8 RETURNING"#));
    }

    #[test]
    fn numeric_columns_are_read_as_float8() {
        let q = select_all(&MOVIE, "public");
        assert!(q.sql.contains(r#""rating"::float8 AS "rating", "runtime"::float8 AS "runtime""#));
        assert!(q.sql.contains(r#""revenue"::float8 AS "revenue""#));
        assert!(q.sql.contains(r#""movie_year", "#));
        let q = insert(&MOVIE, "public", &body(json!({ "title": "Heat" })));
        assert!(q.sql.contains(r#"RETURNING "movie_id"::int8 AS "movie_id""#));
        assert!(q.sql.contains(r#""rating"::float8 AS "rating""#));
    }

    #[test]
    fn composite_key_select_binds_by_name() {
        let q = select_by_key(&MOVIE_ACTOR, "public", KeyValue::Composite(3, 7)).unwrap();
        assert!(q.sql.ends_with(r#"WHERE "movie_id" = :movie_id::int8 AND "actor_id" = :actor_id::int8"#));
        let (sql, values) = q.params.resolve(&q.sql).unwrap();
        assert!(sql.ends_with(r#"WHERE "movie_id" = $1::int8 AND "actor_id" = $2::int8"#));
        assert_eq!(values, vec![json!(3), json!(7)]);
    }

    #[test]
    fn key_shape_mismatch_is_rejected() {
        assert!(select_by_key(&MOVIE, "public", KeyValue::Composite(1, 2)).is_err());
        assert!(delete(&MOVIE_ACTOR, "public", KeyValue::Single(1)).is_err());
    }

    #[test]
    fn insert_skips_serial_key_and_defaulted_created_at() {
        let q = insert(&GENRE, "public", &body(json!({ "name": "Comedy" })));
        assert_eq!(
            q.sql,
            r#"INSERT INTO "public"."genre" ("name") VALUES ($1::text) RETURNING "genre_id"::int8 AS "genre_id", "name"::text AS "name", "created_at""#
        );
        assert_eq!(q.params, Params::Positional(vec![json!("Comedy")]));
    }

    #[test]
    fn insert_keeps_supplied_created_at() {
        let q = insert(&GENRE, "public", &body(json!({ "name": "Comedy", "created_at": "2024-01-01" })));
        assert!(q.sql.contains(r#"("name", "created_at") VALUES ($1::text, $2::timestamp)"#));
        assert!(q.sql.contains("RETURNING"));
    }

    #[test]
    fn update_replaces_every_column() {
        let q = update(
            &GENRE,
            "public",
            KeyValue::Single(4),
            &body(json!({ "name": "Drama", "created_at": "2024-02-02" })),
        )
        .unwrap();
        assert_eq!(
            q.sql,
            r#"UPDATE "public"."genre" SET "name" = $1::text, "created_at" = $2::timestamp WHERE "genre_id" = $3::int8 RETURNING "genre_id"::int8 AS "genre_id", "name"::text AS "name", "created_at""#
        );
        assert_eq!(q.params, Params::Positional(vec![json!("Drama"), json!("2024-02-02"), json!(4)]));
    }

    #[test]
    fn composite_update_can_move_row_to_another_movie() {
        let q = update(
            &MOVIE_REVIEW,
            "public",
            KeyValue::Composite(1, 10),
            &body(json!({ "movie_id": 2, "review": "fine", "created_at": "2024-01-01" })),
        )
        .unwrap();
        let (sql, values) = q.params.resolve(&q.sql).unwrap();
        assert!(sql.contains(r#"SET "movie_id" = $1::int4, "review" = $2::text, "created_at" = $3::timestamp"#));
        assert!(sql.contains(r#"WHERE "movie_id" = $4::int8 AND "review_id" = $5::int8"#));
        assert_eq!(values, vec![json!(2), json!("fine"), json!("2024-01-01"), json!(1), json!(10)]);
    }

    #[test]
    fn delete_children_has_no_returning() {
        let q = delete_children(&MOVIE.children[0], "public", 5);
        assert_eq!(q.sql, r#"DELETE FROM "public"."movie_review" WHERE "movie_id" = $1::int8"#);
    }

    #[test]
    fn delete_by_movie_requires_movie_column() {
        assert!(delete_by_movie(&MOVIE_ACTOR, "public", 5).unwrap().sql.contains("RETURNING"));
        assert!(delete_by_movie(&GENRE, "public", 5).is_err());
    }

    #[test]
    fn search_rejects_unknown_fields() {
        let err = select_where_eq(&MOVIE, "public", "1=1; DROP TABLE movie; --", &json!("x")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn exact_search_binds_value() {
        let q = select_where_eq(&MOVIE, "public", "votes", &json!(120)).unwrap();
        assert!(q.sql.contains(r#"WHERE "votes" = $1::int8"#));
        assert_eq!(q.params, Params::Positional(vec![json!("120")]));
    }

    #[test]
    fn like_search_wraps_value_in_wildcards() {
        let q = select_where_like(&MOVIE, "public", "title", &json!("Godfather")).unwrap();
        assert!(q.sql.contains(r#"WHERE "title"::text LIKE $1::text"#));
        assert_eq!(q.params, Params::Positional(vec![json!("%Godfather%")]));
    }

    #[test]
    fn in_search_binds_every_value() {
        let q = select_where_in(&MOVIE, "public", "movie_id", &[json!(1), json!(2), json!(3)]).unwrap();
        assert!(q.sql.contains(r#"WHERE "movie_id" IN ($1::int8, $2::int8, $3::int8)"#));
        assert_eq!(q.params, Params::Positional(vec![json!("1"), json!("2"), json!("3")]));
    }

    #[test]
    fn in_search_with_no_values_matches_nothing() {
        let q = select_where_in(&GENRE, "public", "name", &[]).unwrap();
        assert!(q.sql.ends_with("WHERE 1 = 0"));
    }

    #[test]
    fn search_rejects_non_scalar_values() {
        assert!(select_where_eq(&GENRE, "public", "name", &json!({ "nested": true })).is_err());
    }
}
