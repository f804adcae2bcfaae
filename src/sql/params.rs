//! Convert serde_json::Value to types that sqlx can bind, and resolve named placeholders.

use crate::error::DbError;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value bound as TEXT. Statements cast each placeholder to the column type (`$1::int4`),
/// so Postgres does the parsing and a bad value surfaces as a database error.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Text(String),
}

impl PgBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::String(s) => PgBindValue::Text(s.clone()),
            Value::Bool(b) => PgBindValue::Text(b.to_string()),
            Value::Number(n) => PgBindValue::Text(n.to_string()),
            Value::Array(_) | Value::Object(_) => PgBindValue::Text(v.to_string()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            PgBindValue::Null => Ok(IsNull::Yes),
            PgBindValue::Text(s) => <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf),
        }
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

/// Parameters for one statement: `$n` placeholders take a sequence, `:name` placeholders a mapping.
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Positional(Vec::new())
    }
}

impl Params {
    pub fn is_empty(&self) -> bool {
        match self {
            Params::Positional(v) => v.is_empty(),
            Params::Named(v) => v.is_empty(),
        }
    }

    /// Final SQL text and values in `$n` order.
    pub fn resolve(&self, sql: &str) -> Result<(String, Vec<Value>), DbError> {
        match self {
            Params::Positional(values) => Ok((sql.to_string(), values.clone())),
            Params::Named(pairs) => rewrite_named(sql, pairs),
        }
    }
}

/// Rewrites `:name` to `$n`. Repeated names reuse their slot. `::` casts and text inside
/// single or double quotes are copied as-is.
fn rewrite_named(sql: &str, pairs: &[(String, Value)]) -> Result<(String, Vec<Value>), DbError> {
    let mut out = String::with_capacity(sql.len());
    let mut slots: Vec<&str> = Vec::new();
    let mut values = Vec::new();
    let mut chars = sql.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            ':' => match chars.peek() {
                Some((_, ':')) => {
                    out.push_str("::");
                    chars.next();
                }
                Some((_, n)) if n.is_ascii_alphabetic() || *n == '_' => {
                    let start = i + 1;
                    let mut end = start;
                    while let Some((j, n)) = chars.peek() {
                        if n.is_ascii_alphanumeric() || *n == '_' {
                            end = j + n.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let name = &sql[start..end];
                    let slot = match slots.iter().position(|s| *s == name) {
                        Some(pos) => pos + 1,
                        None => {
                            let value = pairs
                                .iter()
                                .find(|(k, _)| k == name)
                                .map(|(_, v)| v.clone())
                                .ok_or_else(|| DbError::MissingParam(name.to_string()))?;
                            slots.push(name);
                            values.push(value);
                            slots.len()
                        }
                    };
                    out.push('$');
                    out.push_str(&slot.to_string());
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }
    Ok((out, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(pairs: &[(&str, Value)]) -> Params {
        Params::Named(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn named_placeholders_become_positional_in_order_of_appearance() {
        let p = named(&[("actor_id", json!(7)), ("movie_id", json!(3))]);
        let (sql, values) = p
            .resolve(r#"SELECT * FROM t WHERE "movie_id" = :movie_id::int4 AND "actor_id" = :actor_id::int4"#)
            .unwrap();
        assert_eq!(sql, r#"SELECT * FROM t WHERE "movie_id" = $1::int4 AND "actor_id" = $2::int4"#);
        assert_eq!(values, vec![json!(3), json!(7)]);
    }

    #[test]
    fn repeated_name_shares_one_slot() {
        let p = named(&[("id", json!(1))]);
        let (sql, values) = p.resolve("SELECT :id, :id").unwrap();
        assert_eq!(sql, "SELECT $1, $1");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn quoted_text_and_casts_are_untouched() {
        let p = named(&[("x", json!("a"))]);
        let (sql, _) = p.resolve("SELECT ':not_a_param', now()::date, :x").unwrap();
        assert_eq!(sql, "SELECT ':not_a_param', now()::date, $1");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = named(&[]).resolve("DELETE FROM t WHERE id = :id").unwrap_err();
        assert!(matches!(err, DbError::MissingParam(n) if n == "id"));
    }

    #[test]
    fn positional_passes_through() {
        let p = Params::Positional(vec![json!(9999)]);
        let (sql, values) = p.resolve("SELECT 1 WHERE $1::int4 > 0").unwrap();
        assert_eq!(sql, "SELECT 1 WHERE $1::int4 > 0");
        assert_eq!(values, vec![json!(9999)]);
    }

    #[test]
    fn json_scalars_bind_as_text() {
        assert_eq!(PgBindValue::from_json(&json!(8.5)), PgBindValue::Text("8.5".into()));
        assert_eq!(PgBindValue::from_json(&json!(true)), PgBindValue::Text("true".into()));
        assert_eq!(PgBindValue::from_json(&Value::Null), PgBindValue::Null);
    }
}
