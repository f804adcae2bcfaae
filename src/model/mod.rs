//! Entity descriptors for the movies schema, flattened for the SQL builder, plus typed payloads.

/// `HasCreatedAt` for payload structs with an `Option<String>` `created_at` field.
macro_rules! created_at_field {
    ($($item:ty),+) => {
        $(impl $crate::model::HasCreatedAt for $item {
            fn created_at(&self) -> Option<&str> {
                self.created_at.as_deref()
            }
        })+
    };
}

mod join;
mod movie;
mod people;
mod review;
mod search;

pub use join::*;
pub use movie::*;
pub use people::*;
pub use review::*;
pub use search::*;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Primary identifier of a table as the API addresses it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyShape {
    Single(&'static str),
    /// (movie id column, related id column)
    Composite(&'static str, &'static str),
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    /// PostgreSQL type used to cast bound text (`$1::int4`).
    pub pg_type: &'static str,
    /// DB fills the value when the insert omits it (serial key, `now()`).
    pub has_default: bool,
    /// Generated surrogate key: never inserted or updated from a payload.
    pub generated: bool,
}

impl ColumnDef {
    pub const fn plain(name: &'static str, pg_type: &'static str) -> Self {
        ColumnDef {
            name,
            pg_type,
            has_default: false,
            generated: false,
        }
    }

    pub const fn serial(name: &'static str) -> Self {
        ColumnDef {
            name,
            pg_type: "int4",
            has_default: true,
            generated: true,
        }
    }

    pub const fn created_at() -> Self {
        ColumnDef {
            name: "created_at",
            pg_type: "timestamp",
            has_default: true,
            generated: false,
        }
    }
}

/// Rows in another table that reference this one; cleared before the parent row is deleted.
#[derive(Clone, Copy, Debug)]
pub struct ChildTable {
    pub table: &'static str,
    pub foreign_key: &'static str,
}

/// How PUT replaces a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// `UPDATE ... SET` every payload column.
    InPlace,
    /// Delete the addressed row and insert the payload in one transaction.
    Replace,
}

#[derive(Debug)]
pub struct EntityDef {
    pub table: &'static str,
    /// Route segment, e.g. `movie` in `/v1/movie/movies`.
    pub path: &'static str,
    pub key: KeyShape,
    /// Table column order; also the order of fields in returned rows.
    pub columns: &'static [ColumnDef],
    pub children: &'static [ChildTable],
    pub update: UpdateStrategy,
}

impl EntityDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Plural collection segment: `movie` -> `movies`.
    pub fn collection(&self) -> String {
        format!("{}s", self.path)
    }
}

/// Identifier extracted from the request path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyValue {
    Single(i64),
    Composite(i64, i64),
}

impl From<i64> for KeyValue {
    fn from(id: i64) -> Self {
        KeyValue::Single(id)
    }
}

impl From<(i64, i64)> for KeyValue {
    fn from((movie_id, other_id): (i64, i64)) -> Self {
        KeyValue::Composite(movie_id, other_id)
    }
}

/// A table exposed over HTTP: its descriptor, request body type, and path id type.
pub trait Entity: Send + Sync + 'static {
    const DEF: &'static EntityDef;
    type Payload: DeserializeOwned + Serialize + HasCreatedAt + Send + 'static;
    type Id: DeserializeOwned + Into<KeyValue> + Send + 'static;
}

/// Access to the optional `created_at` every payload carries (required on PUT only).
pub trait HasCreatedAt {
    fn created_at(&self) -> Option<&str>;
}

/// Serialize a typed payload into the column map the SQL builder consumes.
pub fn payload_fields<P: Serialize>(payload: &P) -> Map<String, Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Every descriptor, in foreign-key dependency order (parents first).
pub static ALL_ENTITIES: &[&EntityDef] = &[
    &MOVIE,
    &ACTOR,
    &DIRECTOR,
    &GENRE,
    &MOVIE_REVIEW,
    &MOVIE_ACTOR,
    &MOVIE_GENRE,
    &MOVIE_DIRECTOR,
];
