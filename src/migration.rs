//! Schema bootstrap: CREATE SCHEMA and the eight tables, derived from the entity descriptors.
//! Idempotent (IF NOT EXISTS); tables are created parents first so foreign keys resolve.

use crate::error::{AppError, DbError};
use crate::model::{EntityDef, KeyShape, ALL_ENTITIES};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn key_columns(def: &EntityDef) -> Vec<&'static str> {
    match def.key {
        KeyShape::Single(k) => vec![k],
        KeyShape::Composite(a, b) => vec![a, b],
    }
}

/// Primary key: the generated surrogate when the table has one, else the addressing key.
fn primary_key(def: &EntityDef) -> Vec<&'static str> {
    let generated: Vec<_> = def.columns.iter().filter(|c| c.generated).map(|c| c.name).collect();
    if generated.is_empty() {
        key_columns(def)
    } else {
        generated
    }
}

/// `(column, parent table, parent key)` for every descriptor that lists `def` as a child.
fn references(def: &EntityDef) -> Vec<(&'static str, &'static str, &'static str)> {
    ALL_ENTITIES
        .iter()
        .flat_map(|parent| {
            parent
                .children
                .iter()
                .filter(|child| child.table == def.table)
                .filter_map(move |child| match parent.key {
                    KeyShape::Single(pk) => Some((child.foreign_key, parent.table, pk)),
                    KeyShape::Composite(..) => None,
                })
        })
        .collect()
}

/// CREATE TABLE IF NOT EXISTS for one descriptor.
pub fn table_ddl(def: &EntityDef, schema: &str) -> String {
    let keys = key_columns(def);
    let fks = references(def);
    let mut parts: Vec<String> = def
        .columns
        .iter()
        .map(|c| {
            if c.generated {
                format!("{} SERIAL", quote(c.name))
            } else if c.has_default {
                format!("{} TIMESTAMP NOT NULL DEFAULT now()", quote(c.name))
            } else if keys.contains(&c.name) || fks.iter().any(|(col, _, _)| *col == c.name) {
                format!("{} {} NOT NULL", quote(c.name), c.pg_type)
            } else {
                format!("{} {}", quote(c.name), c.pg_type)
            }
        })
        .collect();
    let pk: Vec<String> = primary_key(def).into_iter().map(quote).collect();
    parts.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    for (col, parent, parent_key) in fks {
        parts.push(format!(
            "FOREIGN KEY ({}) REFERENCES {}.{} ({})",
            quote(col),
            quote(schema),
            quote(parent),
            quote(parent_key)
        ));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {}.{} ({})",
        quote(schema),
        quote(def.table),
        parts.join(", ")
    )
}

/// Every statement needed for an empty database, in execution order.
pub fn migration_statements(schema: &str) -> Vec<String> {
    let mut statements = vec![format!("CREATE SCHEMA IF NOT EXISTS {}", quote(schema))];
    statements.extend(ALL_ENTITIES.iter().map(|def| table_ddl(def, schema)));
    statements
}

/// Create the schema and tables in one transaction.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await.map_err(DbError::from)?;
    for sql in migration_statements(schema) {
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(&mut *tx).await.map_err(DbError::from)?;
    }
    tx.commit().await.map_err(DbError::from)?;
    tracing::info!(schema = %schema, tables = ALL_ENTITIES.len(), "schema ready");
    Ok(())
}
