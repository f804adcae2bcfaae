//! Movies API: CRUD and search over the movie, actor, director, genre, review and link tables,
//! served as JSON over HTTP from PostgreSQL.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{DbSettings, Settings};
pub use db::{connect, PgExecutor, QueryExecutor, QueryResult};
pub use error::{AppError, ConfigError, DbError};
pub use migration::apply_migrations;
pub use routes::app;
pub use service::CrudService;
pub use state::AppState;
