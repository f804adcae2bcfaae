//! Connection pool construction.

use crate::config::DbSettings;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

/// Build the process-wide pool. The first connection is opened eagerly so a bad host or
/// credentials fail startup instead of the first request.
pub async fn connect(settings: &DbSettings) -> Result<PgPool, sqlx::Error> {
    let mut options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.database);
    if let Some(user) = &settings.user {
        options = options.username(user);
    }
    if let Some(password) = &settings.password {
        options = options.password(password);
    }
    if let Some(timeout) = settings.statement_timeout {
        options = options.options([("statement_timeout", format!("{}ms", timeout.as_millis()))]);
    }

    let pool = PgPoolOptions::new()
        .min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await;

    match &pool {
        Ok(_) => tracing::info!(
            host = %settings.host,
            database = %settings.database,
            min = settings.min_connections,
            max = settings.max_connections,
            "connected to database"
        ),
        Err(e) => tracing::error!(error = %e, host = %settings.host, "error setting up database connection"),
    }
    pool
}
