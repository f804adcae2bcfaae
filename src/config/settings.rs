//! Process settings read once at startup from the environment (and `.env` when present).

use crate::error::ConfigError;
use regex::Regex;
use std::net::SocketAddr;
use std::time::Duration;

/// Connection parameters and pool sizing.
#[derive(Clone, Debug)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// `None` leaves the server default (no statement timeout).
    pub statement_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub db: DbSettings,
    /// Schema that holds the movie tables.
    pub schema: String,
    /// Route prefix such as `/v1`; empty mounts entity routes at the root.
    pub version_prefix: String,
    pub bind_addr: SocketAddr,
    pub run_migrations: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database = get("DATABASE").ok_or(ConfigError::Missing("DATABASE"))?;
        let min_connections = parse_or(&get, "MIN_CONNECTIONS", 1u32)?;
        let max_connections = parse_or(&get, "MAX_CONNECTIONS", 10u32)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_CONNECTIONS",
                message: "must be at least 1".into(),
            });
        }
        if min_connections > max_connections {
            return Err(ConfigError::Invalid {
                key: "MIN_CONNECTIONS",
                message: format!("{} exceeds MAX_CONNECTIONS ({})", min_connections, max_connections),
            });
        }
        let statement_timeout_secs = parse_or(&get, "STATEMENT_TIMEOUT_SECS", 30u64)?;

        let db = DbSettings {
            host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: parse_or(&get, "DB_PORT", 5432u16)?,
            user: get("DB_USER"),
            password: get("DB_PASSWORD"),
            database,
            min_connections,
            max_connections,
            acquire_timeout: Duration::from_secs(parse_or(&get, "ACQUIRE_TIMEOUT_SECS", 30u64)?),
            statement_timeout: (statement_timeout_secs > 0).then(|| Duration::from_secs(statement_timeout_secs)),
        };

        let schema = get("SCHEMA").unwrap_or_else(|| "public".into());
        if !is_identifier(&schema) {
            return Err(ConfigError::Invalid {
                key: "SCHEMA",
                message: format!("'{}' is not a plain SQL identifier", schema),
            });
        }

        let version_prefix = normalize_prefix(lookup("VERSION").as_deref().unwrap_or("/v1"))?;

        Ok(Settings {
            db,
            schema,
            version_prefix,
            bind_addr: parse_or(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 5000)))?,
            run_migrations: parse_or(&get, "RUN_MIGRATIONS", false)?,
        })
    }
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
}

fn is_identifier(s: &str) -> bool {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$")
        .map(|re| re.is_match(s))
        .unwrap_or(false)
}

/// `v1`, `/v1/` and `/v1` all become `/v1`; blank or `/` becomes empty.
fn normalize_prefix(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let valid = Regex::new(r"^[A-Za-z0-9_.\-]+(/[A-Za-z0-9_.\-]+)*$")
        .map(|re| re.is_match(trimmed))
        .unwrap_or(false);
    if !valid {
        return Err(ConfigError::Invalid {
            key: "VERSION",
            message: format!("'{}' is not a usable path prefix", raw),
        });
    }
    Ok(format!("/{}", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_is_set() {
        let s = settings(&[("DATABASE", "movies")]).unwrap();
        assert_eq!(s.db.host, "localhost");
        assert_eq!(s.db.port, 5432);
        assert_eq!(s.db.min_connections, 1);
        assert_eq!(s.db.max_connections, 10);
        assert_eq!(s.db.statement_timeout, Some(Duration::from_secs(30)));
        assert_eq!(s.schema, "public");
        assert_eq!(s.version_prefix, "/v1");
        assert!(!s.run_migrations);
    }

    #[test]
    fn database_is_required() {
        assert!(matches!(settings(&[]), Err(ConfigError::Missing("DATABASE"))));
    }

    #[test]
    fn min_above_max_is_rejected() {
        let err = settings(&[("DATABASE", "m"), ("MIN_CONNECTIONS", "8"), ("MAX_CONNECTIONS", "4")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MIN_CONNECTIONS", .. }));
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let err = settings(&[("DATABASE", "m"), ("DB_PORT", "five")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_PORT", .. }));
    }

    #[test]
    fn schema_must_be_identifier() {
        assert!(settings(&[("DATABASE", "m"), ("SCHEMA", "imdb")]).is_ok());
        assert!(settings(&[("DATABASE", "m"), ("SCHEMA", "imdb; drop table movie")]).is_err());
    }

    #[test]
    fn version_prefix_is_normalized() {
        assert_eq!(settings(&[("DATABASE", "m"), ("VERSION", "v2/")]).unwrap().version_prefix, "/v2");
        assert_eq!(settings(&[("DATABASE", "m"), ("VERSION", "/")]).unwrap().version_prefix, "");
        assert!(settings(&[("DATABASE", "m"), ("VERSION", "/v 1")]).is_err());
    }

    #[test]
    fn zero_statement_timeout_disables_it() {
        let s = settings(&[("DATABASE", "m"), ("STATEMENT_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(s.db.statement_timeout, None);
    }
}
