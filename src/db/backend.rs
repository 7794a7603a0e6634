use super::dialect::Dialect;
use super::embedded::EmbeddedBackend;
use super::handle::Db;
use super::network::NetworkBackend;
use crate::config::DatabaseConfig;
use crate::error::CinemaError;
use sqlx::any::AnyPoolOptions;
use std::{fmt, str::FromStr, time::Duration};

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine family named by `database.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Embedded,
    MySql,
    Postgres,
}

impl BackendKind {
    pub fn dialect(self) -> Dialect {
        match self {
            BackendKind::Embedded => Dialect::Sqlite,
            BackendKind::MySql => Dialect::MySql,
            BackendKind::Postgres => Dialect::Postgres,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Embedded => write!(f, "sqlite"),
            BackendKind::MySql => write!(f, "mysql"),
            BackendKind::Postgres => write!(f, "postgresql"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = CinemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "embedded" => Ok(BackendKind::Embedded),
            "mysql" => Ok(BackendKind::MySql),
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            other => Err(CinemaError::connection(format!(
                "unsupported database type: {other}"
            ))),
        }
    }
}

/// A concrete database binding chosen at startup.
#[derive(Debug)]
pub enum Backend {
    Embedded(EmbeddedBackend),
    MySql(NetworkBackend),
    Postgres(NetworkBackend),
}

/// Maps the configured engine tag to its backend, with the engine's defaults
/// overridden by every non-empty settings field.
pub fn select(cfg: &DatabaseConfig) -> Result<Backend, CinemaError> {
    let backend = match cfg.kind.parse::<BackendKind>()? {
        BackendKind::Embedded => Backend::Embedded(EmbeddedBackend::from_config(cfg)),
        BackendKind::MySql => Backend::MySql(NetworkBackend::mysql(cfg)),
        BackendKind::Postgres => Backend::Postgres(NetworkBackend::postgres(cfg)),
    };
    Ok(backend)
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Embedded(_) => BackendKind::Embedded,
            Backend::MySql(_) => BackendKind::MySql,
            Backend::Postgres(_) => BackendKind::Postgres,
        }
    }

    pub async fn connect(&mut self) -> Result<(), CinemaError> {
        match self {
            Backend::Embedded(b) => b.connect().await,
            Backend::MySql(b) | Backend::Postgres(b) => b.connect(),
        }
    }

    /// Releases the connection. Must be called exactly once after a successful `connect`.
    pub async fn disconnect(&mut self) -> Result<(), CinemaError> {
        match self {
            Backend::Embedded(b) => b.disconnect().await,
            Backend::MySql(b) | Backend::Postgres(b) => b.disconnect().await,
        }
    }

    /// The query-execution handle; only available while connected.
    pub fn handle(&self) -> Result<Db, CinemaError> {
        match self {
            Backend::Embedded(b) => b.handle(),
            Backend::MySql(b) | Backend::Postgres(b) => b.handle(),
        }
    }
}

/// Connection lifecycle shared by every backend.
#[derive(Debug, Default)]
pub(crate) enum Link {
    #[default]
    Idle,
    Connected(Db),
    Closed,
}

impl Link {
    pub(crate) fn ensure_connectable(&self) -> Result<(), CinemaError> {
        match self {
            Link::Connected(_) => Err(CinemaError::connection("backend is already connected")),
            Link::Idle | Link::Closed => Ok(()),
        }
    }

    pub(crate) fn handle(&self) -> Result<Db, CinemaError> {
        match self {
            Link::Connected(db) => Ok(db.clone()),
            Link::Idle => Err(CinemaError::connection("backend is not connected")),
            Link::Closed => Err(CinemaError::connection("backend has been disconnected")),
        }
    }

    pub(crate) async fn close(&mut self) -> Result<(), CinemaError> {
        match std::mem::take(self) {
            Link::Connected(db) => {
                db.pool().close().await;
                *self = Link::Closed;
                Ok(())
            }
            Link::Idle => Err(CinemaError::connection(
                "cannot disconnect: backend was never connected",
            )),
            Link::Closed => {
                *self = Link::Closed;
                Err(CinemaError::connection(
                    "cannot disconnect: backend is already disconnected",
                ))
            }
        }
    }
}

pub(crate) fn pool_options() -> AnyPoolOptions {
    sqlx::any::install_default_drivers();
    AnyPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Non-empty settings value, or the backend's default.
pub(crate) fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: &str) -> DatabaseConfig {
        DatabaseConfig {
            kind: kind.to_string(),
            name: String::new(),
            home: String::new(),
            file: String::new(),
            host: String::new(),
            port: 0,
            user: String::new(),
            pass: String::new(),
        }
    }

    #[test]
    fn engine_tags_match_case_insensitively() {
        assert_eq!("SQLite".parse::<BackendKind>().unwrap(), BackendKind::Embedded);
        assert_eq!("embedded".parse::<BackendKind>().unwrap(), BackendKind::Embedded);
        assert_eq!("MySQL".parse::<BackendKind>().unwrap(), BackendKind::MySql);
        assert_eq!("Postgres".parse::<BackendKind>().unwrap(), BackendKind::Postgres);
        assert_eq!("POSTGRESQL".parse::<BackendKind>().unwrap(), BackendKind::Postgres);
    }

    #[test]
    fn unknown_engine_is_a_connection_error() {
        let err = select(&settings("oracle")).expect_err("unsupported type");

        assert!(matches!(err, CinemaError::Connection(_)));
    }

    #[test]
    fn select_builds_the_matching_variant() {
        assert_eq!(select(&settings("h2o")).map(|b| b.kind()).ok(), None);
        assert_eq!(
            select(&settings("mysql")).unwrap().kind(),
            BackendKind::MySql
        );
        assert_eq!(
            select(&settings("postgresql")).unwrap().kind(),
            BackendKind::Postgres
        );
        assert_eq!(
            select(&settings("sqlite")).unwrap().kind().dialect(),
            Dialect::Sqlite
        );
    }

    #[test]
    fn handle_before_connect_fails() {
        let backend = select(&settings("mysql")).unwrap();

        assert!(matches!(backend.handle(), Err(CinemaError::Connection(_))));
    }

    #[tokio::test]
    async fn disconnect_before_connect_fails() {
        let mut backend = select(&settings("postgres")).unwrap();

        assert!(matches!(
            backend.disconnect().await,
            Err(CinemaError::Connection(_))
        ));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        assert_eq!(or_default("", "localhost"), "localhost");
        assert_eq!(or_default("  ", "cinema"), "cinema");
        assert_eq!(or_default("db.internal", "localhost"), "db.internal");
    }
}
