use super::backend::{Link, or_default, pool_options};
use super::dialect::Dialect;
use super::handle::Db;
use crate::config::DatabaseConfig;
use crate::error::CinemaError;
use sqlx::Executor;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 7799;
pub const DEFAULT_HOME: &str = "data";
pub const DEFAULT_FILE: &str = "cinema";
pub const DEFAULT_USER: &str = "sa";

/// In-process SQLite database stored as `<home>/<file>.db`.
///
/// `host`, `port` and `user` only describe the instance in logs; the file is
/// opened directly and there is no listener, so remote access is not offered.
#[derive(Debug)]
pub struct EmbeddedBackend {
    host: String,
    port: u16,
    home: PathBuf,
    file: String,
    user: String,
    link: Link,
}

impl Default for EmbeddedBackend {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            home: PathBuf::from(DEFAULT_HOME),
            file: DEFAULT_FILE.to_string(),
            user: DEFAULT_USER.to_string(),
            link: Link::Idle,
        }
    }
}

impl EmbeddedBackend {
    pub fn from_config(cfg: &DatabaseConfig) -> Self {
        Self {
            host: or_default(&cfg.host, DEFAULT_HOST),
            port: if cfg.port == 0 { DEFAULT_PORT } else { cfg.port },
            home: PathBuf::from(or_default(&cfg.home, DEFAULT_HOME)),
            file: or_default(&cfg.file, DEFAULT_FILE),
            user: or_default(&cfg.user, DEFAULT_USER),
            link: Link::Idle,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn database_path(&self) -> PathBuf {
        self.home.join(format!("{}.db", self.file))
    }

    /// Connection URL; `mode=rwc` creates the file on first open.
    pub fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database_path().display())
    }

    pub async fn connect(&mut self) -> Result<(), CinemaError> {
        self.link.ensure_connectable()?;

        tokio::fs::create_dir_all(&self.home).await.map_err(|e| {
            CinemaError::connection(format!(
                "failed to create database directory {}: {e}",
                self.home.display()
            ))
        })?;

        let pool = pool_options()
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("PRAGMA foreign_keys = ON").await?;
                    Ok(())
                })
            })
            .connect(&self.url())
            .await
            .map_err(|e| {
                CinemaError::connection(format!(
                    "failed to open embedded database {}: {e}",
                    self.database_path().display()
                ))
            })?;

        info!(
            path = %self.database_path().display(),
            host = %self.host,
            port = self.port,
            user = %self.user,
            "embedded database opened"
        );
        self.link = Link::Connected(Db::new(pool, Dialect::Sqlite));
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), CinemaError> {
        self.link.close().await?;
        info!(path = %self.database_path().display(), "embedded database closed");
        Ok(())
    }

    pub fn handle(&self) -> Result<Db, CinemaError> {
        self.link.handle()
    }
}
