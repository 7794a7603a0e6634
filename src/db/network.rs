use super::backend::{Link, or_default, pool_options};
use super::dialect::Dialect;
use super::handle::Db;
use crate::config::DatabaseConfig;
use crate::error::CinemaError;
use tracing::info;
use url::Url;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_NAME: &str = "cinema";
pub const MYSQL_DEFAULT_PORT: u16 = 3306;
pub const MYSQL_DEFAULT_USER: &str = "root";
pub const POSTGRES_DEFAULT_PORT: u16 = 5432;
pub const POSTGRES_DEFAULT_USER: &str = "postgres";

/// Client-side binding to an external MySQL or PostgreSQL server.
///
/// `connect` only builds the pool; the first socket is opened by the first query.
#[derive(Debug)]
pub struct NetworkBackend {
    dialect: Dialect,
    host: String,
    port: u16,
    name: String,
    user: String,
    pass: String,
    link: Link,
}

impl NetworkBackend {
    pub fn mysql(cfg: &DatabaseConfig) -> Self {
        Self::from_config(Dialect::MySql, MYSQL_DEFAULT_PORT, MYSQL_DEFAULT_USER, cfg)
    }

    pub fn postgres(cfg: &DatabaseConfig) -> Self {
        Self::from_config(
            Dialect::Postgres,
            POSTGRES_DEFAULT_PORT,
            POSTGRES_DEFAULT_USER,
            cfg,
        )
    }

    fn from_config(
        dialect: Dialect,
        default_port: u16,
        default_user: &str,
        cfg: &DatabaseConfig,
    ) -> Self {
        Self {
            dialect,
            host: or_default(&cfg.host, DEFAULT_HOST),
            port: if cfg.port == 0 { default_port } else { cfg.port },
            name: or_default(&cfg.name, DEFAULT_NAME),
            user: or_default(&cfg.user, default_user),
            pass: cfg.pass.clone(),
            link: Link::Idle,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn scheme(&self) -> &'static str {
        match self.dialect {
            Dialect::MySql => "mysql",
            Dialect::Postgres | Dialect::Sqlite => "postgres",
        }
    }

    /// Connection URL with credentials percent-encoded.
    pub fn url(&self) -> Result<Url, CinemaError> {
        let raw = format!("{}://{}:{}/{}", self.scheme(), self.host, self.port, self.name);
        let mut url = Url::parse(&raw)
            .map_err(|e| CinemaError::connection(format!("invalid database address: {e}")))?;
        url.set_username(&self.user)
            .map_err(|()| CinemaError::connection("database address cannot carry a user"))?;
        if !self.pass.is_empty() {
            url.set_password(Some(&self.pass)).map_err(|()| {
                CinemaError::connection("database address cannot carry a password")
            })?;
        }
        Ok(url)
    }

    pub fn connect(&mut self) -> Result<(), CinemaError> {
        self.link.ensure_connectable()?;
        let url = self.url()?;
        let pool = pool_options()
            .connect_lazy(url.as_str())
            .map_err(|e| CinemaError::connection(format!("invalid database settings: {e}")))?;

        info!(
            engine = %self.dialect,
            host = %self.host,
            port = self.port,
            database = %self.name,
            user = %self.user,
            "database pool ready"
        );
        self.link = Link::Connected(Db::new(pool, self.dialect));
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), CinemaError> {
        self.link.close().await?;
        info!(engine = %self.dialect, host = %self.host, "database pool closed");
        Ok(())
    }

    pub fn handle(&self) -> Result<Db, CinemaError> {
        self.link.handle()
    }
}
