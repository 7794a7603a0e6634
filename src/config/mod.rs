mod basic;
mod database;

pub use basic::BasicConfig;
pub use database::DatabaseConfig;

use crate::error::CinemaError;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Core server configuration (see `basic` table).
    #[serde(default)]
    pub basic: BasicConfig,

    /// The single database target (see `database` table). Required.
    pub database: DatabaseConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "CINEMA_CONFIG";
const ENV_PREFIX: &str = "CINEMA_";

impl Config {
    /// Builds a Figment that merges defaults, the config file and `CINEMA_*` env overrides.
    ///
    /// The file format follows the extension: `.json` is read as JSON, anything else as TOML.
    pub fn figment(path: &Path) -> Figment {
        let figment = Figment::new().merge(Serialized::default("basic", BasicConfig::default()));
        let figment = if is_json(path) {
            figment.merge(Json::file(path))
        } else {
            figment.merge(Toml::file(path))
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from `path`. A missing file is an error, not an empty config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CinemaError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CinemaError::Configuration(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::from_figment(&Self::figment(path))
    }

    /// Loads configuration from `$CINEMA_CONFIG`, falling back to `config.toml`.
    pub fn load_default() -> Result<Self, CinemaError> {
        Self::load(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Extracts and validates a configuration; never yields a partially populated value.
    pub fn from_figment(figment: &Figment) -> Result<Self, CinemaError> {
        let cfg: Self = figment
            .extract()
            .map_err(|err| CinemaError::Configuration(err.to_string()))?;
        if cfg.database.kind.trim().is_empty() {
            return Err(CinemaError::Configuration(
                "database.type must be set and non-empty".to_string(),
            ));
        }
        Ok(cfg)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(doc: &str) -> Result<Config, CinemaError> {
        Config::from_figment(&Figment::from(Json::string(doc)))
    }

    #[test]
    fn json_document_with_required_fields_parses() {
        let cfg = from_json(
            r#"{"database":{"type":"MySQL","host":"db","port":3306,"user":"root","pass":"secret","name":"cinema"}}"#,
        )
        .expect("valid config");

        assert_eq!(cfg.database.kind, "MySQL");
        assert_eq!(cfg.database.port, 3306);
        assert_eq!(cfg.database.name, "cinema");
        assert_eq!(cfg.database.home, "");
        assert_eq!(cfg.database.file, "");
        assert_eq!(cfg.basic.listen_port, 8080);
        assert_eq!(cfg.basic.loglevel, "info");
    }

    #[test]
    fn numeric_password_is_accepted() {
        let cfg = from_json(
            r#"{"database":{"type":"sqlite","host":"localhost","port":7799,"user":"sa","pass":1234}}"#,
        )
        .expect("valid config");

        assert_eq!(cfg.database.pass, "1234");
    }

    #[test]
    fn missing_required_field_is_a_configuration_error() {
        let err = from_json(r#"{"database":{"type":"mysql","host":"db","port":3306,"user":"root"}}"#)
            .expect_err("pass is required");

        assert!(matches!(err, CinemaError::Configuration(_)));
    }

    #[test]
    fn wrong_shape_is_a_configuration_error() {
        let err = from_json(
            r#"{"database":{"type":"mysql","host":"db","port":"not-a-port","user":"root","pass":""}}"#,
        )
        .expect_err("port must be numeric");

        assert!(matches!(err, CinemaError::Configuration(_)));
    }

    #[test]
    fn missing_database_table_is_a_configuration_error() {
        let err = from_json(r#"{"basic":{"listen_port":9000}}"#).expect_err("database is required");

        assert!(matches!(err, CinemaError::Configuration(_)));
    }

    #[test]
    fn blank_engine_type_is_rejected() {
        let err = from_json(
            r#"{"database":{"type":"  ","host":"db","port":1,"user":"u","pass":"p"}}"#,
        )
        .expect_err("type must be non-empty");

        assert!(matches!(err, CinemaError::Configuration(_)));
    }

    #[test]
    fn toml_document_parses_with_basic_overrides() {
        let figment = Figment::from(Toml::string(
            r#"
            [basic]
            listen_port = 9090
            loglevel = "debug"

            [database]
            type = "postgres"
            host = "pg"
            port = 5432
            user = "cinema"
            pass = "pw"
            "#,
        ));
        let cfg = Config::from_figment(&figment).expect("valid config");

        assert_eq!(cfg.basic.listen_port, 9090);
        assert_eq!(cfg.basic.loglevel, "debug");
        assert_eq!(cfg.database.kind, "postgres");
        assert_eq!(cfg.database.user, "cinema");
    }

    #[test]
    fn load_fails_for_missing_file() {
        let err = Config::load("/definitely/not/here/config.json").expect_err("no such file");

        assert!(matches!(err, CinemaError::Configuration(_)));
    }
}
