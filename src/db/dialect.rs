//! Engine-specific SQL fragments.
//!
//! The `any` driver passes statements through verbatim, so placeholders and
//! DDL types must already match the engine behind the pool.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    MySql,
    Postgres,
}

impl Dialect {
    /// Bind placeholder for the 1-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Sqlite | Dialect::MySql => "?".to_string(),
            Dialect::Postgres => format!("${index}"),
        }
    }

    /// Quotes a table or column name (`year` is a keyword on some engines).
    pub fn quote(self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{ident}`"),
            Dialect::Sqlite | Dialect::Postgres => format!("\"{ident}\""),
        }
    }

    /// Auto-incrementing integer primary key column definition (without the column name).
    pub fn identity_column(self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::MySql => "INT NOT NULL AUTO_INCREMENT PRIMARY KEY",
            Dialect::Postgres => "SERIAL PRIMARY KEY",
        }
    }

    pub fn tiny_int(self) -> &'static str {
        match self {
            Dialect::Sqlite | Dialect::MySql => "TINYINT",
            // PostgreSQL has no single-byte integer.
            Dialect::Postgres => "SMALLINT",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Postgres => write!(f, "postgresql"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_engine_convention() {
        assert_eq!(Dialect::Sqlite.placeholder(3), "?");
        assert_eq!(Dialect::MySql.placeholder(1), "?");
        assert_eq!(Dialect::Postgres.placeholder(2), "$2");
    }

    #[test]
    fn identifiers_are_quoted_per_engine() {
        assert_eq!(Dialect::MySql.quote("year"), "`year`");
        assert_eq!(Dialect::Postgres.quote("year"), "\"year\"");
        assert_eq!(Dialect::Sqlite.quote("movies"), "\"movies\"");
    }

    #[test]
    fn postgres_has_no_tinyint() {
        assert_eq!(Dialect::Postgres.tiny_int(), "SMALLINT");
        assert_eq!(Dialect::MySql.tiny_int(), "TINYINT");
    }
}
