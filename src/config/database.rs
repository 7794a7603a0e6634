use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Connection settings for exactly one database target.
///
/// `type`, `host`, `port`, `user` and `pass` are required. `name` only matters for the
/// networked engines, `home` and `file` only for the embedded one; each defaults to "".
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Engine tag, matched case-insensitively by the backend selector.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub home: String,

    #[serde(default)]
    pub file: String,

    pub host: String,

    pub port: u16,

    pub user: String,

    #[serde(deserialize_with = "deserialize_string_lax")]
    pub pass: String,
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for database.pass",
        )),
    }
}
