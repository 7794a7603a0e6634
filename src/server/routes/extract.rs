use crate::error::CinemaError;
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// JSON request body. Syntax and shape errors become `400 BAD_REQUEST`.
///
/// The debug log shows the body as the client sent it, including write-only
/// fields such as a schedule's `movieId`.
pub(crate) struct JsonBody<T>(pub(crate) T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = CinemaError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let Json(raw) = Json::<Value>::from_request(req, &())
            .await
            .map_err(|rejection| {
                debug!(path = %path, error = %rejection.body_text(), "rejected request body");
                CinemaError::validation(format!("malformed request body: {}", rejection.body_text()))
            })?;

        with_pretty_json_debug(&raw, |pretty_body| {
            debug!(path = %path, body = %pretty_body, "request body");
        });

        decode_body(raw).map(Self)
    }
}

pub(crate) fn decode_body<T: DeserializeOwned>(raw: Value) -> Result<T, CinemaError> {
    serde_json::from_value(raw)
        .map_err(|e| CinemaError::validation(format!("malformed request body: {e}")))
}

/// The single `{id}` path segment as an entity identity.
pub(crate) struct EntityId(pub(crate) i32);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = CinemaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| CinemaError::validation(rejection.body_text()))?;
        parse_id(&raw).map(Self)
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<i32, CinemaError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| CinemaError::validation(format!("invalid id: {raw}")))
}

/// 1-based page number; anything unparseable means the first page.
pub(crate) fn parse_page(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(1)
}
