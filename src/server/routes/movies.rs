use super::extract::{EntityId, JsonBody, parse_page};
use crate::db::Movie;
use crate::error::CinemaError;
use crate::server::router::CinemaState;
use crate::service::{Ack, Page};
use axum::{
    Json,
    extract::{Path, State},
};

pub(super) async fn list_first_page(
    State(state): State<CinemaState>,
) -> Result<Json<Page<Movie>>, CinemaError> {
    Ok(Json(state.catalog.list_movies(1).await?))
}

pub(super) async fn list_page(
    State(state): State<CinemaState>,
    Path(page): Path<String>,
) -> Result<Json<Page<Movie>>, CinemaError> {
    Ok(Json(state.catalog.list_movies(parse_page(&page)).await?))
}

pub(super) async fn find(
    State(state): State<CinemaState>,
    EntityId(id): EntityId,
) -> Result<Json<Movie>, CinemaError> {
    Ok(Json(state.catalog.find_movie(id).await?))
}

pub(super) async fn create(
    State(state): State<CinemaState>,
    JsonBody(movie): JsonBody<Movie>,
) -> Result<Json<Ack>, CinemaError> {
    state.catalog.create_movie(&movie).await?;
    Ok(Json(Ack::OK))
}

pub(super) async fn modify(
    State(state): State<CinemaState>,
    JsonBody(movie): JsonBody<Movie>,
) -> Result<Json<Ack>, CinemaError> {
    state.catalog.modify_movie(&movie).await?;
    Ok(Json(Ack::OK))
}

pub(super) async fn delete(
    State(state): State<CinemaState>,
    EntityId(id): EntityId,
) -> Result<Json<Ack>, CinemaError> {
    state.catalog.delete_movie(id).await?;
    Ok(Json(Ack::OK))
}
