use super::extract::{EntityId, JsonBody, parse_id, parse_page};
use crate::db::Schedule;
use crate::error::CinemaError;
use crate::server::router::CinemaState;
use crate::service::{Ack, Page};
use axum::{
    Json,
    extract::{Path, State},
};

pub(super) async fn list_first_page(
    State(state): State<CinemaState>,
    Path(movie_id): Path<String>,
) -> Result<Json<Page<Schedule>>, CinemaError> {
    let movie_id = parse_id(&movie_id)?;
    Ok(Json(state.catalog.list_schedules(movie_id, 1).await?))
}

pub(super) async fn list_page(
    State(state): State<CinemaState>,
    Path((movie_id, page)): Path<(String, String)>,
) -> Result<Json<Page<Schedule>>, CinemaError> {
    let movie_id = parse_id(&movie_id)?;
    Ok(Json(
        state
            .catalog
            .list_schedules(movie_id, parse_page(&page))
            .await?,
    ))
}

pub(super) async fn find(
    State(state): State<CinemaState>,
    EntityId(id): EntityId,
) -> Result<Json<Schedule>, CinemaError> {
    Ok(Json(state.catalog.find_schedule(id).await?))
}

pub(super) async fn create(
    State(state): State<CinemaState>,
    JsonBody(schedule): JsonBody<Schedule>,
) -> Result<Json<Ack>, CinemaError> {
    state.catalog.create_schedule(&schedule).await?;
    Ok(Json(Ack::OK))
}

pub(super) async fn modify(
    State(state): State<CinemaState>,
    JsonBody(schedule): JsonBody<Schedule>,
) -> Result<Json<Ack>, CinemaError> {
    state.catalog.modify_schedule(&schedule).await?;
    Ok(Json(Ack::OK))
}

pub(super) async fn delete(
    State(state): State<CinemaState>,
    EntityId(id): EntityId,
) -> Result<Json<Ack>, CinemaError> {
    state.catalog.delete_schedule(id).await?;
    Ok(Json(Ack::OK))
}
