use crate::server::router::CinemaState;
use axum::{
    Router,
    routing::{get, post},
};

pub mod extract;
pub mod movies;
pub mod schedules;

pub fn router() -> Router<CinemaState> {
    Router::new()
        .route("/api/movies", get(movies::list_first_page))
        .route("/api/movies/{page}", get(movies::list_page))
        .route("/api/movie", post(movies::create).put(movies::modify))
        .route("/api/movie/{id}", get(movies::find).delete(movies::delete))
        .route("/api/schedules/{movie_id}", get(schedules::list_first_page))
        .route("/api/schedules/{movie_id}/{page}", get(schedules::list_page))
        .route(
            "/api/schedule",
            post(schedules::create).put(schedules::modify),
        )
        .route(
            "/api/schedule/{id}",
            get(schedules::find).delete(schedules::delete),
        )
}
