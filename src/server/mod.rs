pub mod router;
pub mod routes;

pub use router::{CinemaState, cinema_router};
