mod cinema;

pub use cinema::{ApiErrorBody, ApiErrorObject, CinemaError};
