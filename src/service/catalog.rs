use crate::db::{Db, Movie, Schedule, Store, page_count};
use crate::error::CinemaError;
use serde::Serialize;
use tracing::info;

/// Rows per page for both movies and schedules.
pub const PAGE_SIZE: i64 = 10;

/// One page of a listing. `pageCount` is `floor(total / PAGE_SIZE)`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    #[serde(rename = "pageCount")]
    pub page_count: i64,
}

/// Body returned by every successful mutation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Ack = Ack { success: true };
}

/// Movies and schedules over one shared query handle.
#[derive(Clone)]
pub struct Catalog {
    movies: Store<Movie>,
    schedules: Store<Schedule>,
}

impl Catalog {
    pub fn new(db: Db) -> Self {
        Self {
            movies: Store::new(db.clone()),
            schedules: Store::new(db),
        }
    }

    pub fn movies(&self) -> &Store<Movie> {
        &self.movies
    }

    pub fn schedules(&self) -> &Store<Schedule> {
        &self.schedules
    }

    /// Creates movies, then schedules (the latter references the former).
    pub async fn install_schema(&self) -> Result<(), CinemaError> {
        self.movies.create_table().await?;
        self.schedules.create_table().await?;
        info!("schema installed");
        Ok(())
    }

    /// Drops schedules, then movies.
    pub async fn uninstall_schema(&self) -> Result<(), CinemaError> {
        self.schedules.drop_table().await?;
        self.movies.drop_table().await?;
        info!("schema uninstalled");
        Ok(())
    }

    pub async fn list_movies(&self, page: i64) -> Result<Page<Movie>, CinemaError> {
        let total = self.movies.count(()).await?;
        let items = self.movies.list((), page, PAGE_SIZE).await?;
        Ok(Page {
            items,
            total,
            page_count: page_count(total, PAGE_SIZE),
        })
    }

    pub async fn find_movie(&self, id: i32) -> Result<Movie, CinemaError> {
        self.movies.find(id).await
    }

    pub async fn create_movie(&self, movie: &Movie) -> Result<(), CinemaError> {
        if movie.id != 0 {
            return Err(CinemaError::validation(
                "a new movie must not carry an id",
            ));
        }
        movie.validate()?;
        self.movies.save(movie).await?;
        info!(title = %movie.title, year = movie.year, "movie created");
        Ok(())
    }

    pub async fn modify_movie(&self, movie: &Movie) -> Result<(), CinemaError> {
        if movie.id == 0 {
            return Err(CinemaError::validation("movie id is required"));
        }
        movie.validate()?;
        self.require_movie(movie.id).await?;
        self.movies.save(movie).await?;
        info!(id = movie.id, "movie modified");
        Ok(())
    }

    /// Deletes a movie together with its schedules.
    pub async fn delete_movie(&self, id: i32) -> Result<(), CinemaError> {
        self.require_movie(id).await?;
        self.movies.kill(id).await?;
        info!(id, "movie deleted");
        Ok(())
    }

    pub async fn list_schedules(
        &self,
        movie_id: i32,
        page: i64,
    ) -> Result<Page<Schedule>, CinemaError> {
        let total = self.schedules.count(movie_id).await?;
        let items = self.schedules.list(movie_id, page, PAGE_SIZE).await?;
        Ok(Page {
            items,
            total,
            page_count: page_count(total, PAGE_SIZE),
        })
    }

    pub async fn find_schedule(&self, id: i32) -> Result<Schedule, CinemaError> {
        self.schedules.find(id).await
    }

    pub async fn create_schedule(&self, schedule: &Schedule) -> Result<(), CinemaError> {
        if schedule.id != 0 {
            return Err(CinemaError::validation(
                "a new schedule must not carry an id",
            ));
        }
        schedule.validate()?;
        self.require_movie(schedule.movie_id).await?;
        self.schedules.save(schedule).await?;
        info!(movie_id = schedule.movie_id, "schedule created");
        Ok(())
    }

    pub async fn modify_schedule(&self, schedule: &Schedule) -> Result<(), CinemaError> {
        if schedule.id == 0 {
            return Err(CinemaError::validation("schedule id is required"));
        }
        schedule.validate()?;
        if !self.schedules.exists(schedule.id).await? {
            return Err(CinemaError::validation(format!(
                "schedule {} does not exist",
                schedule.id
            )));
        }
        self.require_movie(schedule.movie_id).await?;
        self.schedules.save(schedule).await?;
        info!(id = schedule.id, "schedule modified");
        Ok(())
    }

    pub async fn delete_schedule(&self, id: i32) -> Result<(), CinemaError> {
        if !self.schedules.exists(id).await? {
            return Err(CinemaError::validation(format!(
                "schedule {id} does not exist"
            )));
        }
        self.schedules.kill(id).await?;
        info!(id, "schedule deleted");
        Ok(())
    }

    async fn require_movie(&self, id: i32) -> Result<(), CinemaError> {
        if self.movies.exists(id).await? {
            Ok(())
        } else {
            Err(CinemaError::validation(format!("movie {id} does not exist")))
        }
    }
}
