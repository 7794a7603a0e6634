use super::entity::{Entity, SqlValue, get_int};
use super::schema::{MOVIES, SCHEDULES, TableSpec};
use crate::error::CinemaError;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::any::AnyRow;

const TITLE_MAX_UNITS: usize = 300;
const DATE_TIME_MAX_UNITS: usize = 50;
const AUDITORIUM_MAX: u8 = 127;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    #[serde(default)]
    pub id: i32,
    pub title: String,
    /// Running time in minutes.
    pub duration: i16,
    pub year: i16,
}

impl Movie {
    /// A movie that has not been stored yet.
    pub fn new(title: impl Into<String>, duration: i16, year: i16) -> Self {
        Self {
            id: 0,
            title: title.into(),
            duration,
            year,
        }
    }

    /// Field shape checks; identity rules are up to the caller.
    pub fn validate(&self) -> Result<(), CinemaError> {
        check_text("title", &self.title, TITLE_MAX_UNITS)?;
        if self.duration < 0 {
            return Err(CinemaError::validation("duration must not be negative"));
        }
        Ok(())
    }
}

impl Entity for Movie {
    const TABLE: TableSpec = MOVIES;
    const KIND: &'static str = "movie";
    type Scope = ();

    fn id(&self) -> i32 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.title.clone()),
            SqlValue::SmallInt(self.duration),
            SqlValue::SmallInt(self.year),
        ]
    }

    fn scope_values((): ()) -> Vec<SqlValue> {
        Vec::new()
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_int(row, "id")?,
            title: row.try_get("title")?,
            duration: get_int(row, "duration")?,
            year: get_int(row, "year")?,
        })
    }
}

/// A screening of one movie. `movieId` is accepted on input but never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    #[serde(default)]
    pub id: i32,
    #[serde(rename = "movieId", skip_serializing)]
    pub movie_id: i32,
    #[serde(rename = "dateAndTime")]
    pub date_and_time: String,
    #[serde(default = "default_auditorium")]
    pub auditorium: u8,
}

fn default_auditorium() -> u8 {
    1
}

impl Schedule {
    pub fn new(movie_id: i32, date_and_time: impl Into<String>, auditorium: u8) -> Self {
        Self {
            id: 0,
            movie_id,
            date_and_time: date_and_time.into(),
            auditorium,
        }
    }

    pub fn validate(&self) -> Result<(), CinemaError> {
        check_text("dateAndTime", &self.date_and_time, DATE_TIME_MAX_UNITS)?;
        if self.auditorium == 0 || self.auditorium > AUDITORIUM_MAX {
            return Err(CinemaError::validation(format!(
                "auditorium must be between 1 and {AUDITORIUM_MAX}"
            )));
        }
        Ok(())
    }
}

impl Entity for Schedule {
    const TABLE: TableSpec = SCHEDULES;
    const KIND: &'static str = "schedule";
    /// Owning movie id.
    type Scope = i32;

    fn id(&self) -> i32 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Int(self.movie_id),
            SqlValue::Text(self.date_and_time.clone()),
            SqlValue::SmallInt(i16::from(self.auditorium)),
        ]
    }

    fn scope_values(movie_id: i32) -> Vec<SqlValue> {
        vec![SqlValue::Int(movie_id)]
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_int(row, "id")?,
            movie_id: get_int(row, "movie_id")?,
            date_and_time: row.try_get("date_time")?,
            auditorium: get_int(row, "auditorium")?,
        })
    }
}

/// Non-empty and at most `max_units` UTF-16 code units long.
fn check_text(field: &str, value: &str, max_units: usize) -> Result<(), CinemaError> {
    if value.trim().is_empty() {
        return Err(CinemaError::validation(format!("{field} must not be empty")));
    }
    if value.encode_utf16().count() > max_units {
        return Err(CinemaError::validation(format!(
            "{field} must be at most {max_units} characters"
        )));
    }
    Ok(())
}
