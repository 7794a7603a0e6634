use super::schema::TableSpec;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Row};

/// A value bound into an INSERT/UPDATE for one data column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i32),
    SmallInt(i16),
    Text(String),
}

impl SqlValue {
    pub(crate) fn bind_to<'q>(
        self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        match self {
            SqlValue::Int(v) => query.bind(v),
            SqlValue::SmallInt(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
        }
    }
}

/// A persisted record kind. Implementations describe their table and how to move
/// between a row and the Rust value; `Store` supplies the CRUD behaviour.
pub trait Entity: Sized + Send + Unpin + 'static {
    const TABLE: TableSpec;

    /// Human-readable kind used in errors and logs.
    const KIND: &'static str;

    /// Filter applied by `count`/`list`: `()` for unscoped tables.
    type Scope: Copy + Send + Sync;

    /// Identity; 0 means "not yet persisted".
    fn id(&self) -> i32;

    /// Values for `TABLE.data_columns()`, in the same order.
    fn values(&self) -> Vec<SqlValue>;

    fn scope_values(scope: Self::Scope) -> Vec<SqlValue>;

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error>;
}

/// Reads an integer column regardless of the width the engine reports it with.
pub(crate) fn get_int<T>(row: &AnyRow, column: &str) -> Result<T, sqlx::Error>
where
    T: TryFrom<i64>,
    <T as TryFrom<i64>>::Error: std::error::Error + Send + Sync + 'static,
{
    let raw: i64 = row.try_get(column)?;
    T::try_from(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
