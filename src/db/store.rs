use super::dialect::Dialect;
use super::entity::{Entity, SqlValue};
use super::handle::Db;
use super::schema::TableSpec;
use crate::error::CinemaError;
use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Row};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// Every statement a store issues, rendered once for its dialect.
#[derive(Debug)]
struct Statements {
    create_table: String,
    drop_table: String,
    count: String,
    exists: String,
    find: String,
    list: String,
    delete: String,
    insert: String,
    update: String,
    /// SQLite only: finds other tables whose DDL references this one.
    dependents: Option<DependentCheck>,
}

/// SQLite drops a referenced table after cascading an implicit `DELETE FROM`
/// instead of refusing, so dependents are looked up before `DROP TABLE`.
#[derive(Debug)]
struct DependentCheck {
    sql: String,
    pattern: String,
}

impl Statements {
    fn render(dialect: Dialect, spec: &TableSpec) -> Self {
        let table = dialect.quote(spec.name);
        let id = dialect.quote(spec.identity_column());
        let all_columns = spec
            .columns
            .iter()
            .map(|c| dialect.quote(c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let data_columns: Vec<String> = spec
            .data_columns()
            .iter()
            .map(|c| dialect.quote(c.name))
            .collect();

        let (scope_filter, scope_params) = match spec.scope_column {
            Some(column) => (
                format!(" WHERE {} = {}", dialect.quote(column), dialect.placeholder(1)),
                1,
            ),
            None => (String::new(), 0),
        };

        let insert_params = (1..=data_columns.len())
            .map(|i| dialect.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ");
        let assignments = data_columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = {}", dialect.placeholder(i + 1)))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            create_table: spec.create_table_sql(dialect),
            drop_table: spec.drop_table_sql(dialect),
            count: format!("SELECT COUNT(*) FROM {table}{scope_filter}"),
            exists: format!(
                "SELECT COUNT(*) FROM {table} WHERE {id} = {}",
                dialect.placeholder(1)
            ),
            find: format!(
                "SELECT {all_columns} FROM {table} WHERE {id} = {}",
                dialect.placeholder(1)
            ),
            list: format!(
                "SELECT {all_columns} FROM {table}{scope_filter} ORDER BY {} DESC, {id} DESC LIMIT {} OFFSET {}",
                dialect.quote(spec.sort_column),
                dialect.placeholder(scope_params + 1),
                dialect.placeholder(scope_params + 2),
            ),
            delete: format!(
                "DELETE FROM {table} WHERE {id} = {}",
                dialect.placeholder(1)
            ),
            insert: format!(
                "INSERT INTO {table} ({}) VALUES ({insert_params})",
                data_columns.join(", ")
            ),
            update: format!(
                "UPDATE {table} SET {assignments} WHERE {id} = {}",
                dialect.placeholder(data_columns.len() + 1)
            ),
            dependents: (dialect == Dialect::Sqlite).then(|| DependentCheck {
                sql: "SELECT name FROM sqlite_master WHERE type = 'table' AND name <> ? AND sql LIKE ?"
                    .to_string(),
                pattern: format!("%REFERENCES {table}%"),
            }),
        }
    }
}

/// Row offset for a 1-based page. Pages below 1 are clamped to the first page.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(page_size).max(0)
}

/// Number of pages shown to callers: `floor(total / page_size)`.
///
/// A trailing partial page is not counted (25 rows at 10 per page gives 2).
pub fn page_count(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    total / page_size
}

/// Generic CRUD over one entity table, bound to the shared query handle.
pub struct Store<E: Entity> {
    db: Db,
    sql: Arc<Statements>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Store<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            sql: Arc::clone(&self.sql),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Store<E> {
    pub fn new(db: Db) -> Self {
        let sql = Statements::render(db.dialect(), &E::TABLE);
        Self {
            db,
            sql: Arc::new(sql),
            _entity: PhantomData,
        }
    }

    fn pool(&self) -> &AnyPool {
        self.db.pool()
    }

    /// Creates the table if it does not exist yet.
    pub async fn create_table(&self) -> Result<(), CinemaError> {
        sqlx::query(&self.sql.create_table)
            .execute(self.pool())
            .await?;
        info!(table = E::TABLE.name, "table created (if not exists)");
        Ok(())
    }

    /// Drops the table. Fails while another table still references it, on every engine.
    pub async fn drop_table(&self) -> Result<(), CinemaError> {
        if let Some(check) = &self.sql.dependents {
            let dependents: Vec<String> = sqlx::query_scalar(&check.sql)
                .bind(E::TABLE.name)
                .bind(check.pattern.as_str())
                .fetch_all(self.pool())
                .await?;
            if let Some(dependent) = dependents.first() {
                return Err(CinemaError::Storage(sqlx::Error::Protocol(format!(
                    "cannot drop table {}: table {dependent} still references it",
                    E::TABLE.name
                ))));
            }
        }
        sqlx::query(&self.sql.drop_table).execute(self.pool()).await?;
        info!(table = E::TABLE.name, "table dropped");
        Ok(())
    }

    pub async fn count(&self, scope: E::Scope) -> Result<i64, CinemaError> {
        let row = bind_all(sqlx::query(&self.sql.count), E::scope_values(scope))
            .fetch_one(self.pool())
            .await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    pub async fn exists(&self, id: i32) -> Result<bool, CinemaError> {
        let cnt: i64 = sqlx::query_scalar(&self.sql.exists)
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        Ok(cnt != 0)
    }

    /// Single-row lookup by identity; `NotFound` when no row matches.
    pub async fn find(&self, id: i32) -> Result<E, CinemaError> {
        let row = sqlx::query(&self.sql.find)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        match row {
            Some(row) => Ok(E::from_row(&row)?),
            None => Err(CinemaError::NotFound {
                entity: E::KIND,
                id,
            }),
        }
    }

    /// One page of rows, newest first by the table's sort column.
    pub async fn list(
        &self,
        scope: E::Scope,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<E>, CinemaError> {
        let limit = page_size.max(0);
        let offset = page_offset(page, limit);
        let rows = bind_all(sqlx::query(&self.sql.list), E::scope_values(scope))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;
        rows.iter()
            .map(E::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CinemaError::from)
    }

    /// Deletes by identity. Deleting a missing row is not an error.
    pub async fn kill(&self, id: i32) -> Result<(), CinemaError> {
        let res = sqlx::query(&self.sql.delete)
            .bind(id)
            .execute(self.pool())
            .await?;
        debug!(
            table = E::TABLE.name,
            id,
            affected = res.rows_affected(),
            "row deleted"
        );
        Ok(())
    }

    /// Upsert keyed on identity: 0 inserts (the new id is not written back),
    /// anything else updates the matching row, or nothing if it is gone.
    pub async fn save(&self, entity: &E) -> Result<(), CinemaError> {
        let id = entity.id();
        let res = if id == 0 {
            bind_all(sqlx::query(&self.sql.insert), entity.values())
                .execute(self.pool())
                .await?
        } else {
            bind_all(sqlx::query(&self.sql.update), entity.values())
                .bind(id)
                .execute(self.pool())
                .await?
        };
        debug!(
            table = E::TABLE.name,
            id,
            insert = id == 0,
            affected = res.rows_affected(),
            "row saved"
        );
        Ok(())
    }
}

fn bind_all<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    values: Vec<SqlValue>,
) -> Query<'q, Any, AnyArguments<'q>> {
    values.into_iter().fold(query, |q, v| v.bind_to(q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{MOVIES, SCHEDULES};

    #[test]
    fn page_count_floors_partial_pages() {
        assert_eq!(page_count(25, 10), 2);
        assert_eq!(page_count(30, 10), 3);
        assert_eq!(page_count(9, 10), 0);
        assert_eq!(page_count(0, 10), 0);
    }

    #[test]
    fn page_offset_is_one_based_and_never_negative() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(-4, 10), 0);
    }

    #[test]
    fn movie_statements_for_sqlite() {
        let sql = Statements::render(Dialect::Sqlite, &MOVIES);

        assert_eq!(sql.count, "SELECT COUNT(*) FROM \"movies\"");
        assert_eq!(
            sql.list,
            "SELECT \"id\", \"title\", \"duration\", \"year\" FROM \"movies\" ORDER BY \"year\" DESC, \"id\" DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            sql.insert,
            "INSERT INTO \"movies\" (\"title\", \"duration\", \"year\") VALUES (?, ?, ?)"
        );
        assert_eq!(
            sql.update,
            "UPDATE \"movies\" SET \"title\" = ?, \"duration\" = ?, \"year\" = ? WHERE \"id\" = ?"
        );
    }

    #[test]
    fn schedule_statements_for_postgres_number_placeholders() {
        let sql = Statements::render(Dialect::Postgres, &SCHEDULES);

        assert_eq!(
            sql.count,
            "SELECT COUNT(*) FROM \"schedules\" WHERE \"movie_id\" = $1"
        );
        assert!(sql.list.ends_with(
            "WHERE \"movie_id\" = $1 ORDER BY \"date_time\" DESC, \"id\" DESC LIMIT $2 OFFSET $3"
        ));
        assert_eq!(
            sql.update,
            "UPDATE \"schedules\" SET \"movie_id\" = $1, \"date_time\" = $2, \"auditorium\" = $3 WHERE \"id\" = $4"
        );
        assert_eq!(sql.delete, "DELETE FROM \"schedules\" WHERE \"id\" = $1");
        assert!(sql.dependents.is_none());
    }

    #[test]
    fn sqlite_drop_looks_for_referencing_tables() {
        let check = Statements::render(Dialect::Sqlite, &MOVIES)
            .dependents
            .expect("sqlite needs a dependent check");

        assert_eq!(check.pattern, "%REFERENCES \"movies\"%");
        // Must match the DDL the schedules table is created with.
        let schedules_ddl = SCHEDULES.create_table_sql(Dialect::Sqlite);
        assert!(schedules_ddl.contains(check.pattern.trim_matches('%')));
    }
}
