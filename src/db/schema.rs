//! Declarative table descriptions and the DDL rendered from them.
//!
//! Logical schema:
//! - `movies(id PK autoincrement, title varchar(300), duration smallint, year smallint)`
//! - `schedules(id PK autoincrement, movie_id int -> movies(id) ON DELETE CASCADE,
//!   date_time varchar(50), auditorium tinyint)`

use super::dialect::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing primary key.
    Identity,
    Integer,
    SmallInt,
    TinyInt,
    Varchar(u16),
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
    pub referenced_column: &'static str,
    pub on_delete_cascade: bool,
}

/// Everything the generic store needs to know about an entity's table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    /// First entry must be the identity column.
    pub columns: &'static [Column],
    /// Listing order, descending.
    pub sort_column: &'static str,
    /// Column that `count`/`list` filter on, if the entity is scoped.
    pub scope_column: Option<&'static str>,
    pub foreign_key: Option<ForeignKey>,
}

impl TableSpec {
    pub fn identity_column(&self) -> &'static str {
        self.columns[0].name
    }

    /// Columns written by `save`, in bind order.
    pub fn data_columns(&self) -> &'static [Column] {
        &self.columns[1..]
    }

    pub fn create_table_sql(&self, dialect: Dialect) -> String {
        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let ty = match col.ty {
                    ColumnType::Identity => dialect.identity_column().to_string(),
                    ColumnType::Integer => "INTEGER NOT NULL".to_string(),
                    ColumnType::SmallInt => "SMALLINT NOT NULL".to_string(),
                    ColumnType::TinyInt => format!("{} NOT NULL", dialect.tiny_int()),
                    ColumnType::Varchar(len) => format!("VARCHAR({len}) NOT NULL"),
                };
                format!("{} {ty}", dialect.quote(col.name))
            })
            .collect();

        if let Some(fk) = self.foreign_key {
            let mut constraint = format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                dialect.quote(fk.column),
                dialect.quote(fk.references),
                dialect.quote(fk.referenced_column),
            );
            if fk.on_delete_cascade {
                constraint.push_str(" ON DELETE CASCADE");
            }
            defs.push(constraint);
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            dialect.quote(self.name),
            defs.join(",\n    ")
        )
    }

    pub fn drop_table_sql(&self, dialect: Dialect) -> String {
        format!("DROP TABLE {}", dialect.quote(self.name))
    }
}

pub const MOVIES: TableSpec = TableSpec {
    name: "movies",
    columns: &[
        Column {
            name: "id",
            ty: ColumnType::Identity,
        },
        Column {
            name: "title",
            ty: ColumnType::Varchar(300),
        },
        Column {
            name: "duration",
            ty: ColumnType::SmallInt,
        },
        Column {
            name: "year",
            ty: ColumnType::SmallInt,
        },
    ],
    sort_column: "year",
    scope_column: None,
    foreign_key: None,
};

pub const SCHEDULES: TableSpec = TableSpec {
    name: "schedules",
    columns: &[
        Column {
            name: "id",
            ty: ColumnType::Identity,
        },
        Column {
            name: "movie_id",
            ty: ColumnType::Integer,
        },
        Column {
            name: "date_time",
            ty: ColumnType::Varchar(50),
        },
        Column {
            name: "auditorium",
            ty: ColumnType::TinyInt,
        },
    ],
    sort_column: "date_time",
    scope_column: Some("movie_id"),
    foreign_key: Some(ForeignKey {
        column: "movie_id",
        references: MOVIES.name,
        referenced_column: "id",
        on_delete_cascade: true,
    }),
};
