use super::dialect::Dialect;
use sqlx::AnyPool;

/// Query-execution handle: a live pool plus the SQL dialect of the engine behind it.
///
/// Cloning is cheap (the pool is reference counted) and the pool is safe to share
/// across concurrent requests; isolation is left to the database engine.
#[derive(Debug, Clone)]
pub struct Db {
    pool: AnyPool,
    dialect: Dialect,
}

impl Db {
    pub(crate) fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self { pool, dialect }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}
