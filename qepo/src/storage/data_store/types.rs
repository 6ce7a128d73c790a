use sqlx::{PgPool, SqlitePool};

/// A connection pool for one of the supported database backends
#[derive(Clone, Debug)]
pub(crate) enum PooledDataStore {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// Access to the pool behind the process-wide data store. Queries pick the
/// branch matching the configured backend.
pub trait DataStore: Send + Sync {
    fn backend(&self) -> &'static str;
    fn as_sqlite(&self) -> Option<&SqlitePool>;
    fn as_postgres(&self) -> Option<&PgPool>;
}

impl DataStore for PooledDataStore {
    fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
        }
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            Self::Postgres(_) => None,
        }
    }

    fn as_postgres(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(pool) => Some(pool),
            Self::Sqlite(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_sqlite_store_exposes_only_sqlite_pool() {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let store = PooledDataStore::Sqlite(SqlitePool::connect_lazy_with(opts));

        assert_eq!(store.backend(), "sqlite");
        assert!(store.as_sqlite().is_some());
        assert!(store.as_postgres().is_none());
    }
}
