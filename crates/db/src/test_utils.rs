//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with all migrations applied, so
//! repository and service tests run real SQL without an external server.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::debug;

use crate::migrations::Migrator;

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
}

impl TestDatabase {
    /// Open a fresh in-memory `SQLite` database and run all migrations.
    ///
    /// The pool holds a single connection so every query sees the same
    /// in-memory database.
    pub async fn sqlite() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;
        debug!("Migrated in-memory test database");

        Ok(Self { conn })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Consume the helper, returning the connection.
    #[must_use]
    pub fn into_connection(self) -> DatabaseConnection {
        self.conn
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    use super::*;

    #[tokio::test]
    async fn test_sqlite_database_has_every_table() {
        let db = TestDatabase::sqlite().await.unwrap();
        assert_eq!(db.connection().get_database_backend(), DatabaseBackend::Sqlite);

        for table in [
            "user",
            "category",
            "modification_type",
            "category_modification",
            "product",
            "order",
            "academy",
            "field",
            "group",
            "request_to_group",
            "ticket",
        ] {
            let rows = db
                .connection()
                .query_all(Statement::from_string(
                    DatabaseBackend::Sqlite,
                    format!("SELECT * FROM \"{table}\""),
                ))
                .await
                .unwrap();
            assert!(rows.is_empty(), "{table} should start empty");
        }
    }
}
