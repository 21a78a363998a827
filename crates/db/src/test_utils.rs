//! Disposable `PostgreSQL` databases for integration tests.
//!
//! The server is described by `TEST_DB_*` environment variables. Each
//! [`TestDatabase`] lives in its own freshly created database with the full
//! schema applied, so tests can run in parallel.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

const MAINTENANCE_DB: &str = "postgres";

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Connection settings for the test server.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Database the settings point at.
    pub database: String,
}

impl TestDbConfig {
    /// Read `TEST_DB_HOST`, `TEST_DB_PORT`, `TEST_DB_USER`,
    /// `TEST_DB_PASSWORD` and `TEST_DB_NAME`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: env_or("TEST_DB_HOST", "localhost"),
            port: env_or("TEST_DB_PORT", "5433").parse().unwrap_or(5433),
            username: env_or("TEST_DB_USER", "forum_test"),
            password: env_or("TEST_DB_PASSWORD", "forum_test"),
            database: env_or("TEST_DB_NAME", "forum_test"),
        }
    }

    /// URL of the configured database.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.url_for(&self.database)
    }

    /// URL of the server's maintenance database, used to create and drop
    /// test databases.
    #[must_use]
    pub fn maintenance_url(&self) -> String {
        self.url_for(MAINTENANCE_DB)
    }

    fn url_for(&self, name: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{name}",
            self.username, self.password, self.host, self.port
        )
    }

    /// Same server, a fresh database name.
    #[must_use]
    pub fn with_unique_name(mut self) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        self.database = format!("forum_test_{}", &suffix[..8]);
        self
    }

    async fn run_admin(&self, sql: String) -> Result<(), DbErr> {
        let admin = Database::connect(&self.maintenance_url()).await?;
        admin
            .execute(Statement::from_string(DatabaseBackend::Postgres, sql))
            .await?;
        admin.close().await
    }
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// A migrated, uniquely named test database.
pub struct TestDatabase {
    conn: DatabaseConnection,
    config: TestDbConfig,
}

impl TestDatabase {
    /// Create a new database on the configured server and migrate it.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let config = TestDbConfig::from_env().with_unique_name();
        config
            .run_admin(format!("CREATE DATABASE \"{}\"", config.database))
            .await?;

        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;
        info!(database = %config.database, "Test database ready");

        Ok(Self { conn, config })
    }

    /// Connection to the test database.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Close the connection and drop the database.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        let Self { conn, config } = self;
        conn.close().await?;
        config
            .run_admin(format!(
                "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                config.database
            ))
            .await?;

        info!(database = %config.database, "Test database dropped");
        Ok(())
    }
}
