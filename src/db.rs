use crate::config::DatabaseConfig;
use anyhow::{anyhow, Context, Result};
use diesel::{Connection, PgConnection};
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

// deadpool as re-exported by diesel-async
pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection = Object<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database manager for the Postgres backend
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database manager with connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.url);

        // Configure pool with connection parameters
        let pool = DbPool::builder(manager)
            .max_size(config.max_connections)
            .build()
            .context("Failed to build database pool")?;

        let db = Self { pool };

        // Test connection and run migrations
        db.initialize(config).await?;

        Ok(db)
    }

    /// Initialize the database by testing connection and running migrations
    async fn initialize(&self, config: &DatabaseConfig) -> Result<()> {
        let _conn = self
            .pool
            .get()
            .await
            .map_err(|e| anyhow!("Failed to get database connection: {}", e))?;
        info!("Successfully connected to the database");

        // Migrations use a blocking connection; keep them off the runtime threads
        let url = config.url.clone();
        tokio::task::spawn_blocking(move || run_migrations(&url))
            .await
            .context("Migration task panicked")??;

        Ok(())
    }

    /// Get the database connection pool reference
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn into_pool(self) -> DbPool {
        self.pool
    }
}

/// Run database migrations
fn run_migrations(url: &str) -> Result<()> {
    let mut conn = PgConnection::establish(url).context("Failed to connect for migrations")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to apply migrations: {}", e))?;
    info!("Database migrations applied successfully");

    Ok(())
}

/// Initialize database connection pool and run migrations
pub async fn init_database(config: &DatabaseConfig) -> Result<Database> {
    Database::new(config).await
}
