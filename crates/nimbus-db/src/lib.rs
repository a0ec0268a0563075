//! # nimbus-db
//!
//! PostgreSQL database layer for the Nimbus sync backend.
//!
//! This crate provides:
//! - Connection pool management with a fixed-interval startup retry loop
//! - Repository implementations for user accounts and synced notes
//!
//! ## Example
//!
//! ```rust,ignore
//! use nimbus_db::Database;
//! use nimbus_core::NoteRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/nimbus").await?;
//!     let notes = db.notes.list("google-subject-id").await?;
//!     println!("{} notes", notes.len());
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;
pub mod users;

// Re-export core types
pub use nimbus_core::*;

pub use notes::PgNoteRepository;
pub use pool::{connect_with_retry, create_pool, create_pool_with_config, PoolConfig};
pub use users::PgUserRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for owner-scoped CRUD.
    pub notes: PgNoteRepository,
    /// User account and plan repository.
    pub users: PgUserRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with the startup retry loop, for process boot.
    pub async fn connect_retrying(url: &str) -> Result<Self> {
        let pool = connect_with_retry(url, PoolConfig::default()).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
