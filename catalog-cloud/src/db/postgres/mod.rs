//! PostgreSQL adapter
//!
//! One `PgStore` implements every port. Replace operations run inside a single
//! transaction; dropping the transaction (error or cancellation) rolls back.

mod assoc;
mod catalog;
mod product;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, then apply embedded migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "PostgreSQL pool established");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::new(pool))
    }
}
