//! Application state shared by every handler

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::db::{MemoryStore, PgStore};
use crate::service::{CatalogService, OpContext};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub service: CatalogService,
    /// JWT secret for write routes
    pub jwt_secret: Arc<str>,
    pub request_timeout: Duration,
    /// Cancelled on shutdown; every request context derives from it
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: CatalogService, jwt_secret: &str, request_timeout: Duration) -> Self {
        Self {
            service,
            jwt_secret: Arc::from(jwt_secret),
            request_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Pick the store from config: PostgreSQL when `DATABASE_URL` is set
    pub async fn from_config(config: &Config) -> Result<Self, BoxError> {
        let service = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url, config.db_max_connections).await?;
                CatalogService::from_store(store)
            }
            None if config.is_development() => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
                CatalogService::from_store(MemoryStore::new())
            }
            None => {
                return Err(format!(
                    "DATABASE_URL is required outside development ({})",
                    config.environment
                )
                .into());
            }
        };
        Ok(Self::new(service, &config.jwt_secret, config.request_timeout))
    }

    /// Context for one request
    pub fn op_context(&self) -> OpContext {
        OpContext::with_timeout(self.request_timeout).with_token(self.shutdown.child_token())
    }
}
