//! Application state shared across all request handlers.

use crate::config::runtime::RuntimeConfig;
use callwire_core::broker::RabbitMqPublisher;
use callwire_core::ingest::CallEventService;
use callwire_core::store::PostgresCallEventRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// The single broker publisher; its internal mutex serializes
    /// connect-and-publish across concurrent requests.
    pub publisher: Arc<RabbitMqPublisher>,
    /// Runtime configuration.
    pub config: Arc<RwLock<RuntimeConfig>>,
}

impl AppState {
    pub fn new(db: PgPool, publisher: Arc<RabbitMqPublisher>, config: RuntimeConfig) -> Self {
        Self {
            db,
            publisher,
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Get a read lock on the configuration.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, RuntimeConfig> {
        self.config.read().await
    }

    /// Build a per-request ingestion service over the shared pool and
    /// publisher.
    pub async fn ingest_service(
        &self,
    ) -> CallEventService<PostgresCallEventRepository, Arc<RabbitMqPublisher>> {
        let queue = self.config.read().await.broker.queue.clone();
        CallEventService::new(
            PostgresCallEventRepository::new(self.db.clone()),
            self.publisher.clone(),
            queue,
        )
    }
}
