//! Ingestion orchestration: persist, then publish.
//!
//! [`CallEventService`] is the only component with business sequencing.
//! Within one call the store append strictly precedes the publish
//! attempt, so every event that reaches the broker also has a durable
//! audit record. A publish failure propagates to the caller and the
//! stored row remains: the append-only log is authoritative even when
//! the downstream notification fails, and replaying unpublished rows is
//! an external concern.

use crate::broker::{BrokerError, EventPublisher};
use crate::call_event::CallEvent;
use crate::entities::call_event_logs::CallEventLog;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// The durable log append failed. Fatal for the current call and never
/// silently swallowed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The canonical payload could not be encoded for storage. Should
    /// not occur for a validated event.
    #[error("payload encoding error: {0}")]
    PayloadEncoding(#[from] serde_json::Error),
}

/// Append-only storage for call events.
///
/// Constructor-injected into the orchestrator; tests substitute a
/// recording implementation.
#[async_trait]
pub trait CallEventRepository: Send + Sync {
    /// Append one row. Duplicate `call_id`s are independent rows; the
    /// store never deduplicates.
    async fn append(&self, event: &CallEvent) -> Result<CallEventLog, StorageError>;

    /// Latest stored row for a `call_id`. Audit/debugging path, not
    /// part of the ingestion hot path.
    async fn find_latest_by_call_id(
        &self,
        call_id: &str,
    ) -> Result<Option<CallEventLog>, StorageError>;
}

#[async_trait]
impl<R> CallEventRepository for std::sync::Arc<R>
where
    R: CallEventRepository + Send + Sync,
{
    async fn append(&self, event: &CallEvent) -> Result<CallEventLog, StorageError> {
        (**self).append(event).await
    }

    async fn find_latest_by_call_id(
        &self,
        call_id: &str,
    ) -> Result<Option<CallEventLog>, StorageError> {
        (**self).find_latest_by_call_id(call_id).await
    }
}

/// Failure of a single `handle` call.
///
/// The two kinds stay distinct so operators can tell "recorded but not
/// queued" apart from "not recorded at all".
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),
}

/// Receives a validated event, writes it to the store, then publishes
/// it. Stateless across calls; the only shared state is the broker
/// connection handle inside the publisher.
pub struct CallEventService<R, P> {
    repository: R,
    publisher: P,
    queue_name: String,
}

impl<R, P> CallEventService<R, P>
where
    R: CallEventRepository,
    P: EventPublisher,
{
    pub fn new(repository: R, publisher: P, queue_name: impl Into<String>) -> Self {
        Self {
            repository,
            publisher,
            queue_name: queue_name.into(),
        }
    }

    /// Persist the event, then publish its canonical payload.
    ///
    /// Exactly one store append and at most one publish attempt per
    /// call. The append must succeed before publish is attempted; a
    /// failed publish leaves the stored row in place (no rollback).
    pub async fn handle(&self, event: &CallEvent) -> Result<CallEventLog, IngestError> {
        let log = self.repository.append(event).await?;
        info!(
            id = log.id,
            call_id = %event.call_id,
            event_type = %event.event_type,
            "call event logged to database"
        );

        self.publisher.publish(&self.queue_name, event).await?;
        info!(
            call_id = %event.call_id,
            queue = %self.queue_name,
            "call event queued"
        );

        Ok(log)
    }

    /// Latest stored row for a `call_id`, for auditing collaborators.
    pub async fn latest_for_call(
        &self,
        call_id: &str,
    ) -> Result<Option<CallEventLog>, IngestError> {
        Ok(self.repository.find_latest_by_call_id(call_id).await?)
    }
}
