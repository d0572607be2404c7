//! Postgres-backed call event repository.

use crate::call_event::CallEvent;
use crate::entities::call_event_logs::{
    CallEventLog, GetLatestCallEventLogByCallId, InsertCallEventLog,
};
use crate::framework::DatabaseProcessor;
use crate::ingest::{CallEventRepository, StorageError};
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;

/// Appends call events to the `call_event_logs` table and serves the
/// audit lookup. The only component that talks to the database.
pub struct PostgresCallEventRepository {
    processor: DatabaseProcessor,
}

impl PostgresCallEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl CallEventRepository for PostgresCallEventRepository {
    async fn append(&self, event: &CallEvent) -> Result<CallEventLog, StorageError> {
        let payload = event.to_payload()?;
        let log = self
            .processor
            .process(InsertCallEventLog {
                call_id: event.call_id.clone(),
                event_type: event.event_type,
                payload,
                created_at: time::OffsetDateTime::now_utc().unix_timestamp(),
            })
            .await?;
        Ok(log)
    }

    async fn find_latest_by_call_id(
        &self,
        call_id: &str,
    ) -> Result<Option<CallEventLog>, StorageError> {
        let log = self
            .processor
            .process(GetLatestCallEventLogByCallId {
                call_id: call_id.to_owned(),
            })
            .await?;
        Ok(log)
    }
}
