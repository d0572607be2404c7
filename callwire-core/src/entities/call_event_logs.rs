//! The `call_event_logs` append-only table.
//!
//! Rows are only ever inserted. The pipeline never updates or deletes
//! them; replaying unpublished rows is an external concern.

use crate::call_event::CallEventType;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::Serialize;

/// A persisted call event: the caller-supplied payload plus the
/// store-assigned surrogate id and append timestamp.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct CallEventLog {
    pub id: i64,
    pub call_id: String,
    pub event_type: CallEventType,
    /// Canonical JSON encoding of the full event, stored verbatim.
    pub payload: serde_json::Value,
    /// Unix seconds, set by the store at write time.
    pub created_at: i64,
}

/// Append one row to `call_event_logs`.
#[derive(Debug, Clone)]
pub struct InsertCallEventLog {
    pub call_id: String,
    pub event_type: CallEventType,
    pub payload: serde_json::Value,
    pub created_at: i64,
}

impl Processor<InsertCallEventLog> for DatabaseProcessor {
    type Output = CallEventLog;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertCallEventLog")]
    async fn process(&self, insert: InsertCallEventLog) -> Result<CallEventLog, sqlx::Error> {
        sqlx::query_as::<_, CallEventLog>(
            r#"
            INSERT INTO call_event_logs (call_id, event_type, payload, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, call_id, event_type, payload, created_at
            "#,
        )
        .bind(&insert.call_id)
        .bind(insert.event_type)
        .bind(&insert.payload)
        .bind(insert.created_at)
        .fetch_one(&self.pool)
        .await
    }
}

/// Fetch the most recent row for a `call_id`, if any.
///
/// Ordered by the persisted `created_at` column with `id` as a
/// tie-break for same-second appends.
#[derive(Debug, Clone)]
pub struct GetLatestCallEventLogByCallId {
    pub call_id: String,
}

impl Processor<GetLatestCallEventLogByCallId> for DatabaseProcessor {
    type Output = Option<CallEventLog>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLatestCallEventLogByCallId")]
    async fn process(
        &self,
        query: GetLatestCallEventLogByCallId,
    ) -> Result<Option<CallEventLog>, sqlx::Error> {
        sqlx::query_as::<_, CallEventLog>(
            r#"
            SELECT id, call_id, event_type, payload, created_at
            FROM call_event_logs
            WHERE call_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(&query.call_id)
        .fetch_optional(&self.pool)
        .await
    }
}
