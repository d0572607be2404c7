//! Durable event publication over the managed broker connection.

use super::{BrokerConfig, BrokerError, ConnectionManager, EventPublisher};
use crate::call_event::CallEvent;
use async_trait::async_trait;
use lapin::BasicProperties;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use tokio::sync::Mutex;
use tracing::{error, info};

/// AMQP delivery mode for messages that survive a broker restart.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// Publishes call events to RabbitMQ as persistent messages on a
/// durable queue, via the default direct exchange.
///
/// The mutex serializes the whole connect-declare-publish region so
/// concurrent callers never race to open duplicate connections or
/// publish on a half-closed channel.
pub struct RabbitMqPublisher {
    manager: Mutex<ConnectionManager>,
}

impl RabbitMqPublisher {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            manager: Mutex::new(ConnectionManager::new(config)),
        }
    }
}

#[async_trait]
impl EventPublisher for RabbitMqPublisher {
    async fn publish(&self, queue: &str, event: &CallEvent) -> Result<(), BrokerError> {
        // Encode before touching the connection: a serialization fault
        // is a contract violation, not a transport error.
        let body = serde_json::to_vec(event)?;

        let mut manager = self.manager.lock().await;
        let channel = manager.ensure_connected().await?;

        // Idempotent: durable, non-exclusive, non-auto-deleted, so
        // repeated declarations across restarts are no-ops and messages
        // are kept even with no consumer attached.
        let declare = channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await;
        if let Err(e) = declare {
            manager.reset();
            error!(queue, error = %e, "queue declaration failed");
            return Err(BrokerError::PublishFailed {
                queue: queue.to_owned(),
                reason: e.to_string(),
            });
        }

        // Default exchange, queue name as routing key.
        let published = match channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_delivery_mode(DELIVERY_MODE_PERSISTENT),
            )
            .await
        {
            Ok(confirm) => confirm.await.map(|_| ()),
            Err(e) => Err(e),
        };

        match published {
            Ok(()) => {
                info!(queue, call_id = %event.call_id, "message published to broker");
                Ok(())
            }
            Err(e) => {
                // Leave the manager disconnected so the next call
                // re-establishes the connection instead of reusing a
                // faulted channel.
                manager.reset();
                error!(queue, call_id = %event.call_id, error = %e, "broker publish failed");
                Err(BrokerError::PublishFailed {
                    queue: queue.to_owned(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn is_connected(&self) -> bool {
        self.manager.lock().await.is_connected()
    }

    async fn close(&self) {
        self.manager.lock().await.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[allow(clippy::unwrap_used)]
    fn sample_event() -> CallEvent {
        serde_json::from_value(json!({
            "call_id": "CALL-1",
            "caller_number": "+994501234567",
            "callee_number": "+994551234567",
            "event_type": "call_started",
            "timestamp": "2025-12-04T10:30:00"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn publish_against_unreachable_broker_fails_with_connection_error() {
        let publisher = RabbitMqPublisher::new(BrokerConfig {
            host: "127.0.0.1".to_owned(),
            port: 1,
            ..BrokerConfig::default()
        });

        let result = publisher.publish("call-events", &sample_event()).await;
        assert!(matches!(result, Err(BrokerError::ConnectionFailed { .. })));
        assert!(!publisher.is_connected().await);
    }

    #[tokio::test]
    async fn close_before_any_publish_is_safe() {
        let publisher = RabbitMqPublisher::new(BrokerConfig::default());
        publisher.close().await;
        publisher.close().await;
        assert!(!publisher.is_connected().await);
    }
}
