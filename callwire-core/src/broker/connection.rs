//! Broker connection lifecycle.

use super::{BrokerConfig, BrokerError};
use lapin::{Channel, Connection, ConnectionProperties};
use tracing::{debug, error, info};

pub(crate) const BROKER_NAME: &str = "RabbitMQ";

/// AMQP reply code sent on a clean close.
const REPLY_SUCCESS: u16 = 200;

struct BrokerHandle {
    connection: Connection,
    channel: Channel,
}

/// Owns at most one live connection and one channel to the broker.
///
/// Connection is lazy: nothing is opened until [`ensure_connected`]
/// is called. Callers must serialize access (the publisher holds this
/// behind a mutex) so no publish races a close or reconnect on the
/// same handle.
///
/// [`ensure_connected`]: ConnectionManager::ensure_connected
pub struct ConnectionManager {
    config: BrokerConfig,
    handle: Option<BrokerHandle>,
}

impl ConnectionManager {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    /// True only if the last-known connection and channel both report
    /// themselves live. Never reconnects as a side effect.
    pub fn is_connected(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|h| h.connection.status().connected() && h.channel.status().connected())
    }

    /// Open the connection and channel if not already live, and return
    /// a handle to the channel.
    ///
    /// On failure the manager is left disconnected; no half-open state
    /// is retained for the next call to trip over.
    pub async fn ensure_connected(&mut self) -> Result<Channel, BrokerError> {
        if !self.is_connected() {
            self.handle = None;

            let uri = self.config.amqp_uri();
            let connection = Connection::connect(&uri, ConnectionProperties::default())
                .await
                .map_err(|e| {
                    error!(
                        host = %self.config.host,
                        port = self.config.port,
                        error = %e,
                        "broker connection failed"
                    );
                    BrokerError::ConnectionFailed {
                        broker: BROKER_NAME,
                        reason: e.to_string(),
                    }
                })?;

            let channel = connection.create_channel().await.map_err(|e| {
                error!(
                    host = %self.config.host,
                    port = self.config.port,
                    error = %e,
                    "broker channel open failed"
                );
                BrokerError::ConnectionFailed {
                    broker: BROKER_NAME,
                    reason: e.to_string(),
                }
            })?;

            info!(
                host = %self.config.host,
                port = self.config.port,
                "broker connection established"
            );
            self.handle = Some(BrokerHandle {
                connection,
                channel,
            });
        }

        match &self.handle {
            Some(handle) => Ok(handle.channel.clone()),
            None => Err(BrokerError::ConnectionFailed {
                broker: BROKER_NAME,
                reason: "no channel available after connect".to_owned(),
            }),
        }
    }

    /// Drop the current handle so the next publish reconnects.
    ///
    /// Used after a transport fault mid-publish; the dropped handles
    /// close the underlying socket.
    pub fn reset(&mut self) {
        self.handle = None;
    }

    /// Close the channel, then the connection, if present.
    ///
    /// Idempotent: safe to call multiple times and from a teardown path
    /// even if never connected. Close failures are logged, not surfaced;
    /// the handle is cleared either way.
    pub async fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.channel.close(REPLY_SUCCESS, "shutting down").await {
                debug!(error = %e, "broker channel close failed");
            }
            if let Err(e) = handle.connection.close(REPLY_SUCCESS, "shutting down").await {
                debug!(error = %e, "broker connection close failed");
            }
            info!("broker connection closed");
        }
    }
}

// The reconnect-after-close success path (close, then a later
// ensure_connected opening a fresh connection) needs a live broker and
// is left to deployment verification.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        let manager = ConnectionManager::new(BrokerConfig::default());
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn close_is_idempotent_when_never_connected() {
        let mut manager = ConnectionManager::new(BrokerConfig::default());
        manager.close().await;
        manager.close().await;
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn connect_failure_leaves_manager_disconnected() {
        // Port 1 is unassigned; the connect must fail fast and retain
        // no half-open state.
        let mut manager = ConnectionManager::new(BrokerConfig {
            host: "127.0.0.1".to_owned(),
            port: 1,
            ..BrokerConfig::default()
        });

        let result = manager.ensure_connected().await;
        assert!(matches!(
            result,
            Err(BrokerError::ConnectionFailed { broker: "RabbitMQ", .. })
        ));
        assert!(!manager.is_connected());
    }
}
