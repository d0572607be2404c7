//! Runtime configuration held in application state.

use callwire_core::broker::BrokerConfig;
use std::net::SocketAddr;

/// Fully validated configuration, built by the loader from the TOML
/// file plus CLI overrides.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub broker: BrokerSettings,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    api_token: String,
}

impl AuthConfig {
    pub fn new(api_token: String) -> Self {
        Self { api_token }
    }

    /// Token bytes for constant-time comparison.
    pub fn token_bytes(&self) -> &[u8] {
        self.api_token.as_bytes()
    }
}

/// Broker connection parameters plus the target queue name.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub connection: BrokerConfig,
    pub queue: String,
}
