//! TOML file configuration structures.
//!
//! These structs directly map to the `callwire-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub auth: AuthSection,
    #[serde(default)]
    pub broker: BrokerSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Authentication section: the bearer token the signaling server must
/// present on every API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
    pub api_token: String,
}

/// Broker connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSection {
    #[serde(default = "default_broker_host")]
    pub host: String,
    #[serde(default = "default_broker_port")]
    pub port: u16,
    #[serde(default = "default_broker_user")]
    pub user: String,
    #[serde(default = "default_broker_password")]
    pub password: String,
    #[serde(default = "default_broker_vhost")]
    pub vhost: String,
    /// The durable queue call events are published to.
    #[serde(default = "default_queue_name")]
    pub queue: String,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            host: default_broker_host(),
            port: default_broker_port(),
            user: default_broker_user(),
            password: default_broker_password(),
            vhost: default_broker_vhost(),
            queue: default_queue_name(),
        }
    }
}

fn default_broker_host() -> String {
    "localhost".to_owned()
}

fn default_broker_port() -> u16 {
    5672
}

fn default_broker_user() -> String {
    "guest".to_owned()
}

fn default_broker_password() -> String {
    "guest".to_owned()
}

fn default_broker_vhost() -> String {
    "/".to_owned()
}

fn default_queue_name() -> String {
    "call-events".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[auth]
api_token = "test-token"

[broker]
host = "rabbitmq.internal"
port = 5673
user = "callwire"
password = "secret"
vhost = "/calls"
queue = "call-events-prod"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.auth.api_token, "test-token");
        assert_eq!(config.broker.host, "rabbitmq.internal");
        assert_eq!(config.broker.queue, "call-events-prod");
    }

    #[test]
    fn test_broker_section_defaults() {
        let toml_str = r#"
[auth]
api_token = "test-token"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.broker.host, "localhost");
        assert_eq!(config.broker.port, 5672);
        assert_eq!(config.broker.user, "guest");
        assert_eq!(config.broker.vhost, "/");
        assert_eq!(config.broker.queue, "call-events");
    }
}
