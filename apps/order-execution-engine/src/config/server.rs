//! HTTP server configuration.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port for the REST and WebSocket endpoints.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl ServerConfig {
    /// Socket address to listen on, or `None` if the bind address is not an IP.
    #[must_use]
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.bind_address
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.http_port))
    }
}

pub(crate) const fn default_http_port() -> u16 {
    3000
}

pub(crate) fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
