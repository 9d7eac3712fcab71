//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the WebSocket listener to
    pub bind_addr: SocketAddr,

    /// Address for the plain-HTTP health endpoint (None = disabled)
    pub health_addr: Option<SocketAddr>,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Maximum inbound WebSocket message size in bytes
    pub max_payload_size: usize,

    /// Interval between server-initiated pings
    pub heartbeat_interval: Duration,

    /// Disconnect if no inbound traffic (including pongs) within this time
    pub heartbeat_timeout: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().unwrap(),
            health_addr: None,
            max_connections: 0, // Unlimited
            max_payload_size: 8 * 1024 * 1024, // 8MB, base64 video frames are large
            heartbeat_interval: Duration::from_secs(25),
            heartbeat_timeout: Duration::from_secs(60),
            tcp_nodelay: true, // Important for low latency
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Enable the health endpoint on the given address
    pub fn health(mut self, addr: SocketAddr) -> Self {
        self.health_addr = Some(addr);
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the maximum inbound payload size
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Set heartbeat interval and timeout together
    ///
    /// The timeout is floored at the interval: a timeout shorter than the
    /// ping cadence would disconnect every healthy client.
    pub fn heartbeat(mut self, interval: Duration, timeout: Duration) -> Self {
        self.heartbeat_interval = interval;
        self.heartbeat_timeout = timeout.max(interval);
        self
    }
}
