//! Connectivity detection
//!
//! The session consults this once, at stop time, to decide whether to call
//! the roads service at all. Offline means the raw track is kept as-is.

use crate::config::ConnectivityConfig;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Boolean reachability signal evaluated at the moment of a stop event
#[async_trait::async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Checks reachability with one bounded TCP connect to a well-known endpoint
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: String, timeout: Duration) -> Self {
        Self { addr, timeout }
    }

    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self::new(
            config.probe_addr.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }
}

#[async_trait::async_trait]
impl Connectivity for TcpProbe {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("connectivity probe failed: {e}");
                false
            }
            Err(_) => {
                debug!("connectivity probe timed out");
                false
            }
        }
    }
}
