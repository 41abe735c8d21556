//! Network reachability probe
//!
//! Connectivity can change between user actions, so callers probe right
//! before every network-dependent decision. Results are never cached.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

/// Answers "is the internet reachable right now?"
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// Run a bounded-time connectivity check
    async fn is_reachable(&self) -> bool;
}

/// Probe that opens a TCP connection to a well-known host
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    #[must_use]
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait]
impl NetworkProbe for TcpProbe {
    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_stream)) => {
                tracing::trace!(addr = %self.addr, "network reachable");
                true
            }
            Ok(Err(e)) => {
                tracing::debug!(addr = %self.addr, error = %e, "network probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(
                    addr = %self.addr,
                    timeout_ms = self.timeout.as_millis(),
                    "network probe timed out"
                );
                false
            }
        }
    }
}
