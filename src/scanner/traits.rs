//! Probe trait abstraction.
//!
//! The engine only knows how to schedule attempts; what an attempt does is
//! behind [`PortProbe`], so the scheduling can be exercised without sockets.

use super::PortResult;
use crate::types::Port;
use async_trait::async_trait;
use std::net::IpAddr;

/// One connection attempt against one port.
///
/// Implementations absorb every failure: `None` means closed, filtered,
/// unreachable or timed out, and the engine does not distinguish them.
///
/// # Example
///
/// ```ignore
/// use portxcan::scanner::{PortProbe, TcpConnectProbe};
///
/// let probe = TcpConnectProbe::new(Duration::from_secs(1), Duration::from_secs(1));
/// if let Some(open) = probe.probe(host, port).await {
///     println!("{} {}", open.port, open.service);
/// }
/// ```
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Attempt `host:port`, returning a result only if the port is open.
    async fn probe(&self, host: IpAddr, port: Port) -> Option<PortResult>;
}
