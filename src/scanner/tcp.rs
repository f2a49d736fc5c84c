//! TCP connect probe.
//!
//! Performs standard TCP connect attempts using the operating system's
//! socket API, so no elevated privileges are needed. An accepted connection
//! is open; everything else is reported as nothing.

use super::traits::PortProbe;
use super::PortResult;
use crate::banner::read_banner;
use crate::types::Port;
use async_trait::async_trait;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Why a connect attempt produced no result. Only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectFailure {
    Refused,
    Unreachable,
    TimedOut,
    Other,
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refused => write!(f, "refused"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Other => write!(f, "failed"),
        }
    }
}

/// TCP connect probe with independent connect and banner timeouts.
#[derive(Debug, Clone)]
pub struct TcpConnectProbe {
    connect_timeout: Duration,
    banner_timeout: Duration,
}

impl TcpConnectProbe {
    /// Create a new TCP connect probe.
    pub fn new(connect_timeout: Duration, banner_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            banner_timeout,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn banner_timeout(&self) -> Duration {
        self.banner_timeout
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(&self, addr: SocketAddr) -> Result<TcpStream, ConnectFailure> {
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => {
                let failure = if e.kind() == std::io::ErrorKind::ConnectionRefused {
                    ConnectFailure::Refused
                } else if e.to_string().to_lowercase().contains("unreachable") {
                    ConnectFailure::Unreachable
                } else {
                    ConnectFailure::Other
                };
                trace!(%addr, error = %e, "connect {}", failure);
                Err(failure)
            }
            Err(_) => {
                trace!(%addr, "connect {}", ConnectFailure::TimedOut);
                Err(ConnectFailure::TimedOut)
            }
        }
    }
}

#[async_trait]
impl PortProbe for TcpConnectProbe {
    async fn probe(&self, host: IpAddr, port: Port) -> Option<PortResult> {
        let addr = SocketAddr::new(host, port.as_u16());
        let mut stream = self.attempt_connect(addr).await.ok()?;

        let banner = read_banner(&mut stream, self.banner_timeout).await;
        let _ = stream.shutdown().await;

        let result = PortResult::open(port).with_banner(banner);
        debug!(%addr, service = %result.service, banner = %result.banner, "open port");
        Some(result)
    }
}
