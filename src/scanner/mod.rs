//! Scanner module - the concurrent TCP connect scanning engine.
//!
//! - [`PortProbe`] performs one connection attempt ([`TcpConnectProbe`] in
//!   production).
//! - [`ScanEngine`] drives a probe over one host and one port range in
//!   bounded batches and reports progress.
//! - [`Orchestrator`] expands a target and runs the engine host by host,
//!   collecting everything into a shared [`ScanRun`].

mod engine;
mod orchestrator;
mod progress;
mod run;
mod tcp;
mod traits;

pub use engine::ScanEngine;
pub use orchestrator::{Orchestrator, ScanHandle};
pub use progress::{NoProgress, ProgressEvent, ProgressObserver};
pub use run::{ProgressSnapshot, ScanReport, ScanRun};
pub use tcp::TcpConnectProbe;
pub use traits::PortProbe;

use crate::banner::{BANNER_TIMEOUT, NOT_DISCLOSED};
use crate::error::{ScanError, ScanResult};
use crate::services;
use crate::types::Port;
use serde::Serialize;
use std::time::Duration;

/// An open port found on a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortResult {
    /// The port that accepted the connection.
    pub port: Port,
    /// Label from the well-known services table.
    pub service: String,
    /// First bytes sent by the service, or `"Not disclosed"`.
    pub banner: String,
}

impl PortResult {
    /// Create a new port result.
    pub fn new(port: Port, service: impl Into<String>, banner: impl Into<String>) -> Self {
        Self {
            port,
            service: service.into(),
            banner: banner.into(),
        }
    }

    /// An open port labelled from the services table, with no banner yet.
    pub fn open(port: Port) -> Self {
        Self::new(port, services::classify(port.as_u16()), NOT_DISCLOSED)
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Whether the service sent a usable banner.
    pub fn has_banner(&self) -> bool {
        self.banner != NOT_DISCLOSED
    }
}

/// Runtime scan parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Maximum connection attempts in flight for one host.
    pub concurrency: usize,
    /// Hard limit on each connect.
    pub connect_timeout: Duration,
    /// Limit on the banner read after a successful connect.
    pub banner_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: ScanEngine::DEFAULT_CONCURRENCY,
            connect_timeout: Duration::from_secs(1),
            banner_timeout: BANNER_TIMEOUT,
        }
    }
}

impl ScanConfig {
    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the banner read timeout.
    pub fn with_banner_timeout(mut self, timeout: Duration) -> Self {
        self.banner_timeout = timeout;
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> ScanResult<()> {
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency limit must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_result_is_classified() {
        let result = PortResult::open(Port::new(22).unwrap());
        assert_eq!(result.service, "SSH");
        assert_eq!(result.banner, "Not disclosed");
        assert!(!result.has_banner());

        let result = result.with_banner("SSH-2.0-OpenSSH_9.6");
        assert!(result.has_banner());
    }

    #[test]
    fn test_port_result_serializes_flat() {
        let result = PortResult::new(Port::new(80).unwrap(), "HTTP", "nginx");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"port": 80, "service": "HTTP", "banner": "nginx"})
        );
    }

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.concurrency, 200);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.banner_timeout, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ScanConfig::default().with_concurrency(0);
        assert!(matches!(config.validate(), Err(ScanError::InvalidConfig(_))));

        let config = ScanConfig::default().with_connect_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(ScanError::InvalidConfig(_))));
    }
}
