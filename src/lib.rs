//! # PortXcan - A Concurrent TCP Port Scanner
//!
//! PortXcan expands a target (single IP, hostname, or CIDR block) into hosts,
//! attempts a TCP connection to every port of a range on each host under a
//! fixed concurrency ceiling, and reports the open ports with a well-known
//! service label and whatever banner the service volunteered.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use portxcan::scanner::{NoProgress, Orchestrator, ScanConfig};
//! use portxcan::types::PortRange;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portxcan::ScanError> {
//!     let orchestrator = Orchestrator::from_config(&ScanConfig::default())?;
//!     let range = PortRange::from_bounds(1, 1024)?;
//!
//!     let report = orchestrator.run("192.168.1.0/30", range, &NoProgress).await?;
//!     for (host, ports) in &report.results {
//!         for result in ports {
//!             println!("{} {} {} {}", host, result.port, result.service, result.banner);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port ranges, targets, and scan ids
//! - [`scanner`] - The batched scan engine and multi-host orchestration
//! - [`services`] - Port to service label table
//! - [`banner`] - Banner reading and decoding
//! - [`storage`] - Registry of running and finished scans
//! - [`config`] - Settings file handling
//! - [`output`] - Plain, JSON, and CSV output and export files
//! - [`error`] - Error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{Orchestrator, PortResult, ScanConfig, ScanEngine, ScanReport};
pub use storage::ScanRegistry;
pub use types::{Port, PortRange, ScanId, TargetSpec};
