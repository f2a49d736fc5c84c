//! CLI subcommand definitions and handlers.
//!
//! - `portxcan scan <target>` - Scan a host, hostname, or CIDR block
//! - `portxcan service <port>...` - Show the service label for ports

mod scan;
mod service;

pub use scan::ScanCommand;
pub use service::ServiceCommand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PortXcan - a concurrent TCP connect port scanner.
///
/// Scans single hosts, hostnames, and CIDR ranges, labels open ports with
/// well-known service names, and grabs whatever banner a service sends.
#[derive(Parser, Debug)]
#[command(name = "portxcan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast TCP connect port scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a custom settings file
    #[arg(long, global = true, value_name = "PATH", env = "PORTXCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target for open TCP ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Look up the service label for one or more ports
    Service(ServiceCommand),
}

/// Output format for results on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Plain,
    /// The full report as JSON
    Json,
    /// One CSV row per open port
    Csv,
}

impl OutputFormat {
    /// Whether stdout is meant for another program.
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Format of an export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}
