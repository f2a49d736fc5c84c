//! Core type definitions using newtype patterns for type safety.
//!
//! Ports, ranges and targets are validated on construction, so the scan
//! engine never sees an out-of-range port or an inverted range.

mod port;
mod scan_id;
pub mod target;

pub use port::{Port, PortError, PortRange};
pub use scan_id::{ScanId, ScanIdError};
pub use target::{expand, TargetError, TargetSpec};
