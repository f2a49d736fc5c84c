//! Scan run bookkeeping.
//!
//! Keeps running and finished scans addressable by id for progress polling.

mod registry;

pub use registry::ScanRegistry;
