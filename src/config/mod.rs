//! Configuration management for portxcan.
//!
//! Loads XDG-compliant application settings and turns them into the
//! validated runtime form the scanner uses.

mod settings;

pub use settings::{AppSettings, Paths, ScanSettings};
