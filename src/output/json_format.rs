//! JSON output formatting.

use super::rows;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Print the full report as pretty JSON.
pub fn print_json(report: &ScanReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

/// Write the export form: a flat array of `{host, port, service, banner}`.
pub fn write_json<W: Write>(report: &ScanReport, out: W) -> io::Result<()> {
    serde_json::to_writer_pretty(out, &rows(report))?;
    Ok(())
}
