//! CSV output formatting.

use super::rows;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Print open ports as CSV on stdout.
pub fn print_csv(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_csv(report, stdout.lock())
}

/// Write one `host,port,service,banner` row per open port.
pub fn write_csv<W: Write>(report: &ScanReport, out: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["host", "port", "service", "banner"])?;
    for row in rows(report) {
        wtr.write_record([
            row.host.to_string(),
            row.port.to_string(),
            row.service,
            row.banner,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
