//! Output formatting module.
//!
//! Renders scan reports as a plain table, JSON, or CSV on stdout, and writes
//! the flat per-port export files.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv};
pub use json_format::{print_json, write_json};
pub use plain::{
    print_error, print_info, print_plain, print_scan_header, print_success, print_warning,
};

use crate::cli::{ExportFormat, OutputFormat};
use crate::scanner::ScanReport;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

/// One open port, flattened for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub host: IpAddr,
    pub port: u16,
    pub service: String,
    pub banner: String,
}

/// Flatten a report into rows ordered by host, then port.
pub fn rows(report: &ScanReport) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = report
        .results
        .iter()
        .flat_map(|(host, results)| {
            results.iter().map(move |r| ExportRow {
                host: *host,
                port: r.port.as_u16(),
                service: r.service.clone(),
                banner: r.banner.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.host.cmp(&b.host).then(a.port.cmp(&b.port)));
    rows
}

/// Format and print a report according to the specified format.
pub fn print_results(report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain(report),
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv => print_csv(report),
    }
}

/// `portxcan_<YYYYmmdd_HHMMSS>.<ext>`, stamped with the report's completion time.
pub fn export_file_name(report: &ScanReport, format: ExportFormat) -> String {
    format!(
        "portxcan_{}.{}",
        report.completed_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write the export file into `dir`, creating it if needed.
pub fn write_export(report: &ScanReport, format: ExportFormat, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(report, format));
    let mut out = BufWriter::new(File::create(&path)?);

    match format {
        ExportFormat::Json => write_json(report, &mut out)?,
        ExportFormat::Csv => write_csv(report, &mut out)?,
    }
    out.flush()?;

    info!(path = %path.display(), rows = report.open_ports(), "export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{PortResult, ScanRun};
    use crate::types::{Port, PortRange};
    use std::net::Ipv4Addr;

    pub(super) async fn sample_report() -> ScanReport {
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        let run = ScanRun::new("10.0.0.0/30", vec![a, b], PortRange::default());
        run.store_host(
            b,
            vec![PortResult::open(Port::new(22).unwrap()).with_banner("SSH-2.0-OpenSSH_9.6")],
        )
        .await;
        run.store_host(
            a,
            vec![
                PortResult::open(Port::new(80).unwrap()),
                PortResult::open(Port::new(443).unwrap()),
            ],
        )
        .await;
        run.finish();
        run.report().await
    }

    #[tokio::test]
    async fn test_rows_ordered_by_host_then_port() {
        let report = sample_report().await;
        let rows = rows(&report);

        let keys: Vec<(String, u16)> = rows.iter().map(|r| (r.host.to_string(), r.port)).collect();
        assert_eq!(
            keys,
            vec![
                ("10.0.0.1".to_string(), 80),
                ("10.0.0.1".to_string(), 443),
                ("10.0.0.2".to_string(), 22),
            ]
        );
        assert_eq!(rows[2].banner, "SSH-2.0-OpenSSH_9.6");
        assert_eq!(rows[0].banner, "Not disclosed");
    }

    #[tokio::test]
    async fn test_export_file_name() {
        let report = sample_report().await;
        let name = export_file_name(&report, ExportFormat::Csv);
        assert!(name.starts_with("portxcan_"));
        assert!(name.ends_with(".csv"));
        // portxcan_ + YYYYmmdd_HHMMSS + .csv
        assert_eq!(name.len(), "portxcan_".len() + 15 + ".csv".len());
    }

    #[tokio::test]
    async fn test_write_export_creates_dir() {
        let report = sample_report().await;
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports");

        let path = write_export(&report, ExportFormat::Json, &nested).unwrap();

        assert!(path.starts_with(&nested));
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(3));
    }
}
