//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::ScanReport;
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print a report in human-readable plain text format.
pub fn print_plain(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_plain(report, &mut stdout.lock())
}

fn write_plain<W: Write>(report: &ScanReport, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("PortXcan").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    writeln!(out, "  {} {}", style("Ports:").bold(), report.ports)?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(report.id.short()).dim()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} of {} probes across {} host(s) in {:.2}s",
        style("Statistics:").bold(),
        report.ports_scanned,
        report.total,
        report.hosts.len(),
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "              {} open",
        style(report.open_ports()).green().bold()
    )?;
    if report.cancelled {
        writeln!(out, "              {}", style("cancelled before completion").yellow())?;
    }
    writeln!(out)?;

    if report.open_ports() == 0 {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<15}  {:>6}  {:<15}  {}",
            style("HOST").bold(),
            style("PORT").bold(),
            style("SERVICE").bold(),
            style("BANNER").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for (host, results) in &report.results {
            for result in results {
                writeln!(
                    out,
                    "  {:<15}  {:>6}  {:<15}  {}",
                    host.to_string(),
                    style(result.port).green().bold(),
                    result.service,
                    style(truncate_string(&result.banner, 35)).dim()
                )?;
            }
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, hosts: usize, ports: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("PortXcan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {} ({} host{})",
        style("•").dim(),
        style(target).white().bold(),
        hosts,
        if hosts == 1 { "" } else { "s" }
    );
    println!(
        "{} Scanning {} ports per host...",
        style("•").dim(),
        style(ports).white().bold()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate to at most `max_len` characters, adding an ellipsis if cut.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
