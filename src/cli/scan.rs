//! Scan subcommand implementation.
//!
//! Handles the `portxcan scan <target>` command. The scan runs on a
//! background task registered in a [`ScanRegistry`]; this command polls its
//! progress into the progress bar and cancels it on Ctrl-C.

use crate::cli::{ExportFormat, OutputFormat};
use crate::config::{AppSettings, ScanSettings};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::scanner::{Orchestrator, ProgressEvent, ProgressObserver, ScanConfig, ScanReport};
use crate::storage::ScanRegistry;
use crate::types::PortRange;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Scan a target for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IP, hostname, or CIDR notation)
    ///
    /// Examples:
    ///   192.168.1.1        Single IP address
    ///   example.com        Hostname
    ///   192.168.1.0/24     CIDR range
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Port range to scan, "start-end" or a single port [default: 1-1024]
    #[arg(short, long, value_name = "RANGE")]
    pub ports: Option<String>,

    /// Maximum connection attempts in flight per host [default: 200]
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Connect timeout in milliseconds [default: 1000]
    #[arg(short, long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Banner read timeout in milliseconds [default: 1000]
    #[arg(long, value_name = "MS")]
    pub banner_timeout: Option<u64>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Also write the open ports to a file
    #[arg(long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Directory for export files
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let runtime = settings.to_scan_settings()?;
        let (config, ports) = self.resolve(&runtime)?;
        let chatty = !quiet && !self.output.is_machine_readable();

        let orchestrator = Arc::new(Orchestrator::from_config(&config)?);
        let registry = ScanRegistry::new(runtime.registry_ttl);

        let handle = orchestrator.spawn(&self.target, ports).await?;
        let run = Arc::clone(handle.run());
        let id = registry.insert(Arc::clone(&run)).await;

        if chatty {
            output::print_scan_header(&self.target, run.hosts().len(), ports.len());
        }
        let pb = progress_bar(run.total(), chatty);

        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        let mut interrupted = false;
        let wait = handle.wait();
        tokio::pin!(wait);

        let report = loop {
            tokio::select! {
                report = &mut wait => break report?,
                _ = ticker.tick() => {
                    if let Some(p) = registry.progress(&id).await {
                        pb.on_progress(ProgressEvent { scanned: p.scanned, total: p.total });
                    }
                }
                _ = tokio::signal::ctrl_c(), if !interrupted => {
                    interrupted = true;
                    run.cancel();
                    pb.set_message("cancelling...");
                    warn!(id = %id.short(), "interrupted, finishing current batch");
                }
            }
        };
        pb.finish_and_clear();

        if report.cancelled && !quiet {
            output::print_warning("scan cancelled, results are partial");
        }
        output::print_results(&report, self.output)?;

        if let Some(format) = self.export {
            let dir = self.export_dir.as_ref().unwrap_or(&runtime.export_dir);
            self.export(&report, format, dir, chatty)?;
        }

        Ok(())
    }

    /// Apply command-line overrides on top of the settings file.
    fn resolve(&self, runtime: &ScanSettings) -> CliResult<(ScanConfig, PortRange)> {
        let ports = match &self.ports {
            Some(spec) => spec.parse::<PortRange>()?,
            None => runtime.ports,
        };

        let mut config = runtime.scan.clone();
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(ms) = self.timeout {
            config = config.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.banner_timeout {
            config = config.with_banner_timeout(Duration::from_millis(ms));
        }

        Ok((config, ports))
    }

    fn export(
        &self,
        report: &ScanReport,
        format: ExportFormat,
        dir: &Path,
        chatty: bool,
    ) -> CliResult<()> {
        let path = output::write_export(report, format, dir)
            .map_err(|e| CliError::Export(format!("{}: {}", dir.display(), e)))?;

        info!(path = %path.display(), "exported results");
        if chatty {
            output::print_success(&format!("Exported results to {}", path.display()));
        }
        Ok(())
    }
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::types::PortError;

    fn command(args: &[&str]) -> ScanCommand {
        let mut argv = vec!["scan"];
        argv.extend_from_slice(args);
        ScanCommand::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_settings_used_without_flags() {
        let runtime = AppSettings::default().to_scan_settings().unwrap();
        let (config, ports) = command(&["127.0.0.1"]).resolve(&runtime).unwrap();

        assert_eq!(config, ScanConfig::default());
        assert_eq!(ports, PortRange::default());
    }

    #[test]
    fn test_flags_override_settings() {
        let runtime = AppSettings::default().to_scan_settings().unwrap();
        let cmd = command(&["127.0.0.1", "-p", "8000-8100", "-c", "16", "-t", "250"]);
        let (config, ports) = cmd.resolve(&runtime).unwrap();

        assert_eq!(config.concurrency, 16);
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.banner_timeout, runtime.scan.banner_timeout);
        assert_eq!(ports.len(), 101);
    }

    #[test]
    fn test_bad_port_flag() {
        let runtime = AppSettings::default().to_scan_settings().unwrap();
        let result = command(&["127.0.0.1", "-p", "0-10"]).resolve(&runtime);
        assert!(matches!(
            result,
            Err(CliError::Scan(ScanError::InvalidPortRange(PortError::OutOfRange(0))))
        ));
    }

    #[tokio::test]
    async fn test_invalid_target_fails_before_scanning() {
        let cmd = command(&["10.0.0.0/40", "-o", "json"]);
        let result = cmd.execute(&AppSettings::default(), true).await;
        assert!(matches!(result, Err(CliError::Scan(ScanError::InvalidTarget(_)))));
    }
}
