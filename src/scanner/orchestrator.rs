//! Multi-host scan orchestration.
//!
//! Hosts are scanned one after another; concurrency only applies to the
//! ports of the host currently being scanned. Progress is reported run-wide,
//! so observers see one counter climbing to `hosts × ports`.

use super::engine::ScanEngine;
use super::progress::{NoProgress, ProgressEvent, ProgressObserver};
use super::run::{ProgressSnapshot, ScanReport, ScanRun};
use super::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::types::{self, PortRange, ScanId};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Maps one host's progress onto the run-wide counter.
struct HostProgress<'a> {
    offset: usize,
    run: &'a ScanRun,
    outer: &'a dyn ProgressObserver,
}

impl ProgressObserver for HostProgress<'_> {
    fn on_progress(&self, event: ProgressEvent) {
        let event = ProgressEvent {
            scanned: self.offset + event.scanned,
            total: self.run.total(),
        };
        self.run.record_progress(event.scanned);
        self.outer.on_progress(event);
    }
}

/// Expands targets and drives the engine across their hosts.
#[derive(Clone)]
pub struct Orchestrator {
    engine: ScanEngine,
}

impl Orchestrator {
    pub fn new(engine: ScanEngine) -> Self {
        Self { engine }
    }

    /// Orchestrator over a TCP connect engine.
    pub fn from_config(config: &ScanConfig) -> ScanResult<Self> {
        ScanEngine::tcp(config).map(Self::new)
    }

    pub fn engine(&self) -> &ScanEngine {
        &self.engine
    }

    /// Expand the target into a fresh, not yet started run.
    pub async fn prepare(&self, target: &str, range: PortRange) -> ScanResult<ScanRun> {
        let hosts = types::expand(target).await?;
        info!(input = target, hosts = hosts.len(), ports = %range, "prepared scan");
        Ok(ScanRun::new(target, hosts, range))
    }

    /// Scan every host of `run` in order and mark it finished.
    pub async fn execute(&self, run: &ScanRun, observer: &dyn ProgressObserver) {
        let per_host = run.range().len();

        for (index, &host) in run.hosts().iter().enumerate() {
            if run.is_cancelled() {
                warn!(id = %run.id().short(), "scan cancelled before host {}", host);
                break;
            }

            let progress = HostProgress {
                offset: index * per_host,
                run,
                outer: observer,
            };
            let mut found = self
                .engine
                .scan_cancellable(host, run.range(), &progress, run.cancel_flag())
                .await;
            found.sort_by_key(|r| r.port);
            run.store_host(host, found).await;
        }

        run.finish();
        let open = run.open_ports().await;
        info!(
            id = %run.id().short(),
            scanned = run.scanned(),
            total = run.total(),
            open,
            "scan finished"
        );
    }

    /// Expand, scan every host, and return the report.
    pub async fn run(
        &self,
        target: &str,
        range: PortRange,
        observer: &dyn ProgressObserver,
    ) -> ScanResult<ScanReport> {
        let run = self.prepare(target, range).await?;
        self.execute(&run, observer).await;
        Ok(run.report().await)
    }

    /// Start a scan in the background.
    ///
    /// Target expansion happens before this returns, so an invalid target is
    /// reported to the caller and no task is spawned.
    pub async fn spawn(self: Arc<Self>, target: &str, range: PortRange) -> ScanResult<ScanHandle> {
        let run = Arc::new(self.prepare(target, range).await?);
        let task_run = Arc::clone(&run);
        let task = tokio::spawn(async move {
            self.execute(&task_run, &NoProgress).await;
        });
        Ok(ScanHandle { run, task })
    }
}

/// Handle to a scan running on a background task.
#[derive(Debug)]
pub struct ScanHandle {
    run: Arc<ScanRun>,
    task: JoinHandle<()>,
}

impl ScanHandle {
    pub fn id(&self) -> ScanId {
        self.run.id()
    }

    /// The shared run, for registries and pollers.
    pub fn run(&self) -> &Arc<ScanRun> {
        &self.run
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.run.snapshot()
    }

    pub fn is_done(&self) -> bool {
        self.run.is_done()
    }

    /// Stop after the port batch currently in flight.
    pub fn cancel(&self) {
        self.run.cancel();
    }

    /// Wait for the task and return the final report.
    pub async fn wait(self) -> ScanResult<ScanReport> {
        self.task
            .await
            .map_err(|e| ScanError::TaskFailed(e.to_string()))?;
        Ok(self.run.report().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{PortProbe, PortResult};
    use crate::types::{Port, TargetError};
    use async_trait::async_trait;
    use std::net::IpAddr;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Every host has the same open ports.
    struct StaticProbe {
        open: Vec<u16>,
        delay: Duration,
    }

    #[async_trait]
    impl PortProbe for StaticProbe {
        async fn probe(&self, _host: IpAddr, port: Port) -> Option<PortResult> {
            tokio::time::sleep(self.delay).await;
            self.open
                .contains(&port.as_u16())
                .then(|| PortResult::open(port))
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressObserver for Recorder {
        fn on_progress(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn orchestrator(open: &[u16], delay: Duration) -> Orchestrator {
        let probe = StaticProbe {
            open: open.to_vec(),
            delay,
        };
        Orchestrator::new(ScanEngine::new(Arc::new(probe), 8).unwrap())
    }

    #[tokio::test]
    async fn test_run_across_cidr_hosts() {
        let orchestrator = orchestrator(&[80, 22], Duration::ZERO);
        let recorder = Recorder::default();
        let range = PortRange::from_bounds(1, 100).unwrap();

        let report = orchestrator
            .run("192.0.2.0/30", range, &recorder)
            .await
            .unwrap();

        assert_eq!(report.hosts.len(), 2);
        assert_eq!(report.total, 200);
        assert_eq!(report.ports_scanned, 200);
        assert!(report.is_complete());
        for host in &report.hosts {
            let ports: Vec<u16> = report
                .host_results(host)
                .iter()
                .map(|r| r.port.as_u16())
                .collect();
            assert_eq!(ports, vec![22, 80]);
        }

        // One counter across both hosts, never reset
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 200);
        assert!(events.iter().all(|e| e.total == 200));
        assert!(events.windows(2).all(|w| w[0].scanned < w[1].scanned));
        assert_eq!(events.last().unwrap().scanned, 200);
    }

    #[tokio::test]
    async fn test_invalid_target_is_surfaced() {
        let orchestrator = orchestrator(&[], Duration::ZERO);
        let result = orchestrator
            .run("10.0.0.0/99", PortRange::default(), &NoProgress)
            .await;
        assert!(matches!(
            result,
            Err(ScanError::InvalidTarget(TargetError::InvalidCidr(_)))
        ));
    }

    #[tokio::test]
    async fn test_spawned_scan_completes() {
        let orchestrator = Arc::new(orchestrator(&[443], Duration::from_millis(1)));
        let range = PortRange::from_bounds(440, 450).unwrap();

        let handle = orchestrator.spawn("198.51.100.7", range).await.unwrap();
        assert_eq!(handle.progress().total, 11);

        let run = Arc::clone(handle.run());
        let report = handle.wait().await.unwrap();

        assert!(run.is_done());
        assert_eq!(run.snapshot().scanned, 11);
        assert_eq!(report.open_ports(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_skips_remaining_hosts() {
        let orchestrator = Arc::new(orchestrator(&[], Duration::from_millis(5)));
        let range = PortRange::from_bounds(1, 64).unwrap();

        let handle = orchestrator.spawn("192.0.2.0/29", range).await.unwrap();
        handle.cancel();
        let report = handle.wait().await.unwrap();

        assert!(report.cancelled);
        assert!(!report.is_complete());
        assert!(report.ports_scanned < report.total);
    }
}
