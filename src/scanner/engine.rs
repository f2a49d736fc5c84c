//! Batched concurrent scanning of one host.
//!
//! The port range is cut into batches of at most `concurrency` ports. Every
//! attempt of a batch runs concurrently and the batch is drained completely
//! before the next one is admitted, so sockets in flight never exceed the
//! limit and no batch overlaps the stragglers of the previous one.

use super::progress::{ProgressEvent, ProgressObserver};
use super::traits::PortProbe;
use super::{PortResult, ScanConfig, TcpConnectProbe};
use crate::error::{ScanError, ScanResult};
use crate::types::{Port, PortRange};
use futures::stream::{FuturesUnordered, StreamExt};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Counts one finished attempt when dropped.
///
/// Living inside the attempt's future means the count and the observer call
/// happen exactly once per attempt, whichever way the attempt ends.
struct Tally<'a> {
    scanned: &'a AtomicUsize,
    total: usize,
    observer: &'a dyn ProgressObserver,
}

impl Drop for Tally<'_> {
    fn drop(&mut self) {
        let scanned = self.scanned.fetch_add(1, Ordering::SeqCst) + 1;
        self.observer.on_progress(ProgressEvent {
            scanned,
            total: self.total,
        });
    }
}

/// Scans one host at a time under a fixed concurrency ceiling.
#[derive(Clone)]
pub struct ScanEngine {
    probe: Arc<dyn PortProbe>,
    concurrency: usize,
}

impl ScanEngine {
    /// Default number of attempts in flight per host.
    pub const DEFAULT_CONCURRENCY: usize = 200;

    /// Create an engine around a probe. Fails on a zero concurrency limit.
    pub fn new(probe: Arc<dyn PortProbe>, concurrency: usize) -> ScanResult<Self> {
        if concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency limit must be greater than zero".to_string(),
            ));
        }
        Ok(Self { probe, concurrency })
    }

    /// Create a TCP connect engine from runtime settings.
    pub fn tcp(config: &ScanConfig) -> ScanResult<Self> {
        config.validate()?;
        let probe = TcpConnectProbe::new(config.connect_timeout, config.banner_timeout);
        Self::new(Arc::new(probe), config.concurrency)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Scan every port of `range` on `host`.
    ///
    /// Results come back in completion order. Failed attempts are not
    /// errors, they just produce no entry.
    pub async fn scan(
        &self,
        host: IpAddr,
        range: PortRange,
        observer: &dyn ProgressObserver,
    ) -> Vec<PortResult> {
        let never = AtomicBool::new(false);
        self.scan_cancellable(host, range, observer, &never).await
    }

    /// Like [`scan`](Self::scan), but stops admitting batches once `cancel`
    /// is set. The batch in flight still completes.
    pub async fn scan_cancellable(
        &self,
        host: IpAddr,
        range: PortRange,
        observer: &dyn ProgressObserver,
        cancel: &AtomicBool,
    ) -> Vec<PortResult> {
        let total = range.len();
        let scanned = AtomicUsize::new(0);
        let ports: Vec<Port> = range.iter().collect();
        let mut results = Vec::new();

        info!(%host, ports = total, concurrency = self.concurrency, "scanning host");

        for (index, batch) in ports.chunks(self.concurrency).enumerate() {
            if cancel.load(Ordering::SeqCst) {
                warn!(
                    %host,
                    scanned = scanned.load(Ordering::SeqCst),
                    total,
                    "scan cancelled, abandoning remaining batches"
                );
                break;
            }

            trace!(%host, batch = index, size = batch.len(), "admitting batch");

            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|&port| {
                    let tally = Tally {
                        scanned: &scanned,
                        total,
                        observer,
                    };
                    self.attempt(host, port, tally)
                })
                .collect();

            while let Some(outcome) = in_flight.next().await {
                results.extend(outcome);
            }
        }

        info!(%host, open = results.len(), "host finished");
        results
    }

    async fn attempt(&self, host: IpAddr, port: Port, _tally: Tally<'_>) -> Option<PortResult> {
        self.probe.probe(host, port).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;
    use std::time::Duration;

    const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

    /// Fake probe: ports in `open` succeed, the rest fail, and the number of
    /// attempts in flight at once is recorded.
    struct FakeProbe {
        open: HashSet<u16>,
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeProbe {
        fn new(open: &[u16], delay: Duration) -> Self {
            Self {
                open: open.iter().copied().collect(),
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PortProbe for FakeProbe {
        async fn probe(&self, _host: IpAddr, port: Port) -> Option<PortResult> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // Later ports finish first to shake up completion order
            let jitter = Duration::from_micros(u64::from(1000 - port.as_u16() % 1000));
            tokio::time::sleep(self.delay + jitter).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

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

    /// Cancels the scan once `after` attempts have been reported.
    struct CancelAfter<'a> {
        after: usize,
        flag: &'a AtomicBool,
    }

    impl ProgressObserver for CancelAfter<'_> {
        fn on_progress(&self, event: ProgressEvent) {
            if event.scanned >= self.after {
                self.flag.store(true, Ordering::SeqCst);
            }
        }
    }

    fn range(start: u32, end: u32) -> PortRange {
        PortRange::from_bounds(start, end).unwrap()
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let probe = Arc::new(FakeProbe::new(&[], Duration::ZERO));
        assert!(matches!(
            ScanEngine::new(probe, 0),
            Err(ScanError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_reports_only_open_ports() {
        let probe = Arc::new(FakeProbe::new(&[22, 80, 443, 9999], Duration::ZERO));
        let engine = ScanEngine::new(probe, 16).unwrap();

        let mut results = engine.scan(HOST, range(1, 500), &NoProgressCheck).await;
        results.sort_by_key(|r| r.port);

        let ports: Vec<u16> = results.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(ports, vec![22, 80, 443]);
        assert_eq!(results[0].service, "SSH");
    }

    #[tokio::test]
    async fn test_progress_reaches_total_exactly_once() {
        let probe = Arc::new(FakeProbe::new(&[5, 50], Duration::from_millis(1)));
        let engine = ScanEngine::new(probe, 7).unwrap();
        let recorder = Recorder::default();

        engine.scan(HOST, range(1, 100), &recorder).await;

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 100);
        assert!(events.iter().all(|e| e.total == 100));
        assert!(events.windows(2).all(|w| w[0].scanned < w[1].scanned));
        assert_eq!(events.iter().filter(|e| e.is_complete()).count(), 1);
        assert_eq!(events.last().map(|e| e.scanned), Some(100));
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_limit() {
        let probe = Arc::new(FakeProbe::new(&[], Duration::from_millis(2)));
        let engine = ScanEngine::new(probe.clone(), 25).unwrap();

        engine.scan(HOST, range(1000, 1300), &NoProgressCheck).await;

        let peak = probe.peak.load(Ordering::SeqCst);
        assert!(peak <= 25, "peak in-flight was {}", peak);
        assert!(peak > 1);
        assert_eq!(probe.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_results_unique_and_in_range() {
        let open: Vec<u16> = (100..=300).step_by(3).collect();
        let probe = Arc::new(FakeProbe::new(&open, Duration::ZERO));
        let engine = ScanEngine::new(probe, 50).unwrap();
        let scanned = range(150, 250);

        let results = engine.scan(HOST, scanned, &NoProgressCheck).await;

        let unique: HashSet<Port> = results.iter().map(|r| r.port).collect();
        assert_eq!(unique.len(), results.len());
        assert!(results.iter().all(|r| scanned.contains(r.port)));
        assert_eq!(
            results.len(),
            open.iter().filter(|p| (150..=250).contains(*p)).count()
        );
    }

    #[tokio::test]
    async fn test_single_port_range() {
        let probe = Arc::new(FakeProbe::new(&[8080], Duration::ZERO));
        let engine = ScanEngine::new(probe, 200).unwrap();
        let recorder = Recorder::default();

        let results = engine.scan(HOST, range(8080, 8080), &recorder).await;

        assert_eq!(results.len(), 1);
        assert_eq!(
            recorder.events.lock().unwrap().as_slice(),
            &[ProgressEvent {
                scanned: 1,
                total: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start_scans_nothing() {
        let probe = Arc::new(FakeProbe::new(&[1, 2, 3], Duration::ZERO));
        let engine = ScanEngine::new(probe, 10).unwrap();
        let flag = AtomicBool::new(true);
        let recorder = Recorder::default();

        let results = engine
            .scan_cancellable(HOST, range(1, 100), &recorder, &flag)
            .await;

        assert!(results.is_empty());
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_completes_current_batch() {
        let probe = Arc::new(FakeProbe::new(&[], Duration::ZERO));
        let engine = ScanEngine::new(probe, 10).unwrap();
        let flag = AtomicBool::new(false);
        let recorder = Recorder::default();
        let observer = Chain {
            first: CancelAfter {
                after: 15,
                flag: &flag,
            },
            second: &recorder,
        };

        engine
            .scan_cancellable(HOST, range(1, 100), &observer, &flag)
            .await;

        // Cancelled mid-way through the second batch of ten
        assert_eq!(recorder.events.lock().unwrap().len(), 20);
    }

    struct Chain<'a> {
        first: CancelAfter<'a>,
        second: &'a Recorder,
    }

    impl ProgressObserver for Chain<'_> {
        fn on_progress(&self, event: ProgressEvent) {
            self.first.on_progress(event);
            self.second.on_progress(event);
        }
    }

    struct NoProgressCheck;

    impl ProgressObserver for NoProgressCheck {
        fn on_progress(&self, event: ProgressEvent) {
            assert!(event.scanned <= event.total);
        }
    }
}
