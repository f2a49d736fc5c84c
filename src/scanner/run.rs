//! Shared state of one scan run and its finished report.

use super::PortResult;
use crate::types::{PortRange, ScanId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;
use tokio::sync::RwLock;

/// Polling view of a run: the `{scanned, total, done}` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub scanned: usize,
    pub total: usize,
    pub done: bool,
}

/// One orchestrated scan across every host of a target.
///
/// Counters are atomics and per-host results sit behind a lock, so the run
/// can be shared through an `Arc` and polled while it is being filled in.
#[derive(Debug)]
pub struct ScanRun {
    id: ScanId,
    target: String,
    hosts: Vec<IpAddr>,
    range: PortRange,
    started_at: DateTime<Utc>,
    scanned: AtomicUsize,
    cancelled: AtomicBool,
    finished_at: OnceLock<DateTime<Utc>>,
    results: RwLock<BTreeMap<IpAddr, Vec<PortResult>>>,
}

impl ScanRun {
    /// Create a run for already expanded hosts.
    pub fn new(target: impl Into<String>, hosts: Vec<IpAddr>, range: PortRange) -> Self {
        Self {
            id: ScanId::new(),
            target: target.into(),
            hosts,
            range,
            started_at: Utc::now(),
            scanned: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            finished_at: OnceLock::new(),
            results: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn id(&self) -> ScanId {
        self.id
    }

    /// The target as the caller typed it.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn hosts(&self) -> &[IpAddr] {
        &self.hosts
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at.get().copied()
    }

    /// Attempts across all hosts: `hosts × ports`.
    pub fn total(&self) -> usize {
        self.hosts.len() * self.range.len()
    }

    pub fn scanned(&self) -> usize {
        self.scanned.load(Ordering::SeqCst)
    }

    pub fn is_done(&self) -> bool {
        self.finished_at.get().is_some()
    }

    /// Ask the run to stop admitting new port batches.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn cancel_flag(&self) -> &AtomicBool {
        &self.cancelled
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            scanned: self.scanned(),
            total: self.total(),
            done: self.is_done(),
        }
    }

    /// Raise the run-wide counter. Never moves backwards.
    pub(crate) fn record_progress(&self, scanned: usize) {
        self.scanned.fetch_max(scanned, Ordering::SeqCst);
    }

    pub(crate) async fn store_host(&self, host: IpAddr, results: Vec<PortResult>) {
        self.results.write().await.insert(host, results);
    }

    /// Mark the run complete. Later calls keep the first timestamp.
    pub(crate) fn finish(&self) {
        let _ = self.finished_at.set(Utc::now());
    }

    /// Results gathered so far, keyed by host.
    pub async fn results(&self) -> BTreeMap<IpAddr, Vec<PortResult>> {
        self.results.read().await.clone()
    }

    /// Open ports found so far across all hosts.
    pub async fn open_ports(&self) -> usize {
        self.results.read().await.values().map(Vec::len).sum()
    }

    /// Snapshot the run as a report.
    pub async fn report(&self) -> ScanReport {
        let completed_at = self.finished_at().unwrap_or_else(Utc::now);
        let duration_ms = (completed_at - self.started_at).num_milliseconds().max(0) as u64;

        ScanReport {
            id: self.id,
            target: self.target.clone(),
            ports: self.range,
            hosts: self.hosts.clone(),
            results: self.results().await,
            ports_scanned: self.scanned(),
            total: self.total(),
            started_at: self.started_at,
            completed_at,
            duration_ms,
            cancelled: self.is_cancelled(),
        }
    }
}

/// Immutable outcome of a scan run.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub id: ScanId,
    pub target: String,
    pub ports: PortRange,
    pub hosts: Vec<IpAddr>,
    /// Open ports per host, each list sorted by port.
    pub results: BTreeMap<IpAddr, Vec<PortResult>>,
    pub ports_scanned: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub cancelled: bool,
}

impl ScanReport {
    /// Number of open ports across all hosts.
    pub fn open_ports(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    /// Open ports for one host, empty if it had none.
    pub fn host_results(&self, host: &IpAddr) -> &[PortResult] {
        self.results.get(host).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether every attempt was made.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.ports_scanned == self.total
    }

    /// One-line summary for logs and listings.
    pub fn summary(&self) -> String {
        format!(
            "{} ({} hosts, ports {}) - {} open, {}/{} scanned [{:.2}s]",
            self.target,
            self.hosts.len(),
            self.ports,
            self.open_ports(),
            self.ports_scanned,
            self.total,
            self.duration_ms as f64 / 1000.0
        )
    }
}
