//! In-memory registry of scan runs.
//!
//! Runs are shared through `Arc`, so a poller can read progress while the
//! orchestrator is still filling the run in. Completed runs expire after the
//! configured TTL and are swept on every insert; runs still in progress are
//! never evicted.

use crate::error::{StorageError, StorageResult};
use crate::scanner::{ProgressSnapshot, ScanRun};
use crate::types::ScanId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Registry of scan runs keyed by id.
#[derive(Debug)]
pub struct ScanRegistry {
    runs: RwLock<HashMap<ScanId, Arc<ScanRun>>>,
    ttl: Duration,
}

impl ScanRegistry {
    /// Default lifetime of a completed run.
    pub const DEFAULT_TTL_SECS: i64 = 3600;

    pub fn new(ttl: Duration) -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a run and return its id. Expired runs are dropped first.
    pub async fn insert(&self, run: Arc<ScanRun>) -> ScanId {
        let id = run.id();
        let mut runs = self.runs.write().await;
        let evicted = sweep(&mut runs, Utc::now() - self.ttl);
        runs.insert(id, run);
        debug!(id = %id.short(), evicted, "registered scan");
        id
    }

    pub async fn get(&self, id: &ScanId) -> StorageResult<Arc<ScanRun>> {
        self.runs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::ScanNotFound(id.to_string()))
    }

    /// Look a run up by a prefix of its id, e.g. the short form.
    ///
    /// A full-length id must parse as one; an empty prefix matches nothing.
    pub async fn find_by_prefix(&self, prefix: &str) -> StorageResult<Arc<ScanRun>> {
        if is_full_id(prefix) {
            let id: ScanId = prefix.parse()?;
            return self.get(&id).await;
        }

        let runs = self.runs.read().await;
        let mut matches = runs
            .iter()
            .filter(|(id, _)| id.matches_prefix(prefix))
            .map(|(_, run)| run);

        match (matches.next(), matches.count()) {
            (None, _) => Err(StorageError::ScanNotFound(prefix.to_string())),
            (Some(run), 0) => Ok(Arc::clone(run)),
            (Some(_), rest) => Err(StorageError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                matches: rest + 1,
            }),
        }
    }

    /// Polling view of a run, `None` if it is unknown.
    pub async fn progress(&self, id: &ScanId) -> Option<ProgressSnapshot> {
        self.runs.read().await.get(id).map(|run| run.snapshot())
    }

    pub async fn remove(&self, id: &ScanId) -> StorageResult<Arc<ScanRun>> {
        self.runs
            .write()
            .await
            .remove(id)
            .ok_or_else(|| StorageError::ScanNotFound(id.to_string()))
    }

    /// All runs, most recently started first.
    pub async fn list(&self) -> Vec<Arc<ScanRun>> {
        let mut runs: Vec<_> = self.runs.read().await.values().cloned().collect();
        runs.sort_by(|a, b| b.started_at().cmp(&a.started_at()));
        runs
    }

    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }

    /// Drop completed runs that finished more than one TTL ago.
    pub async fn evict_expired(&self) -> usize {
        let mut runs = self.runs.write().await;
        sweep(&mut runs, Utc::now() - self.ttl)
    }
}

/// Hyphenated (36) or simple (32, no hyphens) UUID text.
fn is_full_id(s: &str) -> bool {
    s.len() >= 36 || (s.len() == 32 && !s.contains('-'))
}

fn sweep(runs: &mut HashMap<ScanId, Arc<ScanRun>>, cutoff: DateTime<Utc>) -> usize {
    let before = runs.len();
    runs.retain(|_, run| match run.finished_at() {
        Some(finished) => finished > cutoff,
        None => true,
    });

    let evicted = before - runs.len();
    if evicted > 0 {
        debug!(evicted, remaining = runs.len(), "evicted expired scans");
    }
    evicted
}

impl Default for ScanRegistry {
    fn default() -> Self {
        Self::new(Duration::seconds(Self::DEFAULT_TTL_SECS))
    }
}
