//! Progress reporting.
//!
//! The engine pushes one [`ProgressEvent`] per finished attempt into a
//! [`ProgressObserver`]. Observers are called from the scanning task, so
//! they should be quick.

use indicatif::ProgressBar;
use serde::Serialize;

/// `(scanned, total)` after one more attempt finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub scanned: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn is_complete(&self) -> bool {
        self.scanned >= self.total
    }

    /// Percentage done, 100 for an empty total.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.scanned as f64 * 100.0 / self.total as f64
        }
    }
}

/// Receives progress events while a scan runs.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _event: ProgressEvent) {}
}

impl ProgressObserver for ProgressBar {
    fn on_progress(&self, event: ProgressEvent) {
        if self.length() != Some(event.total as u64) {
            self.set_length(event.total as u64);
        }
        self.set_position(event.scanned as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let event = ProgressEvent {
            scanned: 50,
            total: 200,
        };
        assert_eq!(event.percent(), 25.0);
        assert!(!event.is_complete());

        let done = ProgressEvent {
            scanned: 200,
            total: 200,
        };
        assert!(done.is_complete());
        assert_eq!(ProgressEvent { scanned: 0, total: 0 }.percent(), 100.0);
    }

    #[test]
    fn test_progress_bar_observer() {
        let pb = ProgressBar::hidden();
        pb.on_progress(ProgressEvent {
            scanned: 3,
            total: 10,
        });
        assert_eq!(pb.length(), Some(10));
        assert_eq!(pb.position(), 3);
    }
}
