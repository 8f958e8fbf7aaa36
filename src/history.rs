//! Session-scoped log of past predictions.

use crate::types::{PredictionRequest, SalaryEstimate};
use chrono::{DateTime, Utc};
use std::sync::RwLock;

/// One logged request/estimate pair.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub request: PredictionRequest,
    pub estimate: SalaryEstimate,
    pub logged_at: DateTime<Utc>,
}

/// Process-local, append-only log of past request/estimate pairs.
///
/// Ordinary application state for the service surface (e.g. charting the
/// session's predictions), not part of the inference pipeline. Cleared on
/// session end; only successful estimates are recorded.
pub struct PredictionLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl PredictionLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append one request/estimate pair.
    pub fn append(&self, request: PredictionRequest, estimate: SalaryEstimate) {
        if let Ok(mut entries) = self.entries.write() {
            entries.push(LogEntry {
                request,
                estimate,
                logged_at: Utc::now(),
            });
        }
    }

    /// Snapshot of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear the log at session end.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl Default for PredictionLog {
    fn default() -> Self {
        Self::new()
    }
}
