use std::collections::BTreeSet;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::RwLock;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::events::{OverflowEvent, OverflowStats, SystemOverview};
use crate::config::persistence::PersistenceError;
use crate::types::identifiers::{EventId, ProjectId};

/// Durable append log for overflow events. Implementations may fail
/// transiently; the recorder absorbs those failures off the decision path.
pub trait AnalyticsSink: Send {
    fn record(&self, event: &OverflowEvent) -> Result<(), PersistenceError>;
}

/// Attempts per event before the sink worker gives up and drops it.
const SINK_ATTEMPTS: u32 = 3;
/// Base backoff between attempts; doubles each retry.
const SINK_BACKOFF: Duration = Duration::from_millis(50);

struct LogState {
    events: Vec<OverflowEvent>,
    seen: BTreeSet<EventId>,
}

/// Records overflow events and selection outcomes.
///
/// Recording is fire-and-forget: duplicates (same event id) are dropped,
/// the in-memory log is append-only, and durable persistence happens on a
/// background worker with bounded retry, so a sink outage never blocks or
/// fails the caller's scoring/selection path.
pub struct AnalyticsRecorder {
    log: RwLock<LogState>,

    selections_applied: AtomicU64,
    selections_accepted: AtomicU64,
    decision_micros_total: AtomicU64,
    decision_count: AtomicU64,

    sink_tx: Option<mpsc::Sender<OverflowEvent>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Default for AnalyticsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsRecorder {
    /// In-memory only; aggregation works, nothing is persisted.
    pub fn new() -> Self {
        AnalyticsRecorder {
            log: RwLock::new(LogState {
                events: Vec::new(),
                seen: BTreeSet::new(),
            }),
            selections_applied: AtomicU64::new(0),
            selections_accepted: AtomicU64::new(0),
            decision_micros_total: AtomicU64::new(0),
            decision_count: AtomicU64::new(0),
            sink_tx: None,
            worker: None,
        }
    }

    /// Attach a durable sink, drained by a background worker thread.
    pub fn with_sink(sink: Box<dyn AnalyticsSink>) -> Self {
        let (tx, rx) = mpsc::channel::<OverflowEvent>();

        let worker = thread::spawn(move || {
            while let Ok(event) = rx.recv() {
                persist_with_retry(sink.as_ref(), &event);
            }
        });

        let mut recorder = Self::new();
        recorder.sink_tx = Some(tx);
        recorder.worker = Some(worker);
        recorder
    }

    /// Record an overflow occurrence. Idempotent on the event id; never
    /// blocks on and never fails from persistence.
    pub fn record_overflow(&self, event: OverflowEvent) {
        {
            let mut log = self.log.write().unwrap_or_else(|e| e.into_inner());
            if !log.seen.insert(event.event_id.clone()) {
                debug!(event_id = event.event_id.as_str(), "duplicate overflow event dropped");
                return;
            }
            log.events.push(event.clone());
        }

        if let Some(tx) = &self.sink_tx {
            // The worker owns the receiving end; a send failure means the
            // worker is gone, which only happens during shutdown.
            if tx.send(event).is_err() {
                warn!("analytics sink worker unavailable, event kept in memory only");
            }
        }
    }

    /// Record the user's final (post-recommendation) selection outcome.
    pub fn record_selection(&self, accepted: bool) {
        self.selections_applied.fetch_add(1, Ordering::Relaxed);
        if accepted {
            self.selections_accepted.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record how long one scoring/selection decision took.
    pub fn record_decision_latency(&self, elapsed: Duration) {
        self.decision_micros_total
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.decision_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Per-project aggregate.
    pub fn aggregate(&self, project_id: &ProjectId) -> OverflowStats {
        let log = self.log.read().unwrap_or_else(|e| e.into_inner());

        let mut total = 0usize;
        let mut resolution_sum = 0u64;
        for event in log.events.iter().filter(|e| &e.project_id == project_id) {
            total += 1;
            resolution_sum += event.resolution_time_ms;
        }

        OverflowStats {
            total_overflow_events: total,
            average_resolution_time_ms: if total == 0 {
                0.0
            } else {
                resolution_sum as f64 / total as f64
            },
        }
    }

    /// Cross-project snapshot for the dashboard.
    pub fn dashboard_snapshot(&self) -> SystemOverview {
        let log = self.log.read().unwrap_or_else(|e| e.into_inner());

        let total = log.events.len();
        let resolution_sum: u64 = log.events.iter().map(|e| e.resolution_time_ms).sum();
        let projects: BTreeSet<&ProjectId> = log.events.iter().map(|e| &e.project_id).collect();

        let applied = self.selections_applied.load(Ordering::Relaxed);
        let accepted = self.selections_accepted.load(Ordering::Relaxed);
        let decision_count = self.decision_count.load(Ordering::Relaxed);
        let decision_micros = self.decision_micros_total.load(Ordering::Relaxed);

        SystemOverview {
            total_overflow_events: total,
            projects_with_overflow: projects.len(),
            average_resolution_time_ms: if total == 0 {
                0.0
            } else {
                resolution_sum as f64 / total as f64
            },
            selections_applied: applied as usize,
            recommendation_acceptance_rate: if applied == 0 {
                0.0
            } else {
                accepted as f64 / applied as f64
            },
            average_decision_micros: if decision_count == 0 {
                0.0
            } else {
                decision_micros as f64 / decision_count as f64
            },
        }
    }

    /// Snapshot of the append-only event log, oldest first.
    pub fn events(&self) -> Vec<OverflowEvent> {
        self.log.read().unwrap_or_else(|e| e.into_inner()).events.clone()
    }
}

impl Drop for AnalyticsRecorder {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what's queued and exit.
        drop(self.sink_tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn persist_with_retry(sink: &dyn AnalyticsSink, event: &OverflowEvent) {
    let mut backoff = SINK_BACKOFF;
    for attempt in 1..=SINK_ATTEMPTS {
        match sink.record(event) {
            Ok(()) => return,
            Err(err) if attempt < SINK_ATTEMPTS => {
                debug!(
                    error = %err,
                    attempt,
                    event_id = event.event_id.as_str(),
                    "analytics sink failed, retrying"
                );
                thread::sleep(backoff);
                backoff *= 2;
            }
            Err(err) => {
                warn!(
                    error = %err,
                    event_id = event.event_id.as_str(),
                    "analytics sink failed after retries, event dropped from durable log"
                );
            }
        }
    }
}

/// Append-only NDJSON file sink: one event per line.
#[derive(Debug)]
pub struct JsonlFileSink {
    path: PathBuf,
}

impl JsonlFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AnalyticsSink for JsonlFileSink {
    fn record(&self, event: &OverflowEvent) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let line = serde_json::to_string(event)?;
        let mut f = fs::OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}
