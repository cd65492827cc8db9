//! Scan progress reporting.
//!
//! A [`ProgressSink`] receives phase updates while a job runs and exactly
//! one terminal call when it ends. All methods default to no-ops.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

use dotmap_core::entities::ScanEvent;
use dotmap_core::enums::{EventLevel, ScanPhase};

use crate::error::ScanWarning;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub phase: ScanPhase,
    pub message: String,
    /// 0..=100, never lower than a previous update of the same job.
    pub percent: u8,
}

pub trait ProgressSink: Send + Sync {
    /// Called once, before any other method, with the id of the job.
    fn on_start(&self, _job_id: &str) {}
    fn on_phase(&self, _update: &ProgressUpdate) {}
    fn on_complete(&self, _scan_id: i64) {}
    fn on_failed(&self, _message: &str) {}
}

/// No-op sink for silent operation.
pub struct SilentSink;

impl ProgressSink for SilentSink {}

// ---------------------------------------------------------------------------
// ChannelSink
// ---------------------------------------------------------------------------

/// Progress broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Phase {
        job_id: String,
        #[serde(flatten)]
        update: ProgressUpdate,
    },
    Complete {
        job_id: String,
        scan_id: i64,
    },
    Failed {
        job_id: String,
        message: String,
    },
}

impl ProgressEvent {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed { .. })
    }
}

/// Forwards progress of one job to any number of broadcast receivers.
///
/// Events sent while nobody is subscribed are dropped.
pub struct ChannelSink {
    job_id: OnceLock<String>,
    tx: broadcast::Sender<ProgressEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            job_id: OnceLock::new(),
            tx,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    fn job_id(&self) -> String {
        self.job_id.get().cloned().unwrap_or_default()
    }

    fn send(&self, event: ProgressEvent) {
        // Err only means there are no receivers.
        let _ = self.tx.send(event);
    }
}

impl ProgressSink for ChannelSink {
    fn on_start(&self, job_id: &str) {
        let _ = self.job_id.set(job_id.to_string());
    }

    fn on_phase(&self, update: &ProgressUpdate) {
        self.send(ProgressEvent::Phase {
            job_id: self.job_id(),
            update: update.clone(),
        });
    }

    fn on_complete(&self, scan_id: i64) {
        self.send(ProgressEvent::Complete {
            job_id: self.job_id(),
            scan_id,
        });
    }

    fn on_failed(&self, message: &str) {
        self.send(ProgressEvent::Failed {
            job_id: self.job_id(),
            message: message.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// PhaseTracker
// ---------------------------------------------------------------------------

/// Drives a sink through the phases of one scan and records the scan's
/// event log. Percentages are clamped so they never go backwards.
pub struct PhaseTracker {
    sink: Arc<dyn ProgressSink>,
    phase: ScanPhase,
    percent: u8,
    events: Vec<ScanEvent>,
}

impl PhaseTracker {
    #[must_use]
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            phase: ScanPhase::Initializing,
            percent: 0,
            events: Vec::new(),
        }
    }

    /// Start `phase` at its nominal percentage.
    pub fn enter(&mut self, phase: ScanPhase, message: impl Into<String>) {
        self.phase = phase;
        let message = message.into();
        info!(phase = %phase, "{message}");
        self.record(EventLevel::Info, message.clone());
        self.emit(message, phase.start_percent());
    }

    /// Progress within the current phase.
    pub fn report(&mut self, message: impl Into<String>, percent: u8) {
        self.emit(message.into(), percent);
    }

    /// Record a skipped file or entity. Not forwarded to the sink.
    pub fn warn(&mut self, warning: &ScanWarning) {
        self.events.push(ScanEvent {
            occurred_at: Utc::now(),
            phase: warning.phase,
            level: EventLevel::Warn,
            message: warning.message.clone(),
        });
    }

    #[must_use]
    pub fn events(&self) -> &[ScanEvent] {
        &self.events
    }

    fn record(&mut self, level: EventLevel, message: String) {
        self.events.push(ScanEvent {
            occurred_at: Utc::now(),
            phase: self.phase,
            level,
            message,
        });
    }

    fn emit(&mut self, message: String, percent: u8) {
        self.percent = percent.min(100).max(self.percent);
        self.sink.on_phase(&ProgressUpdate {
            phase: self.phase,
            message,
            percent: self.percent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        updates: Mutex<Vec<ProgressUpdate>>,
    }

    impl ProgressSink for Recording {
        fn on_phase(&self, update: &ProgressUpdate) {
            self.updates.lock().unwrap().push(update.clone());
        }
    }

    #[test]
    fn percentages_never_decrease() {
        let sink = Arc::new(Recording::default());
        let mut tracker = PhaseTracker::new(sink.clone());
        tracker.enter(ScanPhase::Projects, "parsing");
        tracker.report("halfway", 55);
        tracker.report("stale", 30);
        tracker.enter(ScanPhase::Solutions, "out of order");
        tracker.report("overflow", 250);

        let percents: Vec<u8> = sink.updates.lock().unwrap().iter().map(|u| u.percent).collect();
        assert_eq!(percents, vec![40, 55, 55, 55, 100]);
    }

    #[test]
    fn events_record_phases_and_warnings() {
        let mut tracker = PhaseTracker::new(Arc::new(SilentSink));
        tracker.enter(ScanPhase::Discovery, "walking");
        tracker.warn(&ScanWarning::new(ScanPhase::Projects, None, "bad xml"));

        let events = tracker.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].phase, ScanPhase::Discovery);
        assert_eq!(events[0].level, EventLevel::Info);
        assert_eq!(events[1].phase, ScanPhase::Projects);
        assert_eq!(events[1].level, EventLevel::Warn);
        assert_eq!(events[1].message, "bad xml");
    }

    #[tokio::test]
    async fn channel_sink_tags_events_with_job_id() {
        let sink = ChannelSink::new(8);
        let mut rx = sink.subscribe();
        sink.on_start("job-0000abcd");
        sink.on_phase(&ProgressUpdate {
            phase: ScanPhase::Vcs,
            message: "reading HEAD".into(),
            percent: 5,
        });
        sink.on_complete(7);

        let first = rx.recv().await.unwrap();
        assert!(matches!(&first, ProgressEvent::Phase { job_id, .. } if job_id == "job-0000abcd"));
        assert!(!first.is_terminal());

        let last = rx.recv().await.unwrap();
        assert_eq!(
            last,
            ProgressEvent::Complete {
                job_id: "job-0000abcd".into(),
                scan_id: 7,
            }
        );
        assert!(last.is_terminal());
    }

    #[test]
    fn channel_sink_without_receivers_does_not_fail() {
        let sink = ChannelSink::new(1);
        sink.on_failed("nobody listening");
    }

    #[test]
    fn phase_event_serializes_flat() {
        let event = ProgressEvent::Phase {
            job_id: "job-1".into(),
            update: ProgressUpdate {
                phase: ScanPhase::Graph,
                message: "linking".into(),
                percent: 80,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase");
        assert_eq!(json["phase"], "graph");
        assert_eq!(json["percent"], 80);
    }
}
