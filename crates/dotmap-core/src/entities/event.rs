use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{EventLevel, ScanPhase};

/// One line of a scan's audit log: a phase transition or a skipped-file warning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanEvent {
    pub occurred_at: DateTime<Utc>,
    pub phase: ScanPhase,
    pub level: EventLevel,
    pub message: String,
}
