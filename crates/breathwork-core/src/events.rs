use serde::{Deserialize, Serialize};

use crate::session::SessionPhase;

/// Every observable change of a running session produces an Event.
/// Presentation renders them; the audio notifier turns them into cues.
/// Each sequencer tick produces exactly one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new breathing phase began (also emitted on start and restart).
    PhaseEntered {
        phase: SessionPhase,
        set: u32,
        remaining_seconds: u32,
    },
    /// The countdown of the current phase moved down by one second.
    Tick { remaining_seconds: u32 },
    /// The last exhale of the last set finished. Terminal.
    SessionCompleted {
        completed_sets: u32,
        elapsed_seconds: u64,
    },
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}
