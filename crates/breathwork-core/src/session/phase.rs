use serde::{Deserialize, Serialize};

/// The breathing activity the user should currently perform.
///
/// `Idle` only describes a sequencer that has not started; once a session
/// starts it cycles through the other three phases until it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Inhale,
    Hold,
    Exhale,
}

impl SessionPhase {
    /// Instruction shown on screen and spoken by the voice guide.
    pub fn cue_text(self) -> &'static str {
        match self {
            SessionPhase::Idle => "Press start",
            SessionPhase::Inhale => "Breathe in",
            SessionPhase::Hold => "Hold",
            SessionPhase::Exhale => "Breathe out",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Inhale => "inhale",
            SessionPhase::Hold => "hold",
            SessionPhase::Exhale => "exhale",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
