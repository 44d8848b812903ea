mod config;
mod harness;
mod phase;
mod sequencer;

pub use config::{BreathingConfig, PRACTICAL_RANGE};
pub use harness::{HarnessOptions, SessionHandle, SessionOutcome};
pub use phase::SessionPhase;
pub use sequencer::{Sequencer, SequencerState, SessionSummary};
