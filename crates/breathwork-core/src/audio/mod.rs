//! Audio preferences and the cue notifier.
//!
//! The sequencer never reads [`AudioSettings`]; they are consulted by the
//! [`CueNotifier`] on every event so a change made mid-session applies to
//! the very next cue.

mod notifier;
mod settings;

pub use notifier::{dispatch, run_dispatcher, AudioNotifier, AudioSink, CueNotifier, Tone};
pub use settings::{AudioSettings, BackgroundSound};
