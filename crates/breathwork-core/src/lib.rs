//! # Breathwork Core Library
//!
//! This library provides the core logic for the Breathwork guided breathing
//! app. Every front end (currently the `breathwork` CLI) is a thin
//! presentation layer over the same core library.
//!
//! ## Architecture
//!
//! - **Sequencer**: A pure finite-state machine (Inhale -> Hold -> Exhale ->
//!   repeat) that requires the caller to invoke `tick()` once per second
//! - **Harness**: A tokio-driven, cancellation-guarded scheduler that owns a
//!   sequencer and delivers its events over a channel
//! - **Audio**: Cue notifier that turns events into tones and spoken phrases,
//!   gated by the user's audio settings
//! - **Storage**: SQLite-based history/preset/audio-settings store and
//!   TOML-based application configuration
//! - **Stats**: Weekly aggregation and formatting over session history
//!
//! ## Key Components
//!
//! - [`Sequencer`]: Core breathing state machine
//! - [`SessionHandle`]: Running session driven by a real-time ticker
//! - [`BreathingStore`]: Persistence for presets, history and audio settings
//! - [`Config`]: Application configuration management

pub mod audio;
pub mod error;
pub mod events;
pub mod presets;
pub mod session;
pub mod stats;
pub mod storage;

pub use audio::{AudioNotifier, AudioSettings, AudioSink, BackgroundSound, CueNotifier, Tone};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use presets::{default_presets, Preset};
pub use session::{
    BreathingConfig, HarnessOptions, Sequencer, SequencerState, SessionHandle, SessionOutcome,
    SessionPhase, SessionSummary,
};
pub use stats::{today_session_count, weekly_stats, DayGroup, WeeklyStats};
pub use storage::{BreathingStore, Config, Database, SessionRecord};
