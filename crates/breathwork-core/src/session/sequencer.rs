//! Breathing session sequencer.
//!
//! The sequencer is a pure state machine. It does not use threads or read a
//! clock - the caller (usually [`super::SessionHandle`]) is responsible for
//! calling `tick()` once per second while the session is not paused.
//!
//! ## Phase Transitions
//!
//! ```text
//! Inhale -> Hold -> Exhale -> Inhale (next set) ... -> Completed
//! ```
//!
//! A tick while the countdown is above zero decrements it and yields
//! `Event::Tick`; a tick while it is zero performs the transition and yields
//! `Event::PhaseEntered` (or `Event::SessionCompleted` after the last set).
//! A 4 second inhale therefore displays 4, 3, 2, 1, 0 before the hold begins.
//!
//! ## Usage
//!
//! ```ignore
//! let (mut seq, first) = Sequencer::start(config)?;
//! // Once per second:
//! if let Some(event) = seq.tick() { render(event) }
//! ```

use serde::{Deserialize, Serialize};

use super::config::BreathingConfig;
use super::phase::SessionPhase;
use crate::error::Result;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Running,
    Completed,
    Stopped,
}

/// Point-in-time copy of the sequencer, for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerState {
    pub phase: SessionPhase,
    pub remaining_seconds: u32,
    pub current_set: u32,
    pub total_sets: u32,
    pub paused: bool,
    /// Active (un-paused) seconds since start.
    pub elapsed_seconds: u64,
    pub finished: bool,
}

/// What a session produced, used to build a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub completed_sets: u32,
    pub elapsed_seconds: u64,
    pub config: BreathingConfig,
}

/// Core breathing state machine.
#[derive(Debug, Clone)]
pub struct Sequencer {
    config: BreathingConfig,
    phase: SessionPhase,
    remaining_seconds: u32,
    current_set: u32,
    paused: bool,
    /// Counts processed ticks, so paused time never contributes.
    elapsed_seconds: u64,
    lifecycle: Lifecycle,
}

impl Sequencer {
    /// Start a session in `Inhale` of set 1.
    ///
    /// Returns the sequencer together with the initial `PhaseEntered` event.
    ///
    /// # Errors
    /// Returns a validation error if any duration or the set count is zero.
    pub fn start(config: BreathingConfig) -> Result<(Self, Event)> {
        config.validate()?;
        let mut sequencer = Self {
            config,
            phase: SessionPhase::Idle,
            remaining_seconds: 0,
            current_set: 1,
            paused: false,
            elapsed_seconds: 0,
            lifecycle: Lifecycle::Running,
        };
        let event = sequencer.enter(SessionPhase::Inhale);
        Ok((sequencer, event))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &BreathingConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_completed(&self) -> bool {
        self.lifecycle == Lifecycle::Completed
    }

    /// Completed or stopped. No further events will be produced.
    pub fn is_finished(&self) -> bool {
        self.lifecycle != Lifecycle::Running
    }

    pub fn state(&self) -> SequencerState {
        SequencerState {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            current_set: self.current_set,
            total_sets: self.config.sets,
            paused: self.paused,
            elapsed_seconds: self.elapsed_seconds,
            finished: self.is_finished(),
        }
    }

    /// Summary as of now. The unfinished set never counts.
    pub fn summary(&self) -> SessionSummary {
        let completed_sets = match self.lifecycle {
            Lifecycle::Completed => self.config.sets,
            _ => self.current_set.saturating_sub(1),
        };
        SessionSummary {
            completed_sets,
            elapsed_seconds: self.elapsed_seconds,
            config: self.config,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `true` if the session went from running to paused.
    pub fn pause(&mut self) -> bool {
        if self.is_finished() || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    /// Returns `true` if the session went from paused to running.
    /// The countdown continues from exactly where it was paused.
    pub fn resume(&mut self) -> bool {
        if self.is_finished() || !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    /// Back to `Inhale` of set 1. Elapsed time keeps accumulating.
    pub fn restart(&mut self) -> Option<Event> {
        if self.is_finished() {
            return None;
        }
        self.current_set = 1;
        self.paused = false;
        Some(self.enter(SessionPhase::Inhale))
    }

    /// End the session from any phase. Idempotent.
    pub fn stop(&mut self) -> SessionSummary {
        if self.lifecycle == Lifecycle::Running {
            self.lifecycle = Lifecycle::Stopped;
            self.paused = false;
        }
        self.summary()
    }

    /// Advance one second. `None` while paused or after the session ended.
    pub fn tick(&mut self) -> Option<Event> {
        if self.is_finished() || self.paused {
            return None;
        }
        self.elapsed_seconds += 1;

        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            return Some(Event::Tick {
                remaining_seconds: self.remaining_seconds,
            });
        }

        let event = match self.phase {
            SessionPhase::Inhale => self.enter(SessionPhase::Hold),
            SessionPhase::Hold => self.enter(SessionPhase::Exhale),
            SessionPhase::Exhale if self.current_set < self.config.sets => {
                self.current_set += 1;
                self.enter(SessionPhase::Inhale)
            }
            SessionPhase::Exhale => {
                self.lifecycle = Lifecycle::Completed;
                Event::SessionCompleted {
                    completed_sets: self.config.sets,
                    elapsed_seconds: self.elapsed_seconds,
                }
            }
            // start() never leaves the sequencer idle
            SessionPhase::Idle => self.enter(SessionPhase::Inhale),
        };
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, phase: SessionPhase) -> Event {
        self.phase = phase;
        self.remaining_seconds = match phase {
            SessionPhase::Inhale => self.config.inhale,
            SessionPhase::Hold => self.config.hold,
            SessionPhase::Exhale => self.config.exhale,
            SessionPhase::Idle => 0,
        };
        Event::PhaseEntered {
            phase,
            set: self.current_set,
            remaining_seconds: self.remaining_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use proptest::prelude::*;

    fn config(inhale: u32, hold: u32, exhale: u32, sets: u32) -> BreathingConfig {
        BreathingConfig {
            inhale,
            hold,
            exhale,
            sets,
        }
    }

    /// Drive a session to the end, collecting every event.
    fn run_to_end(seq: &mut Sequencer) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = seq.tick() {
            events.push(event);
        }
        events
    }

    #[test]
    fn start_enters_inhale_of_first_set() {
        let (seq, event) = Sequencer::start(config(4, 7, 8, 2)).unwrap();
        assert_eq!(seq.phase(), SessionPhase::Inhale);
        assert_eq!(seq.remaining_seconds(), 4);
        assert_eq!(seq.current_set(), 1);
        assert!(!seq.is_paused());
        assert_eq!(seq.elapsed_seconds(), 0);
        assert_eq!(
            event,
            Event::PhaseEntered {
                phase: SessionPhase::Inhale,
                set: 1,
                remaining_seconds: 4
            }
        );
    }

    #[test]
    fn start_rejects_zero_durations() {
        let err = Sequencer::start(config(4, 7, 0, 1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidConfig { field: "exhale" })
        ));
    }

    #[test]
    fn four_seven_eight_single_set_countdown() {
        let (mut seq, first) = Sequencer::start(config(4, 7, 8, 1)).unwrap();
        let mut events = vec![first];
        events.extend(run_to_end(&mut seq));

        // Rebuild the displayed counter per phase.
        let mut shown: Vec<(SessionPhase, Vec<u32>)> = Vec::new();
        let mut completed = None;
        for event in &events {
            match *event {
                Event::PhaseEntered {
                    phase,
                    remaining_seconds,
                    ..
                } => shown.push((phase, vec![remaining_seconds])),
                Event::Tick { remaining_seconds } => {
                    shown.last_mut().unwrap().1.push(remaining_seconds)
                }
                Event::SessionCompleted { completed_sets, .. } => completed = Some(completed_sets),
            }
        }

        assert_eq!(
            shown,
            vec![
                (SessionPhase::Inhale, vec![4, 3, 2, 1, 0]),
                (SessionPhase::Hold, vec![7, 6, 5, 4, 3, 2, 1, 0]),
                (SessionPhase::Exhale, vec![8, 7, 6, 5, 4, 3, 2, 1, 0]),
            ]
        );
        assert_eq!(completed, Some(1));
        assert!(seq.is_completed());
        assert_eq!(seq.tick(), None);
    }

    #[test]
    fn stop_during_second_inhale_counts_one_set() {
        let (mut seq, _) = Sequencer::start(config(1, 1, 1, 2)).unwrap();
        while !(seq.current_set() == 2 && seq.phase() == SessionPhase::Inhale) {
            seq.tick().unwrap();
        }
        let summary = seq.stop();
        assert_eq!(summary.completed_sets, 1);
        assert_eq!(summary.elapsed_seconds, 6);
        assert!(seq.is_finished());
        assert_eq!(seq.tick(), None);
    }

    #[test]
    fn stop_during_first_set_reports_zero() {
        let (mut seq, _) = Sequencer::start(config(3, 3, 3, 5)).unwrap();
        seq.tick();
        assert_eq!(seq.stop().completed_sets, 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut seq, _) = Sequencer::start(config(1, 1, 1, 1)).unwrap();
        seq.tick();
        let first = seq.stop();
        seq.tick();
        assert_eq!(seq.stop(), first);
    }

    #[test]
    fn pause_discards_ticks_and_resume_continues() {
        let (mut seq, _) = Sequencer::start(config(5, 1, 1, 1)).unwrap();
        seq.tick();
        seq.tick();
        assert_eq!(seq.remaining_seconds(), 3);

        assert!(seq.pause());
        assert!(!seq.pause());
        assert_eq!(seq.tick(), None);
        assert_eq!(seq.tick(), None);
        assert_eq!(seq.remaining_seconds(), 3);
        assert_eq!(seq.elapsed_seconds(), 2);

        assert!(seq.resume());
        assert!(!seq.resume());
        assert_eq!(seq.remaining_seconds(), 3);
        assert_eq!(seq.tick(), Some(Event::Tick { remaining_seconds: 2 }));
    }

    #[test]
    fn restart_resets_position_but_not_elapsed() {
        let (mut seq, _) = Sequencer::start(config(1, 1, 1, 3)).unwrap();
        for _ in 0..7 {
            seq.tick();
        }
        assert_eq!(seq.current_set(), 2);
        seq.pause();

        let event = seq.restart().unwrap();
        assert_eq!(
            event,
            Event::PhaseEntered {
                phase: SessionPhase::Inhale,
                set: 1,
                remaining_seconds: 1
            }
        );
        assert_eq!(seq.current_set(), 1);
        assert!(!seq.is_paused());
        assert_eq!(seq.elapsed_seconds(), 7);
    }

    #[test]
    fn restart_after_stop_is_ignored() {
        let (mut seq, _) = Sequencer::start(config(1, 1, 1, 1)).unwrap();
        seq.stop();
        assert_eq!(seq.restart(), None);
        assert!(!seq.pause());
    }

    proptest! {
        #[test]
        fn phases_follow_the_cycle(
            inhale in 1u32..6,
            hold in 1u32..6,
            exhale in 1u32..6,
            sets in 1u32..5,
        ) {
            let cfg = config(inhale, hold, exhale, sets);
            let (mut seq, first) = Sequencer::start(cfg).unwrap();
            let mut events = vec![first];
            events.extend(run_to_end(&mut seq));

            let mut expected_next = SessionPhase::Inhale;
            let mut last_set = 1;
            let mut completed_sets = None;
            for event in &events {
                match *event {
                    Event::PhaseEntered { phase, set, .. } => {
                        prop_assert_eq!(phase, expected_next);
                        prop_assert!(set <= sets);
                        if phase == SessionPhase::Inhale && set != 1 {
                            prop_assert_eq!(set, last_set + 1);
                        } else {
                            prop_assert!(set == last_set || set == 1);
                        }
                        last_set = set;
                        expected_next = match phase {
                            SessionPhase::Inhale => SessionPhase::Hold,
                            SessionPhase::Hold => SessionPhase::Exhale,
                            _ => SessionPhase::Inhale,
                        };
                    }
                    Event::Tick { .. } => {}
                    Event::SessionCompleted { completed_sets: n, .. } => completed_sets = Some(n),
                }
            }

            prop_assert_eq!(completed_sets, Some(sets));
            prop_assert_eq!(last_set, sets);
            // One tick per displayed second plus one per transition.
            let ticks = u64::from(sets) * (cfg.set_duration_secs() + 3);
            prop_assert_eq!(seq.elapsed_seconds(), ticks);
            prop_assert_eq!(events.len() as u64, ticks + 1);
        }

        #[test]
        fn stop_never_counts_the_unfinished_set(
            sets in 1u32..5,
            ticks in 0usize..60,
        ) {
            let (mut seq, _) = Sequencer::start(config(2, 2, 2, sets)).unwrap();
            for _ in 0..ticks {
                seq.tick();
            }
            let was_completed = seq.is_completed();
            let set_at_stop = seq.current_set();
            let summary = seq.stop();
            if was_completed {
                prop_assert_eq!(summary.completed_sets, sets);
            } else {
                prop_assert_eq!(summary.completed_sets, set_at_stop - 1);
            }
            prop_assert!(summary.completed_sets <= sets);
        }
    }
}
