use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::settings::AudioSettings;
use crate::events::Event;
use crate::session::SessionPhase;

/// Phrase spoken when the last set finishes.
pub const COMPLETION_PHRASE: &str = "Well done";

/// A short sine cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
    /// Offset from the start of the cue.
    pub delay_ms: u32,
}

impl Tone {
    const fn new(frequency_hz: u32, duration_ms: u32, delay_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
            delay_ms,
        }
    }

    pub const TICK: Tone = Tone::new(1000, 50, 0);

    /// Rising pair for inhale, single tone for hold, falling pair for exhale.
    pub fn transition(phase: SessionPhase) -> &'static [Tone] {
        const INHALE: [Tone; 2] = [Tone::new(600, 200, 0), Tone::new(800, 200, 100)];
        const HOLD: [Tone; 1] = [Tone::new(700, 150, 0)];
        const EXHALE: [Tone; 2] = [Tone::new(800, 250, 0), Tone::new(600, 250, 100)];
        match phase {
            SessionPhase::Inhale => &INHALE,
            SessionPhase::Hold => &HOLD,
            SessionPhase::Exhale => &EXHALE,
            SessionPhase::Idle => &[],
        }
    }
}

/// Output device seam: tone generator plus text-to-speech.
///
/// Implementations must return quickly; queue work rather than block.
pub trait AudioSink: Send {
    fn play_tone(&mut self, tone: Tone, gain: f32);
    fn speak(&mut self, text: &str, gain: f32);
    fn stop_speaking(&mut self) {}
}

/// Receives session events that should produce sound.
pub trait AudioNotifier: Send {
    fn on_phase_entered(&mut self, phase: SessionPhase, text: &str);
    fn on_tick(&mut self, remaining_seconds: u32);
    fn on_session_completed(&mut self, _completed_sets: u32, _elapsed_seconds: u64) {}
    /// The user paused. Nothing here comes from the event stream.
    fn on_paused(&mut self) {}
}

/// Route one event to the notifier.
pub fn dispatch(event: &Event, notifier: &mut dyn AudioNotifier) {
    match *event {
        Event::PhaseEntered { phase, .. } => notifier.on_phase_entered(phase, phase.cue_text()),
        Event::Tick { remaining_seconds } => notifier.on_tick(remaining_seconds),
        Event::SessionCompleted {
            completed_sets,
            elapsed_seconds,
        } => notifier.on_session_completed(completed_sets, elapsed_seconds),
    }
}

/// Forward events until the channel closes, then hand the notifier back.
pub async fn run_dispatcher<N: AudioNotifier>(
    mut events: mpsc::UnboundedReceiver<Event>,
    mut notifier: N,
) -> N {
    while let Some(event) = events.recv().await {
        dispatch(&event, &mut notifier);
    }
    notifier
}

/// Notifier that plays the standard cues through an [`AudioSink`],
/// honouring the current [`AudioSettings`].
pub struct CueNotifier<S> {
    sink: S,
    settings: Arc<RwLock<AudioSettings>>,
}

impl<S: AudioSink> CueNotifier<S> {
    pub fn new(sink: S, settings: Arc<RwLock<AudioSettings>>) -> Self {
        Self { sink, settings }
    }

    pub fn settings(&self) -> Arc<RwLock<AudioSettings>> {
        Arc::clone(&self.settings)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn play(&mut self, tones: &[Tone]) {
        let settings = self.settings.read().clone();
        if !settings.sound_effects || settings.is_muted() {
            return;
        }
        for tone in tones {
            self.sink.play_tone(*tone, settings.gain());
        }
    }

    fn say(&mut self, text: &str) {
        let settings = self.settings.read().clone();
        if !settings.voice_guide || settings.is_muted() {
            return;
        }
        // A new phrase replaces whatever is still being spoken.
        self.sink.stop_speaking();
        self.sink.speak(text, settings.gain());
    }
}

impl<S: AudioSink> AudioNotifier for CueNotifier<S> {
    fn on_phase_entered(&mut self, phase: SessionPhase, text: &str) {
        self.play(Tone::transition(phase));
        self.say(text);
    }

    fn on_tick(&mut self, _remaining_seconds: u32) {
        self.play(&[Tone::TICK]);
    }

    fn on_session_completed(&mut self, _completed_sets: u32, _elapsed_seconds: u64) {
        self.say(COMPLETION_PHRASE);
    }

    fn on_paused(&mut self) {
        self.sink.stop_speaking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        tones: Vec<(Tone, f32)>,
        spoken: Vec<String>,
        interrupted: usize,
    }

    impl AudioSink for RecordingSink {
        fn play_tone(&mut self, tone: Tone, gain: f32) {
            self.tones.push((tone, gain));
        }
        fn speak(&mut self, text: &str, _gain: f32) {
            self.spoken.push(text.to_string());
        }
        fn stop_speaking(&mut self) {
            self.interrupted += 1;
        }
    }

    fn notifier(settings: AudioSettings) -> CueNotifier<RecordingSink> {
        CueNotifier::new(RecordingSink::default(), Arc::new(RwLock::new(settings)))
    }

    #[test]
    fn phase_entry_plays_transition_and_speaks() {
        let mut n = notifier(AudioSettings::default());
        dispatch(
            &Event::PhaseEntered {
                phase: SessionPhase::Exhale,
                set: 1,
                remaining_seconds: 8,
            },
            &mut n,
        );
        let sink = n.into_sink();
        let freqs: Vec<u32> = sink.tones.iter().map(|(t, _)| t.frequency_hz).collect();
        assert_eq!(freqs, vec![800, 600]);
        assert!((sink.tones[0].1 - 0.6).abs() < 1e-6);
        assert_eq!(sink.spoken, vec!["Breathe out".to_string()]);
    }

    #[test]
    fn ticks_only_play_a_tone() {
        let mut n = notifier(AudioSettings::default());
        dispatch(&Event::Tick { remaining_seconds: 3 }, &mut n);
        let sink = n.into_sink();
        assert_eq!(sink.tones.len(), 1);
        assert_eq!(sink.tones[0].0, Tone::TICK);
        assert!(sink.spoken.is_empty());
    }

    #[test]
    fn toggles_mute_their_channel_independently() {
        let mut n = notifier(AudioSettings {
            sound_effects: false,
            ..AudioSettings::default()
        });
        n.on_phase_entered(SessionPhase::Inhale, "Breathe in");
        n.on_tick(2);
        assert!(n.sink().tones.is_empty());
        assert_eq!(n.sink().spoken.len(), 1);

        let mut n = notifier(AudioSettings {
            voice_guide: false,
            ..AudioSettings::default()
        });
        n.on_phase_entered(SessionPhase::Hold, "Hold");
        n.on_session_completed(4, 120);
        assert_eq!(n.sink().tones.len(), 1);
        assert!(n.sink().spoken.is_empty());
    }

    #[test]
    fn settings_changes_apply_mid_session() {
        let mut n = notifier(AudioSettings::default());
        let settings = n.settings();
        n.on_tick(5);
        settings.write().volume = 0;
        n.on_tick(4);
        settings.write().volume = 100;
        n.on_tick(3);
        let gains: Vec<f32> = n.sink().tones.iter().map(|(_, g)| *g).collect();
        assert_eq!(gains.len(), 2);
        assert!((gains[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pausing_cuts_speech_even_when_muted() {
        let mut n = notifier(AudioSettings::default());
        n.on_phase_entered(SessionPhase::Inhale, "Breathe in");
        assert_eq!(n.sink().interrupted, 1);
        n.on_paused();
        assert_eq!(n.sink().interrupted, 2);

        n.settings().write().voice_guide = false;
        n.on_paused();
        assert_eq!(n.sink().interrupted, 3);
        assert_eq!(n.sink().spoken.len(), 1);
        assert_eq!(n.sink().tones.len(), 2);
    }

    #[tokio::test]
    async fn dispatcher_drains_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Event::PhaseEntered {
            phase: SessionPhase::Inhale,
            set: 1,
            remaining_seconds: 1,
        })
        .unwrap();
        tx.send(Event::Tick { remaining_seconds: 0 }).unwrap();
        tx.send(Event::SessionCompleted {
            completed_sets: 1,
            elapsed_seconds: 6,
        })
        .unwrap();
        drop(tx);

        let n = run_dispatcher(rx, notifier(AudioSettings::default())).await;
        assert_eq!(
            n.sink().spoken,
            vec!["Breathe in".to_string(), COMPLETION_PHRASE.to_string()]
        );
        assert_eq!(n.sink().tones.len(), 3);
    }
}
