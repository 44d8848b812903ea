use std::io::Write;
use std::sync::Arc;

use chrono::{Local, Utc};
use clap::Args;
use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use breathwork_core::audio::{dispatch, CueNotifier};
use breathwork_core::presets::find_preset;
use breathwork_core::stats::format_duration;
use breathwork_core::{
    default_presets, today_session_count, AudioNotifier, AudioSink, BreathingConfig,
    BreathingStore, Config, Event, HarnessOptions, SessionHandle, Tone, ValidationError,
};

use super::parse_practical;

const CONTROLS_HELP: &str = "p pause, r resume, s restart, q stop";

#[derive(Args)]
pub struct RunArgs {
    /// Start from a named preset (built-in or saved)
    #[arg(long)]
    pub preset: Option<String>,
    /// Inhale seconds
    #[arg(long, value_parser = parse_practical)]
    pub inhale: Option<u32>,
    /// Hold seconds
    #[arg(long, value_parser = parse_practical)]
    pub hold: Option<u32>,
    /// Exhale seconds
    #[arg(long, value_parser = parse_practical)]
    pub exhale: Option<u32>,
    /// Number of sets
    #[arg(long, value_parser = parse_practical)]
    pub sets: Option<u32>,
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    fn has_overrides(&self) -> bool {
        self.inhale.is_some() || self.hold.is_some() || self.exhale.is_some() || self.sets.is_some()
    }

    fn apply(&self, base: BreathingConfig) -> Result<BreathingConfig, ValidationError> {
        BreathingConfig::new(
            self.inhale.unwrap_or(base.inhale),
            self.hold.unwrap_or(base.hold),
            self.exhale.unwrap_or(base.exhale),
            self.sets.unwrap_or(base.sets),
        )
    }
}

/// One line typed on stdin while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Pause,
    Resume,
    Restart,
    Stop,
}

impl Control {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "s" | "restart" => Some(Self::Restart),
            "q" | "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Terminal stand-in for a tone generator: rings the bell once per cue.
struct TerminalSink;

impl AudioSink for TerminalSink {
    fn play_tone(&mut self, tone: Tone, gain: f32) {
        // Only the first tone of a cue rings; the rest are offset harmonics.
        if tone.delay_ms == 0 {
            let mut err = std::io::stderr();
            let _ = err.write_all(b"\x07");
            let _ = err.flush();
        }
        tracing::trace!(hz = tone.frequency_hz, ms = tone.duration_ms, gain, "tone");
    }

    fn speak(&mut self, text: &str, gain: f32) {
        tracing::debug!(gain, "voice: {text}");
    }

    fn stop_speaking(&mut self) {
        tracing::trace!("voice interrupted");
    }
}

type SharedNotifier = Arc<Mutex<CueNotifier<TerminalSink>>>;

fn render(event: &Event, total_sets: u32, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!("cannot render event: {e}"),
        }
        return;
    }
    match *event {
        Event::PhaseEntered {
            phase,
            set,
            remaining_seconds,
        } => println!(
            "[set {set}/{total_sets}] {} ({remaining_seconds}s)",
            phase.cue_text()
        ),
        Event::Tick { remaining_seconds } => println!("  {remaining_seconds}"),
        Event::SessionCompleted { .. } => println!("Session complete"),
    }
}

/// Apply a control line. Text-mode notes go to stdout so they interleave
/// with the countdown; JSON mode keeps stdout to events only.
fn apply_control(control: Control, handle: &SessionHandle, notifier: &SharedNotifier, json: bool) {
    tracing::debug!(?control, "session control");
    let note = match control {
        Control::Pause => {
            if !handle.pause() {
                return;
            }
            notifier.lock().on_paused();
            "Paused"
        }
        Control::Resume => {
            if !handle.resume() {
                return;
            }
            "Resumed"
        }
        Control::Restart => {
            if !handle.restart() {
                return;
            }
            "Restarted from set 1"
        }
        Control::Stop => {
            handle.stop();
            return;
        }
    };
    if !json {
        println!("{note} ({CONTROLS_HELP})");
    }
}

/// Drive the session until it completes, `q` is typed or Ctrl-C arrives.
async fn control_loop(handle: &SessionHandle, notifier: &SharedNotifier, json: bool) {
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    let mut listening = true;
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            _ = handle.finished() => break,
            signal = &mut ctrl_c, if listening => match signal {
                Ok(()) => {
                    handle.stop();
                    break;
                }
                Err(e) => {
                    tracing::warn!("cannot listen for Ctrl-C: {e}");
                    listening = false;
                }
            },
            line = input.next_line(), if input_open => match line {
                Ok(Some(line)) => match Control::parse(&line) {
                    Some(control) => apply_control(control, handle, notifier, json),
                    None if line.trim().is_empty() => {}
                    None => eprintln!("unknown control '{}' ({CONTROLS_HELP})", line.trim()),
                },
                Ok(None) => input_open = false,
                Err(e) => {
                    tracing::warn!("stdin unavailable: {e}");
                    input_open = false;
                }
            },
        }
    }
}

/// Resolve the pattern: preset, then explicit flags, then configured defaults.
fn resolve(
    args: &RunArgs,
    config: &Config,
    store: &BreathingStore,
) -> Result<(BreathingConfig, Option<String>), Box<dyn std::error::Error>> {
    if let Some(name) = &args.preset {
        let presets = store.get_presets(&default_presets());
        let preset =
            find_preset(&presets, name).ok_or_else(|| format!("unknown preset '{name}'"))?;
        let breathing = args.apply(preset.config)?;
        let label = if args.has_overrides() {
            None
        } else {
            Some(preset.name.clone())
        };
        return Ok((breathing, label));
    }
    Ok((args.apply(config.breathing_config()?)?, None))
}

pub fn run(args: RunArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = BreathingStore::open()?;
    let (breathing, preset_name) = resolve(&args, config, &store)?;
    let settings = Arc::new(RwLock::new(store.get_audio_settings()));
    let json = args.json;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let total_sets = breathing.sets;
        let notifier: SharedNotifier = Arc::new(Mutex::new(CueNotifier::new(
            TerminalSink,
            Arc::clone(&settings),
        )));
        let renderer = tokio::spawn({
            let notifier = Arc::clone(&notifier);
            async move {
                while let Some(event) = rx.recv().await {
                    render(&event, total_sets, json);
                    dispatch(&event, &mut *notifier.lock());
                }
            }
        });

        let handle = SessionHandle::spawn(breathing, HarnessOptions::default(), tx)?;
        if !json {
            println!("Controls: {CONTROLS_HELP}, then Enter");
        }
        control_loop(&handle, &notifier, json).await;

        let outcome = handle.wait().await;
        if let Err(e) = renderer.await {
            tracing::warn!("event renderer failed: {e}");
        }
        Ok::<_, breathwork_core::CoreError>(outcome)
    });
    // A pending read on an interactive stdin would otherwise block shutdown.
    runtime.shutdown_background();
    let outcome = result?;

    let summary = &outcome.summary;
    if let Err(e) = store.record_session(summary, preset_name, Utc::now()) {
        tracing::warn!("session not saved: {e}");
    }

    if !json {
        let heading = if outcome.completed {
            "Well done!"
        } else {
            "Session stopped"
        };
        println!();
        println!("{heading}");
        println!(
            "  {} of {} sets ({}) in {}",
            summary.completed_sets,
            summary.config.sets,
            summary.config.pattern(),
            format_duration(summary.elapsed_seconds)
        );
        let today = today_session_count(&store.get_history(), &Local::now());
        println!("  Sessions today: {today}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_lines_accept_letters_and_words() {
        assert_eq!(Control::parse("p"), Some(Control::Pause));
        assert_eq!(Control::parse("  Resume \n"), Some(Control::Resume));
        assert_eq!(Control::parse("s"), Some(Control::Restart));
        assert_eq!(Control::parse("Q"), Some(Control::Stop));
        assert_eq!(Control::parse("stop"), Some(Control::Stop));
        assert_eq!(Control::parse(""), None);
        assert_eq!(Control::parse("x"), None);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let args = RunArgs {
            preset: None,
            inhale: None,
            hold: Some(2),
            exhale: None,
            sets: Some(1),
            json: false,
        };
        assert!(args.has_overrides());
        let cfg = args.apply(BreathingConfig::default()).unwrap();
        assert_eq!(cfg.pattern(), "4-2-8");
        assert_eq!(cfg.sets, 1);
    }
}
