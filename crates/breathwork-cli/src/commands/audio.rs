use clap::Subcommand;
use breathwork_core::{BackgroundSound, BreathingStore};

#[derive(Subcommand)]
pub enum AudioAction {
    /// Print current audio settings as JSON
    Show,
    /// Change audio settings
    Set {
        /// Volume, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
        /// Speak phase instructions
        #[arg(long)]
        voice_guide: Option<bool>,
        /// Play transition and tick tones
        #[arg(long)]
        sound_effects: Option<bool>,
        /// none, waves, rain or whitenoise
        #[arg(long)]
        background: Option<BackgroundSound>,
    },
}

pub fn run(action: AudioAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = BreathingStore::open()?;

    match action {
        AudioAction::Show => {
            let settings = store.get_audio_settings();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        AudioAction::Set {
            volume,
            voice_guide,
            sound_effects,
            background,
        } => {
            let mut settings = store.get_audio_settings();
            if let Some(volume) = volume {
                settings = settings.with_volume(volume);
            }
            if let Some(voice_guide) = voice_guide {
                settings.voice_guide = voice_guide;
            }
            if let Some(sound_effects) = sound_effects {
                settings.sound_effects = sound_effects;
            }
            if let Some(background) = background {
                settings.background_sound = background;
            }
            store.save_audio_settings(&settings)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
