use clap::Subcommand;
use breathwork_core::{default_presets, BreathingConfig, BreathingStore};

use super::parse_practical;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List built-in and saved presets
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Save a user preset (replaces one with the same name)
    Save {
        /// Preset name
        name: String,
        #[arg(long, value_parser = parse_practical)]
        inhale: u32,
        #[arg(long, value_parser = parse_practical)]
        hold: u32,
        #[arg(long, value_parser = parse_practical)]
        exhale: u32,
        #[arg(long, value_parser = parse_practical)]
        sets: u32,
    },
    /// Delete a user preset
    Delete {
        /// Preset name
        name: String,
    },
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = BreathingStore::open()?;
    let defaults = default_presets();

    match action {
        PresetAction::List { json } => {
            let presets = store.get_presets(&defaults);
            if json {
                println!("{}", serde_json::to_string_pretty(&presets)?);
            } else {
                for preset in presets {
                    let marker = if preset.is_default { "built-in" } else { "saved" };
                    println!(
                        "{:<28} {:>8} x{:<3} ({marker})",
                        preset.name,
                        preset.config.pattern(),
                        preset.config.sets
                    );
                }
            }
        }
        PresetAction::Save {
            name,
            inhale,
            hold,
            exhale,
            sets,
        } => {
            let config = BreathingConfig::new(inhale, hold, exhale, sets)?;
            store.save_preset(&defaults, &name, config)?;
            println!("saved preset '{}' ({})", name.trim(), config.pattern());
        }
        PresetAction::Delete { name } => {
            if !store.delete_preset(&name)? {
                return Err(format!("no saved preset named '{name}'").into());
            }
            println!("deleted preset '{name}'");
        }
    }
    Ok(())
}
