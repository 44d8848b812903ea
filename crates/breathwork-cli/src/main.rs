use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "breathwork", version, about = "Guided breathing sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a guided breathing session
    Run(commands::run::RunArgs),
    /// Breathing preset management
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Session history and statistics
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Audio cue settings
    Audio {
        #[command(subcommand)]
        action: commands::audio::AudioAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "breathwork={level},breathwork_core={level}"
        ))
    });

    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let config = breathwork_core::Config::load_or_default();
    init_logging(&config.logging.level);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, &config),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Audio { action } => commands::audio::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
