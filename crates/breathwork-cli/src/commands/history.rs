use chrono::{Local, Utc};
use clap::Subcommand;
use breathwork_core::stats::{
    format_day_label, format_duration, format_duration_short, format_time_of_day, group_by_day,
};
use breathwork_core::{today_session_count, weekly_stats, BreathingStore};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, grouped by day
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Statistics for the last seven days
    Stats,
    /// Number of sessions recorded today
    Today,
    /// Delete all recorded sessions
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = BreathingStore::open()?;

    match action {
        HistoryAction::List { json } => {
            let history = store.get_history();
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
                return Ok(());
            }
            if history.is_empty() {
                println!("no sessions yet");
                return Ok(());
            }
            let today = Local::now().date_naive();
            for group in group_by_day(&history, &Local) {
                println!("{}", format_day_label(group.day, today));
                for record in &group.records {
                    let local = record.date.with_timezone(&Local);
                    let name = record.preset_name.as_deref().unwrap_or("custom");
                    println!(
                        "  {:>8}  {:<8} {} sets  {:<8} {name}",
                        format_time_of_day(local.time()),
                        record.pattern,
                        record.sets,
                        format_duration(record.duration),
                    );
                }
            }
        }
        HistoryAction::Stats => {
            let stats = weekly_stats(&store.get_history(), Utc::now());
            eprintln!(
                "{} sessions, {} this week (most used: {})",
                stats.total_sessions,
                format_duration_short(stats.total_duration_secs),
                stats.most_used_pattern.as_deref().unwrap_or("N/A")
            );
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        HistoryAction::Today => {
            let count = today_session_count(&store.get_history(), &Local::now());
            println!("{count}");
        }
        HistoryAction::Clear => {
            let removed = store.clear_history()?;
            println!("removed {removed} sessions");
        }
    }
    Ok(())
}
