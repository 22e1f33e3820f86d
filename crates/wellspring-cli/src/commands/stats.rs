use chrono::Utc;
use clap::Subcommand;
use wellspring_core::storage::Config;
use wellspring_core::streak::StreakTracker;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current and best streak plus session totals
    Streak,
    /// Progress against the weekly session goal
    Weekly,
}

pub fn run(action: StatsAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;
    let goal = Config::load_or_default().goals.weekly_sessions;
    let tracker = StreakTracker::load(&store, user, goal);

    match action {
        StatsAction::Streak => {
            println!("{}", serde_json::to_string_pretty(tracker.state())?);
        }
        StatsAction::Weekly => {
            let progress = tracker.weekly_progress(&store, Utc::now());
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
    }
    Ok(())
}
