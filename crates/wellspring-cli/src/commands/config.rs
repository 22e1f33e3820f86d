use clap::Subcommand;
use wellspring_core::storage::Config;
use wellspring_core::streak::StreakTracker;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration as JSON
    Show,
    /// Set the weekly session goal
    SetGoal { sessions_per_week: u32 },
    /// Set the default exercise preset
    SetExercise { exercise_id: String },
}

pub fn run(action: ConfigAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let cfg = Config::load_or_default();
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::SetGoal { sessions_per_week } => {
            let mut cfg = Config::load_or_default();
            cfg.goals.weekly_sessions = sessions_per_week;
            cfg.save()?;

            // Keep the persisted aggregate's goal in step with config.
            let store = super::open_store()?;
            let mut tracker = StreakTracker::load(&store, user, sessions_per_week);
            tracker.set_weekly_goal(&store, sessions_per_week)?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::SetExercise { exercise_id } => {
            use wellspring_core::session::ExerciseDefinition;
            if ExerciseDefinition::preset(&exercise_id).is_none() {
                return Err(format!("unknown exercise preset: {exercise_id}").into());
            }
            let mut cfg = Config::load_or_default();
            cfg.default_exercise = exercise_id;
            cfg.save()?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }
    Ok(())
}
