use chrono::Utc;
use clap::Subcommand;
use wellspring_core::model::HabitRecord;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Record today's status for a habit (same-day re-log mutates in place)
    Log {
        name: String,
        /// Mark the habit incomplete instead of complete
        #[arg(long)]
        undone: bool,
        /// Weekly target in days
        #[arg(long, default_value = "5")]
        target: u32,
    },
    /// List habit records as JSON
    List,
}

pub fn run(action: HabitAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;

    match action {
        HabitAction::Log {
            name,
            undone,
            target,
        } => {
            let record = HabitRecord::new(Utc::now(), name, !undone, target);
            store.log_habit(user, record)?;
            println!("{}", serde_json::to_string_pretty(&store.habits(user))?);
        }
        HabitAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.habits(user))?);
        }
    }
    Ok(())
}
