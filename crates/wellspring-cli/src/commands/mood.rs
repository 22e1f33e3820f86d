use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use wellspring_core::model::{MoodRecord, MoodValue};

#[derive(Clone, Copy, ValueEnum)]
pub enum MoodArg {
    Amazing,
    Good,
    Okay,
    Sad,
    Awful,
}

impl From<MoodArg> for MoodValue {
    fn from(arg: MoodArg) -> Self {
        match arg {
            MoodArg::Amazing => MoodValue::Amazing,
            MoodArg::Good => MoodValue::Good,
            MoodArg::Okay => MoodValue::Okay,
            MoodArg::Sad => MoodValue::Sad,
            MoodArg::Awful => MoodValue::Awful,
        }
    }
}

#[derive(Subcommand)]
pub enum MoodAction {
    /// Log today's mood (replaces an earlier entry for the same day)
    Log {
        value: MoodArg,
        /// Optional free-text note
        #[arg(long)]
        note: Option<String>,
    },
    /// List logged moods as JSON
    List,
}

pub fn run(action: MoodAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;

    match action {
        MoodAction::Log { value, note } => {
            let record = MoodRecord::new(Utc::now(), value.into(), note);
            store.log_mood(user, record)?;
            println!("{}", serde_json::to_string_pretty(&store.moods(user))?);
        }
        MoodAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.moods(user))?);
        }
    }
    Ok(())
}
