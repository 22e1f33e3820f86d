use chrono::Utc;
use clap::Subcommand;
use wellspring_core::model::JournalRecord;

#[derive(Subcommand)]
pub enum JournalAction {
    /// Add a journal entry
    Add {
        title: String,
        /// Entry body
        #[arg(long, default_value = "")]
        body: String,
    },
    /// List journal entries as JSON
    List,
}

pub fn run(action: JournalAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;

    match action {
        JournalAction::Add { title, body } => {
            let record = JournalRecord::new(Utc::now(), title, body);
            store.add_journal(user, record)?;
            println!("{}", serde_json::to_string_pretty(&store.journals(user))?);
        }
        JournalAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.journals(user))?);
        }
    }
    Ok(())
}
