pub mod config;
pub mod exercises;
pub mod habit;
pub mod insights;
pub mod journal;
pub mod mood;
pub mod session;
pub mod stats;
pub mod watch;

use std::rc::Rc;

use wellspring_core::notify::ChangeHub;
use wellspring_core::storage::{Database, WellnessStore};

/// Open the shared store with a hub that traces collection changes.
pub fn open_store() -> Result<WellnessStore, Box<dyn std::error::Error>> {
    let hub = Rc::new(ChangeHub::new());
    hub.subscribe(|key| log::debug!("collection changed: {key}"));
    let db = Database::open()?;
    Ok(WellnessStore::new(Box::new(db), hub))
}
