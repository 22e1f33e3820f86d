use std::time::Duration;

use chrono::Utc;
use wellspring_core::notify::RevisionPoller;
use wellspring_core::storage::{collection, Config};
use wellspring_core::Event;

/// Watch the user's collections for out-of-band writes (another process
/// sharing the database) and print a change event per moved collection.
///
/// Polls at `poll_interval_secs` from config unless overridden. `--once`
/// primes, polls a single time and exits; useful for scripting and smoke
/// tests.
pub fn run(user: &str, interval: Option<u64>, once: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;
    let interval = interval
        .unwrap_or_else(|| Config::load_or_default().poll_interval_secs)
        .max(1);

    let poller = RevisionPoller::new(collection::all(user));
    poller.prime(store.inner());

    loop {
        if !once {
            std::thread::sleep(Duration::from_secs(interval));
        }
        for key in poller.poll(store.inner(), store.hub()) {
            let event = Event::CollectionChanged {
                collection: key,
                at: Utc::now(),
            };
            println!("{}", serde_json::to_string(&event)?);
        }
        if once {
            return Ok(());
        }
    }
}
