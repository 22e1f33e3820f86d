use clap::Subcommand;
use wellspring_core::model::GuidedSessionRecord;
use wellspring_core::session::{ExerciseDefinition, SessionDriver};
use wellspring_core::storage::{Config, EventStore, WellnessStore};
use wellspring_core::streak::StreakTracker;
use wellspring_core::Event;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a guided session
    Start {
        /// Exercise preset id (defaults to the configured exercise)
        #[arg(long)]
        exercise: Option<String>,
    },
    /// Pause the active session
    Pause,
    /// Resume a paused session
    Resume,
    /// Return to the initial phase with the full countdown
    Reset,
    /// Stop the session (credits the nominal duration if time was consumed)
    Stop,
    /// Advance the session by wall-clock time
    Tick,
    /// Print current session state as JSON
    Status,
}

fn driver_key(user: &str) -> String {
    format!("session_driver:{user}")
}

fn load_driver(store: &WellnessStore, user: &str) -> Option<SessionDriver> {
    let json = store.inner().kv_get(&driver_key(user)).ok()??;
    serde_json::from_str(&json).ok()
}

fn save_driver(
    store: &WellnessStore,
    user: &str,
    driver: &SessionDriver,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(driver)?;
    store.inner().kv_set(&driver_key(user), &json)?;
    Ok(())
}

/// Feed a completion event into the streak calculator and surface the
/// user-visible notice.
fn handle_completion(
    store: &WellnessStore,
    user: &str,
    event: &Event,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Event::SessionCompleted {
        exercise_id,
        exercise_type,
        credited_min,
        at,
    } = event
    {
        let record = GuidedSessionRecord::new(*at, exercise_id.clone(), *exercise_type, *credited_min);
        let goal = Config::load_or_default().goals.weekly_sessions;
        let mut tracker = StreakTracker::load(store, user, goal);
        tracker.ingest_completion(store, record)?;
        eprintln!(
            "Session complete: {exercise_id} ({credited_min} min). Streak: {} days.",
            tracker.state().current_streak
        );
    }
    Ok(())
}

fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

pub fn run(action: SessionAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;

    match action {
        SessionAction::Start { exercise } => {
            let cfg = Config::load_or_default();
            let id = exercise.unwrap_or(cfg.default_exercise);
            let definition = ExerciseDefinition::preset(&id)
                .ok_or_else(|| format!("unknown exercise preset: {id}"))?;
            let mut driver = SessionDriver::new(definition)
                .map_err(|e| format!("could not start a session: {e}"))?;
            if let Some(event) = driver.start() {
                print_events(&[event])?;
            }
            save_driver(&store, user, &driver)?;
        }
        SessionAction::Pause => {
            let mut driver =
                load_driver(&store, user).ok_or("no active session; run `session start`")?;
            let events = driver.pause();
            for event in &events {
                handle_completion(&store, user, event)?;
            }
            print_events(&events)?;
            save_driver(&store, user, &driver)?;
        }
        SessionAction::Resume => {
            let mut driver =
                load_driver(&store, user).ok_or("no active session; run `session start`")?;
            if let Some(event) = driver.resume() {
                print_events(&[event])?;
            }
            save_driver(&store, user, &driver)?;
        }
        SessionAction::Reset => {
            let mut driver =
                load_driver(&store, user).ok_or("no active session; run `session start`")?;
            if let Some(event) = driver.reset() {
                print_events(&[event])?;
            }
            save_driver(&store, user, &driver)?;
        }
        SessionAction::Stop => {
            let mut driver =
                load_driver(&store, user).ok_or("no active session; run `session start`")?;
            if let Some(event) = driver.stop() {
                handle_completion(&store, user, &event)?;
                print_events(&[event])?;
            }
            save_driver(&store, user, &driver)?;
        }
        SessionAction::Tick => {
            let mut driver =
                load_driver(&store, user).ok_or("no active session; run `session start`")?;
            let events = driver.tick();
            for event in &events {
                handle_completion(&store, user, event)?;
            }
            print_events(&events)?;
            save_driver(&store, user, &driver)?;
        }
        SessionAction::Status => match load_driver(&store, user) {
            Some(driver) => {
                println!("{}", serde_json::to_string_pretty(&driver.snapshot())?);
            }
            None => {
                let snapshot = serde_json::json!({ "state": "none" });
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
        },
    }
    Ok(())
}
