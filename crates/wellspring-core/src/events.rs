use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ExerciseType;
use crate::session::{BreathPhase, DriverState};

/// Every observable state change in the session driver produces an Event.
/// The CLI prints them; the completion variant is what the streak
/// calculator ingests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        exercise_id: String,
        exercise_type: ExerciseType,
        duration_min: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// Breathing cycle moved to the next phase.
    PhaseAdvanced {
        phase: BreathPhase,
        /// Completed breath cycles so far.
        cycles: u32,
        at: DateTime<Utc>,
    },
    /// Mindfulness sequence moved to the next step (wraps to 0).
    StepAdvanced {
        step_index: usize,
        step_title: String,
        at: DateTime<Utc>,
    },
    /// Session finished, naturally or via an early stop with time consumed.
    /// `credited_min` is always the exercise's nominal duration.
    SessionCompleted {
        exercise_id: String,
        exercise_type: ExerciseType,
        credited_min: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: DriverState,
        exercise_id: String,
        exercise_type: ExerciseType,
        phase: Option<BreathPhase>,
        step_index: Option<usize>,
        breath_cycles: u32,
        phase_remaining_ms: u64,
        session_remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A stored collection changed out of band, detected by the revision
    /// poller; carries only the collection key.
    CollectionChanged {
        collection: String,
        at: DateTime<Utc>,
    },
}
