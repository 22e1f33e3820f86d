//! Activity record types.
//!
//! Every user action relevant to wellness tracking is logged as one of four
//! timestamped record kinds: mood logs, journal entries, habit day-statuses
//! and completed guided sessions. The collections are append-mostly; undo
//! is modeled as mutating a record in place (e.g. un-toggling a habit),
//! never as a separate delete event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mood scale. Ordered best-to-worst; `score()` gives the ordinal used by
/// the trend metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodValue {
    Amazing,
    Good,
    Okay,
    Sad,
    Awful,
}

impl MoodValue {
    /// Ordinal score 1 (Awful) to 5 (Amazing).
    pub fn score(&self) -> u8 {
        match self {
            MoodValue::Amazing => 5,
            MoodValue::Good => 4,
            MoodValue::Okay => 3,
            MoodValue::Sad => 2,
            MoodValue::Awful => 1,
        }
    }
}

/// One mood log. At most one record logically represents "today's mood";
/// logging twice on the same calendar day upserts rather than appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub value: MoodValue,
    #[serde(default)]
    pub note: Option<String>,
}

impl MoodRecord {
    pub fn new(timestamp: DateTime<Utc>, value: MoodValue, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            value,
            note,
        }
    }
}

/// One journal entry. The text is owned by the journaling surface; the
/// insights engine only cares that an entry exists on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl JournalRecord {
    pub fn new(timestamp: DateTime<Utc>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// One calendar day's status for one habit. Records sharing a
/// `habit_name` form that habit's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub habit_name: String,
    pub completed: bool,
    /// Weekly goal for this habit, in days per week.
    pub target_days_per_week: u32,
}

impl HabitRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        habit_name: impl Into<String>,
        completed: bool,
        target_days_per_week: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            habit_name: habit_name.into(),
            completed,
            target_days_per_week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Breathing,
    Mindfulness,
}

/// A completed guided session. `duration_min` is the credited duration --
/// the exercise's nominal length, even when the session was stopped early.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidedSessionRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub exercise_id: String,
    pub exercise_type: ExerciseType,
    pub duration_min: u64,
}

impl GuidedSessionRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        exercise_id: impl Into<String>,
        exercise_type: ExerciseType,
        duration_min: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            exercise_id: exercise_id.into(),
            exercise_type,
            duration_min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_scores_are_ordinal() {
        assert_eq!(MoodValue::Amazing.score(), 5);
        assert_eq!(MoodValue::Good.score(), 4);
        assert_eq!(MoodValue::Okay.score(), 3);
        assert_eq!(MoodValue::Sad.score(), 2);
        assert_eq!(MoodValue::Awful.score(), 1);
    }

    #[test]
    fn records_get_unique_ids() {
        let now = Utc::now();
        let a = MoodRecord::new(now, MoodValue::Good, None);
        let b = MoodRecord::new(now, MoodValue::Good, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn session_record_roundtrip() {
        let rec = GuidedSessionRecord::new(Utc::now(), "box-breathing", ExerciseType::Breathing, 10);
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: GuidedSessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.exercise_id, "box-breathing");
        assert_eq!(parsed.exercise_type, ExerciseType::Breathing);
        assert_eq!(parsed.duration_min, 10);
    }
}
