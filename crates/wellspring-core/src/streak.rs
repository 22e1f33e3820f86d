//! Streak & goal calculator.
//!
//! Maintains the running session aggregates incrementally as completions
//! arrive, and answers weekly-goal progress queries. The aggregate is
//! derived state: it is persisted for cheap reads but always
//! reconstructible from the session log.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{GuidedSessionRecord, HabitRecord};
use crate::storage::{EventStore, WellnessStore};

/// Running session aggregates for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive calendar days ending at the most recent completion.
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_sessions: u64,
    pub total_minutes: u64,
    /// Sessions-per-week target.
    pub weekly_goal: u32,
    pub last_completion_day: Option<NaiveDate>,
}

impl StreakState {
    pub fn new(weekly_goal: u32) -> Self {
        Self {
            current_streak: 0,
            best_streak: 0,
            total_sessions: 0,
            total_minutes: 0,
            weekly_goal,
            last_completion_day: None,
        }
    }
}

/// Weekly-goal progress for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub count: u32,
    pub goal: u32,
    pub remaining: u32,
    /// `min(100, round(count / goal * 100))`; 0 when the goal is 0.
    pub percent: u32,
}

fn state_key(user: &str) -> String {
    format!("streak:{user}")
}

/// Start of the ISO week (Monday 00:00 UTC) containing `now`.
fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    monday.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Streak tracker for a single user.
pub struct StreakTracker {
    user: String,
    state: StreakState,
}

impl StreakTracker {
    /// Load persisted state, falling back to a fresh aggregate with the
    /// given weekly goal. Damage degrades to fresh, never to an error.
    pub fn load(store: &WellnessStore, user: &str, weekly_goal: u32) -> Self {
        let state = match store.inner().kv_get(&state_key(user)) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(state) => state,
                Err(e) => {
                    warn!("streak state for '{user}' is malformed: {e}; starting fresh");
                    StreakState::new(weekly_goal)
                }
            },
            Ok(None) => StreakState::new(weekly_goal),
            Err(e) => {
                warn!("failed to load streak state for '{user}': {e}; starting fresh");
                StreakState::new(weekly_goal)
            }
        };
        Self {
            user: user.to_string(),
            state,
        }
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn set_weekly_goal(&mut self, store: &WellnessStore, goal: u32) -> Result<(), StoreError> {
        self.state.weekly_goal = goal;
        self.persist(store)
    }

    /// Ingest one guided-session completion: append it to the session log,
    /// bump totals, and advance the calendar-day streak.
    ///
    /// Streak rules relative to the previous completion day:
    /// same day -> unchanged; exactly the next day -> `+1`; a gap of more
    /// than one day -> reset to 1 (never merely paused).
    pub fn ingest_completion(
        &mut self,
        store: &WellnessStore,
        record: GuidedSessionRecord,
    ) -> Result<(), StoreError> {
        let day = record.timestamp.date_naive();
        store.append_session(&self.user, record.clone())?;

        self.state.total_sessions += 1;
        self.state.total_minutes += record.duration_min;

        match self.state.last_completion_day {
            Some(prev) if prev == day => {}
            Some(prev) if day == prev + Duration::days(1) => {
                self.state.current_streak += 1;
            }
            _ => {
                self.state.current_streak = 1;
            }
        }
        self.state.best_streak = self.state.best_streak.max(self.state.current_streak);
        self.state.last_completion_day = Some(day);

        self.persist(store)
    }

    /// Sessions completed in the ISO week containing `now`, against the
    /// weekly goal.
    pub fn weekly_progress(&self, store: &WellnessStore, now: DateTime<Utc>) -> WeeklyProgress {
        let start = start_of_week(now);
        let end = start + Duration::days(7);
        let count = store.sessions_between(&self.user, start, end).len() as u32;

        let goal = self.state.weekly_goal;
        let percent = if goal == 0 {
            0
        } else {
            (((count as f64 / goal as f64) * 100.0).round() as u32).min(100)
        };
        WeeklyProgress {
            count,
            goal,
            remaining: goal.saturating_sub(count),
            percent,
        }
    }

    fn persist(&self, store: &WellnessStore) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.state)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        store.inner().kv_set(&state_key(&self.user), &json)
    }
}

/// Longest run of consecutive completed records for one habit, expressed as
/// a percentage of a 7-day reference window, capped at 100.
///
/// Records are one habit's history; they are sorted by date ascending
/// before scanning.
pub fn habit_streak_percent(records: &[HabitRecord]) -> u32 {
    if records.is_empty() {
        return 0;
    }
    let mut sorted: Vec<&HabitRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let mut longest = 0u32;
    let mut run = 0u32;
    for record in sorted {
        if record.completed {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    (((longest as f64 / 7.0) * 100.0).round() as u32).min(100)
}
