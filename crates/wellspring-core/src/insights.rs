//! Insights aggregator.
//!
//! Turns the raw activity logs into the composite display metrics: mood
//! trend, journal consistency, habit streak percentage and the weighted
//! activity level. Every metric is a pure function of one collection and a
//! reference instant, recomputed fresh per query and never persisted.
//!
//! Degradation contract: any subset of the collections may be absent,
//! empty, or corrupt; every metric still returns a finite value inside its
//! documented bounds (trend in [-50, 50], everything else in [0, 100]).

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{HabitRecord, JournalRecord, MoodRecord};
use crate::storage::WellnessStore;
use crate::streak::habit_streak_percent;

/// Composite wellbeing metrics for one user at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeInsight {
    /// Percent change in mean mood between the current and prior 7-day
    /// windows, clamped to [-50, 50].
    pub mood_trend_percent: i32,
    /// Distinct journaling days over the trailing 7, as a percentage.
    pub journal_consistency_percent: u32,
    /// Mean of the per-habit streak percentages.
    pub habit_streak_percent: u32,
    /// Weighted blend of habit completion, journaling and mood engagement.
    pub activity_level_percent: u32,
}

const TREND_MIN: i32 = -50;
const TREND_MAX: i32 = 50;

fn mean_score(moods: &[&MoodRecord]) -> f64 {
    if moods.is_empty() {
        return 0.0;
    }
    let sum: u32 = moods.iter().map(|m| m.value.score() as u32).sum();
    sum as f64 / moods.len() as f64
}

/// Percent change in mean mood score between `[now-7d, now]` and
/// `[now-14d, now-7d)`.
///
/// With no prior-week data the sentinel is "fully improved" when the
/// current week has any mood at all; the global clamp still applies, so it
/// surfaces as the upper bound. Both windows empty yields 0.
pub fn mood_trend(moods: &[MoodRecord], now: DateTime<Utc>) -> i32 {
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let recent: Vec<&MoodRecord> = moods
        .iter()
        .filter(|m| m.timestamp >= week_ago && m.timestamp <= now)
        .collect();
    let prior: Vec<&MoodRecord> = moods
        .iter()
        .filter(|m| m.timestamp >= two_weeks_ago && m.timestamp < week_ago)
        .collect();

    let recent_mean = mean_score(&recent);
    let prior_mean = mean_score(&prior);

    let raw = if prior_mean == 0.0 {
        if recent_mean > 0.0 {
            100
        } else {
            0
        }
    } else {
        ((recent_mean - prior_mean) / prior_mean * 100.0).round() as i32
    };
    raw.clamp(TREND_MIN, TREND_MAX)
}

fn distinct_days<'a, I>(timestamps: I, now: DateTime<Utc>) -> u32
where
    I: Iterator<Item = &'a DateTime<Utc>>,
{
    let week_ago = now - Duration::days(7);
    let days: BTreeSet<_> = timestamps
        .filter(|ts| **ts >= week_ago && **ts <= now)
        .map(|ts| ts.date_naive())
        .collect();
    days.len() as u32
}

/// Distinct calendar days with a journal entry in the trailing 7 days,
/// as a percentage.
pub fn journal_consistency(journals: &[JournalRecord], now: DateTime<Utc>) -> u32 {
    let days = distinct_days(journals.iter().map(|j| &j.timestamp), now);
    (((days as f64 / 7.0) * 100.0).round() as u32).min(100)
}

/// Mean of the per-habit streak percentages, 0 when no habits exist.
pub fn habit_streaks(habits: &[HabitRecord]) -> u32 {
    if habits.is_empty() {
        return 0;
    }
    let mut by_habit: HashMap<&str, Vec<HabitRecord>> = HashMap::new();
    for record in habits {
        by_habit
            .entry(record.habit_name.as_str())
            .or_default()
            .push(record.clone());
    }
    let sum: u32 = by_habit.values().map(|r| habit_streak_percent(r)).sum();
    ((sum as f64 / by_habit.len() as f64).round() as u32).min(100)
}

/// Weighted activity composite over the trailing week:
/// `habit completion x0.5 + journal consistency x0.3 + mood engagement x0.2`.
///
/// With no habit data in the window but some mood/journal activity, a
/// simplified estimate keeps early adopters from seeing a flat zero.
pub fn activity_level(
    moods: &[MoodRecord],
    journals: &[JournalRecord],
    habits: &[HabitRecord],
    now: DateTime<Utc>,
) -> u32 {
    let week_ago = now - Duration::days(7);
    let in_week = |ts: &DateTime<Utc>| *ts >= week_ago && *ts <= now;

    let week_habits: Vec<&HabitRecord> =
        habits.iter().filter(|h| in_week(&h.timestamp)).collect();

    if week_habits.is_empty() {
        let mood_count = moods.iter().filter(|m| in_week(&m.timestamp)).count() as u32;
        let journal_count = journals.iter().filter(|j| in_week(&j.timestamp)).count() as u32;
        if mood_count + journal_count == 0 {
            return 0;
        }
        return (mood_count * 10 + journal_count * 15).min(100);
    }

    let completed = week_habits.iter().filter(|h| h.completed).count() as f64;
    let habit_rate = completed / week_habits.len() as f64 * 100.0;
    let journal_pct = journal_consistency(journals, now) as f64;
    let mood_days = distinct_days(moods.iter().map(|m| &m.timestamp), now);
    let mood_rate = ((mood_days as f64 / 7.0) * 100.0).min(100.0);

    let blended = habit_rate * 0.5 + journal_pct * 0.3 + mood_rate * 0.2;
    (blended.round() as u32).min(100)
}

/// Read the four collections (each tolerating absence or damage) and
/// assemble the composite for `now`.
pub fn compute(store: &WellnessStore, user: &str, now: DateTime<Utc>) -> CompositeInsight {
    let moods = store.moods(user);
    let journals = store.journals(user);
    let habits = store.habits(user);

    CompositeInsight {
        mood_trend_percent: mood_trend(&moods, now),
        journal_consistency_percent: journal_consistency(&journals, now),
        habit_streak_percent: habit_streaks(&habits),
        activity_level_percent: activity_level(&moods, &journals, &habits, now),
    }
}
