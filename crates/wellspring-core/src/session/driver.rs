//! Session timing driver.
//!
//! The driver is a wall-clock-based state machine. It does not use internal
//! threads or blocking sleeps - the caller is responsible for calling
//! `tick()` periodically. Every tick recomputes elapsed time from the
//! injected clock's epoch milliseconds, never from accumulated tick counts,
//! so a late or missed tick self-corrects: a single tick that spans several
//! phase boundaries advances through all of them.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed   (natural countdown expiry, or stop() with time consumed)
//! ```
//!
//! Two schedules run orthogonally: the phase/step cycle (breathing phases
//! wrap indefinitely; mindfulness steps wrap to step 0) and an independent
//! session countdown initialized to the exercise's nominal duration. Only
//! the countdown decides completion.

use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::exercise::{ExerciseDefinition, ExerciseKind};
use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// The four breathing phases, cycling `Inhale -> HoldIn -> Exhale ->
/// HoldOut -> Inhale -> ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl BreathPhase {
    pub fn next(self) -> Self {
        match self {
            BreathPhase::Inhale => BreathPhase::HoldIn,
            BreathPhase::HoldIn => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::HoldOut,
            BreathPhase::HoldOut => BreathPhase::Inhale,
        }
    }

    fn duration_ms(self, pattern: &super::exercise::BreathingPattern) -> u64 {
        let secs = match self {
            BreathPhase::Inhale => pattern.inhale_secs,
            BreathPhase::HoldIn => pattern.hold_in_secs,
            BreathPhase::Exhale => pattern.exhale_secs,
            BreathPhase::HoldOut => pattern.hold_out_secs,
        };
        secs.saturating_mul(1000)
    }
}

/// Position within the exercise's pacing structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pos", rename_all = "lowercase")]
enum Position {
    Breath { phase: BreathPhase },
    Step { index: usize },
}

/// Core session driver.
///
/// Operates on wall-clock deltas -- no internal thread. The caller is
/// responsible for calling `tick()` periodically. Serializable so the CLI
/// can persist it in the kv store between invocations; the clock field is
/// restored to the system clock on deserialize.
#[derive(Serialize, Deserialize)]
pub struct SessionDriver {
    exercise: ExerciseDefinition,
    state: DriverState,
    position: Position,
    /// Remaining time in milliseconds for the current phase/step.
    phase_remaining_ms: u64,
    /// Remaining time in milliseconds for the whole session.
    session_remaining_ms: u64,
    /// Completed breath cycles (HoldOut -> Inhale wraps).
    breath_cycles: u32,
    /// Epoch ms when the driver was last started/resumed/ticked.
    /// Used to compute elapsed time between ticks.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
    #[serde(skip, default = "default_clock")]
    clock: Rc<dyn Clock>,
}

fn default_clock() -> Rc<dyn Clock> {
    Rc::new(SystemClock)
}

impl SessionDriver {
    /// Create a driver for the given exercise.
    ///
    /// # Errors
    /// Returns a validation error if the definition cannot be paced
    /// (zero duration, empty pattern, no steps).
    pub fn new(exercise: ExerciseDefinition) -> Result<Self, ValidationError> {
        Self::with_clock(exercise, default_clock())
    }

    pub fn with_clock(
        exercise: ExerciseDefinition,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, ValidationError> {
        exercise.validate()?;
        let (position, phase_remaining_ms) = Self::initial_position(&exercise);
        let session_remaining_ms = exercise.duration_ms();
        Ok(Self {
            exercise,
            state: DriverState::Idle,
            position,
            phase_remaining_ms,
            session_remaining_ms,
            breath_cycles: 0,
            last_tick_epoch_ms: None,
            clock,
        })
    }

    /// First phase/step with a non-zero duration.
    fn initial_position(exercise: &ExerciseDefinition) -> (Position, u64) {
        match &exercise.kind {
            ExerciseKind::Breathing { pattern } => {
                let mut phase = BreathPhase::Inhale;
                // Validation guarantees at least one non-zero phase.
                while phase.duration_ms(pattern) == 0 {
                    phase = phase.next();
                }
                (Position::Breath { phase }, phase.duration_ms(pattern))
            }
            ExerciseKind::Mindfulness { steps } => {
                let ms = steps.first().map(|s| s.duration_secs * 1000).unwrap_or(0);
                (Position::Step { index: 0 }, ms)
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn exercise(&self) -> &ExerciseDefinition {
        &self.exercise
    }

    pub fn phase(&self) -> Option<BreathPhase> {
        match self.position {
            Position::Breath { phase } => Some(phase),
            Position::Step { .. } => None,
        }
    }

    pub fn step_index(&self) -> Option<usize> {
        match self.position {
            Position::Breath { .. } => None,
            Position::Step { index } => Some(index),
        }
    }

    pub fn breath_cycles(&self) -> u32 {
        self.breath_cycles
    }

    pub fn phase_remaining_ms(&self) -> u64 {
        self.phase_remaining_ms
    }

    pub fn session_remaining_ms(&self) -> u64 {
        self.session_remaining_ms
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            exercise_id: self.exercise.id.clone(),
            exercise_type: self.exercise.exercise_type(),
            phase: self.phase(),
            step_index: self.step_index(),
            breath_cycles: self.breath_cycles,
            phase_remaining_ms: self.phase_remaining_ms,
            session_remaining_ms: self.session_remaining_ms,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state != DriverState::Idle {
            return None;
        }
        self.state = DriverState::Running;
        self.last_tick_epoch_ms = Some(self.clock.now_ms());
        Some(Event::SessionStarted {
            exercise_id: self.exercise.id.clone(),
            exercise_type: self.exercise.exercise_type(),
            duration_min: self.exercise.duration_min,
            at: Utc::now(),
        })
    }

    /// Pause, preserving phase position and both countdowns.
    ///
    /// Like `tick()`, returns every boundary crossed since the last tick.
    /// If the flush discovers the countdown already expired, the session
    /// completes instead and the completion event comes last; otherwise the
    /// pause event does.
    pub fn pause(&mut self) -> Vec<Event> {
        if self.state != DriverState::Running {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.flush_elapsed(&mut events);
        if self.state == DriverState::Completed {
            return events;
        }
        self.state = DriverState::Paused;
        self.last_tick_epoch_ms = None;
        events.push(Event::SessionPaused {
            remaining_ms: self.session_remaining_ms,
            at: Utc::now(),
        });
        events
    }

    /// Resume from pause. Re-anchors the clock so the current phase keeps
    /// its remaining duration rather than restarting in full.
    pub fn resume(&mut self) -> Option<Event> {
        if self.state != DriverState::Paused {
            return None;
        }
        self.state = DriverState::Running;
        self.last_tick_epoch_ms = Some(self.clock.now_ms());
        Some(Event::SessionResumed {
            remaining_ms: self.session_remaining_ms,
            at: Utc::now(),
        })
    }

    /// Return to the initial phase/step with the full nominal countdown.
    pub fn reset(&mut self) -> Option<Event> {
        let (position, phase_remaining_ms) = Self::initial_position(&self.exercise);
        self.state = DriverState::Idle;
        self.position = position;
        self.phase_remaining_ms = phase_remaining_ms;
        self.session_remaining_ms = self.exercise.duration_ms();
        self.breath_cycles = 0;
        self.last_tick_epoch_ms = None;
        Some(Event::SessionReset { at: Utc::now() })
    }

    /// Terminate the session. If any time was consumed, the completion is
    /// still credited with the full nominal duration -- stopping early
    /// never produces a partial credit.
    ///
    /// After `stop()` returns, no later `tick()` can produce an event.
    pub fn stop(&mut self) -> Option<Event> {
        match self.state {
            DriverState::Idle | DriverState::Completed => None,
            DriverState::Running | DriverState::Paused => {
                if self.state == DriverState::Running {
                    if let Some(last) = self.last_tick_epoch_ms {
                        let elapsed = self.clock.now_ms().saturating_sub(last);
                        self.session_remaining_ms =
                            self.session_remaining_ms.saturating_sub(elapsed);
                    }
                }
                let consumed = self.exercise.duration_ms() - self.session_remaining_ms;
                self.state = DriverState::Completed;
                self.last_tick_epoch_ms = None;
                if consumed == 0 {
                    return None;
                }
                Some(self.completion_event())
            }
        }
    }

    /// Call periodically while running. Returns every phase/step boundary
    /// crossed since the last tick, with the completion event last if the
    /// countdown expired.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state == DriverState::Running {
            self.flush_elapsed(&mut events);
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn completion_event(&self) -> Event {
        Event::SessionCompleted {
            exercise_id: self.exercise.id.clone(),
            exercise_type: self.exercise.exercise_type(),
            credited_min: self.exercise.duration_min,
            at: Utc::now(),
        }
    }

    /// Consume wall-clock time since the last anchor: advance the session
    /// countdown and walk the phase/step cycle across every boundary the
    /// elapsed interval covers.
    fn flush_elapsed(&mut self, events: &mut Vec<Event>) {
        let now = self.clock.now_ms();
        let elapsed = match self.last_tick_epoch_ms {
            Some(last) => now.saturating_sub(last),
            None => return,
        };
        self.last_tick_epoch_ms = Some(now);

        // Phase position only advances for time the session actually had
        // left; anything beyond the countdown is discarded.
        let consumed = elapsed.min(self.session_remaining_ms);
        let mut walk = consumed;
        while walk >= self.phase_remaining_ms && walk > 0 {
            walk -= self.phase_remaining_ms;
            self.advance_position(events);
        }
        self.phase_remaining_ms -= walk;
        self.session_remaining_ms -= consumed;

        if self.session_remaining_ms == 0 {
            self.state = DriverState::Completed;
            self.last_tick_epoch_ms = None;
            events.push(self.completion_event());
        }
    }

    /// Move to the next phase/step and reload its full duration.
    fn advance_position(&mut self, events: &mut Vec<Event>) {
        match (&self.exercise.kind, self.position) {
            (ExerciseKind::Breathing { pattern }, Position::Breath { mut phase }) => {
                // Skip zero-length phases (e.g. 4-7-8 has no outer hold).
                loop {
                    if phase == BreathPhase::HoldOut {
                        self.breath_cycles += 1;
                    }
                    phase = phase.next();
                    if phase.duration_ms(pattern) > 0 {
                        break;
                    }
                }
                self.position = Position::Breath { phase };
                self.phase_remaining_ms = phase.duration_ms(pattern);
                events.push(Event::PhaseAdvanced {
                    phase,
                    cycles: self.breath_cycles,
                    at: Utc::now(),
                });
            }
            (ExerciseKind::Mindfulness { steps }, Position::Step { index }) => {
                // Wrap to step 0 when the last step ends with time left.
                let next = (index + 1) % steps.len();
                self.position = Position::Step { index: next };
                self.phase_remaining_ms = steps[next].duration_secs * 1000;
                events.push(Event::StepAdvanced {
                    step_index: next,
                    step_title: steps[next].title.clone(),
                    at: Utc::now(),
                });
            }
            // Exercise kind and position always agree by construction.
            _ => unreachable!("position does not match exercise kind"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn breathing_driver() -> (SessionDriver, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let driver = SessionDriver::with_clock(
            ExerciseDefinition::box_breathing(),
            Rc::new(clock.clone()),
        )
        .unwrap();
        (driver, clock)
    }

    fn mindfulness_driver() -> (SessionDriver, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let driver = SessionDriver::with_clock(
            ExerciseDefinition::body_scan(),
            Rc::new(clock.clone()),
        )
        .unwrap();
        (driver, clock)
    }

    #[test]
    fn start_pause_resume() {
        let (mut driver, _clock) = breathing_driver();
        assert_eq!(driver.state(), DriverState::Idle);

        assert!(driver.start().is_some());
        assert_eq!(driver.state(), DriverState::Running);

        assert!(!driver.pause().is_empty());
        assert_eq!(driver.state(), DriverState::Paused);

        assert!(driver.resume().is_some());
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn invalid_exercise_cannot_start() {
        let mut ex = ExerciseDefinition::box_breathing();
        ex.duration_min = 0;
        assert!(SessionDriver::new(ex).is_err());
    }

    #[test]
    fn phase_advances_on_schedule() {
        let (mut driver, clock) = breathing_driver();
        driver.start();
        assert_eq!(driver.phase(), Some(BreathPhase::Inhale));

        clock.advance(4_000);
        let events = driver.tick();
        assert_eq!(events.len(), 1);
        assert_eq!(driver.phase(), Some(BreathPhase::HoldIn));
        assert_eq!(driver.phase_remaining_ms(), 4_000);
    }

    #[test]
    fn cycle_counter_increments_on_wrap() {
        let (mut driver, clock) = breathing_driver();
        driver.start();

        // One full box cycle: 4+4+4+4 seconds.
        clock.advance(16_000);
        driver.tick();
        assert_eq!(driver.phase(), Some(BreathPhase::Inhale));
        assert_eq!(driver.breath_cycles(), 1);
    }

    #[test]
    fn zero_length_phase_is_skipped() {
        let clock = ManualClock::new(0);
        let mut driver = SessionDriver::with_clock(
            ExerciseDefinition::relaxing_breath(),
            Rc::new(clock.clone()),
        )
        .unwrap();
        driver.start();

        // 4-7-8 with no outer hold: after the exhale the next phase is
        // Inhale, and the wrap still counts a cycle.
        clock.advance(19_000);
        driver.tick();
        assert_eq!(driver.phase(), Some(BreathPhase::Inhale));
        assert_eq!(driver.breath_cycles(), 1);
    }

    #[test]
    fn late_tick_crosses_multiple_phases() {
        let (mut driver, clock) = breathing_driver();
        driver.start();

        // 12 seconds in one tick spans three boundaries.
        clock.advance(12_000);
        let events = driver.tick();
        assert_eq!(events.len(), 3);
        assert_eq!(driver.phase(), Some(BreathPhase::HoldOut));
    }

    #[test]
    fn countdown_completes_session() {
        let (mut driver, clock) = breathing_driver();
        driver.start();

        clock.advance(5 * 60 * 1000);
        let events = driver.tick();
        assert_eq!(driver.state(), DriverState::Completed);
        match events.last() {
            Some(Event::SessionCompleted { credited_min, .. }) => assert_eq!(*credited_min, 5),
            other => panic!("expected completion, got {other:?}"),
        }

        // Terminal state: no further events.
        clock.advance(60_000);
        assert!(driver.tick().is_empty());
    }

    #[test]
    fn pause_then_immediate_resume_is_a_noop() {
        let (mut driver, clock) = breathing_driver();
        driver.start();
        clock.advance(2_500);
        driver.tick();

        let phase_before = driver.phase();
        let phase_rem = driver.phase_remaining_ms();
        let session_rem = driver.session_remaining_ms();

        driver.pause();
        driver.resume();

        assert_eq!(driver.phase(), phase_before);
        assert_eq!(driver.phase_remaining_ms(), phase_rem);
        assert_eq!(driver.session_remaining_ms(), session_rem);
    }

    #[test]
    fn resume_preserves_remaining_not_full_phase() {
        let (mut driver, clock) = breathing_driver();
        driver.start();
        clock.advance(2_000);
        driver.tick();
        assert_eq!(driver.phase_remaining_ms(), 2_000);

        driver.pause();
        // Wall clock marches on while paused; none of it counts.
        clock.advance(100_000);
        driver.resume();
        assert_eq!(driver.phase_remaining_ms(), 2_000);

        clock.advance(2_000);
        let events = driver.tick();
        assert_eq!(events.len(), 1);
        assert_eq!(driver.phase(), Some(BreathPhase::HoldIn));
    }

    #[test]
    fn pause_reports_boundaries_crossed_since_last_tick() {
        let (mut driver, clock) = breathing_driver();
        driver.start();

        // Inhale ends at 4s; pausing at 5s crosses that boundary.
        clock.advance(5_000);
        let events = driver.pause();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::PhaseAdvanced { .. }));
        assert!(matches!(events[1], Event::SessionPaused { .. }));
    }

    #[test]
    fn pause_past_expiry_keeps_crossed_boundaries_before_completion() {
        let (mut driver, clock) = breathing_driver();
        driver.start();

        clock.advance(5 * 60 * 1000);
        let events = driver.pause();
        assert_eq!(driver.state(), DriverState::Completed);
        assert!(events.iter().any(|e| matches!(e, Event::PhaseAdvanced { .. })));
        assert!(matches!(events.last(), Some(Event::SessionCompleted { .. })));
    }

    #[test]
    fn stop_early_credits_nominal_duration() {
        let (mut driver, clock) = breathing_driver();
        driver.start();
        clock.advance(30_000);

        match driver.stop() {
            Some(Event::SessionCompleted { credited_min, .. }) => assert_eq!(credited_min, 5),
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(driver.state(), DriverState::Completed);
        assert!(driver.tick().is_empty());
    }

    #[test]
    fn stop_without_consumed_time_emits_nothing() {
        let (mut driver, _clock) = breathing_driver();
        driver.start();
        assert!(driver.stop().is_none());
        assert_eq!(driver.state(), DriverState::Completed);
    }

    #[test]
    fn stop_while_paused_still_credits() {
        let (mut driver, clock) = breathing_driver();
        driver.start();
        clock.advance(10_000);
        driver.tick();
        driver.pause();

        match driver.stop() {
            Some(Event::SessionCompleted { credited_min, .. }) => assert_eq!(credited_min, 5),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn mindfulness_steps_advance_and_wrap() {
        let (mut driver, clock) = mindfulness_driver();
        driver.start();
        assert_eq!(driver.step_index(), Some(0));

        clock.advance(60_000);
        driver.tick();
        assert_eq!(driver.step_index(), Some(1));

        // Finish the remaining steps (90 + 180 + 90 seconds): sequence
        // restarts from step 0 because session time remains.
        clock.advance(360_000);
        driver.tick();
        assert_eq!(driver.step_index(), Some(0));
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn mindfulness_completes_on_countdown() {
        let (mut driver, clock) = mindfulness_driver();
        driver.start();

        clock.advance(10 * 60 * 1000);
        let events = driver.tick();
        assert_eq!(driver.state(), DriverState::Completed);
        assert!(matches!(
            events.last(),
            Some(Event::SessionCompleted { credited_min: 10, .. })
        ));
    }

    #[test]
    fn reset_restores_initial_state() {
        let (mut driver, clock) = breathing_driver();
        driver.start();
        clock.advance(20_000);
        driver.tick();
        assert_eq!(driver.breath_cycles(), 1);

        driver.reset();
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.phase(), Some(BreathPhase::Inhale));
        assert_eq!(driver.breath_cycles(), 0);
        assert_eq!(driver.session_remaining_ms(), 5 * 60 * 1000);
    }

    #[test]
    fn driver_roundtrips_through_json() {
        let (mut driver, clock) = breathing_driver();
        driver.start();
        clock.advance(5_000);
        driver.tick();
        driver.pause();

        let json = serde_json::to_string(&driver).unwrap();
        let restored: SessionDriver = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), DriverState::Paused);
        assert_eq!(restored.phase(), driver.phase());
        assert_eq!(restored.session_remaining_ms(), driver.session_remaining_ms());
    }
}
