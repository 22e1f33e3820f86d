//! # Wellspring Core Library
//!
//! This library provides the core business logic for the Wellspring
//! wellness tracker. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any GUI
//! being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Session Driver**: A wall-clock-based state machine that paces
//!   guided breathing and mindfulness exercises; the caller periodically
//!   invokes `tick()` for progress updates
//! - **Storage**: SQLite-based activity collections plus TOML
//!   configuration, behind a narrow event-store seam
//! - **Streaks**: Incremental session aggregates and weekly-goal progress
//! - **Insights**: Composite wellbeing metrics recomputed per query from
//!   the raw activity logs
//! - **Notify**: In-process change broadcasting with a revision-polling
//!   fallback for out-of-band writes
//!
//! ## Key Components
//!
//! - [`SessionDriver`]: Guided-session state machine
//! - [`WellnessStore`]: Typed, change-publishing event store adapter
//! - [`StreakTracker`]: Streak & weekly-goal calculator
//! - [`insights::compute`]: Composite insight aggregation
//! - [`ChangeHub`]: Collection change notifications

pub mod clock;
pub mod error;
pub mod events;
pub mod insights;
pub mod model;
pub mod notify;
pub mod session;
pub mod storage;
pub mod streak;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, StoreError, ValidationError};
pub use events::Event;
pub use insights::CompositeInsight;
pub use model::{
    ExerciseType, GuidedSessionRecord, HabitRecord, JournalRecord, MoodRecord, MoodValue,
};
pub use notify::{ChangeHub, RevisionPoller};
pub use session::{BreathPhase, DriverState, ExerciseDefinition, SessionDriver};
pub use storage::{Config, Database, EventStore, MemoryStore, WellnessStore};
pub use streak::{StreakState, StreakTracker, WeeklyProgress};
