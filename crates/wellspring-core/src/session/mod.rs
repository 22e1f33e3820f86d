//! Guided-session pacing: exercise definitions and the timing driver.

pub mod driver;
pub mod exercise;

pub use driver::{BreathPhase, DriverState, SessionDriver};
pub use exercise::{BreathingPattern, ExerciseDefinition, ExerciseKind, MindfulnessStep};
