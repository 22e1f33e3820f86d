use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Four-phase breathing pattern, each phase a duration in seconds.
/// A zero phase is skipped by the driver (e.g. 4-7-8 has no outer hold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub inhale_secs: u64,
    pub hold_in_secs: u64,
    pub exhale_secs: u64,
    pub hold_out_secs: u64,
}

impl BreathingPattern {
    /// Total seconds of one full breath cycle.
    pub fn cycle_secs(&self) -> u64 {
        self.inhale_secs
            .saturating_add(self.hold_in_secs)
            .saturating_add(self.exhale_secs)
            .saturating_add(self.hold_out_secs)
    }
}

/// One step of a mindfulness sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindfulnessStep {
    pub title: String,
    #[serde(default)]
    pub instruction: String,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExerciseKind {
    Breathing { pattern: BreathingPattern },
    Mindfulness { steps: Vec<MindfulnessStep> },
}

/// A guided exercise: a pacing structure plus a nominal total duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ExerciseKind,
    /// Nominal session length in minutes. Also the credited duration on
    /// completion, even when the session is stopped early.
    pub duration_min: u64,
}

impl ExerciseDefinition {
    pub fn exercise_type(&self) -> crate::model::ExerciseType {
        match self.kind {
            ExerciseKind::Breathing { .. } => crate::model::ExerciseType::Breathing,
            ExerciseKind::Mindfulness { .. } => crate::model::ExerciseType::Mindfulness,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_min.saturating_mul(60).saturating_mul(1000)
    }

    /// Reject definitions the driver cannot pace. This is the only
    /// user-facing failure in the engine ("could not start a session").
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_min == 0 {
            return Err(ValidationError::ZeroDuration {
                exercise: self.id.clone(),
            });
        }
        match &self.kind {
            ExerciseKind::Breathing { pattern } => {
                if pattern.cycle_secs() == 0 {
                    return Err(ValidationError::EmptyPattern {
                        exercise: self.id.clone(),
                    });
                }
            }
            ExerciseKind::Mindfulness { steps } => {
                if steps.is_empty() {
                    return Err(ValidationError::NoSteps {
                        exercise: self.id.clone(),
                    });
                }
                if let Some(step) = steps.iter().find(|s| s.duration_secs == 0) {
                    return Err(ValidationError::ZeroLengthStep {
                        exercise: self.id.clone(),
                        step: step.title.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // ── Built-in presets ─────────────────────────────────────────────

    /// Box breathing: 4-4-4-4, five minutes.
    pub fn box_breathing() -> Self {
        Self {
            id: "box-breathing".into(),
            name: "Box Breathing".into(),
            kind: ExerciseKind::Breathing {
                pattern: BreathingPattern {
                    inhale_secs: 4,
                    hold_in_secs: 4,
                    exhale_secs: 4,
                    hold_out_secs: 4,
                },
            },
            duration_min: 5,
        }
    }

    /// Relaxing breath: 4-7-8 with no outer hold, five minutes.
    pub fn relaxing_breath() -> Self {
        Self {
            id: "relaxing-breath".into(),
            name: "4-7-8 Relaxing Breath".into(),
            kind: ExerciseKind::Breathing {
                pattern: BreathingPattern {
                    inhale_secs: 4,
                    hold_in_secs: 7,
                    exhale_secs: 8,
                    hold_out_secs: 0,
                },
            },
            duration_min: 5,
        }
    }

    /// A short guided body scan, ten minutes.
    pub fn body_scan() -> Self {
        Self {
            id: "body-scan".into(),
            name: "Body Scan".into(),
            kind: ExerciseKind::Mindfulness {
                steps: vec![
                    MindfulnessStep {
                        title: "Settle".into(),
                        instruction: "Find a comfortable position and close your eyes.".into(),
                        duration_secs: 60,
                    },
                    MindfulnessStep {
                        title: "Breath".into(),
                        instruction: "Bring attention to the natural rhythm of your breath.".into(),
                        duration_secs: 90,
                    },
                    MindfulnessStep {
                        title: "Body".into(),
                        instruction: "Slowly scan from your feet to the crown of your head.".into(),
                        duration_secs: 180,
                    },
                    MindfulnessStep {
                        title: "Release".into(),
                        instruction: "Notice any tension and let it soften on each exhale.".into(),
                        duration_secs: 90,
                    },
                ],
            },
            duration_min: 10,
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![
            Self::box_breathing(),
            Self::relaxing_breath(),
            Self::body_scan(),
        ]
    }

    pub fn preset(id: &str) -> Option<Self> {
        Self::presets().into_iter().find(|e| e.id == id)
    }
}
