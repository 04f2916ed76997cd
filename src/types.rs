// src/types.rs
//
// Common shared types for the treatment-policy engine.

use serde::{Deserialize, Serialize};

/// Month counter within a simulated treatment course.
pub type MonthIndex = u32;

/// Modality of a single monthly treatment decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatmentType {
    Chemo,
    Radiation,
    Combined,
    /// Observation month: no active treatment, passive recovery.
    None,
}

impl TreatmentType {
    /// Return a stable lowercase name (used in logs/telemetry and plan output).
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentType::Chemo => "chemo",
            TreatmentType::Radiation => "radiation",
            TreatmentType::Combined => "combined",
            TreatmentType::None => "none",
        }
    }

    /// Parse a treatment name (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<TreatmentType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chemo" | "chemotherapy" => Some(TreatmentType::Chemo),
            "radiation" | "radiotherapy" => Some(TreatmentType::Radiation),
            "combined" | "chemoradiation" => Some(TreatmentType::Combined),
            "none" | "observation" => Some(TreatmentType::None),
            _ => None,
        }
    }
}

/// Clinical stage label carried on the patient record.
///
/// `T4` and `M1` are the advanced markers used by the reward model's
/// stage-progression penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    T1,
    T2,
    T3,
    T4,
    M1,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::T1 => "T1",
            Stage::T2 => "T2",
            Stage::T3 => "T3",
            Stage::T4 => "T4",
            Stage::M1 => "M1",
        }
    }

    /// Parse a stage label (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<Stage> {
        match s.trim().to_ascii_uppercase().as_str() {
            "T1" => Some(Stage::T1),
            "T2" => Some(Stage::T2),
            "T3" => Some(Stage::T3),
            "T4" => Some(Stage::T4),
            "M1" => Some(Stage::M1),
            _ => None,
        }
    }

    /// Late-T or metastatic marker.
    pub fn is_advanced(&self) -> bool {
        matches!(self, Stage::T4 | Stage::M1)
    }
}

/// A candidate monthly treatment decision.
///
/// Invariant: `intensity == 0.0` and `duration_months == 0` exactly when
/// `treatment_type == None`. Violations are rejected by
/// [`TreatmentAction::validate`] before any state transition, never
/// silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreatmentAction {
    pub treatment_type: TreatmentType,
    /// Dose intensity in [0, 1].
    pub intensity: f64,
    /// Nominal course length in months.
    pub duration_months: u32,
}

impl TreatmentAction {
    pub fn new(treatment_type: TreatmentType, intensity: f64, duration_months: u32) -> Self {
        Self {
            treatment_type,
            intensity,
            duration_months,
        }
    }

    /// The do-nothing observation action.
    pub fn observe() -> Self {
        Self::new(TreatmentType::None, 0.0, 0)
    }

    /// Check the declared action bounds.
    ///
    /// Must pass before the transition model touches any state; an invalid
    /// action produces no partial transition.
    pub fn validate(&self) -> Result<(), InvalidActionError> {
        if !self.intensity.is_finite() || !(0.0..=1.0).contains(&self.intensity) {
            return Err(InvalidActionError::IntensityOutOfRange {
                intensity: self.intensity,
            });
        }

        match self.treatment_type {
            TreatmentType::None => {
                if self.intensity != 0.0 || self.duration_months != 0 {
                    return Err(InvalidActionError::InertActionWithDose {
                        intensity: self.intensity,
                        duration_months: self.duration_months,
                    });
                }
            }
            _ => {
                if self.intensity == 0.0 || self.duration_months == 0 {
                    return Err(InvalidActionError::ActiveActionWithoutDose {
                        treatment: self.treatment_type,
                    });
                }
            }
        }

        Ok(())
    }
}

/// The only failure class of the engine: an action outside its declared
/// bounds. Physiological values never error (they are clamped at source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvalidActionError {
    IntensityOutOfRange {
        intensity: f64,
    },
    /// A `none` action carrying a nonzero dose or duration.
    InertActionWithDose {
        intensity: f64,
        duration_months: u32,
    },
    /// An active treatment with zero intensity or zero duration.
    ActiveActionWithoutDose {
        treatment: TreatmentType,
    },
}

impl std::fmt::Display for InvalidActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidActionError::IntensityOutOfRange { intensity } => {
                write!(f, "treatment intensity {} outside [0, 1]", intensity)
            }
            InvalidActionError::InertActionWithDose {
                intensity,
                duration_months,
            } => write!(
                f,
                "'none' action must carry zero dose (got intensity {}, duration {} months)",
                intensity, duration_months
            ),
            InvalidActionError::ActiveActionWithoutDose { treatment } => write!(
                f,
                "'{}' action requires nonzero intensity and duration",
                treatment.as_str()
            ),
        }
    }
}

impl std::error::Error for InvalidActionError {}
