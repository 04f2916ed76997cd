// src/state.rs
//
// Immutable patient-state snapshot.
//
// Every numeric field is clamped at construction, so an out-of-range
// physiological value is structurally unreachable and transitions never
// need to assert. Snapshots are produced fresh by the transition model;
// a prior state is never mutated in place.

use serde::{Deserialize, Serialize};

use crate::types::{MonthIndex, Stage, TreatmentType};

/// Tumor diameter below which the patient counts as cured.
pub const CURED_THRESHOLD_CM: f64 = 0.1;

/// Largest tumor diameter the model represents.
pub const MAX_TUMOR_SIZE_CM: f64 = 10.0;

/// Toxicity level above which treatment must stop.
pub const TOXICITY_LIMIT: f64 = 0.9;

/// One snapshot of a patient's clinical state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientState {
    /// Tumor diameter in cm. The transition model keeps treated tumors at
    /// or above [`CURED_THRESHOLD_CM`]; only an already-cured initial state
    /// sits below it.
    pub tumor_size: f64,
    /// Patient age in years, fixed for the episode.
    pub age: u32,
    /// Clinical stage label; informs action availability and reward.
    pub stage: Stage,
    /// Treatment types applied so far, one per elapsed month (append-only).
    pub treatment_history: Vec<TreatmentType>,
    /// Months since the simulated course started.
    pub months_elapsed: MonthIndex,
    /// Quality of life in [0, 1], 1 = best.
    pub qol_score: f64,
    /// Cumulative treatment burden in [0, 1].
    pub toxicity_level: f64,
    /// Probability-like proxy for drug-resistant relapse in [0, 1].
    pub resistance_risk: f64,
}

impl PatientState {
    /// Build an initial state with all physiological fields clamped into
    /// their declared bounds.
    pub fn new(tumor_size: f64, age: u32, stage: Stage) -> Self {
        Self {
            tumor_size: tumor_size.clamp(0.0, MAX_TUMOR_SIZE_CM),
            age,
            stage,
            treatment_history: Vec::new(),
            months_elapsed: 0,
            qol_score: 0.5,
            toxicity_level: 0.0,
            resistance_risk: 0.0,
        }
    }

    pub fn with_qol(mut self, qol_score: f64) -> Self {
        self.qol_score = qol_score.clamp(0.0, 1.0);
        self
    }

    pub fn with_toxicity(mut self, toxicity_level: f64) -> Self {
        self.toxicity_level = toxicity_level.clamp(0.0, 1.0);
        self
    }

    pub fn with_resistance(mut self, resistance_risk: f64) -> Self {
        self.resistance_risk = resistance_risk.clamp(0.0, 1.0);
        self
    }

    /// Tumor below the cure threshold.
    pub fn is_cured(&self) -> bool {
        self.tumor_size < CURED_THRESHOLD_CM
    }

    /// Toxicity past the treatment-limiting level.
    pub fn is_toxicity_limited(&self) -> bool {
        self.toxicity_level > TOXICITY_LIMIT
    }
}
