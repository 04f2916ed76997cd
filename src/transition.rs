// src/transition.rs
//
// Disease-response model: (state, action) -> next state.
//
// Active treatments shrink the tumor and raise toxicity deterministically;
// an observation month draws random growth from the injected rng and lets
// the patient recover. Every update is clamped at source, so the returned
// snapshot always respects the declared bounds.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::AgentConfig;
use crate::state::{PatientState, CURED_THRESHOLD_CM, MAX_TUMOR_SIZE_CM};
use crate::types::{InvalidActionError, TreatmentAction, TreatmentType};

/// Apply one month of treatment to `state`, producing a fresh snapshot.
///
/// The action is validated before any work; an invalid action leaves no
/// partial transition. The prior state is never mutated.
pub fn apply_treatment(
    cfg: &AgentConfig,
    state: &PatientState,
    action: &TreatmentAction,
    rng: &mut ChaCha8Rng,
) -> Result<PatientState, InvalidActionError> {
    action.validate()?;

    let mut next = state.clone();
    next.treatment_history.push(action.treatment_type);
    next.months_elapsed += 1;

    let i = action.intensity;
    match action.treatment_type {
        TreatmentType::Chemo => {
            next.tumor_size = (state.tumor_size - i * 0.3).max(CURED_THRESHOLD_CM);
            next.toxicity_level = (state.toxicity_level + i * 0.2).min(1.0);
            next.qol_score = (state.qol_score - i * 0.1).max(0.0);
        }
        TreatmentType::Radiation => {
            next.tumor_size = (state.tumor_size - i * 0.4).max(CURED_THRESHOLD_CM);
            next.toxicity_level = (state.toxicity_level + i * 0.15).min(1.0);
            next.qol_score = (state.qol_score - i * 0.05).max(0.0);
        }
        TreatmentType::Combined => {
            next.tumor_size = (state.tumor_size - i * 0.5).max(CURED_THRESHOLD_CM);
            next.toxicity_level = (state.toxicity_level + i * 0.3).min(1.0);
            next.qol_score = (state.qol_score - i * 0.2).max(0.0);
        }
        TreatmentType::None => {
            let growth: f64 = rng.gen_range(0.0..cfg.max_monthly_growth_cm);
            next.tumor_size = (state.tumor_size + growth).min(MAX_TUMOR_SIZE_CM);
            next.toxicity_level = (state.toxicity_level - 0.05).max(0.0);
            next.qol_score = (state.qol_score + 0.05).min(1.0);
        }
    }

    // Cumulative drug pressure: once enough courses have been applied,
    // resistance risk escalates every month regardless of modality.
    if next.treatment_history.len() > cfg.resistance_history_threshold {
        next.resistance_risk = (state.resistance_risk + cfg.resistance_increment).min(1.0);
    }

    Ok(next)
}
