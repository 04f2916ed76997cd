// src/reward.rs
//
// Clinical-outcome reward model.
//
// Pure function of (previous state, new state, action, terminal flag).
// All terms are additive and independently applicable; no term excludes
// another. The action itself carries no weight today but stays in the
// signature so modality-specific shaping can be added without churn.

use crate::state::PatientState;
use crate::types::TreatmentAction;

/// Tumor shrinkage (cm) counted as a significant response.
const SIGNIFICANT_REDUCTION_CM: f64 = 0.5;
/// Tumor shrinkage (cm) counted as a moderate response.
const MODERATE_REDUCTION_CM: f64 = 0.1;
/// Negative reduction (growth) past this magnitude is progression.
const PROGRESSION_GROWTH_CM: f64 = 0.2;

/// Score one step of a simulated treatment course.
///
/// `terminal` marks the final evaluated step of an episode; the long-horizon
/// cure bonus only applies there.
pub fn compute_reward(
    prev: &PatientState,
    next: &PatientState,
    _action: &TreatmentAction,
    terminal: bool,
) -> f64 {
    let mut reward = 0.0;

    let size_reduction = prev.tumor_size - next.tumor_size;
    if size_reduction > SIGNIFICANT_REDUCTION_CM {
        reward += 10.0;
    } else if size_reduction > MODERATE_REDUCTION_CM {
        reward += 5.0;
    }

    if next.qol_score - prev.qol_score > 0.1 {
        reward += 5.0;
    }

    // Five-year disease-free survival bonus.
    if terminal && next.tumor_size < 0.5 && next.months_elapsed >= 60 {
        reward += 100.0;
    }

    if size_reduction < -PROGRESSION_GROWTH_CM {
        reward -= 20.0;
    }

    if next.toxicity_level > 0.8 {
        reward -= 5.0;
    }

    if next.resistance_risk > 0.7 {
        reward -= 50.0;
    }

    // Treatment-limiting toxicity, additive with the 0.8 penalty above.
    if next.toxicity_level > 0.9 {
        reward -= 10.0;
    }

    // Stage progression to a late-T / metastatic marker.
    if next.stage.is_advanced() && !prev.stage.is_advanced() {
        reward -= 15.0;
    }

    reward
}
