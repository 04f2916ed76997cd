// src/policy.rs
//
// Action enumeration and epsilon-greedy selection.
//
// The feasible action set is generated per state from toxicity and tumor
// size; the observation action is always offered, so selection can never
// come up empty. Exploration draws from a broader random-parameter
// generator than the enumerated set. All randomness flows through the
// caller's seeded rng.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::qtable::{ActionKey, QTable, StateKey};
use crate::state::PatientState;
use crate::types::{TreatmentAction, TreatmentType};

/// Toxicity below which the standard active treatments are offered.
const TREATMENT_TOLERANCE_TOXICITY: f64 = 0.7;
/// Tumor size below which gentler low-dose options are added.
const SMALL_TUMOR_CM: f64 = 1.0;

/// Enumerate the feasible treatment actions for `state`.
///
/// Never empty: observation is unconditionally included. Enumeration order
/// is fixed; greedy tie-breaks resolve to the first entry.
pub fn possible_actions(state: &PatientState) -> Vec<TreatmentAction> {
    let mut actions = Vec::with_capacity(6);

    if state.toxicity_level < TREATMENT_TOLERANCE_TOXICITY {
        actions.push(TreatmentAction::new(TreatmentType::Chemo, 0.8, 3));
        actions.push(TreatmentAction::new(TreatmentType::Radiation, 0.7, 2));
        actions.push(TreatmentAction::new(TreatmentType::Combined, 0.6, 4));
    }

    if state.tumor_size < SMALL_TUMOR_CM {
        actions.push(TreatmentAction::new(TreatmentType::Chemo, 0.5, 2));
        actions.push(TreatmentAction::new(TreatmentType::Radiation, 0.6, 1));
    }

    actions.push(TreatmentAction::observe());

    actions
}

/// Draw a random action from the broad parameter space (exploration).
///
/// Unlike [`possible_actions`], intensity and duration are sampled
/// continuously: intensity in [0.3, 1.0) and duration in 1..=6 months for
/// active treatments; the observation action carries zero dose.
pub fn random_action(rng: &mut ChaCha8Rng) -> TreatmentAction {
    let treatment_type = match rng.gen_range(0..4) {
        0 => TreatmentType::Chemo,
        1 => TreatmentType::Radiation,
        2 => TreatmentType::Combined,
        _ => TreatmentType::None,
    };

    if treatment_type == TreatmentType::None {
        return TreatmentAction::observe();
    }

    let intensity = rng.gen_range(0.3..1.0);
    let duration = rng.gen_range(1..=6);
    TreatmentAction::new(treatment_type, intensity, duration)
}

/// Epsilon-greedy exploration schedule.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    decay: f64,
    min_epsilon: f64,
}

impl EpsilonGreedy {
    pub fn new(initial: f64, decay: f64, min_epsilon: f64) -> Self {
        Self {
            epsilon: initial.clamp(0.0, 1.0),
            decay,
            min_epsilon,
        }
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Multiplicative decay, floored at the configured minimum.
    /// Monotonically non-increasing across calls.
    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.decay).max(self.min_epsilon);
    }

    /// Select an action for `state`.
    ///
    /// In training mode an epsilon-probability coin flip picks a random
    /// action from the broad generator; otherwise (and always when
    /// `training` is false) the enumerated set is evaluated under the
    /// value table and the first maximum wins.
    pub fn select(
        &self,
        q_table: &QTable,
        state: &PatientState,
        rng: &mut ChaCha8Rng,
        training: bool,
    ) -> TreatmentAction {
        if training && rng.gen::<f64>() < self.epsilon {
            return random_action(rng);
        }

        greedy_action(q_table, state)
    }
}

/// Exploitation-only selection: best enumerated action under the table.
///
/// Ties (including the all-zero cold start) resolve to whichever action
/// comes first in enumeration order.
pub fn greedy_action(q_table: &QTable, state: &PatientState) -> TreatmentAction {
    let state_key = StateKey::from_state(state);

    let mut best: Option<TreatmentAction> = None;
    let mut best_value = f64::NEG_INFINITY;

    for action in possible_actions(state) {
        let value = q_table.value(&state_key, &ActionKey::from_action(&action));
        if value > best_value {
            best_value = value;
            best = Some(action);
        }
    }

    // possible_actions() is never empty.
    best.unwrap_or_else(TreatmentAction::observe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qtable::{ActionKey, StateKey};
    use crate::types::Stage;
    use rand::SeedableRng;

    fn mk_state(tumor: f64, tox: f64) -> PatientState {
        PatientState::new(tumor, 55, Stage::T2).with_toxicity(tox)
    }

    #[test]
    fn low_toxicity_offers_standard_treatments() {
        let actions = possible_actions(&mk_state(3.0, 0.2));
        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0].treatment_type, TreatmentType::Chemo);
        assert_eq!(actions[0].intensity, 0.8);
        assert_eq!(actions[3], TreatmentAction::observe());
    }

    #[test]
    fn small_tumor_adds_low_dose_options() {
        let actions = possible_actions(&mk_state(0.8, 0.2));
        assert_eq!(actions.len(), 6);
        assert_eq!(actions[3].intensity, 0.5);
        assert_eq!(actions[4].duration_months, 1);
    }

    #[test]
    fn high_toxicity_state_still_offers_observation() {
        let actions = possible_actions(&mk_state(3.0, 0.85));
        assert_eq!(actions, vec![TreatmentAction::observe()]);
    }

    #[test]
    fn random_actions_respect_declared_bounds() {
        let rng = &mut ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let a = random_action(rng);
            assert!(a.validate().is_ok());
            if a.treatment_type != TreatmentType::None {
                assert!((0.3..1.0).contains(&a.intensity));
                assert!((1..=6).contains(&a.duration_months));
            }
        }
    }

    #[test]
    fn epsilon_decay_is_monotone_and_floored() {
        let mut sched = EpsilonGreedy::new(0.1, 0.995, 0.01);
        let mut prev = sched.epsilon();

        for _ in 0..1000 {
            sched.decay();
            assert!(sched.epsilon() <= prev);
            assert!(sched.epsilon() >= 0.01);
            prev = sched.epsilon();
        }

        // 0.1 * 0.995^1000 < 0.01, so the floor must be active.
        assert_eq!(sched.epsilon(), 0.01);
    }

    #[test]
    fn greedy_picks_highest_valued_action() {
        let state = mk_state(3.0, 0.2);
        let state_key = StateKey::from_state(&state);
        let mut q = QTable::new();

        let radiation = TreatmentAction::new(TreatmentType::Radiation, 0.7, 2);
        q.update(
            state_key,
            ActionKey::from_action(&radiation),
            10.0,
            &state_key,
            1.0,
            0.0,
        );

        assert_eq!(greedy_action(&q, &state), radiation);
    }

    #[test]
    fn greedy_ties_resolve_to_first_enumerated() {
        // Cold start: everything reads 0, so the first enumerated action wins.
        let state = mk_state(3.0, 0.2);
        let q = QTable::new();

        let chosen = greedy_action(&q, &state);
        assert_eq!(chosen, possible_actions(&state)[0]);
    }

    #[test]
    fn zero_epsilon_never_explores() {
        let sched = EpsilonGreedy::new(0.0, 0.995, 0.0);
        let state = mk_state(3.0, 0.2);
        let q = QTable::new();
        let rng = &mut ChaCha8Rng::seed_from_u64(3);

        for _ in 0..100 {
            let a = sched.select(&q, &state, rng, true);
            assert_eq!(a, greedy_action(&q, &state));
        }
    }
}
