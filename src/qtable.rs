// src/qtable.rs
//
// Sparse tabular value store for Q-learning.
//
// States and actions are discretized into explicit composite keys (no
// string concatenation), so nearby clinical states intentionally share a
// table entry. Entries are created lazily; an absent entry reads as 0.
// The table is owned by one agent and mutated only through `update`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::PatientState;
use crate::types::{MonthIndex, Stage, TreatmentAction, TreatmentType};

/// Discretized state signature.
///
/// tumor/qol/toxicity are stored in integer tenths so equality and hashing
/// stay exact; age is bucketed to the decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    tumor_tenths: i32,
    age_decade: u32,
    stage: Stage,
    qol_tenths: i8,
    toxicity_tenths: i8,
    months_elapsed: MonthIndex,
}

impl StateKey {
    pub fn from_state(state: &PatientState) -> Self {
        Self {
            tumor_tenths: round_tenths(state.tumor_size) as i32,
            age_decade: (state.age / 10) * 10,
            stage: state.stage,
            qol_tenths: round_tenths(state.qol_score) as i8,
            toxicity_tenths: round_tenths(state.toxicity_level) as i8,
            months_elapsed: state.months_elapsed,
        }
    }
}

/// Discretized action signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionKey {
    treatment_type: TreatmentType,
    intensity_tenths: i8,
    duration_months: u32,
}

impl ActionKey {
    pub fn from_action(action: &TreatmentAction) -> Self {
        Self {
            treatment_type: action.treatment_type,
            intensity_tenths: round_tenths(action.intensity) as i8,
            duration_months: action.duration_months,
        }
    }
}

fn round_tenths(x: f64) -> i64 {
    (x * 10.0).round() as i64
}

/// Lazily populated state-action value table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: HashMap<StateKey, HashMap<ActionKey, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimated value of (state, action); 0 when never visited.
    pub fn value(&self, state: &StateKey, action: &ActionKey) -> f64 {
        self.values
            .get(state)
            .and_then(|m| m.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Best known value over all actions tried in `state`; 0 when the state
    /// has no entries yet. With entries present the max is taken over the
    /// entries alone and may be negative.
    pub fn max_value(&self, state: &StateKey) -> f64 {
        self.values
            .get(state)
            .filter(|m| !m.is_empty())
            .map(|m| m.values().copied().fold(f64::NEG_INFINITY, f64::max))
            .unwrap_or(0.0)
    }

    /// Standard off-policy tabular Q-learning update:
    ///
    /// `Q(s,a) <- Q(s,a) + alpha * (r + gamma * max_a' Q(s',a') - Q(s,a))`
    pub fn update(
        &mut self,
        state: StateKey,
        action: ActionKey,
        reward: f64,
        next_state: &StateKey,
        learning_rate: f64,
        discount_factor: f64,
    ) {
        let max_next = self.max_value(next_state);
        let entry = self
            .values
            .entry(state)
            .or_default()
            .entry(action)
            .or_insert(0.0);
        *entry += learning_rate * (reward + discount_factor * max_next - *entry);
    }

    /// Number of distinct state entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop all learned values (test isolation / fresh training run).
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_state(tumor: f64, months: u32) -> PatientState {
        let mut s = PatientState::new(tumor, 55, Stage::T2);
        s.months_elapsed = months;
        s
    }

    #[test]
    fn nearby_states_share_a_key() {
        let a = StateKey::from_state(&mk_state(2.04, 3));
        let b = StateKey::from_state(&mk_state(1.96, 3));
        assert_eq!(a, b);

        let c = StateKey::from_state(&mk_state(2.16, 3));
        assert_ne!(a, c);
    }

    #[test]
    fn age_buckets_to_decade() {
        let a = StateKey::from_state(&PatientState::new(2.0, 51, Stage::T2));
        let b = StateKey::from_state(&PatientState::new(2.0, 59, Stage::T2));
        let c = StateKey::from_state(&PatientState::new(2.0, 60, Stage::T2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn action_keys_discretize_intensity() {
        let a = ActionKey::from_action(&TreatmentAction::new(TreatmentType::Chemo, 0.81, 3));
        let b = ActionKey::from_action(&TreatmentAction::new(TreatmentType::Chemo, 0.79, 3));
        assert_eq!(a, b);

        let c = ActionKey::from_action(&TreatmentAction::new(TreatmentType::Chemo, 0.7, 3));
        assert_ne!(a, c);
    }

    #[test]
    fn absent_entries_read_zero() {
        let q = QTable::new();
        let s = StateKey::from_state(&mk_state(2.0, 0));
        let a = ActionKey::from_action(&TreatmentAction::observe());

        assert_eq!(q.value(&s, &a), 0.0);
        assert_eq!(q.max_value(&s), 0.0);
        assert!(q.is_empty());
    }

    #[test]
    fn update_moves_value_toward_target() {
        let mut q = QTable::new();
        let s0 = StateKey::from_state(&mk_state(2.0, 0));
        let s1 = StateKey::from_state(&mk_state(1.7, 1));
        let a = ActionKey::from_action(&TreatmentAction::new(TreatmentType::Chemo, 0.8, 3));

        // First update from zero: Q = alpha * r.
        q.update(s0, a, 10.0, &s1, 0.1, 0.95);
        assert!((q.value(&s0, &a) - 1.0).abs() < 1e-12);

        // Seed the next state so the bootstrap term participates.
        q.update(s1, a, 5.0, &StateKey::from_state(&mk_state(1.4, 2)), 0.1, 0.95);
        let max_next = q.max_value(&s1);
        assert!((max_next - 0.5).abs() < 1e-12);

        let before = q.value(&s0, &a);
        q.update(s0, a, 10.0, &s1, 0.1, 0.95);
        let expected = before + 0.1 * (10.0 + 0.95 * max_next - before);
        assert!((q.value(&s0, &a) - expected).abs() < 1e-12);
    }

    #[test]
    fn max_over_existing_entries_may_be_negative() {
        let mut q = QTable::new();
        let s = StateKey::from_state(&mk_state(2.0, 1));
        let a = ActionKey::from_action(&TreatmentAction::observe());

        q.update(s, a, -20.0, &StateKey::from_state(&mk_state(2.1, 2)), 1.0, 0.95);
        assert_eq!(q.value(&s, &a), -20.0);
        assert_eq!(q.max_value(&s), -20.0);
    }

    #[test]
    fn reset_clears_all_entries() {
        let mut q = QTable::new();
        let s = StateKey::from_state(&mk_state(2.0, 0));
        let a = ActionKey::from_action(&TreatmentAction::observe());
        q.update(s, a, 1.0, &s, 0.1, 0.95);
        assert!(!q.is_empty());

        q.reset();
        assert!(q.is_empty());
        assert_eq!(q.value(&s, &a), 0.0);
    }
}
