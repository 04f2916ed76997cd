// src/agent.rs
//
// Q-learning treatment agent: episode orchestration, training loop, and
// greedy plan extraction.
//
// The agent owns the value table and the exploration schedule; all
// randomness (exploration draws, untreated-growth sampling) flows through
// one seeded rng so a fixed seed reproduces exact trajectories.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;
use crate::logging::{EventSink, NoopSink};
use crate::policy::{greedy_action, EpsilonGreedy};
use crate::qtable::{ActionKey, QTable, StateKey};
use crate::reward::compute_reward;
use crate::state::PatientState;
use crate::transition::apply_treatment;
use crate::types::{InvalidActionError, TreatmentAction};

/// Why a simulated course ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Tumor fell below the cure threshold.
    Cured,
    /// Toxicity passed the treatment-limiting level.
    ToxicityLimit,
    /// Configured horizon reached.
    HorizonReached,
}

/// Full record of one simulated episode.
///
/// `rewards` and `actions` are aligned by step index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeTrace {
    pub episode_id: u32,
    pub actions: Vec<TreatmentAction>,
    pub rewards: Vec<f64>,
    pub termination: TerminationReason,
    pub total_reward: f64,
    pub final_state: PatientState,
}

/// Compact per-episode result for training traces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode_id: u32,
    pub steps: u32,
    pub total_reward: f64,
    pub termination: TerminationReason,
    /// Exploration rate the episode ran with (before its decay step).
    pub epsilon: f64,
    pub final_tumor_size: f64,
    pub final_toxicity_level: f64,
    pub final_resistance_risk: f64,
}

impl EpisodeSummary {
    fn from_trace(trace: &EpisodeTrace, epsilon: f64) -> Self {
        Self {
            episode_id: trace.episode_id,
            steps: trace.actions.len() as u32,
            total_reward: trace.total_reward,
            termination: trace.termination,
            epsilon,
            final_tumor_size: trace.final_state.tumor_size,
            final_toxicity_level: trace.final_state.toxicity_level,
            final_resistance_risk: trace.final_state.resistance_risk,
        }
    }
}

/// A recommended treatment plan extracted from a trained table.
///
/// `rewards` holds the predicted per-month reward along the greedy rollout,
/// aligned with `actions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub actions: Vec<TreatmentAction>,
    pub rewards: Vec<f64>,
    pub total_reward: f64,
    pub final_state: PatientState,
}

/// Tabular Q-learning agent over simulated treatment courses.
pub struct TreatmentAgent {
    cfg: AgentConfig,
    q_table: QTable,
    schedule: EpsilonGreedy,
    rng: ChaCha8Rng,
}

impl TreatmentAgent {
    pub fn new(cfg: AgentConfig, seed: u64) -> Self {
        let schedule = EpsilonGreedy::new(cfg.initial_epsilon, cfg.epsilon_decay, cfg.min_epsilon);
        Self {
            cfg,
            q_table: QTable::new(),
            schedule,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }

    /// The learned value table (read-only; mutation goes through training).
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn epsilon(&self) -> f64 {
        self.schedule.epsilon()
    }

    /// Apply one multiplicative epsilon-decay step.
    pub fn decay_epsilon(&mut self) {
        self.schedule.decay();
    }

    /// Discard everything learned and reseed: fresh table, fresh epsilon,
    /// fresh rng. Used for test isolation and repeated runs.
    pub fn reset(&mut self, seed: u64) {
        self.q_table.reset();
        self.schedule = EpsilonGreedy::new(
            self.cfg.initial_epsilon,
            self.cfg.epsilon_decay,
            self.cfg.min_epsilon,
        );
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Run one training episode from `initial`, updating the value table
    /// after every step.
    ///
    /// Terminal conditions, checked after each step (any one suffices):
    /// tumor below the cure threshold (an already-cured initial state
    /// terminates after its first evaluated step), treatment-limiting
    /// toxicity, or the configured horizon.
    pub fn simulate_treatment_episode(
        &mut self,
        initial: &PatientState,
        episode_id: u32,
        sink: &mut dyn EventSink,
    ) -> Result<EpisodeTrace, InvalidActionError> {
        let horizon = self.cfg.episode_horizon_months;

        let mut actions = Vec::new();
        let mut rewards = Vec::new();
        let mut current = initial.clone();
        let mut termination = TerminationReason::HorizonReached;

        for step in 0..horizon {
            let action = self
                .schedule
                .select(&self.q_table, &current, &mut self.rng, true);
            let next = apply_treatment(&self.cfg, &current, &action, &mut self.rng)?;

            let cured = current.is_cured() || next.is_cured();
            let terminal =
                cured || next.is_toxicity_limited() || next.months_elapsed >= horizon;
            let reward = compute_reward(&current, &next, &action, terminal);

            self.q_table.update(
                StateKey::from_state(&current),
                ActionKey::from_action(&action),
                reward,
                &StateKey::from_state(&next),
                self.cfg.learning_rate,
                self.cfg.discount_factor,
            );

            sink.log_step(episode_id, step, &next, &action, reward, self.epsilon());
            actions.push(action);
            rewards.push(reward);

            if terminal {
                termination = if cured {
                    TerminationReason::Cured
                } else if next.is_toxicity_limited() {
                    TerminationReason::ToxicityLimit
                } else {
                    TerminationReason::HorizonReached
                };
                current = next;
                break;
            }

            current = next;
        }

        let total_reward = rewards.iter().sum();
        Ok(EpisodeTrace {
            episode_id,
            actions,
            rewards,
            termination,
            total_reward,
            final_state: current,
        })
    }

    /// Train over the configured number of episodes from the same initial
    /// state, decaying epsilon once per episode. Returns the per-episode
    /// reward trace.
    pub fn train(
        &mut self,
        initial: &PatientState,
        sink: &mut dyn EventSink,
    ) -> Result<Vec<EpisodeSummary>, InvalidActionError> {
        let episodes = self.cfg.training_episodes;
        let mut summaries = Vec::with_capacity(episodes as usize);

        for episode_id in 0..episodes {
            let epsilon = self.epsilon();
            let trace = self.simulate_treatment_episode(initial, episode_id, sink)?;
            let summary = EpisodeSummary::from_trace(&trace, epsilon);
            sink.log_episode_end(&summary);
            summaries.push(summary);
            self.decay_epsilon();
        }

        Ok(summaries)
    }

    /// Convenience wrapper: train without telemetry.
    pub fn train_quiet(
        &mut self,
        initial: &PatientState,
    ) -> Result<Vec<EpisodeSummary>, InvalidActionError> {
        self.train(initial, &mut NoopSink)
    }

    /// Extract a fixed-horizon treatment plan by greedy rollout.
    ///
    /// No exploration, no table updates. Untreated-growth draws come from a
    /// fresh rng seeded with `seed`, so two calls on the same trained table
    /// and initial state return the identical action sequence.
    pub fn optimal_treatment_plan(
        &self,
        initial: &PatientState,
        seed: u64,
    ) -> Result<TreatmentPlan, InvalidActionError> {
        let horizon = self.cfg.plan_horizon_months;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut actions = Vec::new();
        let mut rewards = Vec::new();
        let mut current = initial.clone();

        for _ in 0..horizon {
            let action = greedy_action(&self.q_table, &current);
            let next = apply_treatment(&self.cfg, &current, &action, &mut rng)?;

            let cured = current.is_cured() || next.is_cured();
            let reward = compute_reward(&current, &next, &action, cured);

            actions.push(action);
            rewards.push(reward);
            current = next;

            if cured {
                break;
            }
        }

        let total_reward = rewards.iter().sum();
        Ok(TreatmentPlan {
            actions,
            rewards,
            total_reward,
            final_state: current,
        })
    }
}
