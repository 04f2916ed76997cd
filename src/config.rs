// src/config.rs
//
// Central configuration for the treatment-policy engine.
//
// Single source of truth for the Q-learning hyperparameters, the
// exploration schedule, the disease-model tunables, and the run
// parameters (episode horizon, training episode count, plan horizon).

use serde::{Deserialize, Serialize};

/// Hyperparameters and run parameters for a training run.
///
/// Defaults are the standard tabular Q-learning setup: alpha 0.1,
/// gamma 0.95, epsilon 0.1 decaying by 0.995 to a floor of 0.01,
/// 24-month episodes and 12-month plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Q-learning step size (alpha).
    pub learning_rate: f64,
    /// Discount factor (gamma) on future reward.
    pub discount_factor: f64,
    /// Initial exploration rate (epsilon).
    pub initial_epsilon: f64,
    /// Multiplicative epsilon decay applied once per training episode.
    pub epsilon_decay: f64,
    /// Floor below which epsilon never falls.
    pub min_epsilon: f64,

    // ----- Disease-model tunables -----
    /// History length beyond which resistance risk escalates each month.
    /// Heuristic, not a clinical law; kept tunable.
    pub resistance_history_threshold: usize,
    /// Per-month resistance increase once past the threshold.
    pub resistance_increment: f64,
    /// Upper bound of the uniform monthly growth draw for untreated tumors (cm).
    pub max_monthly_growth_cm: f64,

    // ----- Run parameters -----
    /// Maximum episode length in months.
    pub episode_horizon_months: u32,
    /// Number of training episodes per run.
    pub training_episodes: u32,
    /// Length of the extracted treatment plan in months.
    pub plan_horizon_months: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.95,
            initial_epsilon: 0.1,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
            resistance_history_threshold: 3,
            resistance_increment: 0.05,
            max_monthly_growth_cm: 0.1,
            episode_horizon_months: 24,
            training_episodes: 200,
            plan_horizon_months: 12,
        }
    }
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, alpha: f64) -> Self {
        self.learning_rate = alpha;
        self
    }

    pub fn with_discount_factor(mut self, gamma: f64) -> Self {
        self.discount_factor = gamma;
        self
    }

    pub fn with_epsilon(mut self, initial: f64, decay: f64, min: f64) -> Self {
        self.initial_epsilon = initial;
        self.epsilon_decay = decay;
        self.min_epsilon = min;
        self
    }

    pub fn with_episode_horizon(mut self, months: u32) -> Self {
        self.episode_horizon_months = months;
        self
    }

    pub fn with_training_episodes(mut self, episodes: u32) -> Self {
        self.training_episodes = episodes;
        self
    }

    pub fn with_plan_horizon(mut self, months: u32) -> Self {
        self.plan_horizon_months = months;
        self
    }

    /// Check every tunable against its declared range.
    ///
    /// Builders and struct literals accept anything; callers standing up an
    /// agent from external input (CLI, research sweeps) run this first so a
    /// bad hyperparameter fails loudly instead of corrupting a training run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("learning_rate", self.learning_rate, 0.0, 1.0)?;
        check_range("discount_factor", self.discount_factor, 0.0, 1.0)?;
        check_range("initial_epsilon", self.initial_epsilon, 0.0, 1.0)?;
        check_range("min_epsilon", self.min_epsilon, 0.0, 1.0)?;
        // decay > 1 would make epsilon grow from the very first step.
        check_range("epsilon_decay", self.epsilon_decay, 0.0, 1.0)?;
        if self.min_epsilon > self.initial_epsilon {
            return Err(ConfigError::EpsilonFloorAboveInitial {
                min_epsilon: self.min_epsilon,
                initial_epsilon: self.initial_epsilon,
            });
        }
        check_range("resistance_increment", self.resistance_increment, 0.0, 1.0)?;
        // The growth draw is U(0, max); a non-positive upper bound would
        // make the sampler's range empty.
        if !self.max_monthly_growth_cm.is_finite() || self.max_monthly_growth_cm <= 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                field: "max_monthly_growth_cm",
                value: self.max_monthly_growth_cm,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// A hyperparameter or tunable outside its declared range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ValueOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// `min_epsilon > initial_epsilon`: decay would be non-monotone from
    /// the first call (epsilon jumps up to the floor).
    EpsilonFloorAboveInitial {
        min_epsilon: f64,
        initial_epsilon: f64,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ValueOutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{} = {} outside [{}, {}]", field, value, min, max),
            ConfigError::EpsilonFloorAboveInitial {
                min_epsilon,
                initial_epsilon,
            } => write!(
                f,
                "min_epsilon {} exceeds initial_epsilon {}",
                min_epsilon, initial_epsilon
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hyperparameters() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.learning_rate, 0.1);
        assert_eq!(cfg.discount_factor, 0.95);
        assert_eq!(cfg.initial_epsilon, 0.1);
        assert_eq!(cfg.epsilon_decay, 0.995);
        assert_eq!(cfg.min_epsilon, 0.01);
        assert_eq!(cfg.resistance_history_threshold, 3);
        assert_eq!(cfg.episode_horizon_months, 24);
        assert_eq!(cfg.plan_horizon_months, 12);
    }

    #[test]
    fn builder_overrides() {
        let cfg = AgentConfig::default()
            .with_learning_rate(0.2)
            .with_epsilon(0.3, 0.99, 0.05)
            .with_episode_horizon(60);

        assert_eq!(cfg.learning_rate, 0.2);
        assert_eq!(cfg.initial_epsilon, 0.3);
        assert_eq!(cfg.episode_horizon_months, 60);
    }

    #[test]
    fn defaults_validate() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_hyperparameters_rejected() {
        let cfg = AgentConfig::default().with_learning_rate(-0.1);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ValueOutOfRange {
                field: "learning_rate",
                value: -0.1,
                min: 0.0,
                max: 1.0,
            })
        );

        let cfg = AgentConfig::default().with_discount_factor(f64::NAN);
        assert!(cfg.validate().is_err());

        // Decay above 1 would grow epsilon instead of shrinking it.
        let cfg = AgentConfig::default().with_epsilon(0.1, 1.5, 0.01);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn epsilon_floor_above_initial_rejected() {
        let cfg = AgentConfig::default().with_epsilon(0.05, 0.995, 0.2);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EpsilonFloorAboveInitial {
                min_epsilon: 0.2,
                initial_epsilon: 0.05,
            })
        );
    }

    #[test]
    fn non_positive_growth_range_rejected() {
        let mut cfg = AgentConfig::default();
        cfg.max_monthly_growth_cm = 0.0;
        assert!(cfg.validate().is_err());
    }
}
