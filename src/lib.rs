//! Oncoplan core library.
//!
//! This crate exposes the tumor-response simulator, the reward model, and
//! the Q-learning treatment agent. The binary (`src/main.rs`) is just a
//! thin training / plan-extraction harness around these components.

pub mod agent;
pub mod config;
pub mod logging;
pub mod policy;
pub mod qtable;
pub mod reward;
pub mod state;
pub mod transition;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use agent::{
    EpisodeSummary, EpisodeTrace, TerminationReason, TreatmentAgent, TreatmentPlan,
};

pub use config::{AgentConfig, ConfigError};

pub use logging::{EventSink, FileSink, NoopSink};

pub use policy::{greedy_action, possible_actions, EpsilonGreedy};

pub use qtable::{ActionKey, QTable, StateKey};

pub use reward::compute_reward;

pub use state::{PatientState, CURED_THRESHOLD_CM, MAX_TUMOR_SIZE_CM, TOXICITY_LIMIT};

pub use transition::apply_treatment;

pub use types::{InvalidActionError, MonthIndex, Stage, TreatmentAction, TreatmentType};
