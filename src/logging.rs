// src/logging.rs
//
// Telemetry sinks for training runs.
// - EventSink: trait used by the episode orchestrator
// - NoopSink:  discards all events
// - FileSink:  writes one JSON line per step for offline analysis

use std::fs::File;
use std::io::{self, BufWriter, Write};

use serde::Serialize;

use crate::agent::EpisodeSummary;
use crate::state::PatientState;
use crate::types::TreatmentAction;

/// Abstract sink for per-step training telemetry.
pub trait EventSink {
    fn log_step(
        &mut self,
        episode_id: u32,
        step: u32,
        state: &PatientState,
        action: &TreatmentAction,
        reward: f64,
        epsilon: f64,
    );

    fn log_episode_end(&mut self, _summary: &EpisodeSummary) {}
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_step(
        &mut self,
        _episode_id: u32,
        _step: u32,
        _state: &PatientState,
        _action: &TreatmentAction,
        _reward: f64,
        _epsilon: f64,
    ) {
        // intentionally no-op
    }
}

/// One step record as serialized by [`FileSink`].
#[derive(Debug, Serialize)]
struct StepRecord<'a> {
    episode: u32,
    step: u32,
    action: &'a TreatmentAction,
    reward: f64,
    epsilon: f64,
    tumor_size: f64,
    toxicity_level: f64,
    qol_score: f64,
    resistance_risk: f64,
    months_elapsed: u32,
}

/// JSONL file sink.
///
/// Each step is written as a single JSON object on its own line; episode
/// summaries are interleaved with a `"kind":"episode_end"` marker.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create(path: &str) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, value: &impl Serialize) {
        // Telemetry is best-effort; a failed write must not abort training.
        if let Ok(line) = serde_json::to_string(value) {
            let _ = writeln!(self.writer, "{}", line);
        }
    }
}

impl EventSink for FileSink {
    fn log_step(
        &mut self,
        episode_id: u32,
        step: u32,
        state: &PatientState,
        action: &TreatmentAction,
        reward: f64,
        epsilon: f64,
    ) {
        let record = StepRecord {
            episode: episode_id,
            step,
            action,
            reward,
            epsilon,
            tumor_size: state.tumor_size,
            toxicity_level: state.toxicity_level,
            qol_score: state.qol_score,
            resistance_risk: state.resistance_risk,
            months_elapsed: state.months_elapsed,
        };
        self.write_line(&record);
    }

    fn log_episode_end(&mut self, summary: &EpisodeSummary) {
        #[derive(Serialize)]
        struct EpisodeEndRecord<'a> {
            kind: &'static str,
            #[serde(flatten)]
            summary: &'a EpisodeSummary,
        }

        self.write_line(&EpisodeEndRecord {
            kind: "episode_end",
            summary,
        });
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
