// tests/telemetry_log_tests.rs
//
// JSONL telemetry contract: one parseable record per step, episode-end
// markers interleaved, and field names stable for downstream tooling.

use std::fs;

use serde_json::Value;

use oncoplan::{AgentConfig, FileSink, PatientState, Stage, TreatmentAgent};

fn tmp_path(name: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("oncoplan_{}_{}.jsonl", name, std::process::id()));
    p.to_string_lossy().into_owned()
}

#[test]
fn training_log_is_line_delimited_json() {
    let path = tmp_path("train");
    let cfg = AgentConfig::default().with_training_episodes(5);
    let initial = PatientState::new(2.5, 55, Stage::T2);

    let mut agent = TreatmentAgent::new(cfg, 42);
    let summaries = {
        let mut sink = FileSink::create(&path).unwrap();
        agent.train(&initial, &mut sink).unwrap()
        // sink dropped here, flushing the writer
    };

    let contents = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).ok();

    let records: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    let step_count: usize = summaries.iter().map(|s| s.steps as usize).sum();
    let end_count = records
        .iter()
        .filter(|r| r.get("kind").and_then(Value::as_str) == Some("episode_end"))
        .count();

    assert_eq!(records.len(), step_count + summaries.len());
    assert_eq!(end_count, summaries.len());

    // Step records carry the state snapshot fields downstream tooling keys on.
    let step = records
        .iter()
        .find(|r| r.get("kind").is_none())
        .expect("at least one step record");
    for field in [
        "episode",
        "step",
        "action",
        "reward",
        "epsilon",
        "tumor_size",
        "toxicity_level",
        "qol_score",
        "resistance_risk",
        "months_elapsed",
    ] {
        assert!(step.get(field).is_some(), "missing field {field}");
    }

    // Episode-end records flatten the summary next to the marker.
    let end = records
        .iter()
        .find(|r| r.get("kind").is_some())
        .expect("at least one episode_end record");
    for field in ["episode_id", "steps", "total_reward", "termination", "epsilon"] {
        assert!(end.get(field).is_some(), "missing field {field}");
    }
}
