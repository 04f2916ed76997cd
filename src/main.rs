// src/main.rs
//
// Thin harness around the Oncoplan library.
// All of the real logic lives in the lib crate (transition, reward, agent).

use clap::Parser;

use oncoplan::{
    AgentConfig,
    EventSink,
    FileSink,
    NoopSink,
    PatientState,
    Stage,
    TreatmentAgent,
};

/// Command-line arguments for the Oncoplan binary.
#[derive(Parser, Debug)]
#[command(name = "oncoplan")]
struct Cli {
    /// Initial tumor size in cm.
    #[arg(long, default_value_t = 2.5)]
    tumor_size: f64,

    /// Patient age in years.
    #[arg(long, default_value_t = 55)]
    age: u32,

    /// Clinical stage label (T1-T4 or M1).
    #[arg(long, default_value = "T2")]
    stage: String,

    /// Initial quality-of-life score in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    qol: f64,

    /// Number of training episodes.
    #[arg(long)]
    episodes: Option<u32>,

    /// Episode horizon in months.
    #[arg(long)]
    horizon: Option<u32>,

    /// Extracted plan length in months.
    #[arg(long)]
    plan_horizon: Option<u32>,

    /// Rng seed for the training run (plan extraction derives its own).
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Optional JSONL path for the per-step training log.
    #[arg(long)]
    log_jsonl: Option<String>,

    /// Print a summary line for every training episode.
    #[arg(short, long)]
    verbose: bool,
}

/// Build the telemetry sink as a trait object so we can choose between
/// FileSink and NoopSink at runtime.
fn build_sink(log_jsonl: Option<&str>) -> Box<dyn EventSink> {
    if let Some(path) = log_jsonl {
        match FileSink::create(path) {
            Ok(s) => Box::new(s),
            Err(err) => {
                eprintln!(
                    "Failed to create log file ({path}), \
                     falling back to NoopSink: {err}"
                );
                Box::new(NoopSink)
            }
        }
    } else {
        Box::new(NoopSink)
    }
}

/// Build AgentConfig from defaults, then apply CLI overrides.
///
/// This keeps src/config.rs as the single source of truth for the
/// hyperparameters; the CLI only touches run parameters.
fn build_config_from_args(cli: &Cli) -> AgentConfig {
    let mut cfg = AgentConfig::default();

    if let Some(episodes) = cli.episodes {
        cfg.training_episodes = episodes;
    }
    if let Some(horizon) = cli.horizon {
        cfg.episode_horizon_months = horizon;
    }
    if let Some(plan_horizon) = cli.plan_horizon {
        cfg.plan_horizon_months = plan_horizon;
    }

    cfg
}

fn main() {
    // 0) Parse CLI args.
    let cli = Cli::parse();

    let stage = match Stage::parse(&cli.stage) {
        Some(s) => s,
        None => {
            eprintln!("Unknown stage '{}' (expected T1-T4 or M1)", cli.stage);
            std::process::exit(2);
        }
    };

    // 1) Build config and the initial patient record.
    let cfg = build_config_from_args(&cli);
    if let Err(err) = cfg.validate() {
        eprintln!("invalid configuration: {err}");
        std::process::exit(2);
    }
    let initial = PatientState::new(cli.tumor_size, cli.age, stage).with_qol(cli.qol);

    // 2) Build telemetry sink from CLI.
    //
    //    - NoopSink -> no on-disk logs, just the stdout summary.
    //    - FileSink -> JSONL file with 1 record per step for offline analysis.
    let mut sink = build_sink(cli.log_jsonl.as_deref());

    println!(
        "oncoplan: tumor {:.2} cm, age {}, stage {}, {} episodes x {} months (seed {})",
        initial.tumor_size,
        initial.age,
        stage.as_str(),
        cfg.training_episodes,
        cfg.episode_horizon_months,
        cli.seed,
    );

    // 3) Train.
    let mut agent = TreatmentAgent::new(cfg, cli.seed);
    let summaries = match agent.train(&initial, sink.as_mut()) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("training failed: {err}");
            std::process::exit(1);
        }
    };

    if cli.verbose {
        for s in &summaries {
            println!(
                "episode {:>4}: {:>2} steps, reward {:>7.1}, {:?}, eps {:.4}",
                s.episode_id, s.steps, s.total_reward, s.termination, s.epsilon,
            );
        }
    }

    if let Some(last) = summaries.last() {
        let best = summaries
            .iter()
            .map(|s| s.total_reward)
            .fold(f64::NEG_INFINITY, f64::max);
        println!(
            "trained {} episodes: {} states visited, best episode reward {:.1}, final epsilon {:.4}",
            summaries.len(),
            agent.q_table().len(),
            best,
            last.epsilon,
        );
    }

    // 4) Extract and print the greedy plan.
    let plan = match agent.optimal_treatment_plan(&initial, cli.seed) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("plan extraction failed: {err}");
            std::process::exit(1);
        }
    };

    println!("\nrecommended plan ({} months):", plan.actions.len());
    println!("month  treatment  intensity  duration  reward");
    for (i, (action, reward)) in plan.actions.iter().zip(plan.rewards.iter()).enumerate() {
        println!(
            "{:>5}  {:<9}  {:>9.2}  {:>8}  {:>6.1}",
            i + 1,
            action.treatment_type.as_str(),
            action.intensity,
            action.duration_months,
            reward,
        );
    }
    println!(
        "\nprojected outcome: tumor {:.2} cm, toxicity {:.2}, qol {:.2}, total reward {:.1}",
        plan.final_state.tumor_size,
        plan.final_state.toxicity_level,
        plan.final_state.qol_score,
        plan.total_reward,
    );
}
