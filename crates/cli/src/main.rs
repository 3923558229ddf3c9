use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use opgen::api::{
    GeneratorCache, GeneratorStats, OperatorId, PartialAssignment, RandomRegressionWalkSampler,
    RandomTaskGenerator, RandomTaskParams, RandomWalkSampler, State, Task, Value, WalkCfg,
    WalkHooks,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod samples;
mod task_file;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Operator generator inspection and state sampling")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Technique {
    /// Forward walks from the initial state (full states)
    Forward,
    /// Regression walks from the goal (partial assignments)
    Backward,
}

#[derive(Subcommand)]
enum Action {
    /// Build both generators for a task and print their statistics
    Inspect {
        #[arg(long)]
        task: PathBuf,
    },
    /// List operators applicable in a state; `*` marks an unassigned variable
    Applicable {
        #[arg(long)]
        task: PathBuf,
        /// Comma-separated values, e.g. "1,0,*"
        #[arg(long)]
        state: String,
    },
    /// Sample states with random walks and write them as a table
    Sample {
        #[arg(long)]
        task: PathBuf,
        #[arg(long, value_enum, default_value_t = Technique::Forward)]
        technique: Technique,
        #[arg(long, default_value_t = 100)]
        samples: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Estimated solution cost; sets the expected walk length
        #[arg(long, default_value_t = 0)]
        init_h: u64,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        deprioritize_undo: bool,
    },
    /// Write a random task file
    Generate {
        #[arg(long, default_value_t = 8)]
        variables: usize,
        #[arg(long, default_value_t = 40)]
        operators: usize,
        #[arg(long, default_value_t = 4)]
        domain_max: usize,
        #[arg(long, default_value_t = 0.0)]
        conditional: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Inspect { task } => inspect(&task),
        Action::Applicable { task, state } => applicable(&task, &state),
        Action::Sample {
            task,
            technique,
            samples,
            seed,
            init_h,
            out,
            deprioritize_undo,
        } => sample(
            &task,
            technique,
            samples,
            seed,
            init_h,
            &out,
            deprioritize_undo,
        ),
        Action::Generate {
            variables,
            operators,
            domain_max,
            conditional,
            seed,
            out,
        } => generate(variables, operators, domain_max, conditional, seed, &out),
        Action::Report => report(),
    }
}

fn stats_json(stats: &GeneratorStats) -> serde_json::Value {
    json!({
        "operators": stats.operators,
        "nodes": stats.nodes(),
        "forks": stats.forks,
        "dense_switches": stats.dense_switches,
        "sparse_switches": stats.sparse_switches,
        "single_switches": stats.single_switches,
        "leaves": stats.leaves,
        "max_switch_depth": stats.max_switch_depth,
    })
}

fn inspect(path: &Path) -> Result<()> {
    let task = task_file::load(path)?;
    tracing::info!(task = %path.display(), "inspect");
    let cache = GeneratorCache::new();
    let successors = cache.successor_generator(&task);
    let predecessors = cache.predecessor_generator(&task);
    let obj = json!({
        "variables": task.num_variables(),
        "operators": task.operators().len(),
        "unit_cost": task.is_unit_cost(),
        "conditional_effects": task.has_conditional_effects(),
        "successor_tree": stats_json(&successors.tree().stats()),
        "predecessor_tree": stats_json(&predecessors.tree().stats()),
        "initially_applicable": successors.generate_applicable_ops(&task.initial_state()).len(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

/// Parse "1,0,*" into per-variable options.
fn parse_values(text: &str) -> Result<Vec<Option<Value>>> {
    text.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(var, token)| match token {
            "*" | "_" => Ok(None),
            _ => token
                .parse::<Value>()
                .map(Some)
                .with_context(|| format!("bad value {token:?} for variable {var}")),
        })
        .collect()
}

fn applicable(path: &Path, text: &str) -> Result<()> {
    let task = task_file::load(path)?;
    let values = parse_values(text)?;
    let cache = GeneratorCache::new();
    let (direction, ids): (&str, Vec<OperatorId>) = if values.iter().all(Option::is_some) {
        let state = State::from_values(&task, values.into_iter().flatten().collect())
            .context("invalid state")?;
        ("forward", cache.successor_generator(&task).generate_applicable_ops(&state))
    } else {
        let partial =
            PartialAssignment::from_options(&task, values).context("invalid partial assignment")?;
        let generator = cache.predecessor_generator(&task);
        ("regression", generator.generate_applicable_ops(&partial))
    };
    let ops: Vec<serde_json::Value> = ids
        .iter()
        .map(|&id| json!({ "id": id.0, "name": task.operator(id).name }))
        .collect();
    tracing::info!(direction, count = ops.len(), "applicable");
    println!("{}", serde_json::to_string_pretty(&json!({ "direction": direction, "operators": ops }))?);
    Ok(())
}

fn sample(
    path: &Path,
    technique: Technique,
    num_samples: usize,
    seed: u64,
    init_h: u64,
    out: &Path,
    deprioritize_undo: bool,
) -> Result<()> {
    let task = task_file::load(path)?;
    tracing::info!(?technique, num_samples, seed, init_h, "sample");
    let cache = GeneratorCache::new();
    let cfg = WalkCfg {
        deprioritize_undoing_steps: deprioritize_undo,
        ..WalkCfg::default()
    };
    let rows = sample_rows(&task, &cache, technique, num_samples, seed, init_h, &cfg);
    samples::write_samples(out, &task, &rows)?;
    let payload = provenance::Payload::new(json!({
        "technique": format!("{technique:?}").to_lowercase(),
        "samples": num_samples,
        "init_h": init_h,
        "deprioritize_undo": deprioritize_undo,
    }))
    .with_task(path)
    .with_seed(seed);
    let sidecar = provenance::write_sidecar(out, payload)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "sample done");
    Ok(())
}

fn sample_rows(
    task: &Task,
    cache: &GeneratorCache,
    technique: Technique,
    num_samples: usize,
    seed: u64,
    init_h: u64,
    cfg: &WalkCfg,
) -> Vec<PartialAssignment> {
    match technique {
        Technique::Forward => RandomWalkSampler::new(task, cache, seed)
            .sample_states(num_samples, init_h, cfg, &WalkHooks::default())
            .into_iter()
            .map(PartialAssignment::from)
            .collect(),
        Technique::Backward => {
            let mut sampler = RandomRegressionWalkSampler::new(task, cache, seed);
            sampler.sample_states(num_samples, init_h, cfg, &WalkHooks::default())
        }
    }
}

fn generate(
    variables: usize,
    operators: usize,
    domain_max: usize,
    conditional: f64,
    seed: u64,
    out: &Path,
) -> Result<()> {
    if domain_max < 2 {
        bail!("--domain-max must be at least 2");
    }
    let params = RandomTaskParams {
        num_variables: variables,
        domain_max,
        num_operators: operators,
        max_preconditions: RandomTaskParams::default().max_preconditions.min(variables),
        max_effects: RandomTaskParams::default().max_effects.min(variables),
        conditional_effect_prob: conditional,
        goal_size: RandomTaskParams::default().goal_size.min(variables),
        ..RandomTaskParams::default()
    };
    let task = RandomTaskGenerator::generate_single(&params, seed)
        .context("generating random task")?;
    task_file::save(out, &task)?;
    let payload = provenance::Payload::new(json!({
        "variables": variables,
        "operators": operators,
        "domain_max": domain_max,
        "conditional_effect_prob": conditional,
    }))
    .with_seed(seed);
    provenance::write_sidecar(out, payload)?;
    tracing::info!(out = %out.display(), variables, operators, "generate");
    Ok(())
}

fn report() -> Result<()> {
    let mut obj = provenance::header();
    obj["params"] = json!({});
    obj["outputs"] = json!([]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_values_with_wildcards() {
        let values = parse_values("1, 0,*,_").unwrap();
        assert_eq!(values, vec![Some(1), Some(0), None, None]);
        assert!(parse_values("1,x").is_err());
    }

    #[test]
    fn generate_then_sample_both_directions() {
        let dir = tempdir().unwrap();
        let task_path = dir.path().join("task.json");
        generate(5, 30, 3, 0.2, 11, &task_path).unwrap();
        assert!(dir.path().join("task.provenance.json").exists());

        for (technique, name) in [(Technique::Forward, "fw.csv"), (Technique::Backward, "bw.csv")] {
            let out = dir.path().join(name);
            sample(&task_path, technique, 10, 3, 4, &out, true).unwrap();
            let text = std::fs::read_to_string(&out).unwrap();
            assert_eq!(text.lines().count(), 11);
        }
        inspect(&task_path).unwrap();
        applicable(&task_path, "0,0,0,0,0").unwrap();
        applicable(&task_path, "*,*,*,*,*").unwrap();
        assert!(applicable(&task_path, "0,0").is_err());
    }

    #[test]
    fn forward_rows_are_full_states() {
        let params = RandomTaskParams::default();
        let task = RandomTaskGenerator::generate_single(&params, 2).unwrap();
        let cache = GeneratorCache::new();
        let rows = sample_rows(&task, &cache, Technique::Forward, 5, 1, 3, &WalkCfg::default());
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(PartialAssignment::is_full));
    }
}
