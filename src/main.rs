use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use predictor_tuner::config::AppConfig;
use predictor_tuner::data::{Baseline, EvaluationCache};
use predictor_tuner::engines::evaluation::{
    capture_baseline, evaluate_holdout, FitnessEvaluator, OptimizationDirection, ReferenceRun,
    SimulatorOracle,
};
use predictor_tuner::engines::generation::{
    ConsoleProgressCallback, FileProgressRecorder, GeneticEngine, GridEngine, SearchContext,
};
use predictor_tuner::types::{Configuration, InstructionBudget};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "predictor-tuner", about = "Search predictor hyperparameters against a simulator")]
struct Cli {
    /// Tuner configuration (TOML or JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct BudgetArgs {
    /// Number of warmup instructions
    #[arg(short = 'w', long)]
    warmup: Option<u64>,
    /// Number of instructions of the region of interest (ROI)
    #[arg(short = 'n', long)]
    simulation: Option<u64>,
    /// Concurrent simulator processes
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate the default configuration and store the baseline MPKI per trace
    Baseline {
        #[command(flatten)]
        budget: BudgetArgs,
    },
    /// Run the genetic search on the training traces
    Genetic {
        #[command(flatten)]
        budget: BudgetArgs,
        #[arg(long)]
        generations: Option<usize>,
        #[arg(long)]
        population: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Randomly sample the configuration grid without replacement
    Grid {
        #[command(flatten)]
        budget: BudgetArgs,
        /// Max number of algorithm iterations
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Evaluate a configuration (JSON) on the held-out traces
    Evaluate {
        configuration: PathBuf,
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Print the effective configuration as TOML
    ShowConfig,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Baseline { budget } => {
            apply_budget(&mut config, &budget);
            run_baseline(&config)
        }
        Command::Genetic {
            budget,
            generations,
            population,
            seed,
        } => {
            apply_budget(&mut config, &budget);
            if let Some(generations) = generations {
                config.genetic.generations = generations;
            }
            if let Some(population) = population {
                config.genetic.population_size = population;
            }
            if seed.is_some() {
                config.genetic.seed = seed;
            }
            config.validate()?;
            run_genetic(&config)
        }
        Command::Grid { budget, limit, seed } => {
            apply_budget(&mut config, &budget);
            if let Some(limit) = limit {
                config.grid.limit = limit;
            }
            if seed.is_some() {
                config.grid.seed = seed;
            }
            config.validate()?;
            run_grid(&config)
        }
        Command::Evaluate { configuration, jobs } => {
            if let Some(jobs) = jobs {
                config.simulator.parallelism = jobs;
            }
            config.validate()?;
            run_evaluate(&config, &configuration)
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn apply_budget(config: &mut AppConfig, args: &BudgetArgs) {
    if let Some(warmup) = args.warmup {
        config.workloads.training_budget.warmup = warmup;
    }
    if let Some(simulation) = args.simulation {
        config.workloads.training_budget.simulation = simulation;
    }
    if let Some(jobs) = args.jobs {
        config.simulator.parallelism = jobs;
    }
}

/// Run `f` on a dedicated rayon pool sized by `simulator.parallelism`
fn with_pool<T: Send>(config: &AppConfig, f: impl FnOnce(bool) -> Result<T> + Send) -> Result<T> {
    let parallelism = config.simulator.parallelism;
    if parallelism <= 1 {
        return f(false);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .context("Failed to build worker pool")?;
    pool.install(|| f(true))
}

fn print_run_header(label: &str, budget: InstructionBudget, traces: &[predictor_tuner::types::Trace]) {
    println!("{}", "=".repeat(55));
    println!("*** {} ***\n", label);
    println!(" - Num warmup instructions: {}", budget.warmup);
    println!(" - Num simulation instructions: {}", budget.simulation);
    println!(" - Workloads:");
    for trace in traces {
        println!("   - {}", trace.short_name());
    }
    println!("{}\n", "=".repeat(55));
}

fn run_baseline(config: &AppConfig) -> Result<()> {
    let oracle = SimulatorOracle::from_config(&config.simulator)?;
    let runs = vec![
        ReferenceRun {
            traces: config.workloads.training_traces(),
            budget: config.workloads.training_budget,
        },
        ReferenceRun {
            traces: config.workloads.testing_traces(),
            budget: config.workloads.evaluation_budget,
        },
    ];
    for (label, run) in ["Training", "Testing"].iter().zip(&runs) {
        print_run_header(label, run.budget, &run.traces);
    }

    let baseline = with_pool(config, |parallel| Ok(capture_baseline(&oracle, &runs, parallel)?))?;
    baseline
        .save(&config.workloads.baseline_path)
        .with_context(|| format!("Failed to write {}", config.workloads.baseline_path.display()))?;

    for (trace, mpki) in baseline.iter() {
        println!(" - {}:\t{}", trace.short_name(), mpki);
    }
    println!("\nBaseline written to {}", config.workloads.baseline_path.display());
    Ok(())
}

fn load_baseline(config: &AppConfig) -> Result<Arc<Baseline>> {
    let baseline = Baseline::load(&config.workloads.baseline_path).with_context(|| {
        format!(
            "Failed to load baseline {}; run `baseline` first",
            config.workloads.baseline_path.display()
        )
    })?;
    Ok(Arc::new(baseline))
}

fn run_genetic(config: &AppConfig) -> Result<()> {
    let baseline = load_baseline(config)?;
    let space = config.space.space()?;
    let oracle = SimulatorOracle::from_config(&config.simulator)?;
    let traces = config.workloads.training_traces();
    let budget = config.workloads.training_budget;
    print_run_header("Genetic search", budget, &traces);

    let evaluator = FitnessEvaluator::new(baseline, config.genetic.direction)
        .with_failure_penalty(config.fitness.failure_penalty);
    let cache = Arc::new(EvaluationCache::new(config.genetic.cache_capacity));
    let recorder = FileProgressRecorder::new()
        .with_generation_log(&config.output.genetic_progress)
        .with_best_record(&config.output.best_config);

    let outcome = with_pool(config, |parallel| {
        let context = SearchContext::new(&oracle, traces, budget, evaluator)?
            .with_cache(cache)
            .with_parallel(parallel);
        let mut engine = GeneticEngine::new(config.genetic.clone(), space, context)?;
        Ok(engine.run((ConsoleProgressCallback, recorder))?)
    })?;

    println!(
        "Best individual after {} generations ({}):\n{}\nwith score {:.4}",
        config.genetic.generations,
        outcome.best.individual.id,
        outcome.best.individual.config,
        outcome.best.score
    );
    for (trace, result) in outcome.best.results.iter() {
        println!(" - {}:\t{:?}", trace.short_name(), result);
    }
    if outcome.best_ever.individual != outcome.best.individual {
        println!(
            "Best ever ({}) scored {:.4}: {}",
            outcome.best_ever.individual.id,
            outcome.best_ever.score,
            outcome.best_ever.individual.config
        );
    }
    Ok(())
}

fn run_grid(config: &AppConfig) -> Result<()> {
    let baseline = load_baseline(config)?;
    let space = config.grid.space(&config.space.space()?)?;
    let oracle = SimulatorOracle::from_config(&config.simulator)?;
    let traces = config.workloads.training_traces();
    let budget = config.workloads.training_budget;
    print_run_header("Grid search", budget, &traces);

    let evaluator = FitnessEvaluator::new(baseline, config.grid.direction)
        .with_failure_penalty(config.fitness.failure_penalty);
    let recorder = FileProgressRecorder::new()
        .with_iteration_log(&config.output.grid_progress)
        .with_best_record(&config.output.best_config);

    let outcome = with_pool(config, |parallel| {
        let context = SearchContext::new(&oracle, traces, budget, evaluator)?.with_parallel(parallel);
        let mut engine = GridEngine::new(config.grid.clone(), space, context)?;
        Ok(engine.run((ConsoleProgressCallback, recorder))?)
    })?;

    println!(
        "Evaluated {} of {} configurations ({} discarded)",
        outcome.iterations, outcome.grid_len, outcome.discarded
    );
    match outcome.best {
        Some(best) => println!("Best conf ({:.4}): {}", best.score, best.individual.config),
        None => println!("No configuration beat the baseline"),
    }
    Ok(())
}

fn run_evaluate(config: &AppConfig, path: &Path) -> Result<()> {
    let baseline = load_baseline(config)?;
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let configuration = parse_configuration(&contents)
        .with_context(|| format!("Failed to parse configuration {}", path.display()))?;

    let oracle = SimulatorOracle::from_config(&config.simulator)?;
    let run = ReferenceRun {
        traces: config.workloads.testing_traces(),
        budget: config.workloads.evaluation_budget,
    };
    print_run_header("Evaluating final config", run.budget, &run.traces);

    let evaluator = FitnessEvaluator::new(baseline, OptimizationDirection::Maximize)
        .with_failure_penalty(config.fitness.failure_penalty);
    let report = with_pool(config, |parallel| {
        Ok(evaluate_holdout(&oracle, &evaluator, &configuration, &run, parallel)?)
    })?;

    for row in &report.rows {
        println!(
            " - {}:\tDefault Conf MPKI: {}\tTest Conf MPKI: {:?}",
            row.trace.short_name(),
            row.baseline_mpki,
            row.outcome
        );
    }
    println!("\nWeighted improvement: {:.4}%", report.weighted_improvement);
    println!("New config evaluation took {:.2} seconds\n", report.elapsed_secs);

    predictor_tuner::data::write_json_atomic(&config.output.holdout_report, &report)?;
    Ok(())
}

/// Accepts either a flat configuration or a best-record file with an `individual`
fn parse_configuration(contents: &str) -> Result<Configuration> {
    let value: serde_json::Value = serde_json::from_str(contents)?;
    let flat = value
        .get("individual")
        .and_then(|individual| individual.get("config"))
        .cloned()
        .unwrap_or(value);
    Ok(serde_json::from_value(flat)?)
}
