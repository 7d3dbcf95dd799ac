use neuroflap::logging::Stats;
use neuroflap::{Execution, GenerationOutcome, GeneticTrainer, TrainerConfig};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Trains a population with no renderer attached.
#[derive(Parser, Debug)]
#[command(name = "headless")]
struct Cli {
    /// RON file with a trainer configuration; defaults are used
    /// for anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    generations: usize,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Directory to load network weights from before training.
    #[arg(long)]
    load: Option<PathBuf>,
    /// Directory to save network weights to after training.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Steps agents on a single thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

fn load_config(cli: &Cli) -> Result<TrainerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => TrainerConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.sequential {
        config.execution = Execution::Sequential;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let mut trainer = GeneticTrainer::new(config).context("creating trainer")?;

    if let Some(dir) = &cli.load {
        let report = trainer.load_all(dir);
        if !report.is_complete() {
            warn!(
                missing = report.missing.len(),
                failed = report.failed.len(),
                "some networks kept their random weights"
            );
        }
    }

    let start = Instant::now();
    for _ in 0..cli.generations {
        trainer.run_generation().context("advancing generation")?;
    }

    let logs: Vec<_> = trainer.logger().iter().collect();
    let completed = logs
        .iter()
        .filter(|log| log.outcome == GenerationOutcome::CourseCompleted)
        .count();
    info!(
        generations = logs.len(),
        completed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "training finished"
    );
    println!(
        "Best fitness per generation {:?}, {} of {} generations completed the course",
        Stats::from(logs.iter().map(|log| log.fitness.maximum)),
        completed,
        logs.len(),
    );

    if let Some(dir) = &cli.save {
        trainer
            .save_all(dir)
            .with_context(|| format!("saving networks to {}", dir.display()))?;
    }
    Ok(())
}
