pub mod config;
pub mod lander;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neuro_core::Engine;
use tracing::{error, info, Level};

use crate::config::Config;
use crate::lander::HighScores;

#[derive(Parser)]
#[command(name = "neuro-lander")]
#[command(about = "Evolve rocket-landing controllers with neuroevolution")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the evolutionary loop
    Run {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of rounds to evaluate
        #[arg(long)]
        generations: Option<u32>,
        /// Networks per generation
        #[arg(long)]
        population: Option<usize>,
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Write the best network of the whole run here as JSON
        #[arg(long)]
        export_best: Option<PathBuf>,
    },
    /// Write the default configuration
    InitConfig {
        /// Output TOML file path
        output: PathBuf,
    },
}

fn init_logging(json: bool, level: Level) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(level);
    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("setting default subscriber failed")
}

fn run(
    config_path: Option<PathBuf>,
    generations: Option<u32>,
    population: Option<usize>,
    seed: Option<u64>,
    export_best: Option<PathBuf>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(generations) = generations {
        config.generations = generations;
    }
    if let Some(population) = population {
        config.engine.population = population;
    }
    if seed.is_some() {
        config.engine.seed = seed;
    }

    info!(
        generations = config.generations,
        simulation = ?config.simulation,
        "Starting evolution"
    );

    let mut engine = Engine::new(config.engine.clone())?;
    let mut board = HighScores::default();

    for _ in 0..config.generations {
        let mut networks = engine.next_generation()?;
        let summary = lander::evaluate(&mut engine, &mut networks, &config.simulation, &mut board)?;

        info!(
            round = summary.round,
            flown = summary.flown,
            landed = summary.landed,
            crashed = summary.crashed,
            best = summary.best_score,
            mean = summary.mean_score,
            "Round complete"
        );
    }

    info!(
        best_overall = board.best().map(|b| b.score),
        rounds = engine.round(),
        "Evolution finished"
    );
    for (rank, entry) in board.entries().iter().take(5).enumerate() {
        info!(
            rank = rank + 1,
            score = entry.score,
            round = entry.round,
            velocity = entry.velocity,
            fuel = entry.fuel,
            "High score"
        );
    }

    if let Some(path) = export_best {
        let snapshot = board
            .best_network()
            .context("no round was evaluated, nothing to export")?;
        fs::write(&path, snapshot.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Best network exported");
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.json_logs, cli.log_level) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run {
            config,
            generations,
            population,
            seed,
            export_best,
        } => run(config, generations, population, seed, export_best),
        Commands::InitConfig { output } => Config::default().save(&output),
    };

    if let Err(e) = result {
        error!(error = %format!("{e:#}"), "Fatal Error");
        std::process::exit(1);
    }
}
