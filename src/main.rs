//! Headless training driver.
//!
//! Owns the generation loop: pull controllers from the population, evaluate
//! them on the level, feed the fitness back, breed, repeat. The simulation
//! crate never drives itself; everything generational happens here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use evodash::simulation::evolution::Population;
use evodash::simulation::generation::run_generation_until;
use evodash::simulation::level::LevelGrid;
use evodash::simulation::params::Params;

#[derive(Parser, Debug)]
#[command(
    name = "evodash",
    version,
    about = "Train side-scrolling platformer agents by neuroevolution"
)]
struct Cli {
    /// Level file: comma-separated symbol rows.
    #[arg(long, default_value = "levels/canyon.csv")]
    level: PathBuf,

    /// JSON parameter file; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to train.
    #[arg(long, default_value_t = 100)]
    generations: u32,

    /// Resume from a previously saved population file.
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Stop training as soon as any agent finishes the level.
    #[arg(long)]
    halt_on_win: bool,

    /// Tick budget per generation; 0 means unlimited.
    #[arg(long, default_value_t = 0)]
    max_ticks: u32,

    /// Where to save the champion genome after training.
    #[arg(long)]
    champion_out: Option<PathBuf>,

    /// Where to save the final population after training.
    #[arg(long)]
    population_out: Option<PathBuf>,

    /// Where to save the per-generation training summary.
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

/// One line of the training summary written by `--summary-out`.
#[derive(Debug, Serialize)]
struct GenerationSummary {
    generation: u32,
    best_fitness: f32,
    best_distance: f32,
    winners: usize,
    faulted_controllers: usize,
    ticks: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let params = match &cli.config {
        Some(path) => Params::load_from_file(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => Params::default(),
    };

    let level = LevelGrid::load_from_file(&cli.level)
        .with_context(|| format!("loading level from {}", cli.level.display()))?;
    info!(
        "level loaded: {} obstacles, {} hazard groups, {:.0} units long",
        level.obstacles().len(),
        level.hazard_groups().len(),
        level.pixel_width()
    );

    let mut population = match &cli.resume {
        Some(path) => Population::load_from_file(path)
            .with_context(|| format!("resuming population from {}", path.display()))?,
        None => Population::new_random(&params),
    };
    info!(
        "starting training: {} genomes, {} generations",
        population.genomes.len(),
        cli.generations
    );

    let mut summary = Vec::new();
    for round in 0..cli.generations {
        let mut controllers = population.spawn_controllers();
        let budget = cli.max_ticks;
        let mut ticks_seen = 0u32;
        let outcome = run_generation_until(&level, &params, &mut controllers, || {
            if budget == 0 {
                return false;
            }
            ticks_seen += 1;
            ticks_seen > budget
        });
        population.record_outcome(&outcome);

        let winners = outcome.agents.iter().filter(|agent| agent.won).count();
        if let Some(best) = outcome.best() {
            info!(
                "generation {}: best {:.2} by {} ({:.0} units), {winners} winner(s), {} faulted controller(s), {} ticks",
                population.generation,
                best.fitness,
                best.label,
                best.distance,
                outcome.faults.len(),
                outcome.ticks
            );
            summary.push(GenerationSummary {
                generation: population.generation,
                best_fitness: best.fitness,
                best_distance: best.distance,
                winners,
                faulted_controllers: outcome.faults.len(),
                ticks: outcome.ticks,
            });
        }

        if cli.halt_on_win && winners > 0 {
            info!(
                "level completed, stopping after generation {}",
                population.generation
            );
            break;
        }
        if round + 1 < cli.generations {
            population.next_generation(&params);
        }
    }

    if let Some(path) = &cli.champion_out {
        let champion = population
            .champion()
            .context("population is empty, nothing to save as champion")?;
        let json = serde_json::to_string_pretty(champion)?;
        std::fs::write(path, json)
            .with_context(|| format!("saving champion to {}", path.display()))?;
        info!(
            "champion saved to {} (fitness {:.2})",
            path.display(),
            champion.fitness
        );
    }

    if let Some(path) = &cli.population_out {
        population
            .save_to_file(path)
            .with_context(|| format!("saving population to {}", path.display()))?;
        info!("population saved to {}", path.display());
    }

    if let Some(path) = &cli.summary_out {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("saving training summary to {}", path.display()))?;
        info!("training summary saved to {}", path.display());
    }

    Ok(())
}
