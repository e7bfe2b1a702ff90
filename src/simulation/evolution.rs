//! Evolving population of MLP-backed controllers.
//!
//! The evaluation loop only knows the [`Controller`] trait; this module is
//! the bundled implementation of the other side of that seam. A
//! [`Population`] owns one genome per controller slot, spawns boxed
//! controllers for each generation, takes the evaluated fitness back from
//! the outcome, and breeds the next generation from the fittest fraction.

use std::path::Path;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::brain::Brain;
use super::controller::{Action, Controller, ControllerError};
use super::generation::GenerationOutcome;
use super::params::Params;
use super::perception::Features;

/// Errors emitted while saving or loading a population.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// The population file could not be read or written.
    #[error("failed to access population file: {0}")]
    Io(#[from] std::io::Error),
    /// The population file is not valid JSON for [`Population`].
    #[error("failed to parse population file: {0}")]
    Json(#[from] serde_json::Error),
}

/// One member of the population: a policy network and its latest score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    /// Policy network.
    pub brain: Brain,
    /// Fitness from the most recent evaluation.
    pub fitness: f32,
}

/// Bundled controller driving an agent with a fixed [`Brain`] policy.
///
/// The network sees the three perception features and emits one value;
/// the controller requests a jump whenever that value drops below zero.
pub struct MlpController {
    brain: Brain,
}

impl MlpController {
    /// Wraps a brain as a controller.
    pub fn new(brain: Brain) -> Self {
        Self { brain }
    }
}

impl Controller for MlpController {
    fn decide(&mut self, features: &Features) -> Result<Action, ControllerError> {
        let inputs = Array1::from_vec(features.to_vec());
        let output = self.brain.think(&inputs);
        match output.first() {
            Some(&value) if value < 0.0 => Ok(Action::Jump),
            Some(_) => Ok(Action::NoOp),
            None => Err(ControllerError::new("policy network produced no output")),
        }
    }

    fn report_fitness(&mut self, _fitness: f32) {
        // Fitness flows back to the population through the generation outcome.
    }
}

/// Evolving pool of genomes, evaluated one generation at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    /// Current genomes, in controller-index order.
    pub genomes: Vec<Genome>,
    /// Number of generations evolved so far.
    pub generation: u32,
}

impl Population {
    /// Creates a population of random genomes.
    pub fn new_random(params: &Params) -> Self {
        let genomes = (0..params.population_size)
            .map(|_| Genome {
                brain: Brain::new(&params.layer_sizes, params.init_weight_scale),
                fitness: 0.0,
            })
            .collect();
        Self {
            genomes,
            generation: 0,
        }
    }

    /// Boxes one controller per genome, in genome order, so controller
    /// index `i` in a generation outcome always maps back to genome `i`.
    pub fn spawn_controllers(&self) -> Vec<Box<dyn Controller>> {
        self.genomes
            .iter()
            .map(|genome| Box::new(MlpController::new(genome.brain.clone())) as Box<dyn Controller>)
            .collect()
    }

    /// Writes each agent's evaluated fitness back onto its genome.
    pub fn record_outcome(&mut self, outcome: &GenerationOutcome) {
        for agent in &outcome.agents {
            if let Some(genome) = self.genomes.get_mut(agent.controller) {
                genome.fitness = agent.fitness;
            }
        }
    }

    /// The best genome of the last evaluated generation.
    pub fn champion(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    /// Breeds the next generation in place.
    ///
    /// The fittest `elite_count` genomes survive unchanged. Every other slot
    /// is filled by a child of parents drawn from the top `parent_fraction`
    /// of the old generation: either an averaged crossover of two distinct
    /// parents or a clone of one, mutated in both cases with a freshly
    /// sampled scale. All fitness accumulators reset to zero.
    pub fn next_generation(&mut self, params: &Params) {
        if self.genomes.is_empty() {
            return;
        }
        self.genomes
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let parent_count = ((self.genomes.len() as f32 * params.parent_fraction).ceil() as usize)
            .clamp(1, self.genomes.len());

        let mut next: Vec<Genome> = self
            .genomes
            .iter()
            .take(params.elite_count.min(self.genomes.len()))
            .cloned()
            .collect();

        while next.len() < params.population_size {
            let mutation_scale = sample_mutation_scale();
            let use_crossover =
                parent_count >= 2 && rand::rng().random::<f32>() < params.crossover_prob;

            let mut brain = if use_crossover {
                let parent_1 = rand::rng().random_range(0..parent_count);
                let mut parent_2 = rand::rng().random_range(0..parent_count);
                while parent_2 == parent_1 {
                    parent_2 = rand::rng().random_range(0..parent_count);
                }
                Brain::crossover(&self.genomes[parent_1].brain, &self.genomes[parent_2].brain)
            } else {
                let parent = rand::rng().random_range(0..parent_count);
                self.genomes[parent].brain.clone()
            };
            brain.mutate(mutation_scale);
            next.push(Genome {
                brain,
                fitness: 0.0,
            });
        }

        for genome in &mut next {
            genome.fitness = 0.0;
        }
        self.genomes = next;
        self.generation += 1;
    }

    /// Saves the population to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvolutionError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a population from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EvolutionError> {
        let json = std::fs::read_to_string(path)?;
        let population = serde_json::from_str(&json)?;
        Ok(population)
    }
}

/// Samples a mutation scale using logarithmic random distribution, so small
/// refinements stay common while large jumps remain possible.
fn sample_mutation_scale() -> f32 {
    let min = 0.002f32;
    let max = 0.2f32;
    let log_min = min.ln();
    let log_max = max.ln();
    let log_mutation_scale = rand::rng().random_range(log_min..log_max);
    log_mutation_scale.exp()
}
