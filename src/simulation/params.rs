//! Simulation parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::perception::FEATURE_COUNT;

/// Errors emitted while loading or validating parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The parameter file could not be read or written.
    #[error("failed to access parameter file: {0}")]
    Io(#[from] std::io::Error),
    /// The parameter file is not valid JSON for [`Params`].
    #[error("failed to parse parameter file: {0}")]
    Json(#[from] serde_json::Error),
    /// A parameter value is outside its usable range.
    #[error("invalid parameter: {0}")]
    Invalid(&'static str),
}

/// Simulation parameters that control physics, scoring, and evolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Downward acceleration per tick while airborne.
    pub gravity: f32,
    /// Upward velocity impulse applied when a grounded jump fires.
    pub jump_strength: f32,
    /// Hard cap on downward velocity.
    pub max_fall_speed: f32,
    /// Fixed horizontal speed; agents cannot steer, only jump.
    pub forward_speed: f32,
    /// Side length of the agent's square body.
    pub agent_size: f32,
    /// X coordinate of the agent's center at spawn.
    pub spawn_x: f32,
    /// Y coordinate of the agent's center at spawn.
    pub spawn_y: f32,
    /// Scroll progress at the start of every evaluation.
    pub start_progress: f32,
    /// Fitness gained per unit of scroll distance survived.
    pub progress_rate: f32,
    /// Fitness lost for a jump decision made while airborne.
    pub jump_penalty: f32,
    /// Fitness lost on death, applied once.
    pub death_penalty: f32,
    /// Cosmetic rotation in degrees per airborne tick of a latched jump.
    pub spin_step: f32,
    /// Number of controllers per generation.
    pub population_size: usize,
    /// Neural network layer dimensions, input first.
    pub layer_sizes: Vec<usize>,
    /// Weight range for freshly initialized networks.
    pub init_weight_scale: f32,
    /// Fraction of the population eligible as parents, fittest first.
    pub parent_fraction: f32,
    /// Number of top genomes copied unchanged into the next generation.
    pub elite_count: usize,
    /// Probability that a child comes from crossover rather than cloning.
    pub crossover_prob: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            gravity: 0.96,
            jump_strength: 12.0,
            max_fall_speed: 100.0,
            forward_speed: 6.0,
            agent_size: 32.0,
            spawn_x: 150.0,
            spawn_y: 150.0,
            start_progress: 150.0,
            progress_rate: 0.01,
            jump_penalty: 5.0,
            death_penalty: 50.0,
            spin_step: 8.1712,
            population_size: 50,
            layer_sizes: vec![FEATURE_COUNT, 8, 8, 1],
            init_weight_scale: 0.1,
            parent_fraction: 0.15,
            elite_count: 2,
            crossover_prob: 0.5,
        }
    }
}

impl Params {
    /// Checks that the parameter set is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.forward_speed <= 0.0 {
            return Err(ParamsError::Invalid("forward_speed must be positive"));
        }
        if self.agent_size <= 0.0 {
            return Err(ParamsError::Invalid("agent_size must be positive"));
        }
        if self.population_size == 0 {
            return Err(ParamsError::Invalid("population_size must be at least 1"));
        }
        if self.layer_sizes.len() < 2 {
            return Err(ParamsError::Invalid("layer_sizes needs input and output"));
        }
        if self.layer_sizes.first() != Some(&FEATURE_COUNT) {
            return Err(ParamsError::Invalid(
                "layer_sizes must start at the perception feature count",
            ));
        }
        if self.layer_sizes.last() != Some(&1) {
            return Err(ParamsError::Invalid("layer_sizes must end with 1 output"));
        }
        if !(self.parent_fraction > 0.0 && self.parent_fraction <= 1.0) {
            return Err(ParamsError::Invalid("parent_fraction must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.crossover_prob) {
            return Err(ParamsError::Invalid("crossover_prob must be in [0, 1]"));
        }
        if self.elite_count > self.population_size {
            return Err(ParamsError::Invalid(
                "elite_count cannot exceed population_size",
            ));
        }
        Ok(())
    }

    /// Saves the parameters to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ParamsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads and validates parameters from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParamsError> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }
}
