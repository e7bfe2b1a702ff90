//! # Evodash - Neuroevolution Platformer Trainer
//!
//! A side-scrolling obstacle course played by a population of autonomous
//! agents instead of a human. Every agent shares one fixed-timestep world:
//! the course scrolls toward the agents, the only available action is a jump,
//! and the distance survived becomes the fitness signal that drives the
//! evolution of the next generation of controllers.
//!
//! ## Features
//!
//! - Grid levels with solid blocks, half blocks, and hazard runs
//! - Deterministic two-pass (horizontal, then vertical) collision resolution
//! - Fixed three-feature perception of the nearest hazard ahead
//! - Generation evaluation loop with per-controller fitness reporting
//! - Bundled MLP controllers evolved by mutation and crossover
//! - Headless training driver with JSON config and champion saves
//!
//! ## Core Modules
//!
//! - [`simulation::level`] - Level geometry and hazard grouping
//! - [`simulation::agent`] - Agent kinematics and collision handling
//! - [`simulation::generation`] - Per-generation evaluation loop
//! - [`simulation::controller`] - Decision interface for controllers
//! - [`simulation::evolution`] - Evolving MLP controller population

/// Core simulation logic and data structures.
pub mod simulation {
    /// Agent kinematics, collision resolution, and lifecycle.
    pub mod agent;
    /// Multi-layer perceptron backing the bundled controllers.
    pub mod brain;
    /// Decision interface between the loop and controllers.
    pub mod controller;
    /// Evolving population of MLP-backed controllers.
    pub mod evolution;
    /// Generation evaluation loop and outcome reporting.
    pub mod generation;
    /// Rectangle primitive shared by agents and obstacles.
    pub mod geometry;
    /// Nearest-hazard-ahead lookups over the sorted group list.
    pub mod hazard_index;
    /// Level geometry: symbol grids, obstacles, hazard groups.
    pub mod level;
    /// Simulation parameters.
    pub mod params;
    /// Fixed-size perception features fed to controllers.
    pub mod perception;
    /// Global scroll progress shared by every agent.
    pub mod scroll;
}
