//! Generation evaluation loop and outcome reporting.
//!
//! One [`Evaluation`] value owns all mutable state for one generation: the
//! roster, the scroll, the hazard cursor, the fault ledger, and the phase
//! machine. It is created, run, and torn down per generation; nothing about
//! an evaluation lives in globals or survives [`Evaluation::drain`].
//!
//! Ticks are synchronous and sequential. The roster is compacted by marking
//! agents dead during the pass and moving them out afterwards, never by
//! removing mid-iteration.

use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use super::agent::{Agent, DeathCause, avatar_label};
use super::controller::{Action, Controller};
use super::hazard_index::HazardIndex;
use super::level::LevelGrid;
use super::params::Params;
use super::perception;
use super::scroll::ScrollState;

/// Phase of one generation evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    /// The roster has not been built yet.
    Spawning,
    /// Agents are being stepped tick by tick.
    Running,
    /// The active roster is empty; fitness reporting remains.
    Draining,
    /// The evaluation is finished and the context inert.
    Concluded,
}

/// Result of one agent's run, reported after the generation ends.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    /// Index of the controller that drove this agent.
    pub controller: usize,
    /// Display name.
    pub label: String,
    /// Final fitness, as reported to the controller.
    pub fitness: f32,
    /// Scroll distance covered while the agent was active.
    pub distance: f32,
    /// Tick on which the agent retired, or the last simulated tick.
    pub ticks: u32,
    /// Whether the agent reached the end of the level.
    pub won: bool,
    /// What killed the agent, if anything did.
    pub death: Option<DeathCause>,
}

/// Aggregated decision failures for one controller.
///
/// Failures degrade to no-ops during the run; this records that they
/// happened so the driver can spot controllers that stopped cooperating.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerFault {
    /// Index of the failing controller.
    pub controller: usize,
    /// Number of failed decisions over the generation.
    pub occurrences: u32,
    /// Tick of the first failure.
    pub first_tick: u32,
    /// Message of the first failure.
    pub message: String,
}

/// Everything the driver learns from one finished generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    /// Per-agent results, ordered by controller index.
    pub agents: Vec<AgentOutcome>,
    /// Per-controller fault summaries, ordered by controller index.
    pub faults: Vec<ControllerFault>,
    /// Number of ticks simulated.
    pub ticks: u32,
    /// Scroll progress when the evaluation ended.
    pub final_progress: f32,
    /// Whether the stop signal ended the evaluation early.
    pub halted: bool,
}

impl GenerationOutcome {
    /// The best-scoring agent of the generation, if any ran.
    pub fn best(&self) -> Option<&AgentOutcome> {
        self.agents
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }
}

struct Retired {
    agent: Agent,
    tick: u32,
    progress: f32,
}

/// Explicit evaluation context for one generation.
pub struct Evaluation<'a> {
    level: &'a LevelGrid,
    params: &'a Params,
    controllers: &'a mut [Box<dyn Controller>],
    phase: GenerationPhase,
    scroll: ScrollState,
    hazards: HazardIndex<'a>,
    active: Vec<Agent>,
    retired: Vec<Retired>,
    faults: HashMap<usize, ControllerFault>,
    tick: u32,
    halted: bool,
}

impl<'a> Evaluation<'a> {
    /// Creates an evaluation in the [`GenerationPhase::Spawning`] phase.
    ///
    /// # Arguments
    ///
    /// * `level` - Level geometry, shared by every agent
    /// * `params` - Simulation parameters
    /// * `controllers` - One agent will be spawned per entry
    pub fn new(
        level: &'a LevelGrid,
        params: &'a Params,
        controllers: &'a mut [Box<dyn Controller>],
    ) -> Self {
        Self {
            level,
            params,
            controllers,
            phase: GenerationPhase::Spawning,
            scroll: ScrollState::new(params.start_progress),
            hazards: HazardIndex::new(level),
            active: Vec::new(),
            retired: Vec::new(),
            faults: HashMap::new(),
            tick: 0,
            halted: false,
        }
    }

    /// Current phase of the evaluation.
    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    /// Current scroll progress.
    pub fn progress(&self) -> f32 {
        self.scroll.progress()
    }

    /// Number of ticks simulated so far.
    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    /// Number of agents still running.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// The still-active roster, first-spawned agent first.
    pub fn active_agents(&self) -> &[Agent] {
        &self.active
    }

    /// Builds the roster: one agent per controller, scroll and fitness
    /// accumulators reset.
    ///
    /// Moves the evaluation to [`GenerationPhase::Running`], or straight to
    /// [`GenerationPhase::Draining`] when there are no controllers, which
    /// makes an empty roster a quiet no-op rather than an error. Does
    /// nothing outside the spawning phase.
    pub fn spawn(&mut self) {
        if self.phase != GenerationPhase::Spawning {
            return;
        }
        self.scroll = ScrollState::new(self.params.start_progress);
        self.active = (0..self.controllers.len())
            .map(|index| {
                Agent::new(
                    index,
                    avatar_label(index),
                    self.params,
                    self.scroll.progress(),
                )
            })
            .collect();
        self.phase = if self.active.is_empty() {
            GenerationPhase::Draining
        } else {
            GenerationPhase::Running
        };
    }

    /// Advances the evaluation by one tick. Does nothing unless running.
    ///
    /// Tick order: level-end check, one shared perception snapshot, the
    /// decision pass, the physics pass, death penalties and roster
    /// compaction, scroll advance, and finally the progress fitness accrual
    /// for the agents that survived the tick. A tick is atomic: there is no
    /// cancellation point inside it.
    pub fn tick(&mut self) {
        if self.phase != GenerationPhase::Running {
            return;
        }
        self.tick += 1;
        let tick = self.tick;

        if self.scroll.progress() >= self.level.pixel_width() {
            // End of the course: everyone still standing has beaten it.
            for agent in &mut self.active {
                agent.retire_won();
            }
            self.compact(tick);
            return;
        }

        // One hazard lookup serves the whole roster this tick.
        let progress = self.scroll.progress();
        let hazard = self.hazards.nearest_ahead(progress);

        for agent in &mut self.active {
            let features = perception::encode(progress, agent.rect.top(), hazard);
            match self.controllers[agent.controller].decide(&features) {
                Ok(Action::Jump) => {
                    if !agent.grounded {
                        agent.fitness -= self.params.jump_penalty;
                    }
                    agent.request_jump();
                }
                Ok(Action::NoOp) => {}
                Err(error) => {
                    // A failing controller costs itself the tick, nothing more.
                    warn!(
                        "controller {} failed on tick {tick}: {error}",
                        agent.controller
                    );
                    let fault =
                        self.faults
                            .entry(agent.controller)
                            .or_insert_with(|| ControllerFault {
                                controller: agent.controller,
                                occurrences: 0,
                                first_tick: tick,
                                message: error.message,
                            });
                    fault.occurrences += 1;
                }
            }
        }

        let offset = self.scroll.offset();
        for agent in &mut self.active {
            agent.vel_x = self.params.forward_speed;
            agent.step(self.params, self.level, offset);
        }

        for agent in &mut self.active {
            if !agent.alive {
                agent.fitness -= self.params.death_penalty;
            }
        }
        self.compact(tick);
        if self.phase != GenerationPhase::Running {
            return;
        }

        let delta = self.active[0].vel_x;
        self.scroll.advance(delta);
        for agent in &mut self.active {
            agent.fitness += self.params.progress_rate * delta;
        }
    }

    /// Signals the evaluation to stop before its natural end.
    ///
    /// Agents still active keep the state of the last completed tick and
    /// are reported as they stood.
    pub fn halt(&mut self) {
        if self.phase == GenerationPhase::Running || self.phase == GenerationPhase::Spawning {
            self.halted = true;
            self.phase = GenerationPhase::Draining;
        }
    }

    /// Reports every agent's final fitness back to its controller and tears
    /// the evaluation down, yielding the outcome.
    pub fn drain(mut self) -> GenerationOutcome {
        let tick = self.tick;
        let progress = self.scroll.progress();
        for agent in self.active.drain(..) {
            self.retired.push(Retired {
                agent,
                tick,
                progress,
            });
        }

        let mut agents: Vec<AgentOutcome> = self
            .retired
            .iter()
            .map(|retired| AgentOutcome {
                controller: retired.agent.controller,
                label: retired.agent.label.clone(),
                fitness: retired.agent.fitness,
                distance: retired.progress - retired.agent.spawn_progress,
                ticks: retired.tick,
                won: retired.agent.won,
                death: retired.agent.death,
            })
            .collect();
        agents.sort_by_key(|outcome| outcome.controller);

        for outcome in &agents {
            self.controllers[outcome.controller].report_fitness(outcome.fitness);
        }

        let mut faults: Vec<ControllerFault> = self.faults.drain().map(|(_, f)| f).collect();
        faults.sort_by_key(|fault| fault.controller);

        self.phase = GenerationPhase::Concluded;
        GenerationOutcome {
            agents,
            faults,
            ticks: self.tick,
            final_progress: self.scroll.progress(),
            halted: self.halted,
        }
    }

    /// Moves every no-longer-active agent from the roster to the retired
    /// list, preserving order, and drains the phase once the roster empties.
    fn compact(&mut self, tick: u32) {
        let progress = self.scroll.progress();
        for agent in std::mem::take(&mut self.active) {
            if agent.is_active() {
                self.active.push(agent);
            } else {
                self.retired.push(Retired {
                    agent,
                    tick,
                    progress,
                });
            }
        }
        if self.active.is_empty() {
            self.phase = GenerationPhase::Draining;
        }
    }
}

/// Evaluates one generation to its natural end.
///
/// Spawns one agent per controller, runs the world until every agent has
/// died or finished the level, and reports each controller's fitness back
/// through [`Controller::report_fitness`].
pub fn run_generation(
    level: &LevelGrid,
    params: &Params,
    controllers: &mut [Box<dyn Controller>],
) -> GenerationOutcome {
    run_generation_until(level, params, controllers, || false)
}

/// Evaluates one generation with an external stop signal.
///
/// The signal is checked once per tick, before the tick mutates anything,
/// so a halt never leaves an agent half-updated.
pub fn run_generation_until(
    level: &LevelGrid,
    params: &Params,
    controllers: &mut [Box<dyn Controller>],
    mut stop: impl FnMut() -> bool,
) -> GenerationOutcome {
    let mut evaluation = Evaluation::new(level, params, controllers);
    evaluation.spawn();
    while evaluation.phase() == GenerationPhase::Running {
        if stop() {
            evaluation.halt();
            break;
        }
        evaluation.tick();
    }
    evaluation.drain()
}
