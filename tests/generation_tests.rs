#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use evodash::simulation::agent::{DeathCause, avatar_label};
use evodash::simulation::controller::{Action, Controller, ControllerError};
use evodash::simulation::generation::{
    Evaluation, GenerationPhase, run_generation, run_generation_until,
};
use evodash::simulation::level::LevelGrid;
use evodash::simulation::params::Params;
use evodash::simulation::perception::{FEATURE_COUNT, Features};

fn create_test_params() -> Params {
    Params {
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
        population_size: 4,
        layer_sizes: vec![FEATURE_COUNT, 8, 8, 1],
        init_weight_scale: 0.1,
        parent_fraction: 0.5,
        elite_count: 1,
        crossover_prob: 0.5,
    }
}

// A flat run: six empty rows, then a solid floor the agents land on.
fn corridor(cols: usize) -> LevelGrid {
    let mut text = String::new();
    for _ in 0..6 {
        text.push('\n');
    }
    text.push_str(&vec!["0"; cols].join(","));
    LevelGrid::from_csv_str(&text)
}

// Same corridor with one extra cell standing on the floor at `col`.
fn corridor_with(symbol: char, col: usize, cols: usize) -> LevelGrid {
    let mut text = String::new();
    for _ in 0..5 {
        text.push('\n');
    }
    text.push_str(&",".repeat(col));
    text.push(symbol);
    text.push('\n');
    text.push_str(&vec!["0"; cols].join(","));
    LevelGrid::from_csv_str(&text)
}

struct Scripted {
    action: Action,
    reported: Rc<Cell<Option<f32>>>,
}

impl Scripted {
    fn boxed(action: Action) -> (Box<dyn Controller>, Rc<Cell<Option<f32>>>) {
        let reported = Rc::new(Cell::new(None));
        let controller = Box::new(Scripted {
            action,
            reported: Rc::clone(&reported),
        });
        (controller, reported)
    }
}

impl Controller for Scripted {
    fn decide(&mut self, _features: &Features) -> Result<Action, ControllerError> {
        Ok(self.action)
    }

    fn report_fitness(&mut self, fitness: f32) {
        self.reported.set(Some(fitness));
    }
}

struct Faulty;

impl Controller for Faulty {
    fn decide(&mut self, _features: &Features) -> Result<Action, ControllerError> {
        Err(ControllerError::new("rigged to fail"))
    }

    fn report_fitness(&mut self, _fitness: f32) {}
}

struct Spy {
    seen: Rc<RefCell<Vec<Features>>>,
}

impl Controller for Spy {
    fn decide(&mut self, features: &Features) -> Result<Action, ControllerError> {
        self.seen.borrow_mut().push(*features);
        Ok(Action::NoOp)
    }

    fn report_fitness(&mut self, _fitness: f32) {}
}

fn calm_roster(count: usize) -> Vec<Box<dyn Controller>> {
    (0..count).map(|_| Scripted::boxed(Action::NoOp).0).collect()
}

#[test]
fn test_spawn_creates_one_agent_per_controller() {
    let params = create_test_params();
    let level = corridor(12);
    let mut controllers = calm_roster(3);

    let mut evaluation = Evaluation::new(&level, &params, &mut controllers);
    assert_eq!(evaluation.phase(), GenerationPhase::Spawning);

    evaluation.spawn();
    assert_eq!(evaluation.phase(), GenerationPhase::Running);
    assert_eq!(evaluation.active_count(), 3);

    let labels: HashSet<&str> = evaluation
        .active_agents()
        .iter()
        .map(|agent| agent.label.as_str())
        .collect();
    assert_eq!(labels.len(), 3);
    for (index, agent) in evaluation.active_agents().iter().enumerate() {
        assert_eq!(agent.controller, index);
        assert_eq!(agent.label, avatar_label(index));
    }
}

#[test]
fn test_generation_ends_with_every_agent_terminal() {
    let params = create_test_params();
    let level = corridor(12);
    let mut controllers = calm_roster(3);

    let mut evaluation = Evaluation::new(&level, &params, &mut controllers);
    evaluation.spawn();
    while evaluation.phase() == GenerationPhase::Running {
        evaluation.tick();
    }
    assert_eq!(evaluation.phase(), GenerationPhase::Draining);

    let outcome = evaluation.drain();
    assert_eq!(outcome.agents.len(), 3);
    assert!(
        outcome
            .agents
            .iter()
            .all(|agent| agent.won || agent.death.is_some())
    );
}

#[test]
fn test_open_corridor_ends_in_a_win() {
    let params = create_test_params();
    let level = corridor(6);
    let mut controllers = calm_roster(2);

    let outcome = run_generation(&level, &params, &mut controllers);

    assert_eq!(outcome.agents.len(), 2);
    assert!(!outcome.halted);
    assert_eq!(outcome.final_progress, level.pixel_width());
    for agent in &outcome.agents {
        assert!(agent.won);
        assert_eq!(agent.death, None);
        assert_eq!(agent.distance, level.pixel_width() - params.start_progress);
        assert!(agent.fitness > 0.0);
    }
}

#[test]
fn test_wall_kills_the_whole_roster() {
    let params = create_test_params();
    let level = corridor_with('0', 10, 12);
    let mut controllers = calm_roster(3);

    let outcome = run_generation(&level, &params, &mut controllers);

    assert_eq!(outcome.agents.len(), 3);
    for agent in &outcome.agents {
        assert!(!agent.won);
        assert_eq!(agent.death, Some(DeathCause::WallImpact));
        assert_eq!(agent.ticks, outcome.ticks);
        // The death penalty dwarfs what little progress was made
        assert!(agent.fitness < 0.0);
        assert!(agent.fitness > -params.death_penalty);
    }
}

#[test]
fn test_hazard_kills_in_a_full_run() {
    let params = create_test_params();
    let level = corridor_with('2', 10, 12);
    let mut controllers = calm_roster(2);

    let outcome = run_generation(&level, &params, &mut controllers);

    for agent in &outcome.agents {
        assert_eq!(agent.death, Some(DeathCause::Hazard));
        assert!(!agent.won);
    }
}

#[test]
fn test_empty_roster_is_a_quiet_noop() {
    let params = create_test_params();
    let level = corridor(6);
    let mut controllers: Vec<Box<dyn Controller>> = Vec::new();

    let mut evaluation = Evaluation::new(&level, &params, &mut controllers);
    evaluation.spawn();
    assert_eq!(evaluation.phase(), GenerationPhase::Draining);

    let outcome = evaluation.drain();
    assert!(outcome.agents.is_empty());
    assert!(outcome.faults.is_empty());
    assert_eq!(outcome.ticks, 0);
    assert!(!outcome.halted);
}

#[test]
fn test_fitness_is_monotone_without_penalties() {
    let params = create_test_params();
    let level = corridor(12);
    let mut controllers = calm_roster(1);

    let mut evaluation = Evaluation::new(&level, &params, &mut controllers);
    evaluation.spawn();

    let mut previous = 0.0f32;
    while evaluation.phase() == GenerationPhase::Running {
        evaluation.tick();
        if let Some(agent) = evaluation.active_agents().first() {
            assert!(
                agent.fitness >= previous,
                "fitness dropped from {previous} to {} on tick {}",
                agent.fitness,
                evaluation.tick_count()
            );
            previous = agent.fitness;
        }
    }

    let outcome = evaluation.drain();
    assert!(outcome.agents[0].fitness >= previous);
}

#[test]
fn test_airborne_jump_decisions_cost_a_fixed_penalty_each() {
    let params = create_test_params();
    let level = corridor(6);
    let mut controllers: Vec<Box<dyn Controller>> = vec![
        Scripted::boxed(Action::NoOp).0,
        Scripted::boxed(Action::Jump).0,
    ];

    let outcome = run_generation(&level, &params, &mut controllers);

    let calm = &outcome.agents[0];
    let eager = &outcome.agents[1];
    assert!(calm.won && eager.won);
    assert_eq!(calm.distance, eager.distance);

    // Every airborne jump decision costs exactly one penalty and the
    // progress contributions are identical, so the gap is a whole
    // multiple of the penalty constant.
    let gap = calm.fitness - eager.fitness;
    assert!(gap > 0.0);
    let penalties = gap / params.jump_penalty;
    assert!(
        (penalties - penalties.round()).abs() < 1e-3,
        "gap {gap} is not a multiple of the jump penalty"
    );
}

#[test]
fn test_failing_controller_degrades_to_noop() {
    let params = create_test_params();
    let level = corridor(6);
    let (calm, _) = Scripted::boxed(Action::NoOp);
    let mut controllers: Vec<Box<dyn Controller>> = vec![Box::new(Faulty), calm];

    let outcome = run_generation(&level, &params, &mut controllers);

    // The faulty controller's agent runs exactly like the calm one
    assert_eq!(outcome.agents.len(), 2);
    assert!(outcome.agents[0].won);
    assert!(outcome.agents[1].won);
    assert_eq!(outcome.agents[0].fitness, outcome.agents[1].fitness);

    assert_eq!(outcome.faults.len(), 1);
    let fault = &outcome.faults[0];
    assert_eq!(fault.controller, 0);
    assert_eq!(fault.first_tick, 1);
    assert!(fault.occurrences >= 1);
    assert!(fault.message.contains("rigged to fail"));
}

#[test]
fn test_stop_signal_halts_between_ticks() {
    let params = create_test_params();
    let level = corridor(12);
    let mut controllers = calm_roster(2);

    let mut polls = 0u32;
    let outcome = run_generation_until(&level, &params, &mut controllers, || {
        polls += 1;
        polls > 3
    });

    assert!(outcome.halted);
    assert_eq!(outcome.ticks, 3);
    for agent in &outcome.agents {
        assert!(!agent.won);
        assert_eq!(agent.death, None);
        assert_eq!(agent.ticks, 3);
        assert!((agent.distance - 3.0 * params.forward_speed).abs() < 1e-3);
    }
}

#[test]
fn test_final_fitness_is_reported_to_each_controller() {
    let params = create_test_params();
    let level = corridor_with('0', 10, 12);
    let rosters: Vec<(Box<dyn Controller>, Rc<Cell<Option<f32>>>)> =
        (0..3).map(|_| Scripted::boxed(Action::NoOp)).collect();

    let mut controllers = Vec::new();
    let mut cells = Vec::new();
    for (controller, cell) in rosters {
        controllers.push(controller);
        cells.push(cell);
    }

    let outcome = run_generation(&level, &params, &mut controllers);

    for (cell, agent) in cells.iter().zip(&outcome.agents) {
        assert_eq!(cell.get(), Some(agent.fitness));
    }
}

#[test]
fn test_roster_shares_one_scroll_snapshot_per_tick() {
    let params = create_test_params();
    let level = corridor_with('2', 10, 12);

    let seen_a = Rc::new(RefCell::new(Vec::new()));
    let seen_b = Rc::new(RefCell::new(Vec::new()));
    let mut controllers: Vec<Box<dyn Controller>> = vec![
        Box::new(Spy {
            seen: Rc::clone(&seen_a),
        }),
        Box::new(Spy {
            seen: Rc::clone(&seen_b),
        }),
    ];

    run_generation(&level, &params, &mut controllers);

    let seen_a = seen_a.borrow();
    let seen_b = seen_b.borrow();
    assert!(!seen_a.is_empty());
    assert_eq!(seen_a.as_slice(), seen_b.as_slice());

    // First tick: hazard leading cell at x=320 seen from progress 150,
    // agent top edge still at its spawn height of 134.
    assert_eq!(seen_a[0], [170.0, 26.0, 32.0]);
}
