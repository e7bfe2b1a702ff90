//! Agent kinematics, collision resolution, and lifecycle.
//!
//! Agents are square bodies carried forward at a fixed speed. The controller
//! only ever decides one thing per tick: whether to request a jump. Vertical
//! motion, collision response, and death all follow deterministically from
//! the level geometry.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::level::{CELL_SIZE, LevelGrid, ObstacleKind};
use super::params::Params;

/// Cosmetic avatar names cycled through when labelling a roster.
pub const AVATAR_NAMES: [&str; 11] = [
    "Bloody", "Ghost", "Haze", "Ice", "Lime", "Orange", "Samurai", "Sub-Zero", "Sunny", "Vampire",
    "Tomato",
];

/// Builds a display label for the agent at `index`, unique within a roster.
pub fn avatar_label(index: usize) -> String {
    let name = AVATAR_NAMES[index % AVATAR_NAMES.len()];
    format!("{name} #{}", index + 1)
}

/// What ended an agent's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Touched a hazard cell.
    Hazard,
    /// Ran side-on into a block.
    WallImpact,
    /// Fell past the bottom of the level.
    OutOfBounds,
}

/// One simulated body, driven by exactly one controller for one generation.
///
/// An agent never outlives its generation, and `alive = false` is terminal:
/// nothing ever resurrects an agent, and a dead or finished agent's state is
/// frozen apart from bookkeeping done by the evaluation loop.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Index of the controller driving this agent.
    pub controller: usize,
    /// Display name used in logs and outcomes.
    pub label: String,
    /// Body rectangle in world coordinates.
    pub rect: Rect,
    /// Horizontal velocity. Pinned to the forward speed while running;
    /// zeroed by a wall impact.
    pub vel_x: f32,
    /// Vertical velocity, positive down.
    pub vel_y: f32,
    /// Whether the last vertical pass ended standing on a block.
    pub grounded: bool,
    /// Latched jump request. Fires on the next grounded tick and is cleared
    /// by landing.
    pub jump_requested: bool,
    /// Live fitness accumulator, adjusted only by the evaluation loop.
    pub fitness: f32,
    /// Scroll progress at the moment this agent spawned.
    pub spawn_progress: f32,
    /// Cosmetic rotation in degrees, spun while a jump is latched.
    pub angle: f32,
    /// False once the agent has died.
    pub alive: bool,
    /// True once the agent has reached the end of the level.
    pub won: bool,
    /// What killed the agent, if anything did.
    pub death: Option<DeathCause>,
}

impl Agent {
    /// Creates an agent at the spawn point defined by the parameters.
    ///
    /// # Arguments
    ///
    /// * `controller` - Index of the controller driving this agent
    /// * `label` - Display name
    /// * `params` - Simulation parameters
    /// * `spawn_progress` - Scroll progress at spawn time
    pub fn new(controller: usize, label: String, params: &Params, spawn_progress: f32) -> Self {
        let half = params.agent_size / 2.0;
        Self {
            controller,
            label,
            rect: Rect::new(
                params.spawn_x - half,
                params.spawn_y - half,
                params.agent_size,
                params.agent_size,
            ),
            vel_x: params.forward_speed,
            vel_y: 0.0,
            grounded: false,
            jump_requested: false,
            fitness: 0.0,
            spawn_progress,
            angle: 0.0,
            alive: true,
            won: false,
            death: None,
        }
    }

    /// Whether the agent still takes part in the evaluation.
    pub fn is_active(&self) -> bool {
        self.alive && !self.won
    }

    /// Latches a jump request. Idempotent while already latched.
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Marks the agent dead. The first cause sticks; terminal.
    pub fn kill(&mut self, cause: DeathCause) {
        if self.alive {
            self.alive = false;
            self.death = Some(cause);
        }
    }

    /// Marks the agent as having finished the level. Terminal.
    pub fn retire_won(&mut self) {
        self.won = true;
    }

    /// Advances the agent by one tick against the level.
    ///
    /// Update order: a latched jump fires if the agent is grounded; gravity
    /// accelerates an airborne agent down to the fall-speed cap; a horizontal
    /// collision pass runs with the vertical delta treated as zero; the body
    /// moves by its vertical velocity; `grounded` is tentatively cleared and
    /// the vertical collision pass settles it. A side-on overlap therefore
    /// resolves as a wall impact even when the agent was also falling, since
    /// the horizontal pass sees it first.
    ///
    /// # Arguments
    ///
    /// * `params` - Simulation parameters
    /// * `level` - Level geometry
    /// * `scroll_offset` - Distance obstacles have scrolled left so far
    pub fn step(&mut self, params: &Params, level: &LevelGrid, scroll_offset: f32) {
        if !self.is_active() {
            return;
        }

        if self.jump_requested && self.grounded {
            self.vel_y = -params.jump_strength;
        }

        if !self.grounded {
            self.vel_y += params.gravity;
            if self.vel_y > params.max_fall_speed {
                self.vel_y = params.max_fall_speed;
            }
        }

        self.collide(0.0, level, scroll_offset);

        self.rect.y += self.vel_y;

        // Assume airborne; the vertical pass restores contact if standing.
        self.grounded = false;

        self.collide(self.vel_y, level, scroll_offset);

        if self.jump_requested {
            self.angle -= params.spin_step;
        }

        // Kill plane one cell below the level keeps pit falls finite.
        if self.rect.top() > level.pixel_height() + CELL_SIZE as f32 {
            self.kill(DeathCause::OutOfBounds);
        }
    }

    /// Resolves overlaps against every obstacle for one axis pass.
    ///
    /// `vel_y` selects the branch: positive lands on top of blocks, negative
    /// bumps the head on their underside, and zero means the overlap came
    /// from horizontal motion, which is fatal. Hazards kill on any touch.
    /// The pass visits every obstacle even after a death so positional
    /// clamps stay consistent.
    fn collide(&mut self, vel_y: f32, level: &LevelGrid, scroll_offset: f32) {
        let cell = CELL_SIZE as f32;
        for obstacle in level.obstacles() {
            let obstacle_rect = Rect::new(
                obstacle.x as f32 - scroll_offset,
                obstacle.y as f32,
                cell,
                cell,
            );
            if !self.rect.overlaps(&obstacle_rect) {
                continue;
            }
            match obstacle.kind {
                ObstacleKind::Hazard => self.kill(DeathCause::Hazard),
                ObstacleKind::Solid | ObstacleKind::HalfHeight => {
                    if vel_y > 0.0 {
                        self.rect.y = obstacle_rect.top() - self.rect.h;
                        self.vel_y = 0.0;
                        self.grounded = true;
                        self.jump_requested = false;
                    } else if vel_y < 0.0 {
                        self.rect.y = obstacle_rect.bottom();
                    } else {
                        self.vel_x = 0.0;
                        self.rect.x = obstacle_rect.left() - self.rect.w;
                        self.kill(DeathCause::WallImpact);
                    }
                }
            }
        }
    }
}
