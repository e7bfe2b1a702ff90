//! Decision interface between the evaluation loop and controllers.
//!
//! The evolving population is an external collaborator. The loop only ever
//! talks to it through [`Controller`]: features in, one [`Action`] out, and
//! a final fitness report when the agent retires. Controller internals stay
//! opaque to the simulation.

use thiserror::Error;

use super::perception::Features;

/// Failure raised by a controller's decision function.
///
/// These never abort a generation. The loop downgrades the decision to
/// [`Action::NoOp`], logs the failure, and records it in the outcome so the
/// driver can see which controllers misbehaved.
#[derive(Debug, Clone, Error)]
#[error("controller failure: {message}")]
pub struct ControllerError {
    /// Description of what went wrong.
    pub message: String,
}

impl ControllerError {
    /// Creates an error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A controller's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Request a jump. The request latches and fires on the next grounded
    /// tick; making it while airborne costs the jump penalty.
    Jump,
    /// Do nothing this tick.
    NoOp,
}

/// Interface implemented by everything that can drive an agent.
pub trait Controller {
    /// Decides the action for this tick from the perception features.
    ///
    /// # Errors
    ///
    /// Returning an error counts as [`Action::NoOp`] for this tick and is
    /// reported in the generation outcome; it never stops the evaluation.
    fn decide(&mut self, features: &Features) -> Result<Action, ControllerError>;

    /// Receives the agent's final fitness once its generation has ended.
    fn report_fitness(&mut self, fitness: f32);
}
