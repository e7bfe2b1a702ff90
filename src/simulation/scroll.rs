//! Global scroll progress shared by every agent.
//!
//! The world scrolls; the agents do not. Obstacles keep the coordinates they
//! were loaded with, and the scroll offset is subtracted from them at query
//! time, so "moving the map" is a single accumulator update per tick instead
//! of a mutation of every obstacle.

/// Cumulative scroll distance for one evaluation.
///
/// One scroll state is shared by the whole roster: the delta per tick is the
/// forward speed of the first still-active agent. Since every agent runs at
/// the same fixed forward speed this is equivalent to a per-agent camera,
/// just cheaper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    start: f32,
    progress: f32,
}

impl ScrollState {
    /// Creates a scroll state at the given starting progress.
    pub fn new(start: f32) -> Self {
        Self {
            start,
            progress: start,
        }
    }

    /// Adds `delta` to cumulative progress, conceptually shifting every
    /// obstacle's effective position left by the same amount.
    pub fn advance(&mut self, delta: f32) {
        self.progress += delta;
    }

    /// Cumulative progress, the reference frame for perception and fitness.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Distance travelled since the start of the evaluation. Subtract this
    /// from an obstacle's stored x to get its effective collision position.
    pub fn offset(&self) -> f32 {
        self.progress - self.start
    }
}
