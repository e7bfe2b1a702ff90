//! Fixed-size perception features fed to controllers.
//!
//! Controllers never see level geometry directly. Each tick they receive
//! one compact feature vector describing the nearest hazard ahead, which is
//! all the information needed to time a jump.

use super::level::{CELL_SIZE, HazardGroup};

/// Number of features every controller receives per tick.
pub const FEATURE_COUNT: usize = 3;

/// Distance reported when no hazard lies ahead.
///
/// Far beyond any real level width, so a controller close to the end of the
/// course simply sees open road instead of a missing value.
pub const NO_HAZARD_DISTANCE: f32 = 1.0e4;

/// Feature vector handed to a controller.
///
/// Layout: `[0]` horizontal distance from the current progress to the
/// leading cell of the nearest hazard ahead, `[1]` absolute vertical
/// distance between that hazard and the agent's top edge, `[2]` width of
/// the hazard run in world units.
pub type Features = [f32; FEATURE_COUNT];

/// Encodes the perception features for one agent.
///
/// # Arguments
///
/// * `progress` - Current scroll progress, shared by the whole roster
/// * `agent_y` - Y coordinate of the agent's top edge
/// * `hazard` - Nearest hazard ahead, or `None` past the last one
pub fn encode(progress: f32, agent_y: f32, hazard: Option<&HazardGroup>) -> Features {
    match hazard {
        Some(group) => [
            group.x as f32 - progress,
            (group.y as f32 - agent_y).abs(),
            group.run as f32 * CELL_SIZE as f32,
        ],
        None => [NO_HAZARD_DISTANCE, 0.0, 0.0],
    }
}
