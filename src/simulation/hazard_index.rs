//! Nearest-hazard-ahead lookups over the sorted hazard group list.

use super::level::{HazardGroup, LevelGrid};

/// Finds the first group strictly ahead of `progress` by linear scan.
///
/// Reference lookup over the sorted group list. [`HazardIndex::nearest_ahead`]
/// must always agree with this scan; the index only exists to avoid rescanning
/// from the front every tick.
pub fn scan_nearest_ahead(groups: &[HazardGroup], progress: f32) -> Option<&HazardGroup> {
    groups.iter().find(|group| (group.x as f32) > progress)
}

/// Read-only view over a level's hazard groups with a monotonic cursor.
///
/// Progress only ever moves forward within one evaluation, so the cursor
/// never has to back up: each query advances it past every group already
/// reached and returns the next one, making repeated lookups O(1) amortized.
/// Build a fresh index per evaluation; the underlying group list lives in
/// the [`LevelGrid`] and is folded and sorted only once, at level load.
#[derive(Debug)]
pub struct HazardIndex<'a> {
    groups: &'a [HazardGroup],
    cursor: usize,
}

impl<'a> HazardIndex<'a> {
    /// Creates an index over the level's hazard groups.
    pub fn new(level: &'a LevelGrid) -> Self {
        Self {
            groups: level.hazard_groups(),
            cursor: 0,
        }
    }

    /// Returns the nearest group strictly ahead of `progress`.
    ///
    /// Queries must come with non-decreasing `progress` values; the cursor
    /// never moves backwards. `None` means the level holds no further
    /// hazards, which callers treat as open road, not as a failure.
    pub fn nearest_ahead(&mut self, progress: f32) -> Option<&'a HazardGroup> {
        while self.cursor < self.groups.len() && (self.groups[self.cursor].x as f32) <= progress {
            self.cursor += 1;
        }
        self.groups.get(self.cursor)
    }
}
