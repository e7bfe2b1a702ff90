//! Level geometry: symbol grids, obstacles, and hazard grouping.
//!
//! A level is an opaque 2D grid of symbols. Loading scans the grid once,
//! left to right and top to bottom, and produces two immutable views of it:
//! the flat obstacle list used for collision, and the list of contiguous
//! hazard runs used for perception. Obstacles never move after the scan;
//! scrolling is expressed as an offset applied at query time.

use std::fs;
use std::path::Path;

use log::debug;
use thiserror::Error;

/// Side length of one grid cell in world units.
pub const CELL_SIZE: i32 = 32;

/// Errors emitted while loading a level file.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file could not be read.
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    /// The file parsed to a grid without a single cell.
    #[error("level file has no usable rows")]
    Empty,
}

/// One cell of the level grid.
///
/// Unrecognized tokens in level files degrade to [`Symbol::Empty`] rather
/// than failing the load, so hand-edited levels stay usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// Nothing in this cell.
    Empty,
    /// A full solid block.
    Solid,
    /// A half-height block. Collides exactly like a solid block; the
    /// distinction only matters to level authors and renderers.
    HalfHeight,
    /// A hazard cell. Touching it kills the agent.
    Hazard,
}

impl Symbol {
    /// Parses one grid token.
    ///
    /// # Returns
    ///
    /// The matching symbol, or `None` for tokens outside the alphabet.
    /// Empty tokens are valid and map to [`Symbol::Empty`].
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().trim_matches('"') {
            "" => Some(Self::Empty),
            "0" => Some(Self::Solid),
            "1" => Some(Self::HalfHeight),
            "2" => Some(Self::Hazard),
            _ => None,
        }
    }
}

/// Collision class of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Blocks movement; a side-on hit is fatal.
    Solid,
    /// Same collision behavior as [`ObstacleKind::Solid`].
    HalfHeight,
    /// Fatal on any touch.
    Hazard,
}

/// A grid-aligned obstacle, positioned in world units.
///
/// Coordinates are the top-left corner of the cell and are immutable after
/// the level scan; every obstacle occupies one [`CELL_SIZE`] square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    /// Collision class.
    pub kind: ObstacleKind,
    /// X coordinate of the cell's left edge.
    pub x: i32,
    /// Y coordinate of the cell's top edge.
    pub y: i32,
}

/// A contiguous run of hazard cells, folded into one perception target.
///
/// Position is the leading (leftmost) cell of the run; `run` counts cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardGroup {
    /// X coordinate of the leading cell.
    pub x: i32,
    /// Y coordinate of the leading cell.
    pub y: i32,
    /// Number of cells in the run.
    pub run: u32,
}

/// Immutable level geometry produced by one grid scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelGrid {
    rows: usize,
    cols: usize,
    obstacles: Vec<Obstacle>,
    hazard_groups: Vec<HazardGroup>,
}

impl LevelGrid {
    /// Builds level geometry from an already-parsed symbol grid.
    ///
    /// Scans once, left to right and top to bottom. Hazard cells fold into
    /// the previous group when they sit exactly one cell to the right of the
    /// most recently scanned hazard cell; otherwise they start a new group.
    /// Groups are sorted ascending by leading x after the scan, which the
    /// nearest-ahead queries rely on.
    ///
    /// The scan is pure: the same grid always produces the same geometry.
    ///
    /// # Arguments
    ///
    /// * `grid` - Rows of symbols, top row first. Rows may be ragged.
    pub fn from_grid(grid: &[Vec<Symbol>]) -> Self {
        let mut obstacles = Vec::new();
        let mut hazard_groups: Vec<HazardGroup> = Vec::new();
        let mut last_hazard_x: Option<i32> = None;

        for (row_idx, row) in grid.iter().enumerate() {
            let y = row_idx as i32 * CELL_SIZE;
            for (col_idx, symbol) in row.iter().enumerate() {
                let x = col_idx as i32 * CELL_SIZE;
                match symbol {
                    Symbol::Empty => {}
                    Symbol::Solid => obstacles.push(Obstacle {
                        kind: ObstacleKind::Solid,
                        x,
                        y,
                    }),
                    Symbol::HalfHeight => obstacles.push(Obstacle {
                        kind: ObstacleKind::HalfHeight,
                        x,
                        y,
                    }),
                    Symbol::Hazard => {
                        obstacles.push(Obstacle {
                            kind: ObstacleKind::Hazard,
                            x,
                            y,
                        });
                        match (last_hazard_x, hazard_groups.last_mut()) {
                            (Some(last_x), Some(group)) if x - last_x == CELL_SIZE => {
                                group.run += 1;
                            }
                            _ => hazard_groups.push(HazardGroup { x, y, run: 1 }),
                        }
                        last_hazard_x = Some(x);
                    }
                }
            }
        }

        hazard_groups.sort_by_key(|group| group.x);

        Self {
            rows: grid.len(),
            cols: grid.iter().map(Vec::len).max().unwrap_or(0),
            obstacles,
            hazard_groups,
        }
    }

    /// Parses comma-separated symbol rows, one grid row per line.
    ///
    /// Tokens outside the alphabet are logged and skipped, leaving their
    /// cell empty; the parse itself never fails.
    pub fn from_csv_str(text: &str) -> Self {
        let grid: Vec<Vec<Symbol>> = text
            .lines()
            .enumerate()
            .map(|(row_idx, line)| {
                line.split(',')
                    .enumerate()
                    .map(|(col_idx, token)| {
                        Symbol::from_token(token).unwrap_or_else(|| {
                            debug!(
                                "ignoring unknown level symbol {:?} at row {row_idx}, column {col_idx}",
                                token.trim()
                            );
                            Symbol::Empty
                        })
                    })
                    .collect()
            })
            .collect();
        Self::from_grid(&grid)
    }

    /// Loads a level from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Io`] if the file cannot be read and
    /// [`LevelError::Empty`] if it contains no cells at all.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let text = fs::read_to_string(path)?;
        let level = Self::from_csv_str(&text);
        if level.rows == 0 || level.cols == 0 {
            return Err(LevelError::Empty);
        }
        Ok(level)
    }

    /// All obstacles, in scan order.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Hazard runs, sorted ascending by leading x.
    pub fn hazard_groups(&self) -> &[HazardGroup] {
        &self.hazard_groups
    }

    /// Number of grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns (widest row).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Level width in world units. Reaching it completes the level.
    pub fn pixel_width(&self) -> f32 {
        (self.cols as i32 * CELL_SIZE) as f32
    }

    /// Level height in world units.
    pub fn pixel_height(&self) -> f32 {
        (self.rows as i32 * CELL_SIZE) as f32
    }
}
