//! # Occupancy map
//!
//! Grid representation of the environment used for goal sampling and
//! planning. The map is built from the wire-shape message supplied by the
//! external mapping collaborator and is immutable until replaced wholesale by
//! the next update.
//!
//! The origin/resolution pair defines a strict affine transform between world
//! and grid coordinates, used consistently in both directions: a world
//! position maps to the cell containing it, and a cell maps back to the world
//! position of its centre.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::{Point2, Vector2};
use ndarray::Array2;

// Internal
use comms_if::eqpt::map::{OccupancyGridMsg, CELL_OCCUPIED_THRESHOLD, CELL_UNKNOWN};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// An occupancy grid with world/grid coordinate transforms.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    /// Cell states indexed by (x cell, y cell)
    cells: Array2<CellState>,

    /// The size of each cell in meters
    resolution_m: f64,

    /// World position of the corner of cell (0, 0)
    origin_m: Vector2<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The occupancy state of a single map cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellState {
    Unknown,
    Free,
    Occupied,
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("The occupancy grid message is malformed (data length doesn't match dimensions or non-positive resolution)")]
    MalformedGrid,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl OccupancyMap {
    /// Build a map from the wire-shape message.
    ///
    /// Fails if the message is malformed. The message's row-major `i8` cells
    /// are classified into [`CellState`]s using the usual occupancy
    /// conventions.
    pub fn from_msg(msg: &OccupancyGridMsg) -> Result<Self, MapError> {
        if !msg.is_well_formed() {
            return Err(MapError::MalformedGrid);
        }

        let mut cells = Array2::from_elem((msg.width, msg.height), CellState::Unknown);

        for y in 0..msg.height {
            for x in 0..msg.width {
                let value = msg.data[y * msg.width + x];
                cells[[x, y]] = CellState::from_occupancy_value(value);
            }
        }

        Ok(Self {
            cells,
            resolution_m: msg.resolution_m,
            origin_m: Vector2::new(msg.origin_m.0, msg.origin_m.1),
        })
    }

    /// Get the number of cells along the X axis
    pub fn width(&self) -> usize {
        self.cells.shape()[0]
    }

    /// Get the number of cells along the Y axis
    pub fn height(&self) -> usize {
        self.cells.shape()[1]
    }

    /// Get the size of each cell in meters
    pub fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    /// Get the state of the given cell, or `None` if it's outside the map.
    pub fn get(&self, cell: (usize, usize)) -> Option<CellState> {
        self.cells.get([cell.0, cell.1]).copied()
    }

    /// Convert a world position into the cell containing it.
    ///
    /// Returns `None` for positions outside the map bounds.
    pub fn world_to_grid(&self, position_m: &Point2<f64>) -> Option<(usize, usize)> {
        let x = (position_m[0] - self.origin_m[0]) / self.resolution_m;
        let y = (position_m[1] - self.origin_m[1]) / self.resolution_m;

        if x < 0.0 || y < 0.0 {
            return None;
        }

        let cell = (x.floor() as usize, y.floor() as usize);

        if cell.0 >= self.width() || cell.1 >= self.height() {
            return None;
        }

        Some(cell)
    }

    /// Convert a cell into the world position of its centre.
    pub fn grid_to_world(&self, cell: (usize, usize)) -> Point2<f64> {
        Point2::new(
            self.origin_m[0] + ((cell.0 as f64) + 0.5) * self.resolution_m,
            self.origin_m[1] + ((cell.1 as f64) + 0.5) * self.resolution_m,
        )
    }

    /// True if the cell containing the given world position is known free.
    ///
    /// Positions outside the map and unknown cells are not free.
    pub fn is_free_world(&self, position_m: &Point2<f64>) -> bool {
        match self.world_to_grid(position_m) {
            Some(cell) => self.get(cell) == Some(CellState::Free),
            None => false,
        }
    }
}

impl CellState {
    /// Classify a raw occupancy value into a cell state.
    pub fn from_occupancy_value(value: i8) -> Self {
        if value == CELL_UNKNOWN {
            CellState::Unknown
        } else if value >= CELL_OCCUPIED_THRESHOLD {
            CellState::Occupied
        } else {
            CellState::Free
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
