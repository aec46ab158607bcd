//! # Occupancy grid messages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Cell value indicating the cell's occupancy is unknown
pub const CELL_UNKNOWN: i8 = -1;

/// Threshold at or above which a cell value is considered occupied
pub const CELL_OCCUPIED_THRESHOLD: i8 = 50;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An occupancy grid supplied by the external mapping collaborator.
///
/// The grid is row-major with cell (0, 0) at the map origin. Cell values
/// follow the usual occupancy convention: -1 for unknown, 0 for free, and
/// values up to 100 for increasing occupancy probability. Maps are replaced
/// wholesale on each update.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OccupancyGridMsg {
    /// Number of cells along the X axis
    pub width: usize,

    /// Number of cells along the Y axis
    pub height: usize,

    /// The size of each cell in meters
    pub resolution_m: f64,

    /// World position of the corner of cell (0, 0)
    pub origin_m: (f64, f64),

    /// Row-major cell occupancy values
    pub data: Vec<i8>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OccupancyGridMsg {
    /// True if the message describes a well-formed grid, i.e. the grid is
    /// non-empty, the resolution is positive and the data length matches the
    /// stated dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.resolution_m > 0.0
            && self.data.len() == self.width * self.height
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_well_formed() {
        let msg = OccupancyGridMsg {
            width: 2,
            height: 3,
            resolution_m: 0.05,
            origin_m: (0.0, 0.0),
            data: vec![0; 6],
        };
        assert!(msg.is_well_formed());
    }

    #[test]
    fn test_malformed() {
        let msg = OccupancyGridMsg {
            width: 2,
            height: 3,
            resolution_m: 0.05,
            origin_m: (0.0, 0.0),
            data: vec![0; 5],
        };
        assert!(!msg.is_well_formed());
    }
}
