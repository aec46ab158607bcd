//! Goal manager parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the goal manager
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// The distance below which the current goal counts as reached.
    pub goal_distance_m: f64,

    /// The number of goals requested from random goal generation.
    pub num_random_goals: usize,

    /// Minimum separation between any two randomly generated goals.
    pub min_goal_separation_m: f64,

    /// The total number of cell samples random goal generation may draw
    /// before giving up and returning the goals accepted so far.
    pub max_sample_retries: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            goal_distance_m: 0.1,
            num_random_goals: 5,
            min_goal_separation_m: 0.5,
            max_sample_retries: 1000,
        }
    }
}
