//! Safety monitor parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the safety monitor
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// The range below which the robot is considered too close to an
    /// obstacle, measured from the robot's own frame.
    pub stop_distance_m: f64,

    /// The offset between the robot's reference frame and the range sensor's
    /// frame, subtracted from observed ranges.
    pub sensor_offset_m: f64,

    /// Half angle of the forward cone within which beams are considered.
    pub forward_cone_half_angle_rad: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            stop_distance_m: 0.24,
            sensor_offset_m: 0.12,
            forward_cone_half_angle_rad: std::f64::consts::FRAC_PI_4,
        }
    }
}
