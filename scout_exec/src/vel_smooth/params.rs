//! Velocity smoother parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the velocity smoother
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Maximum commanded velocity.
    pub max_vel_ms: f64,

    /// Maximum change of the commanded velocity per second.
    pub max_accel_mss: f64,

    /// Maximum rate of change of acceleration.
    pub max_jerk_msss: f64,

    /// The control tick period used to scale the per-tick steps.
    pub tick_period_s: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_vel_ms: 0.26,
            max_accel_mss: 0.43,
            max_jerk_msss: 1.0,
            tick_period_s: 0.1,
        }
    }
}
