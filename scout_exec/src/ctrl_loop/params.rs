//! Control loop parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the control loop selects its steering target.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrajMode {
    /// Pursue the raw goal queue directly
    DirectPursuit,

    /// Pursue the generated spline profile
    SplineProfile,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the control loop
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// The pure-pursuit lookahead distance.
    pub lookahead_m: f64,

    /// Gain applied to the computed curvature when converting it into an
    /// angular rate demand.
    pub steering_sens: f64,

    /// Cruise speed demanded when pursuing raw goals without a profile.
    pub cruise_vel_ms: f64,

    /// Steering target selection mode.
    pub traj_mode: TrajMode,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            lookahead_m: 0.4,
            steering_sens: 0.8,
            cruise_vel_ms: 0.2,
            traj_mode: TrajMode::SplineProfile,
        }
    }
}
