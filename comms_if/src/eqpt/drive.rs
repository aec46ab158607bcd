//! # Drive command messages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A velocity demand for the robot's base, one emitted per control cycle.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TwistCmd {
    /// The linear speed demand in meters/second.
    ///
    /// Positive speeds are "forwards", negative speeds are "backwards".
    pub linear_ms: f64,

    /// The angular rate demand in radians/second.
    ///
    /// Follows the right hand rule about the robot's Z+ (upwards) axis, so
    /// that a positive rate turns the robot to the left and a negative rate
    /// to the right.
    pub angular_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TwistCmd {
    /// The neutral command - zero linear and angular velocity.
    pub fn stop() -> Self {
        Self::default()
    }

    /// True if this command demands no motion at all.
    pub fn is_stop(&self) -> bool {
        self.linear_ms == 0.0 && self.angular_rads == 0.0
    }
}
