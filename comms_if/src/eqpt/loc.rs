//! # Localisation messages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and attitude in the world frame) of the robot.
///
/// Supplied by the external localisation collaborator at its own cadence. The
/// default value (origin position, identity attitude) is the "no data yet"
/// sentinel used before the first update arrives.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default)]
pub struct Pose {
    /// The position in the world frame
    pub position_m: Vector3<f64>,

    /// The attitude of the robot in the world frame
    pub attitude_q: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Build a planar pose from a 2D position and heading.
    pub fn from_xy_heading(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector3::new(x_m, y_m, 0.0),
            attitude_q: UnitQuaternion::from_euler_angles(0.0, 0.0, heading_rad),
        }
    }

    /// Return the heading (angle to the positive world X axis) of the robot
    /// in radians, in the range (-pi, pi].
    pub fn get_heading(&self) -> f64 {
        self.attitude_q.euler_angles().2
    }

    /// Get the 2D position of the robot (the Z component is ignored by the
    /// planar controller).
    pub fn position2(&self) -> Vector2<f64> {
        Vector2::new(self.position_m[0], self.position_m[1])
    }

    /// Get the 2D unit vector pointing in the robot's heading direction.
    pub fn forward2(&self) -> Vector2<f64> {
        let heading = self.get_heading();
        Vector2::new(heading.cos(), heading.sin())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_heading_round_trip() {
        let pose = Pose::from_xy_heading(1.0, -2.0, 0.5);
        assert!((pose.get_heading() - 0.5).abs() < 1e-12);
        assert_eq!(pose.position2(), Vector2::new(1.0, -2.0));
    }

    #[test]
    fn test_forward_vector() {
        let pose = Pose::from_xy_heading(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let fwd = pose.forward2();
        assert!(fwd[0].abs() < 1e-12);
        assert!((fwd[1] - 1.0).abs() < 1e-12);
    }
}
