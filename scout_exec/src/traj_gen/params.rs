//! Trajectory generator parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory generator
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Maximum velocity assigned to any profile point.
    pub max_vel_ms: f64,

    /// Maximum acceleration between consecutive profile points.
    pub max_accel_mss: f64,

    /// Maximum rate of change of acceleration along the profile.
    pub max_jerk_msss: f64,

    /// Minimum cruise velocity, the floor applied to the curvature speed
    /// cap so tight turns slow the robot without stalling it.
    pub min_vel_ms: f64,

    /// Time separation between consecutive profile points. One profile
    /// index corresponds to one control tick.
    pub profile_dt_s: f64,

    /// Number of geometric samples taken along each spline segment.
    pub samples_per_segment: usize,

    /// Curvature to speed map coefficients, applied to the absolute
    /// curvature.
    ///
    /// The order of these coefficients is highest power first, i.e. if there
    /// are 3 coefficients it's a 2nd order polynomial with c[0]*x^2 + c[1]*x
    /// + c[2].
    pub curv_speed_map_coeffs: Vec<f64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_vel_ms: 0.26,
            max_accel_mss: 0.43,
            max_jerk_msss: 1.0,
            min_vel_ms: 0.05,
            profile_dt_s: 0.1,
            samples_per_segment: 20,
            curv_speed_map_coeffs: vec![-0.05, 0.26],
        }
    }
}
