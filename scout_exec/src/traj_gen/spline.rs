//! # Waypoint spline
//!
//! A uniform Catmull-Rom spline through an ordered set of waypoints. The
//! curve passes through every waypoint and has a continuous tangent, so the
//! sampled headings and curvatures feed straight into steering without
//! discontinuities at waypoint boundaries.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Point2, Vector2};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A Catmull-Rom spline through a waypoint sequence.
///
/// The first and last waypoints are duplicated as phantom control points so
/// the curve spans the full waypoint sequence.
pub struct WaypointSpline {
    /// Control points, including the duplicated endpoints
    control_m: Vec<Vector2<f64>>,
}

/// One geometric sample of the spline.
#[derive(Debug, Copy, Clone)]
pub struct SplineSample {
    /// Sampled position
    pub position_m: Vector2<f64>,

    /// Tangent direction at the sample
    pub heading_rad: f64,

    /// Signed curvature at the sample in 1/meters
    pub curv_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WaypointSpline {
    /// Build a spline through the given waypoints.
    ///
    /// The caller must supply at least two waypoints; this is enforced by the
    /// trajectory generator before construction.
    pub fn through(waypoints_m: &[Point2<f64>]) -> Self {
        let mut control_m = Vec::with_capacity(waypoints_m.len() + 2);

        control_m.push(waypoints_m[0].coords);
        control_m.extend(waypoints_m.iter().map(|p| p.coords));
        control_m.push(waypoints_m[waypoints_m.len() - 1].coords);

        Self { control_m }
    }

    /// The number of curve segments, one per pair of adjacent waypoints.
    pub fn num_segments(&self) -> usize {
        self.control_m.len() - 3
    }

    /// Sample the given segment at parameter `t` in [0, 1].
    ///
    /// Segment `i` spans waypoints `i` and `i + 1`.
    pub fn sample(&self, segment: usize, t: f64) -> SplineSample {
        let p0 = self.control_m[segment];
        let p1 = self.control_m[segment + 1];
        let p2 = self.control_m[segment + 2];
        let p3 = self.control_m[segment + 3];

        // Uniform Catmull-Rom basis
        let c1 = (p2 - p0) * 0.5;
        let c2 = p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3;
        let c2 = c2 * 0.5;
        let c3 = (p1 * 3.0 - p0 - p2 * 3.0 + p3) * 0.5;

        let position_m = p1 + c1 * t + c2 * (t * t) + c3 * (t * t * t);
        let deriv = c1 + c2 * (2.0 * t) + c3 * (3.0 * t * t);
        let second = c2 * 2.0 + c3 * (6.0 * t);

        let heading_rad = deriv[1].atan2(deriv[0]);

        // Signed curvature; zero for a degenerate tangent
        let speed_sq = deriv.norm_squared();
        let curv_m = if speed_sq > std::f64::EPSILON {
            (deriv[0] * second[1] - deriv[1] * second[0]) / speed_sq.powf(1.5)
        } else {
            0.0
        };

        SplineSample {
            position_m,
            heading_rad,
            curv_m,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_waypoints() {
        let waypoints = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.5),
            Point2::new(2.0, 0.0),
        ];
        let spline = WaypointSpline::through(&waypoints);

        assert_eq!(spline.num_segments(), 2);

        for (i, wp) in waypoints.iter().enumerate() {
            let sample = if i < spline.num_segments() {
                spline.sample(i, 0.0)
            } else {
                spline.sample(i - 1, 1.0)
            };
            assert_relative_eq!(sample.position_m[0], wp[0], epsilon = 1e-12);
            assert_relative_eq!(sample.position_m[1], wp[1], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_straight_line_has_zero_curvature() {
        let waypoints = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let spline = WaypointSpline::through(&waypoints);

        for segment in 0..spline.num_segments() {
            for i in 0..=10 {
                let sample = spline.sample(segment, (i as f64) / 10.0);
                assert_relative_eq!(sample.curv_m, 0.0, epsilon = 1e-9);
                assert_relative_eq!(sample.heading_rad, 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_curvature_sign_follows_turn_direction() {
        // A left turn (towards +y) must have positive curvature mid-turn
        let waypoints = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 1.0),
        ];
        let spline = WaypointSpline::through(&waypoints);

        let sample = spline.sample(1, 0.5);
        assert!(sample.curv_m > 0.0);
    }
}
