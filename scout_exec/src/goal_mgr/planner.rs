//! # Path planning interface
//!
//! The goal manager does not search for paths itself - it delegates to a
//! planner behind the [`PathPlanner`] trait so the planning implementation
//! can be swapped out (including for a test double).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;

// Internal
use crate::map::OccupancyMap;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors returned by a planner.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("No feasible path exists between the requested points")]
    NoFeasiblePath,

    #[error("The requested points coincide, nothing to plan")]
    DegenerateRequest,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An external collaborator which produces intermediate waypoints between two
/// points, respecting map obstacles.
///
/// An empty result and [`PlanError::NoFeasiblePath`] both mean "no plan"; the
/// caller must treat them as a recoverable failure, never a crash.
pub trait PathPlanner {
    fn plan_path(
        &self,
        start_m: Point2<f64>,
        end_m: Point2<f64>,
        map: &OccupancyMap,
    ) -> Result<Vec<Point2<f64>>, PlanError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A planner producing a direct subdivided segment between the two points,
/// with each waypoint at most the given separation from its neighbour.
///
/// The route is checked against the map: if any waypoint falls in a cell that
/// is not known free, the plan is rejected as infeasible. This is the
/// simplest planner satisfying the planning contract; smarter planners can
/// replace it behind the same trait.
pub struct GridLinePlanner {
    /// The separation between consecutive waypoints.
    point_sep_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GridLinePlanner {
    pub fn new(point_sep_m: f64) -> Self {
        Self { point_sep_m }
    }
}

impl PathPlanner for GridLinePlanner {
    fn plan_path(
        &self,
        start_m: Point2<f64>,
        end_m: Point2<f64>,
        map: &OccupancyMap,
    ) -> Result<Vec<Point2<f64>>, PlanError> {
        let diff_vec = end_m - start_m;
        let dist_m = diff_vec.norm();

        if dist_m <= std::f64::EPSILON {
            return Err(PlanError::DegenerateRequest);
        }

        // If the points are closer than the separation the plan is just the
        // two endpoints themselves
        let waypoints = if dist_m <= self.point_sep_m {
            vec![start_m, end_m]
        } else {
            // Ceil so the waypoints space evenly at no more than the
            // separation, landing exactly on the end point
            let num_steps = (dist_m / self.point_sep_m).ceil() as usize;
            let delta = diff_vec / (num_steps as f64);

            let mut points = Vec::with_capacity(num_steps + 1);
            points.push(start_m);
            for i in 1..num_steps {
                points.push(points[i - 1] + delta);
            }
            points.push(end_m);

            points
        };

        // Reject the route if it crosses anything other than known-free
        // space
        for point_m in waypoints.iter() {
            if !map.is_free_world(point_m) {
                return Err(PlanError::NoFeasiblePath);
            }
        }

        Ok(waypoints)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::map::OccupancyGridMsg;

    /// A 10x10 free map at 0.5 m resolution with a wall of occupied cells at
    /// x cell = 5
    fn walled_map() -> OccupancyMap {
        let mut data = vec![0i8; 100];
        for y in 0..10 {
            data[y * 10 + 5] = 100;
        }

        OccupancyMap::from_msg(&OccupancyGridMsg {
            width: 10,
            height: 10,
            resolution_m: 0.5,
            origin_m: (0.0, 0.0),
            data,
        })
        .unwrap()
    }

    #[test]
    fn test_direct_plan_spacing() {
        let map = walled_map();

        let plan = GridLinePlanner::new(0.3)
            .plan_path(Point2::new(0.25, 0.25), Point2::new(2.0, 0.25), &map)
            .unwrap();

        assert_eq!(plan.first().unwrap(), &Point2::new(0.25, 0.25));
        assert_eq!(plan.last().unwrap(), &Point2::new(2.0, 0.25));

        for pair in plan.windows(2) {
            assert!((pair[1] - pair[0]).norm() <= 0.3 + 1e-9);
        }
    }

    #[test]
    fn test_blocked_plan_rejected() {
        let map = walled_map();

        // Crossing the wall at x = 2.5..3.0 m
        let result = GridLinePlanner::new(0.1).plan_path(
            Point2::new(0.25, 2.25),
            Point2::new(4.25, 2.25),
            &map,
        );

        assert!(matches!(result, Err(PlanError::NoFeasiblePath)));
    }

    #[test]
    fn test_degenerate_request_rejected() {
        let map = walled_map();

        let result = GridLinePlanner::new(0.1).plan_path(
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
            &map,
        );

        assert!(matches!(result, Err(PlanError::DegenerateRequest)));
    }
}
