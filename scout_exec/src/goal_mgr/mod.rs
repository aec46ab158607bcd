//! # Goal manager module
//!
//! The goal manager owns the ordered sequence of goals the robot is visiting.
//! It is a small state machine over the goal queue: **idle** while the queue
//! is empty, **pursuing** while a front goal is active. When the distance
//! from the current pose to the front goal drops below the goal-distance
//! threshold the goal is popped; an emptied queue returns the manager to
//! idle.
//!
//! Alongside the queue the module provides the pure-pursuit geometry
//! operations (goal distances, bearing to goal, lookahead point selection),
//! random goal sampling over free map cells, and delegation to the injected
//! path-planning collaborator.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub mod planner;

pub use params::Params;
pub use planner::{GridLinePlanner, PathPlanner, PlanError};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use nalgebra::Point2;
use rand::Rng;
use std::collections::VecDeque;

// Internal
use crate::map::{CellState, OccupancyMap};
use comms_if::eqpt::loc::Pose;
use util::{maths, params as util_params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Goal manager state
pub struct GoalMgr {
    params: Params,

    /// Executing mode
    mode: GoalMgrMode,

    /// The ordered sequence of goals; insertion order is visiting order and
    /// the front is the current goal.
    goals: VecDeque<Point2<f64>>,

    /// The injected path-planning collaborator
    planner: Box<dyn PathPlanner + Send>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of the goal manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GoalMgrMode {
    /// No goals are loaded
    Idle,

    /// The front goal is being pursued
    Pursuing,
}

/// Events produced when advancing the goal state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GoalEvent {
    /// The front goal was reached and popped, a new front goal is active
    GoalReached,

    /// The front goal was reached and the queue is now empty
    QueueEmptied,
}

/// Possible errors that can occur during goal manager operation.
#[derive(Debug, thiserror::Error)]
pub enum GoalMgrError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util_params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The planning collaborator could not produce a usable plan. The
    /// manager has already transitioned back to idle.
    #[error("The planner returned no usable plan: {0}")]
    NoPath(PlanError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Straight-line 2D distance from the robot's pose to a goal (Z ignored).
pub fn distance_to_goal(goal_m: &Point2<f64>, pose: &Pose) -> f64 {
    let position = pose.position2();

    // The unwrap here is safe as both slices are 2D
    maths::norm(&[goal_m[0], goal_m[1]], &[position[0], position[1]]).unwrap()
}

/// Straight-line 2D distance between two goals.
pub fn distance_between_goals(goal_0_m: &Point2<f64>, goal_1_m: &Point2<f64>) -> f64 {
    maths::norm(&[goal_0_m[0], goal_0_m[1]], &[goal_1_m[0], goal_1_m[1]]).unwrap()
}

/// Signed angle between the robot's heading and the vector to the goal.
///
/// The result is normalised into (-pi, pi]. A goal directly ahead gives an
/// angle of zero, a goal directly behind gives +pi.
pub fn goal_angle(goal_m: &Point2<f64>, pose: &Pose) -> f64 {
    let position = pose.position2();
    let bearing_rad = (goal_m[1] - position[1]).atan2(goal_m[0] - position[0]);

    maths::wrap_to_pi(bearing_rad - pose.get_heading())
}

/// Find the pure-pursuit lookahead point on an ordered point sequence.
///
/// Scans the sequence for the first point at or beyond the lookahead
/// distance from the pose, interpolating along the bracketing segment where
/// the lookahead circle crosses it. If no point reaches the lookahead
/// distance the last point is returned as a fallback. Returns `None` only
/// for an empty sequence.
pub fn find_lookahead_point(
    points_m: &[Point2<f64>],
    pose: &Pose,
    lookahead_m: f64,
) -> Option<Point2<f64>> {
    let position = pose.position2();

    for (i, point_m) in points_m.iter().enumerate() {
        let dist_m = (point_m.coords - position).norm();

        if dist_m < lookahead_m {
            continue;
        }

        // The first point may already be beyond the lookahead circle, in
        // which case there is no bracketing segment to interpolate along
        if i == 0 {
            return Some(*point_m);
        }

        // Solve |a + t*(b - a) - p| = lookahead for t in [0, 1], taking the
        // root closer to b (the crossing in the direction of travel)
        let a = points_m[i - 1].coords;
        let b = point_m.coords;
        let seg = b - a;
        let offset = a - position;

        let qa = seg.dot(&seg);
        let qb = 2.0 * offset.dot(&seg);
        let qc = offset.dot(&offset) - lookahead_m * lookahead_m;
        let disc = qb * qb - 4.0 * qa * qc;

        if qa > std::f64::EPSILON && disc >= 0.0 {
            let t = (-qb + disc.sqrt()) / (2.0 * qa);
            if (0.0..=1.0).contains(&t) {
                return Some(Point2::from(a + t * seg));
            }
        }

        // Degenerate segment geometry, fall back to the bracketing point
        return Some(*point_m);
    }

    points_m.last().copied()
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalMgr {
    /// Initialise the goal manager.
    ///
    /// Expected init data is the path to the parameter file and the planning
    /// collaborator to delegate to.
    pub fn init(
        params_path: &str,
        planner: Box<dyn PathPlanner + Send>,
    ) -> Result<Self, GoalMgrError> {
        let params = util_params::load(params_path).map_err(GoalMgrError::ParamLoadError)?;

        Self::from_params(params, planner)
    }

    /// Build a goal manager directly from a parameter struct.
    pub fn from_params(
        params: Params,
        planner: Box<dyn PathPlanner + Send>,
    ) -> Result<Self, GoalMgrError> {
        if params.goal_distance_m <= 0.0 {
            return Err(GoalMgrError::InvalidParams(
                "goal_distance_m must be positive".into(),
            ));
        }
        if params.min_goal_separation_m <= 0.0 {
            return Err(GoalMgrError::InvalidParams(
                "min_goal_separation_m must be positive".into(),
            ));
        }
        if params.max_sample_retries == 0 {
            return Err(GoalMgrError::InvalidParams(
                "max_sample_retries must be at least 1".into(),
            ));
        }

        Ok(Self {
            params,
            mode: GoalMgrMode::Idle,
            goals: VecDeque::new(),
            planner,
        })
    }

    /// Get the current executing mode.
    pub fn mode(&self) -> GoalMgrMode {
        self.mode
    }

    /// Get the current (front) goal, or `None` when idle.
    pub fn current_goal(&self) -> Option<Point2<f64>> {
        self.goals.front().copied()
    }

    /// Get a copy of the remaining goal sequence in visiting order.
    pub fn goal_points(&self) -> Vec<Point2<f64>> {
        self.goals.iter().copied().collect()
    }

    /// Replace the goal queue with a new ordered sequence.
    pub fn set_goals(&mut self, goals_m: Vec<Point2<f64>>) {
        self.goals = goals_m.into();

        self.mode = if self.goals.is_empty() {
            GoalMgrMode::Idle
        } else {
            GoalMgrMode::Pursuing
        };

        info!(
            "Goal queue replaced, {} goal(s) loaded",
            self.goals.len()
        );
    }

    /// Drop all goals and return to idle.
    pub fn clear(&mut self) {
        self.goals.clear();
        self.mode = GoalMgrMode::Idle;
    }

    /// Advance the goal state machine for the current pose.
    ///
    /// If the front goal lies within the goal-distance threshold it is
    /// popped. Returns the resulting event, or `None` if nothing changed.
    pub fn advance(&mut self, pose: &Pose) -> Option<GoalEvent> {
        let goal_m = self.current_goal()?;

        if distance_to_goal(&goal_m, pose) >= self.params.goal_distance_m {
            return None;
        }

        self.goals.pop_front();
        info!(
            "Goal ({:.2}, {:.2}) reached, {} remaining",
            goal_m[0],
            goal_m[1],
            self.goals.len()
        );

        if self.goals.is_empty() {
            self.mode = GoalMgrMode::Idle;
            Some(GoalEvent::QueueEmptied)
        } else {
            Some(GoalEvent::GoalReached)
        }
    }

    /// Generate up to `num_random_goals` goals over free cells of the map.
    ///
    /// Cells are sampled uniformly at random; non-free cells and candidates
    /// closer than the minimum separation to an already accepted goal are
    /// rejected. Sampling draws at most `max_sample_retries` cells in total
    /// so the operation always terminates; on exhaustion the accepted subset
    /// is returned, which may hold fewer goals than requested.
    pub fn generate_random_goals(&self, map: &OccupancyMap) -> Vec<Point2<f64>> {
        let mut rng = rand::rng();
        let mut accepted: Vec<Point2<f64>> = Vec::with_capacity(self.params.num_random_goals);
        let mut num_samples = 0usize;

        while accepted.len() < self.params.num_random_goals
            && num_samples < self.params.max_sample_retries
        {
            num_samples += 1;

            let cell = (
                rng.random_range(0..map.width()),
                rng.random_range(0..map.height()),
            );

            if map.get(cell) != Some(CellState::Free) {
                continue;
            }

            let candidate_m = map.grid_to_world(cell);

            let too_close = accepted
                .iter()
                .any(|g| distance_between_goals(g, &candidate_m) < self.params.min_goal_separation_m);
            if too_close {
                continue;
            }

            accepted.push(candidate_m);
        }

        if accepted.len() < self.params.num_random_goals {
            warn!(
                "Random goal sampling exhausted its budget of {} samples, {} of {} goals accepted",
                self.params.max_sample_retries,
                accepted.len(),
                self.params.num_random_goals
            );
        }

        accepted
    }

    /// Plan an intermediate waypoint sequence between two goals.
    ///
    /// Delegates to the injected planning collaborator and returns its result
    /// unmodified. If the planner fails or returns an empty plan the manager
    /// transitions back to idle and the error is signalled upward - an
    /// unreachable goal is a recoverable condition, not a fault.
    pub fn plan_between_goals(
        &mut self,
        start_m: Point2<f64>,
        end_m: Point2<f64>,
        map: &OccupancyMap,
    ) -> Result<Vec<Point2<f64>>, GoalMgrError> {
        match self.planner.plan_path(start_m, end_m, map) {
            Ok(plan) if !plan.is_empty() => Ok(plan),
            Ok(_) => {
                warn!("Planner returned an empty plan, dropping goals");
                self.clear();
                Err(GoalMgrError::NoPath(PlanError::NoFeasiblePath))
            }
            Err(e) => {
                warn!("Planner failed ({}), dropping goals", e);
                self.clear();
                Err(GoalMgrError::NoPath(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
