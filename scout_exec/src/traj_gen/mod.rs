//! # Trajectory generator module
//!
//! The trajectory generator converts an ordered sequence of goal points into
//! a profile of poses, curvatures and velocities which the control loop
//! consumes in index order, one point per tick.
//!
//! Generation happens in two stages. First the goals are threaded with a
//! spline and sampled geometrically, giving position, heading, curvature and
//! arc distance along the curve. Second a jerk-limited S-curve velocity
//! profile is laid over the curve's length: the cruise speed is the
//! curvature-speed map evaluated at the curve's tightest turn (never above
//! the velocity limit), and the ramps up from and down to rest are shaped in
//! closed form by the acceleration and jerk limits. Sampling the closed-form
//! velocity at the tick period guarantees that consecutive profile
//! velocities never differ by more than the acceleration bound per tick, and
//! that the implied acceleration never changes faster than the jerk bound.
//!
//! Regeneration replaces the stored profile wholesale; a failed regeneration
//! leaves the previous profile untouched.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod spline;

pub use params::Params;
pub use spline::{SplineSample, WaypointSpline};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Point2, Vector2};
use serde::Serialize;

// Internal
use util::{maths, params as util_params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory generator state
pub struct TrajGen {
    params: Params,

    /// The current profile, replaced wholesale on regeneration
    profile: Option<Vec<ProfilePoint>>,
}

/// One sampled element of a planned trajectory.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct ProfilePoint {
    /// Sampled position on the curve
    pub position_m: Vector2<f64>,

    /// Heading (tangent direction) at the sample
    pub heading_rad: f64,

    /// Signed curvature at the sample in 1/meters
    pub curv_m: f64,

    /// The velocity assigned to this point
    pub vel_ms: f64,

    /// Time offset of this point from the start of the profile
    pub time_s: f64,

    /// Arc distance of this point from the start of the profile
    pub dist_m: f64,
}

/// One geometric sample used while building the profile
struct GeoSample {
    s_m: f64,
    position_m: Vector2<f64>,
    heading_rad: f64,
    curv_m: f64,
}

/// The closed-form jerk-limited velocity ramp shared by both ends of a
/// profile.
///
/// The ramp rises from rest to the cruise velocity with a jerk-bounded
/// acceleration wave: jerk up to the peak acceleration, hold it, jerk back
/// down, reaching the cruise velocity with zero acceleration. When the
/// cruise velocity is too small to reach the peak acceleration the hold
/// phase vanishes.
struct VelRamp {
    /// Cruise velocity the ramp reaches
    cruise_ms: f64,

    /// Duration of each jerk phase
    jerk_time_s: f64,

    /// Duration of the constant-acceleration hold phase
    hold_time_s: f64,

    /// The jerk magnitude shaping the ramp
    jerk_msss: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during trajectory generation.
#[derive(Debug, thiserror::Error)]
pub enum TrajGenError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util_params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// At least two goals are needed to span a trajectory.
    #[error("Expected at least two goals, found {0}")]
    TooFewGoals(usize),

    /// Consecutive goals coincide, which would create a zero-length segment.
    #[error("Goals {0} and {1} coincide")]
    CoincidentGoals(usize, usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajGen {
    /// Initialise the trajectory generator.
    ///
    /// Expected init data is the path to the parameter file.
    pub fn init(params_path: &str) -> Result<Self, TrajGenError> {
        let params = util_params::load(params_path).map_err(TrajGenError::ParamLoadError)?;

        Self::from_params(params)
    }

    /// Build a trajectory generator directly from a parameter struct.
    ///
    /// Non-positive kinematic limits are a configuration fault and are
    /// rejected here, before the control loop can start.
    pub fn from_params(params: Params) -> Result<Self, TrajGenError> {
        if params.max_vel_ms <= 0.0 {
            return Err(TrajGenError::InvalidParams(
                "max_vel_ms must be positive".into(),
            ));
        }
        if params.max_accel_mss <= 0.0 {
            return Err(TrajGenError::InvalidParams(
                "max_accel_mss must be positive".into(),
            ));
        }
        if params.max_jerk_msss <= 0.0 {
            return Err(TrajGenError::InvalidParams(
                "max_jerk_msss must be positive".into(),
            ));
        }
        if params.min_vel_ms <= 0.0 || params.min_vel_ms > params.max_vel_ms {
            return Err(TrajGenError::InvalidParams(
                "min_vel_ms must be positive and no greater than max_vel_ms".into(),
            ));
        }
        if params.profile_dt_s <= 0.0 {
            return Err(TrajGenError::InvalidParams(
                "profile_dt_s must be positive".into(),
            ));
        }
        if params.samples_per_segment < 2 {
            return Err(TrajGenError::InvalidParams(
                "samples_per_segment must be at least 2".into(),
            ));
        }

        Ok(Self {
            params,
            profile: None,
        })
    }

    /// Get the current profile, or `None` if none has been generated.
    pub fn profile(&self) -> Option<&[ProfilePoint]> {
        self.profile.as_deref()
    }

    /// Drop the current profile.
    pub fn clear(&mut self) {
        self.profile = None;
    }

    /// Generate a new profile through the given goals, replacing the current
    /// one.
    ///
    /// Fails if fewer than two goals are supplied or if consecutive goals
    /// coincide; the previous profile is retained unchanged on failure.
    pub fn generate(&mut self, goals_m: &[Point2<f64>]) -> Result<(), TrajGenError> {
        if goals_m.len() < 2 {
            return Err(TrajGenError::TooFewGoals(goals_m.len()));
        }
        for i in 1..goals_m.len() {
            if (goals_m[i] - goals_m[i - 1]).norm() <= 1e-9 {
                return Err(TrajGenError::CoincidentGoals(i - 1, i));
            }
        }

        let geo = self.sample_geometry(goals_m);
        let profile = self.assign_velocities(&geo);

        self.profile = Some(profile);

        Ok(())
    }

    /// Find the profile index nearest the given position, never before
    /// `from_index`.
    ///
    /// Progress along a profile is monotonic: restricting the search to
    /// indices at or after the previous tick's index prevents the tracker
    /// from jumping backwards where the curve passes close to itself.
    pub fn nearest_index_ahead(
        &self,
        position_m: &Vector2<f64>,
        from_index: usize,
    ) -> Option<usize> {
        let profile = self.profile.as_ref()?;
        if profile.is_empty() {
            return None;
        }

        let start = from_index.min(profile.len() - 1);

        let mut best_index = start;
        let mut best_dist_m = f64::MAX;

        for (i, point) in profile.iter().enumerate().skip(start) {
            let dist_m = (point.position_m - position_m).norm();
            if dist_m < best_dist_m {
                best_dist_m = dist_m;
                best_index = i;
            }
        }

        Some(best_index)
    }

    /// Sample the spline through the goals, accumulating arc distance.
    fn sample_geometry(&self, goals_m: &[Point2<f64>]) -> Vec<GeoSample> {
        let spline = WaypointSpline::through(goals_m);
        let num_t = self.params.samples_per_segment;

        let mut geo: Vec<GeoSample> = Vec::with_capacity(spline.num_segments() * num_t + 1);

        for segment in 0..spline.num_segments() {
            for i in 0..num_t {
                let t = (i as f64) / (num_t as f64);
                push_geo_sample(&mut geo, &spline.sample(segment, t));
            }
        }
        push_geo_sample(&mut geo, &spline.sample(spline.num_segments() - 1, 1.0));

        geo
    }

    /// Lay a jerk-limited S-curve velocity profile over the sampled curve,
    /// emitting one profile point per tick.
    fn assign_velocities(&self, geo: &[GeoSample]) -> Vec<ProfilePoint> {
        let dt = self.params.profile_dt_s;
        let total_len_m = geo.last().unwrap().s_m;

        // Cruise speed from the curvature-speed map at the tightest turn of
        // the whole curve, floored so tight geometry slows but never stalls
        // the robot
        let max_abs_curv_m = geo
            .iter()
            .map(|g| g.curv_m.abs())
            .fold(0.0f64, f64::max);
        let curve_cap_ms = maths::clamp(
            &maths::poly_val(&max_abs_curv_m, &self.params.curv_speed_map_coeffs),
            &self.params.min_vel_ms,
            &self.params.max_vel_ms,
        );

        let ramp = VelRamp::shape(
            total_len_m,
            curve_cap_ms,
            self.params.max_accel_mss,
            self.params.max_jerk_msss,
        );

        let ramp_time_s = ramp.duration_s();
        let ramp_dist_m = ramp.distance_m();
        let cruise_time_s = ((total_len_m - 2.0 * ramp_dist_m) / ramp.cruise_ms).max(0.0);
        let total_time_s = 2.0 * ramp_time_s + cruise_time_s;

        // Sample the closed-form velocity at the tick grid, integrating arc
        // distance with the trapezoid rule
        let num_ticks = (total_time_s / dt).ceil() as usize;
        let mut points: Vec<ProfilePoint> = Vec::with_capacity(num_ticks + 1);

        let mut s_m = 0.0;
        let mut prev_vel_ms = 0.0;

        for k in 0..=num_ticks {
            let t_s = ((k as f64) * dt).min(total_time_s);

            let vel_ms = if t_s < ramp_time_s {
                ramp.vel_at(t_s)
            } else if t_s < ramp_time_s + cruise_time_s {
                ramp.cruise_ms
            } else {
                ramp.vel_at(total_time_s - t_s)
            };

            if k > 0 {
                let step_dt_s = t_s - points.last().unwrap().time_s;
                s_m += 0.5 * (prev_vel_ms + vel_ms) * step_dt_s;
            }
            prev_vel_ms = vel_ms;

            // The trapezoid integral lands within a whisker of the true
            // length; pin the terminal point to the end of the curve
            let at_end = k == num_ticks;
            let dist_m = if at_end { total_len_m } else { s_m.min(total_len_m) };
            let vel_ms = if at_end { 0.0 } else { vel_ms };

            points.push(profile_point_at(geo, dist_m, vel_ms, t_s));
        }

        points
    }
}

impl VelRamp {
    /// Shape the ramp for the given curve length and limits.
    ///
    /// The cruise velocity is lowered when the curve is too short to reach
    /// the cap and still stop within it.
    fn shape(total_len_m: f64, cap_ms: f64, accel_mss: f64, jerk_msss: f64) -> Self {
        // Largest cruise speed whose up-and-down ramps fit in the curve:
        // ramp distance is cruise * ramp_time / 2, so both ramps cover
        // cruise * ramp_time
        let fits = |cruise_ms: f64| -> bool {
            Self::with_cruise(cruise_ms, accel_mss, jerk_msss).distance_m() * 2.0
                <= total_len_m + 1e-12
        };

        let cruise_ms = if fits(cap_ms) {
            cap_ms
        } else {
            // Try the trapezoidal-acceleration solution first, fall back to
            // the triangular one for very short curves
            let half = 0.5 * accel_mss * accel_mss / jerk_msss;
            let trap_ms =
                (half * half + total_len_m * accel_mss).sqrt() - half;

            if trap_ms >= accel_mss * accel_mss / jerk_msss {
                trap_ms
            } else {
                (0.5 * total_len_m * jerk_msss.sqrt()).powf(2.0 / 3.0)
            }
        };

        Self::with_cruise(cruise_ms, accel_mss, jerk_msss)
    }

    /// Build the ramp reaching the given cruise speed.
    fn with_cruise(cruise_ms: f64, accel_mss: f64, jerk_msss: f64) -> Self {
        // Peak acceleration is reached only if the cruise speed is high
        // enough, otherwise the acceleration wave is triangular
        if cruise_ms >= accel_mss * accel_mss / jerk_msss {
            Self {
                cruise_ms,
                jerk_time_s: accel_mss / jerk_msss,
                hold_time_s: cruise_ms / accel_mss - accel_mss / jerk_msss,
                jerk_msss,
            }
        } else {
            Self {
                cruise_ms,
                jerk_time_s: (cruise_ms / jerk_msss).sqrt(),
                hold_time_s: 0.0,
                jerk_msss,
            }
        }
    }

    /// Total duration of the ramp.
    fn duration_s(&self) -> f64 {
        2.0 * self.jerk_time_s + self.hold_time_s
    }

    /// Distance covered by the ramp.
    ///
    /// The acceleration wave is symmetric about the ramp midpoint, so the
    /// distance is simply the cruise speed times half the duration.
    fn distance_m(&self) -> f64 {
        0.5 * self.cruise_ms * self.duration_s()
    }

    /// Velocity at time `t` into the ramp.
    fn vel_at(&self, t_s: f64) -> f64 {
        let t_s = maths::clamp(&t_s, &0.0, &self.duration_s());
        let accel_peak_mss = self.jerk_msss * self.jerk_time_s;

        if t_s < self.jerk_time_s {
            0.5 * self.jerk_msss * t_s * t_s
        } else if t_s < self.jerk_time_s + self.hold_time_s {
            let vel_after_jerk_ms = 0.5 * self.jerk_msss * self.jerk_time_s * self.jerk_time_s;
            vel_after_jerk_ms + accel_peak_mss * (t_s - self.jerk_time_s)
        } else {
            let remaining_s = self.duration_s() - t_s;
            self.cruise_ms - 0.5 * self.jerk_msss * remaining_s * remaining_s
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Append a geometric sample, accumulating arc distance from the previous
/// one.
fn push_geo_sample(geo: &mut Vec<GeoSample>, sample: &SplineSample) {
    let s_m = match geo.last() {
        Some(prev) => prev.s_m + (sample.position_m - prev.position_m).norm(),
        None => 0.0,
    };

    geo.push(GeoSample {
        s_m,
        position_m: sample.position_m,
        heading_rad: sample.heading_rad,
        curv_m: sample.curv_m,
    });
}

/// Build a profile point at the given arc distance by interpolating the
/// geometric samples.
fn profile_point_at(geo: &[GeoSample], s_m: f64, vel_ms: f64, time_s: f64) -> ProfilePoint {
    let upper = geo.partition_point(|g| g.s_m < s_m).min(geo.len() - 1);
    let lower = upper.saturating_sub(1);

    let a = &geo[lower];
    let b = &geo[upper];
    let span_m = b.s_m - a.s_m;
    let frac = if span_m > std::f64::EPSILON {
        ((s_m - a.s_m) / span_m).max(0.0).min(1.0)
    } else {
        1.0
    };

    // Positions interpolate linearly; heading and curvature come from the
    // nearer sample to avoid interpolating across the angle wrap
    let nearer = if frac < 0.5 { a } else { b };

    ProfilePoint {
        position_m: a.position_m + frac * (b.position_m - a.position_m),
        heading_rad: nearer.heading_rad,
        curv_m: nearer.curv_m,
        vel_ms,
        time_s,
        dist_m: s_m,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn gen() -> TrajGen {
        TrajGen::from_params(Params::default()).unwrap()
    }

    fn straight_goals() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]
    }

    #[test]
    fn test_too_few_goals_rejected() {
        let mut gen = gen();
        assert!(matches!(
            gen.generate(&[Point2::new(0.0, 0.0)]),
            Err(TrajGenError::TooFewGoals(1))
        ));
        assert!(gen.profile().is_none());
    }

    #[test]
    fn test_coincident_goals_rejected_and_profile_retained() {
        let mut gen = gen();
        gen.generate(&straight_goals()).unwrap();
        let len_before = gen.profile().unwrap().len();

        let result = gen.generate(&[
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
        ]);
        assert!(matches!(result, Err(TrajGenError::CoincidentGoals(0, 1))));

        // Previous profile untouched
        assert_eq!(gen.profile().unwrap().len(), len_before);
    }

    #[test]
    fn test_profile_respects_kinematic_limits() {
        let params = Params::default();
        let mut gen = gen();
        gen.generate(&straight_goals()).unwrap();
        let profile = gen.profile().unwrap();

        let dt = params.profile_dt_s;

        for point in profile.iter() {
            assert!(point.vel_ms <= params.max_vel_ms + 1e-9);
            assert!(point.vel_ms >= 0.0);
        }

        for pair in profile.windows(2) {
            let dv = pair[1].vel_ms - pair[0].vel_ms;
            assert!(
                dv.abs() <= params.max_accel_mss * dt + 1e-9,
                "dv {} exceeds accel bound",
                dv
            );
        }

        // Rate of change of acceleration bounded by the jerk limit
        let accels: Vec<f64> = profile
            .windows(2)
            .map(|pair| (pair[1].vel_ms - pair[0].vel_ms) / dt)
            .collect();
        for pair in accels.windows(2) {
            let da = pair[1] - pair[0];
            assert!(
                da.abs() <= params.max_jerk_msss * dt + 1e-9,
                "da {} exceeds jerk bound",
                da
            );
        }
    }

    #[test]
    fn test_profile_starts_and_ends_at_rest() {
        let mut gen = gen();
        gen.generate(&straight_goals()).unwrap();
        let profile = gen.profile().unwrap();

        assert_eq!(profile.first().unwrap().vel_ms, 0.0);
        assert_eq!(profile.last().unwrap().vel_ms, 0.0);

        // And actually cruises in between
        assert!(profile.iter().any(|p| p.vel_ms > 0.1));
    }

    #[test]
    fn test_short_trajectory_stays_feasible() {
        // Far too short to reach the cruise speed; the ramp must shrink
        let mut gen = gen();
        gen.generate(&[Point2::new(0.0, 0.0), Point2::new(0.05, 0.0)])
            .unwrap();
        let profile = gen.profile().unwrap();

        assert_eq!(profile.first().unwrap().vel_ms, 0.0);
        assert_eq!(profile.last().unwrap().vel_ms, 0.0);
        assert_relative_eq!(profile.last().unwrap().dist_m, 0.05, epsilon = 1e-9);

        for pair in profile.windows(2) {
            let dv = pair[1].vel_ms - pair[0].vel_ms;
            assert!(dv.abs() <= 0.43 * 0.1 + 1e-9);
        }
    }

    #[test]
    fn test_straight_line_profile_has_zero_curvature() {
        let mut gen = gen();
        gen.generate(&straight_goals()).unwrap();

        for point in gen.profile().unwrap() {
            assert_relative_eq!(point.curv_m, 0.0, epsilon = 1e-9);
            assert_relative_eq!(point.heading_rad, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_curvy_trajectory_cruises_slower() {
        let mut gen = gen();

        gen.generate(&straight_goals()).unwrap();
        let straight_peak = gen
            .profile()
            .unwrap()
            .iter()
            .map(|p| p.vel_ms)
            .fold(0.0f64, f64::max);

        // A tight zig-zag of the same span
        gen.generate(&[
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.5),
            Point2::new(1.0, 0.0),
            Point2::new(1.5, 0.5),
            Point2::new(2.0, 0.0),
        ])
        .unwrap();
        let curvy_peak = gen
            .profile()
            .unwrap()
            .iter()
            .map(|p| p.vel_ms)
            .fold(0.0f64, f64::max);

        assert!(curvy_peak < straight_peak);
    }

    #[test]
    fn test_profile_reaches_every_waypoint() {
        let goals = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.4),
            Point2::new(2.0, 0.0),
        ];
        let mut gen = gen();
        gen.generate(&goals).unwrap();
        let profile = gen.profile().unwrap();

        for goal in goals.iter() {
            let min_dist = profile
                .iter()
                .map(|p| (p.position_m - goal.coords).norm())
                .fold(f64::MAX, f64::min);
            assert!(
                min_dist < 0.05,
                "profile misses waypoint {:?} by {}",
                goal,
                min_dist
            );
        }
    }

    #[test]
    fn test_arc_distance_is_monotonic() {
        let mut gen = gen();
        gen.generate(&straight_goals()).unwrap();

        for pair in gen.profile().unwrap().windows(2) {
            assert!(pair[1].dist_m >= pair[0].dist_m);
        }
    }

    #[test]
    fn test_nearest_index_is_monotonic() {
        let mut gen = gen();
        gen.generate(&straight_goals()).unwrap();

        let near_start = Vector2::new(0.2, 0.0);
        let idx = gen.nearest_index_ahead(&near_start, 0).unwrap();
        assert!(idx > 0);

        // Searching from a later index never goes backwards, even for a
        // position behind it
        let later = gen.nearest_index_ahead(&near_start, idx + 5).unwrap();
        assert!(later >= idx + 5);
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let params = Params {
            max_accel_mss: 0.0,
            ..Params::default()
        };
        assert!(TrajGen::from_params(params).is_err());

        let params = Params {
            max_jerk_msss: -1.0,
            ..Params::default()
        };
        assert!(TrajGen::from_params(params).is_err());
    }
}
