//! # Control loop module
//!
//! The control loop combines the independently-timed sensor inputs into one
//! consistent decision per tick. Each tick it:
//!
//!  1. Reads the mission state; an inactive or completed mission emits a
//!     neutral command and nothing else.
//!  2. Takes copies of the latest pose and scan from the data store. A tick
//!     without both is an insufficient-information tick and emits a stop.
//!  3. Asks the safety monitor for the "too close" signal. Too close
//!     pre-empts all other logic: a stop is emitted and steering is skipped.
//!  4. Selects the pure-pursuit lookahead target from either the generated
//!     profile or the raw goal queue, depending on the trajectory mode.
//!  5. Computes the pure-pursuit curvature `2*sin(angle)/lookahead` and
//!     scales it by the smoothed linear speed and the steering gain to get
//!     the angular rate demand.
//!  6. Emits the command to the actuation path selected by the real/sim
//!     mode flag, then advances the goal state machine, latching mission
//!     completion when the queue empties.
//!
//! The loop runs on its own dedicated thread at a fixed rate, always
//! operating on the latest available sensor values. It never blocks waiting
//! for fresh data: staleness up to one tick is accepted. There is no
//! staleness timeout in the base design; adding one is the first hardening
//! step for deployments with unreliable sensor links.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

pub use params::{Params, TrajMode};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use nalgebra::Point2;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Internal
use crate::data_store::DataStore;
use crate::goal_mgr::{self, GoalEvent, GoalMgr, GoalMgrError, PathPlanner};
use crate::safety::{SafetyError, SafetyMonitor};
use crate::traj_gen::{TrajGen, TrajGenError};
use crate::vel_smooth::{self, VelSmoothError, VelSmoother};
use comms_if::{eqpt::drive::TwistCmd, eqpt::loc::Pose, tm::GoalMarkerSet};
use util::{module::State, session::Session};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one control cycle.
pub const CYCLE_PERIOD_S: f64 = 0.10;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The outbound actuation boundary - one drive command per tick is handed to
/// an implementation of this trait.
pub trait DriveSink {
    fn send(&mut self, cmd: &TwistCmd) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control loop state
pub struct CtrlLoop {
    params: Params,

    /// Shared sensor-state cache, written by the ingestion call sites
    ds: Arc<DataStore>,

    safety: SafetyMonitor,
    goal_mgr: GoalMgr,
    traj_gen: TrajGen,
    vel_smooth: VelSmoother,

    /// Actuation path used when the real mode flag is set
    real_sink: Box<dyn DriveSink + Send>,

    /// Actuation path used otherwise
    sim_sink: Box<dyn DriveSink + Send>,

    /// Session handle for archiving goal marker telemetry
    session: Option<Session>,

    /// Progress index into the current profile
    profile_index: usize,

    /// Number of cycles already executed
    num_cycles: u128,

    /// Latch so an insufficient-information condition is logged once, not
    /// every tick
    no_data_warned: bool,

    /// Latch for the safety stop transition log
    safety_stopped: bool,

    /// Sequence number for archived marker sets
    marker_counter: u32,
}

/// A sink which logs commands, used as the real actuation path until a
/// transport is attached.
pub struct LogSink {
    label: &'static str,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error at the actuation boundary.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to send drive command: {0}")]
    SendFailed(String),
}

/// Possible errors that can occur during control loop operation.
#[derive(Debug, thiserror::Error)]
pub enum CtrlLoopError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Safety monitor error: {0}")]
    Safety(#[from] SafetyError),

    #[error("Goal manager error: {0}")]
    GoalMgr(#[from] GoalMgrError),

    #[error("Trajectory generator error: {0}")]
    TrajGen(#[from] TrajGenError),

    #[error("Velocity smoother error: {0}")]
    VelSmooth(#[from] VelSmoothError),

    #[error("Actuation error: {0}")]
    Sink(#[from] SinkError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CtrlLoop {
    /// Initialise the control loop and all its modules from their parameter
    /// files.
    pub fn new(
        ds: Arc<DataStore>,
        planner: Box<dyn PathPlanner + Send>,
        real_sink: Box<dyn DriveSink + Send>,
        sim_sink: Box<dyn DriveSink + Send>,
        session: &Session,
    ) -> Result<Self, CtrlLoopError> {
        let params = util::params::load("ctrl_loop.toml").map_err(CtrlLoopError::ParamLoadError)?;

        let mut safety = SafetyMonitor::default();
        safety.init("safety.toml", session)?;

        let goal_mgr = GoalMgr::init("goal_mgr.toml", planner)?;
        let traj_gen = TrajGen::init("traj_gen.toml")?;

        let mut vel_smooth = VelSmoother::default();
        vel_smooth.init("vel_smooth.toml", session)?;

        Ok(Self::from_parts(
            params,
            ds,
            safety,
            goal_mgr,
            traj_gen,
            vel_smooth,
            real_sink,
            sim_sink,
            Some(session.clone()),
        ))
    }

    /// Assemble a control loop from already-initialised modules.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        params: Params,
        ds: Arc<DataStore>,
        safety: SafetyMonitor,
        goal_mgr: GoalMgr,
        traj_gen: TrajGen,
        vel_smooth: VelSmoother,
        real_sink: Box<dyn DriveSink + Send>,
        sim_sink: Box<dyn DriveSink + Send>,
        session: Option<Session>,
    ) -> Self {
        Self {
            params,
            ds,
            safety,
            goal_mgr,
            traj_gen,
            vel_smooth,
            real_sink,
            sim_sink,
            session,
            profile_index: 0,
            num_cycles: 0,
            no_data_warned: false,
            safety_stopped: false,
            marker_counter: 0,
        }
    }

    /// Load a new mission from an ordered goal sequence.
    ///
    /// Replaces the goal queue, regenerates the profile (in spline mode) and
    /// resets all per-mission state. A single-goal mission cannot span a
    /// profile and is pursued directly.
    pub fn load_mission(&mut self, goals_m: Vec<Point2<f64>>) -> Result<(), CtrlLoopError> {
        if self.params.traj_mode == TrajMode::SplineProfile && goals_m.len() >= 2 {
            self.traj_gen.generate(&goals_m)?;

            if let (Some(session), Some(profile)) = (&self.session, self.traj_gen.profile()) {
                session.save("tm/profile.json", profile.to_vec());
            }
        } else {
            self.traj_gen.clear();
        }

        self.goal_mgr.set_goals(goals_m);
        self.vel_smooth.reset();
        self.profile_index = 0;
        self.no_data_warned = false;

        self.publish_markers();

        Ok(())
    }

    /// Build and load a mission from randomly sampled map goals.
    ///
    /// Samples goals over the free cells of the latest map and checks that
    /// every leg between consecutive goals is reachable by asking the
    /// planning collaborator for a route. Returns false, without loading
    /// anything, when the data store holds no map yet, when sampling cannot
    /// find enough goals, or when any leg is unreachable.
    pub fn start_random_mission(&mut self) -> Result<bool, CtrlLoopError> {
        let map = match self.ds.get_map() {
            Some(m) => m,
            None => {
                warn!("Cannot start a random mission before a map has arrived");
                return Ok(false);
            }
        };

        let goals_m = self.goal_mgr.generate_random_goals(&map);
        if goals_m.len() < 2 {
            warn!(
                "Random sampling produced only {} goal(s), not starting",
                goals_m.len()
            );
            return Ok(false);
        }

        // Seed the visiting order from the current position if one is known,
        // and finish at the externally supplied path point when there is one
        // in free space
        let mut anchors_m = Vec::with_capacity(goals_m.len() + 2);
        if let Some(pose) = self.ds.get_pose() {
            let position = pose.position2();
            anchors_m.push(Point2::new(position[0], position[1]));
        }
        anchors_m.extend(goals_m);
        if let Some(point_m) = self.ds.get_external_point() {
            if map.is_free_world(&point_m) {
                anchors_m.push(point_m);
            } else {
                warn!(
                    "External path point ({:.2}, {:.2}) is not in free space, ignoring",
                    point_m[0], point_m[1]
                );
            }
        }
        anchors_m.dedup_by(|b, a| (*b - *a).norm() <= 1e-6);

        for pair in anchors_m.windows(2) {
            if let Err(e) = self.goal_mgr.plan_between_goals(pair[0], pair[1], &map) {
                warn!("Mission route unreachable: {}", e);
                return Ok(false);
            }
        }

        self.load_mission(anchors_m)?;

        Ok(true)
    }

    /// Execute one control cycle, returning the emitted command.
    pub fn tick(&mut self) -> Result<TwistCmd, CtrlLoopError> {
        // ---- MISSION GATE ----

        if !self.ds.is_running() || self.ds.is_mission_complete() {
            return self.emit_stop();
        }

        // ---- SENSOR SNAPSHOT ----

        let pose = self.ds.get_pose();
        let scan = self.ds.get_scan();

        let pose = match (pose, scan.is_some()) {
            (Some(p), true) => p,
            _ => {
                if !self.no_data_warned {
                    warn!("Insufficient sensor data for control, holding stop");
                    self.no_data_warned = true;
                }
                return self.emit_stop();
            }
        };
        self.no_data_warned = false;

        // ---- SAFETY GATE ----

        // Too close pre-empts all other logic
        let (too_close, safety_report) = self.safety.proc(&scan)?;
        if too_close {
            if !self.safety_stopped {
                info!(
                    "Obstacle within stop distance (min forward range {:?}), stopping",
                    safety_report.min_forward_range_m
                );
                self.safety_stopped = true;
            }
            return self.emit_stop();
        }
        if self.safety_stopped {
            info!("Obstacle cleared, resuming");
            self.safety_stopped = false;
        }

        // ---- STEERING TARGET ----

        let (lookahead_m, target_vel_ms) = match self.steering_target(&pose) {
            Some(t) => t,
            None => {
                // Running with an empty goal queue is the defined terminal
                // condition
                self.ds.set_mission_complete();
                return self.emit_stop();
            }
        };

        // ---- COMMAND GENERATION ----

        let (linear_ms, _) = self.vel_smooth.proc(&vel_smooth::InputData {
            target_vel_ms,
            index: self.profile_index,
        })?;

        let angle_rad = goal_mgr::goal_angle(&lookahead_m, &pose);
        let curv_m = 2.0 * angle_rad.sin() / self.params.lookahead_m;
        let angular_rads = self.params.steering_sens * curv_m * linear_ms;

        let cmd = TwistCmd {
            linear_ms,
            angular_rads,
        };
        self.emit(&cmd)?;

        // ---- GOAL ADVANCEMENT ----

        match self.goal_mgr.advance(&pose) {
            Some(GoalEvent::QueueEmptied) => {
                self.ds.set_mission_complete();
                self.traj_gen.clear();
                self.vel_smooth.reset();
                self.publish_markers();
            }
            Some(GoalEvent::GoalReached) => {
                self.publish_markers();
            }
            None => (),
        }

        Ok(cmd)
    }

    /// Run the control loop at the fixed cycle rate until shutdown is
    /// requested.
    pub fn run(&mut self) {
        info!("Begining control loop at {:.1} Hz\n", 1.0 / CYCLE_PERIOD_S);

        loop {
            let cycle_start = Instant::now();

            if self.ds.is_shutdown_requested() {
                info!("Shutdown requested, stopping control loop");
                if let Err(e) = self.emit_stop() {
                    warn!("Could not emit final stop command: {}", e);
                }
                break;
            }

            // A failed cycle is logged and the loop continues; every error
            // class here is recoverable and the next tick starts from fresh
            // snapshots
            if let Err(e) = self.tick() {
                warn!("Error during control cycle: {}", e);
            }

            self.num_cycles += 1;

            let elapsed_s = cycle_start.elapsed().as_secs_f64();
            if elapsed_s < CYCLE_PERIOD_S {
                std::thread::sleep(Duration::from_secs_f64(CYCLE_PERIOD_S - elapsed_s));
            } else {
                warn!(
                    "Cycle {} overran by {:.4} s",
                    self.num_cycles,
                    elapsed_s - CYCLE_PERIOD_S
                );
            }
        }
    }

    /// Get the number of executed cycles.
    pub fn num_cycles(&self) -> u128 {
        self.num_cycles
    }

    /// Get a copy of the remaining goal sequence, for observers.
    pub fn goal_points(&self) -> Vec<Point2<f64>> {
        self.goal_mgr.goal_points()
    }

    /// Select the lookahead point and raw velocity demand for this tick.
    ///
    /// Returns `None` when there is nothing left to pursue.
    fn steering_target(&mut self, pose: &Pose) -> Option<(Point2<f64>, f64)> {
        let position = pose.position2();

        if self.params.traj_mode == TrajMode::SplineProfile {
            if self.traj_gen.profile().is_some() {
                // Profile points are one per tick, so progress advances at
                // least one index per cycle; the position tracker pulls the
                // index further forward if the robot is ahead of schedule
                let tracked = self
                    .traj_gen
                    .nearest_index_ahead(&position, self.profile_index)?;

                let profile = self.traj_gen.profile()?;
                let last = profile.len() - 1;
                let index = tracked.max((self.profile_index + 1).min(last));
                self.profile_index = index;

                // An exhausted profile with goals still queued means pure
                // pursuit cut a corner wider than the goal radius; fall back
                // to pursuing the remaining goals directly rather than
                // stalling at the profile's rest point
                if index < last {
                    let points_m: Vec<Point2<f64>> = profile[index..]
                        .iter()
                        .map(|p| Point2::from(p.position_m))
                        .collect();

                    let lookahead_m =
                        goal_mgr::find_lookahead_point(&points_m, pose, self.params.lookahead_m)?;

                    return Some((lookahead_m, profile[index].vel_ms));
                }
            }
        }

        // Direct pursuit of the raw goal queue
        let goals_m = self.goal_mgr.goal_points();
        let lookahead_m =
            goal_mgr::find_lookahead_point(&goals_m, pose, self.params.lookahead_m)?;

        Some((lookahead_m, self.params.cruise_vel_ms))
    }

    /// Emit a command to the actuation path selected by the mode flag.
    fn emit(&mut self, cmd: &TwistCmd) -> Result<(), CtrlLoopError> {
        trace!(
            "Drive command: linear {:.3} m/s, angular {:.3} rad/s",
            cmd.linear_ms,
            cmd.angular_rads
        );

        if self.ds.is_real_mode() {
            self.real_sink.send(cmd)?;
        } else {
            self.sim_sink.send(cmd)?;
        }

        Ok(())
    }

    /// Emit a stop command and clear the smoother so a later resume ramps up
    /// from rest.
    fn emit_stop(&mut self) -> Result<TwistCmd, CtrlLoopError> {
        let cmd = TwistCmd::stop();
        self.vel_smooth.reset();
        self.emit(&cmd)?;
        Ok(cmd)
    }

    /// Archive the current goal set as a marker telemetry snapshot.
    fn publish_markers(&mut self) {
        let session = match &self.session {
            Some(s) => s,
            None => return,
        };

        let goals: Vec<(f64, f64)> = self
            .goal_mgr
            .goal_points()
            .iter()
            .map(|g| (g[0], g[1]))
            .collect();

        session.save(
            format!("tm/goal_markers_{:04}.json", self.marker_counter),
            GoalMarkerSet::from_goals(&goals),
        );
        self.marker_counter += 1;
    }
}

impl LogSink {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl DriveSink for LogSink {
    fn send(&mut self, cmd: &TwistCmd) -> Result<(), SinkError> {
        debug!(
            "[{}] linear {:.3} m/s, angular {:.3} rad/s",
            self.label, cmd.linear_ms, cmd.angular_rads
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::goal_mgr::GridLinePlanner;
    use crate::safety;
    use crate::traj_gen;
    use crate::vel_smooth::VelSmoother;
    use approx::assert_relative_eq;
    use comms_if::eqpt::scan::RangeScan;
    use std::sync::Mutex;

    /// Sink double which records every command it is handed
    #[derive(Clone)]
    struct CaptureSink {
        cmds: Arc<Mutex<Vec<TwistCmd>>>,
    }

    impl CaptureSink {
        fn new() -> Self {
            Self {
                cmds: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn last(&self) -> Option<TwistCmd> {
            self.cmds.lock().unwrap().last().copied()
        }
    }

    impl DriveSink for CaptureSink {
        fn send(&mut self, cmd: &TwistCmd) -> Result<(), SinkError> {
            self.cmds.lock().unwrap().push(*cmd);
            Ok(())
        }
    }

    fn forward_scan(range_m: f64) -> RangeScan {
        RangeScan {
            ranges_m: vec![range_m],
            angle_min_rad: 0.0,
            angle_increment_rad: 0.01,
            range_min_m: 0.02,
            range_max_m: 10.0,
        }
    }

    fn loop_with(params: Params) -> (CtrlLoop, Arc<DataStore>, CaptureSink) {
        let ds = Arc::new(DataStore::new());
        let sink = CaptureSink::new();

        let ctrl = CtrlLoop::from_parts(
            params,
            ds.clone(),
            SafetyMonitor::from_params(safety::Params::default()).unwrap(),
            GoalMgr::from_params(
                crate::goal_mgr::Params::default(),
                Box::new(GridLinePlanner::new(0.1)),
            )
            .unwrap(),
            TrajGen::from_params(traj_gen::Params::default()).unwrap(),
            VelSmoother::from_params(crate::vel_smooth::Params::default()).unwrap(),
            Box::new(sink.clone()),
            Box::new(sink.clone()),
            None,
        );

        (ctrl, ds, sink)
    }

    fn direct_params() -> Params {
        Params {
            traj_mode: TrajMode::DirectPursuit,
            ..Params::default()
        }
    }

    #[test]
    fn test_inactive_mission_emits_stop() {
        let (mut ctrl, ds, sink) = loop_with(direct_params());

        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));
        ctrl.load_mission(vec![Point2::new(1.0, 0.0)]).unwrap();

        let cmd = ctrl.tick().unwrap();
        assert!(cmd.is_stop());
        assert!(sink.last().unwrap().is_stop());
    }

    #[test]
    fn test_obstacle_preempts_valid_goal() {
        let (mut ctrl, ds, sink) = loop_with(direct_params());

        ds.set_mission_active(true);
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        // Obstacle at 0.10 m against a 0.24 m stop distance
        ds.on_scan_update(forward_scan(0.10));
        ctrl.load_mission(vec![Point2::new(1.0, 0.0)]).unwrap();

        let cmd = ctrl.tick().unwrap();
        assert!(cmd.is_stop());
        assert!(sink.last().unwrap().is_stop());
    }

    #[test]
    fn test_no_data_tick_emits_stop() {
        let (mut ctrl, ds, _sink) = loop_with(direct_params());

        ds.set_mission_active(true);
        ctrl.load_mission(vec![Point2::new(1.0, 0.0)]).unwrap();

        // No pose, no scan
        assert!(ctrl.tick().unwrap().is_stop());

        // Pose alone is still insufficient
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        assert!(ctrl.tick().unwrap().is_stop());
    }

    #[test]
    fn test_straight_ahead_goal_gives_zero_angular() {
        let (mut ctrl, ds, _sink) = loop_with(direct_params());

        ds.set_mission_active(true);
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));
        ctrl.load_mission(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)])
            .unwrap();

        let cmd = ctrl.tick().unwrap();

        // Lookahead at (0.4, 0), directly ahead: no turn, forward motion
        assert!(cmd.linear_ms > 0.0);
        assert_relative_eq!(cmd.angular_rads, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_goal_turns_towards_it() {
        let (mut ctrl, ds, _sink) = loop_with(direct_params());

        ds.set_mission_active(true);
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));
        // Goal up and to the left
        ctrl.load_mission(vec![Point2::new(0.5, 0.5)]).unwrap();

        let cmd = ctrl.tick().unwrap();
        assert!(cmd.angular_rads > 0.0);
    }

    #[test]
    fn test_reached_goal_completes_mission() {
        let (mut ctrl, ds, _sink) = loop_with(direct_params());

        ds.set_mission_active(true);
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));
        // Goal at 0.05 m, inside the 0.1 m goal distance
        ctrl.load_mission(vec![Point2::new(0.05, 0.0)]).unwrap();

        ctrl.tick().unwrap();
        assert!(ds.is_mission_complete());

        // Subsequent ticks emit stop commands
        let cmd = ctrl.tick().unwrap();
        assert!(cmd.is_stop());
    }

    #[test]
    fn test_mission_restart_after_completion() {
        let (mut ctrl, ds, _sink) = loop_with(direct_params());

        ds.set_mission_active(true);
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));
        ctrl.load_mission(vec![Point2::new(0.05, 0.0)]).unwrap();
        ctrl.tick().unwrap();
        assert!(ds.is_mission_complete());

        // Restarting the mission with fresh goals resumes control
        ds.set_mission_active(false);
        ds.set_mission_active(true);
        ctrl.load_mission(vec![Point2::new(1.0, 0.0)]).unwrap();

        let cmd = ctrl.tick().unwrap();
        assert!(!ds.is_mission_complete());
        assert!(cmd.linear_ms > 0.0);
    }

    #[test]
    fn test_spline_mission_commands_are_bounded() {
        let (mut ctrl, ds, _sink) = loop_with(Params::default());

        ds.set_mission_active(true);
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));
        ctrl.load_mission(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ])
        .unwrap();

        let max_vel = crate::vel_smooth::Params::default().max_vel_ms;

        let mut prev_linear = 0.0;
        for _ in 0..20 {
            let cmd = ctrl.tick().unwrap();
            assert!(cmd.linear_ms >= 0.0 && cmd.linear_ms <= max_vel + 1e-9);

            // Straight profile: no turning
            assert_relative_eq!(cmd.angular_rads, 0.0, epsilon = 1e-9);

            // The commanded speed ramps smoothly
            assert!((cmd.linear_ms - prev_linear).abs() <= 0.43 * 0.1 + 1e-9);
            prev_linear = cmd.linear_ms;
        }

        // After two seconds of ramping the robot is well under way
        assert!(prev_linear > 0.1);
    }

    #[test]
    fn test_random_mission_from_map() {
        let (mut ctrl, ds, _sink) = loop_with(direct_params());

        ds.on_map_update(&comms_if::eqpt::map::OccupancyGridMsg {
            width: 40,
            height: 40,
            resolution_m: 0.5,
            origin_m: (0.0, 0.0),
            data: vec![0; 1600],
        });
        ds.on_pose_update(Pose::from_xy_heading(5.0, 5.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));
        ds.on_external_point(Point2::new(12.3, 12.3));

        assert!(ctrl.start_random_mission().unwrap());
        ds.set_mission_active(true);

        // The externally supplied point is the final destination
        assert_eq!(ctrl.goal_points().last(), Some(&Point2::new(12.3, 12.3)));

        let cmd = ctrl.tick().unwrap();
        assert!(cmd.linear_ms > 0.0);
    }

    #[test]
    fn test_random_mission_requires_map() {
        let (mut ctrl, _ds, _sink) = loop_with(direct_params());
        assert!(!ctrl.start_random_mission().unwrap());
    }

    #[test]
    fn test_empty_goal_queue_mid_mission_completes() {
        let (mut ctrl, ds, _sink) = loop_with(direct_params());

        ds.set_mission_active(true);
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));
        ds.on_scan_update(forward_scan(5.0));

        // Mission activated without any goals loaded
        let cmd = ctrl.tick().unwrap();
        assert!(cmd.is_stop());
        assert!(ds.is_mission_complete());
    }
}
