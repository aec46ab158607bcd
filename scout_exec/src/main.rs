//! Main controller executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger and parameters
//!     - Initialise the data store and control modules
//!     - Spawn the control thread, which runs the fixed-rate control loop
//!     - Feed the data store from the sensor/transport call sites
//!
//! Sensor ingestion is asynchronous to the control thread: whatever carries
//! the sensor streams calls the data store's `on_*_update` methods at its own
//! cadence, and the control loop always works from the latest values. With
//! the `sim` feature enabled the executable seeds a synthetic map and pose
//! and drives a randomly sampled mission through the simulated actuation
//! path.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
use scout_lib::ctrl_loop::CYCLE_PERIOD_S;
use scout_lib::{
    ctrl_loop::{CtrlLoop, LogSink},
    data_store::DataStore,
    goal_mgr::GridLinePlanner,
};

#[cfg(feature = "sim")]
use scout_lib::sim_client::SimClient;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
#[cfg(feature = "sim")]
use color_eyre::eyre::eyre;
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::sync::Arc;
use std::thread;
#[cfg(feature = "sim")]
use std::time::Duration;

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Spacing of waypoints produced by the line planner.
const PLANNER_POINT_SEP_M: f64 = 0.05;

/// Size of the synthetic demo map in cells.
#[cfg(feature = "sim")]
const SIM_MAP_CELLS: usize = 60;

/// Resolution of the synthetic demo map.
#[cfg(feature = "sim")]
const SIM_MAP_RES_M: f64 = 0.1;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("scout_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Scout Controller Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let ds = Arc::new(DataStore::new());

    // ---- INITIALISE CONTROL LOOP ----

    // The control loop owns all the control modules; each loads its own
    // parameter file here, and malformed configuration aborts the run before
    // the loop can start.
    let planner = Box::new(GridLinePlanner::new(PLANNER_POINT_SEP_M));
    let real_sink = Box::new(LogSink::new("real"));

    #[cfg(feature = "sim")]
    let sim_sink = Box::new(SimClient::new(ds.clone()));
    #[cfg(not(feature = "sim"))]
    let sim_sink = Box::new(LogSink::new("sim"));

    let mut ctrl_loop = CtrlLoop::new(ds.clone(), planner, real_sink, sim_sink, &session)
        .wrap_err("Failed to initialise the control loop")?;

    info!("Module initialisation complete\n");

    // ---- SEED SIMULATED MISSION ----

    #[cfg(feature = "sim")]
    {
        use comms_if::eqpt::{loc::Pose, map::OccupancyGridMsg};

        // An open synthetic map with the robot starting at its centre
        ds.on_map_update(&OccupancyGridMsg {
            width: SIM_MAP_CELLS,
            height: SIM_MAP_CELLS,
            resolution_m: SIM_MAP_RES_M,
            origin_m: (0.0, 0.0),
            data: vec![0; SIM_MAP_CELLS * SIM_MAP_CELLS],
        });

        let centre_m = 0.5 * (SIM_MAP_CELLS as f64) * SIM_MAP_RES_M;
        ds.on_pose_update(Pose::from_xy_heading(centre_m, centre_m, 0.0));

        if !ctrl_loop
            .start_random_mission()
            .wrap_err("Failed to build the demo mission")?
        {
            return Err(eyre!("Could not build a demo mission from the synthetic map"));
        }

        let response = ds.set_mission_active(true);
        info!("Mission request: {}", response.message);
    }

    // ---- CONTROL THREAD ----

    // The control loop runs on its own dedicated thread, independent of any
    // sensor ingestion call sites
    let control_handle = thread::spawn(move || ctrl_loop.run());

    // With the sim feature the main thread just supervises: once the mission
    // completes the executable shuts down cleanly. Without it, the control
    // thread runs until the process is killed and ingestion is expected to
    // arrive from an attached transport layer.
    #[cfg(feature = "sim")]
    {
        let deadline = std::time::Instant::now() + Duration::from_secs(600);

        while !ds.is_mission_complete() {
            if std::time::Instant::now() > deadline {
                warn!("Demo mission did not complete within its deadline");
                break;
            }
            thread::sleep(Duration::from_secs_f64(CYCLE_PERIOD_S));
        }

        if ds.is_mission_complete() {
            info!("Demo mission complete, shutting down");
        }
        ds.request_shutdown();
    }

    match control_handle.join() {
        Ok(()) => (),
        Err(_) => warn!("Control thread panicked"),
    }

    session.exit();

    Ok(())
}
