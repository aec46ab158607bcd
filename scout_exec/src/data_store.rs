//! # Data Store
//!
//! The shared sensor-state cache for the executable. Ingestion call sites
//! (driven by whatever transport layer carries the sensor streams) replace
//! individual fields at their own cadence, while the control thread takes
//! copies once per cycle.
//!
//! Each field is guarded by its own mutex so that readers of one field never
//! block writers of another, and no method ever holds more than one lock at a
//! time. Writers fully replace a field's value and readers clone it out while
//! holding the lock, releasing before any computation happens. Mission and
//! mode flags are lock-free atomics since they are simple booleans read far
//! more often than they are written.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use nalgebra::Point2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

// Internal
use crate::map::OccupancyMap;
use comms_if::{
    eqpt::{loc::Pose, map::OccupancyGridMsg, scan::RangeScan},
    tc::TcResponse,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared state store for the executable.
///
/// A "no data yet" state is represented by `None` in each field; consumers
/// must handle it rather than assume data is present.
#[derive(Default)]
pub struct DataStore {
    /// Latest pose from the localisation collaborator
    pose: Mutex<Option<Pose>>,

    /// Latest range scan snapshot
    scan: Mutex<Option<RangeScan>>,

    /// Latest occupancy map
    map: Mutex<Option<OccupancyMap>>,

    /// Latest externally supplied path point
    external_point: Mutex<Option<Point2<f64>>>,

    /// True while a mission is active
    running: AtomicBool,

    /// True if commands should go to the real actuation path
    real_mode: AtomicBool,

    /// Latched once the goal queue empties mid-mission
    mission_complete: AtomicBool,

    /// Set to request the control thread to exit
    shutdown: AtomicBool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- SENSOR INGESTION ----

    /// Ingest a new pose from the localisation collaborator.
    pub fn on_pose_update(&self, pose: Pose) {
        *lock_recover(&self.pose) = Some(pose);
    }

    /// Get a copy of the latest pose, or `None` if no pose has arrived yet.
    pub fn get_pose(&self) -> Option<Pose> {
        *lock_recover(&self.pose)
    }

    /// Ingest a new range scan, replacing the previous snapshot wholesale.
    pub fn on_scan_update(&self, scan: RangeScan) {
        *lock_recover(&self.scan) = Some(scan);
    }

    /// Get a copy of the latest range scan.
    pub fn get_scan(&self) -> Option<RangeScan> {
        lock_recover(&self.scan).clone()
    }

    /// Ingest a new occupancy grid, replacing the previous map wholesale.
    ///
    /// Malformed grids are dropped with a warning rather than replacing a
    /// previously good map.
    pub fn on_map_update(&self, msg: &OccupancyGridMsg) {
        match OccupancyMap::from_msg(msg) {
            Ok(map) => *lock_recover(&self.map) = Some(map),
            Err(e) => warn!("Dropping occupancy grid update: {}", e),
        }
    }

    /// Get a copy of the latest occupancy map.
    pub fn get_map(&self) -> Option<OccupancyMap> {
        lock_recover(&self.map).clone()
    }

    /// Ingest an externally supplied path point.
    pub fn on_external_point(&self, point_m: Point2<f64>) {
        *lock_recover(&self.external_point) = Some(point_m);
    }

    /// Get a copy of the latest externally supplied path point.
    pub fn get_external_point(&self) -> Option<Point2<f64>> {
        *lock_recover(&self.external_point)
    }

    // ---- MISSION CONTROL ----

    /// Request the mission be started or stopped.
    ///
    /// Always accepted. Starting a mission clears any latched completion so a
    /// new mission begins cleanly. The transition is logged once, not on
    /// every repeated request with the same value.
    pub fn set_mission_active(&self, active: bool) -> TcResponse {
        let previous = self.running.swap(active, Ordering::SeqCst);

        if previous != active {
            if active {
                self.mission_complete.store(false, Ordering::SeqCst);
                info!("Mission started");
            } else {
                info!("Mission stopped");
            }
        }

        TcResponse::accepted(if active {
            "Mission is active"
        } else {
            "Mission is stopped"
        })
    }

    /// Request the real or simulated actuation path.
    ///
    /// Always accepted. Does not change control behaviour, only which
    /// downstream path receives the emitted commands.
    pub fn set_real_mode(&self, real: bool) -> TcResponse {
        let previous = self.real_mode.swap(real, Ordering::SeqCst);

        if previous != real {
            info!(
                "Actuation path set to {}",
                if real { "real" } else { "simulated" }
            );
        }

        TcResponse::accepted(if real {
            "Real actuation path selected"
        } else {
            "Simulated actuation path selected"
        })
    }

    /// True while the mission is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// True if the real actuation path is selected.
    pub fn is_real_mode(&self) -> bool {
        self.real_mode.load(Ordering::SeqCst)
    }

    /// Latch the mission-complete terminal state.
    pub fn set_mission_complete(&self) {
        if !self.mission_complete.swap(true, Ordering::SeqCst) {
            info!("Mission complete");
        }
    }

    /// True once the goal queue has emptied mid-mission.
    pub fn is_mission_complete(&self) -> bool {
        self.mission_complete.load(Ordering::SeqCst)
    }

    // ---- SHUTDOWN ----

    /// Request the control thread to exit at the end of its current cycle.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// True once shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Lock a mutex, recovering the data if a writer panicked mid-update.
///
/// Writers only ever replace the whole value, so the data inside a poisoned
/// lock is still self-consistent.
fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sentinels_before_first_update() {
        let ds = DataStore::new();
        assert!(ds.get_pose().is_none());
        assert!(ds.get_scan().is_none());
        assert!(ds.get_map().is_none());
        assert!(ds.get_external_point().is_none());
        assert!(!ds.is_running());
        assert!(!ds.is_real_mode());
    }

    #[test]
    fn test_updates_replace_wholesale() {
        let ds = DataStore::new();

        ds.on_pose_update(Pose::from_xy_heading(1.0, 2.0, 0.0));
        ds.on_pose_update(Pose::from_xy_heading(3.0, 4.0, 0.0));

        let pose = ds.get_pose().unwrap();
        assert_eq!(pose.position2(), nalgebra::Vector2::new(3.0, 4.0));

        ds.on_external_point(Point2::new(0.5, 0.5));
        ds.on_external_point(Point2::new(1.5, 1.5));
        assert_eq!(ds.get_external_point(), Some(Point2::new(1.5, 1.5)));
    }

    #[test]
    fn test_mission_requests_always_accepted() {
        let ds = DataStore::new();

        let resp = ds.set_mission_active(true);
        assert!(resp.accepted);
        assert!(ds.is_running());

        let resp = ds.set_real_mode(true);
        assert!(resp.accepted);
        assert!(ds.is_real_mode());

        let resp = ds.set_mission_active(false);
        assert!(resp.accepted);
        assert!(!ds.is_running());
    }

    #[test]
    fn test_mission_restart_clears_completion() {
        let ds = DataStore::new();

        ds.set_mission_active(true);
        ds.set_mission_complete();
        assert!(ds.is_mission_complete());

        // Restarting clears the latched terminal state
        ds.set_mission_active(false);
        ds.set_mission_active(true);
        assert!(!ds.is_mission_complete());
    }

    #[test]
    fn test_malformed_map_dropped() {
        let ds = DataStore::new();

        let good = OccupancyGridMsg {
            width: 2,
            height: 2,
            resolution_m: 0.5,
            origin_m: (0.0, 0.0),
            data: vec![0; 4],
        };
        ds.on_map_update(&good);
        assert!(ds.get_map().is_some());

        let bad = OccupancyGridMsg {
            width: 2,
            height: 2,
            resolution_m: 0.5,
            origin_m: (0.0, 0.0),
            data: vec![0; 3],
        };
        ds.on_map_update(&bad);

        // The previous good map survives
        assert!(ds.get_map().is_some());
    }
}
