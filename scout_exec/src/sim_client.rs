//! # Simulation client
//!
//! A stand-in for the real actuation and sensor transports which closes the
//! control loop without hardware: each drive command is integrated through a
//! unicycle model and the resulting pose is fed back into the data store as
//! if the localisation collaborator had produced it, along with a clear
//! synthetic range scan.
//!
//! This is an actuation-path implementation only - control behaviour is
//! identical whether commands land here or on real hardware.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::Arc;

// Internal
use crate::ctrl_loop::{DriveSink, SinkError, CYCLE_PERIOD_S};
use crate::data_store::DataStore;
use comms_if::eqpt::{drive::TwistCmd, loc::Pose, scan::RangeScan};
use util::maths;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated actuation path.
pub struct SimClient {
    ds: Arc<DataStore>,

    /// Integration step, matched to the control cycle period
    dt_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimClient {
    pub fn new(ds: Arc<DataStore>) -> Self {
        Self {
            ds,
            dt_s: CYCLE_PERIOD_S,
        }
    }

    /// A synthetic scan reporting open space ahead.
    fn clear_scan() -> RangeScan {
        RangeScan {
            ranges_m: vec![8.0; 16],
            angle_min_rad: -0.75,
            angle_increment_rad: 0.1,
            range_min_m: 0.05,
            range_max_m: 10.0,
        }
    }
}

impl DriveSink for SimClient {
    fn send(&mut self, cmd: &TwistCmd) -> Result<(), SinkError> {
        let pose = self.ds.get_pose().unwrap_or_default();

        let heading_rad = maths::wrap_to_pi(pose.get_heading() + cmd.angular_rads * self.dt_s);
        let x_m = pose.position_m[0] + cmd.linear_ms * heading_rad.cos() * self.dt_s;
        let y_m = pose.position_m[1] + cmd.linear_ms * heading_rad.sin() * self.dt_s;

        self.ds
            .on_pose_update(Pose::from_xy_heading(x_m, y_m, heading_rad));
        self.ds.on_scan_update(Self::clear_scan());

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_forward_command_advances_pose() {
        let ds = Arc::new(DataStore::new());
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));

        let mut sim = SimClient::new(ds.clone());
        sim.send(&TwistCmd {
            linear_ms: 0.2,
            angular_rads: 0.0,
        })
        .unwrap();

        let pose = ds.get_pose().unwrap();
        assert!((pose.position_m[0] - 0.02).abs() < 1e-12);
        assert_eq!(pose.position_m[1], 0.0);

        // A fresh scan was published alongside the pose
        assert!(!ds.get_scan().unwrap().is_empty());
    }

    #[test]
    fn test_turn_command_changes_heading() {
        let ds = Arc::new(DataStore::new());
        ds.on_pose_update(Pose::from_xy_heading(0.0, 0.0, 0.0));

        let mut sim = SimClient::new(ds.clone());
        sim.send(&TwistCmd {
            linear_ms: 0.0,
            angular_rads: 0.5,
        })
        .unwrap();

        let pose = ds.get_pose().unwrap();
        assert!((pose.get_heading() - 0.05).abs() < 1e-12);
    }
}
