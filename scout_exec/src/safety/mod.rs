//! # Safety monitor module
//!
//! The safety monitor derives a single boolean "too close" signal from the
//! latest range scan snapshot. Beams are restricted to the robot's forward
//! cone, the sensor-to-robot-frame offset is subtracted from the minimum
//! observed range, and the result is compared to the stop distance.
//!
//! The monitor has no side effects beyond its output; the control loop
//! decides what to do with the signal.
//!
//! If the scan is empty, or every reading lies outside the sensor's valid
//! band, the output is false - danger cannot be asserted from no data. This
//! policy is fail-permissive and should be re-examined for safety-critical
//! deployments; the status report exposes `min_forward_range_m` so a
//! stricter gate can be layered on top.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use comms_if::eqpt::scan::RangeScan;
use util::{module::State, params as util_params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Safety monitor module state
#[derive(Default)]
pub struct SafetyMonitor {
    params: Params,
}

/// The status report for one safety check.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The minimum valid range within the forward cone, corrected for the
    /// sensor offset, or `None` if the scan held no usable reading.
    pub min_forward_range_m: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during safety monitor operation.
#[derive(Debug, thiserror::Error)]
pub enum SafetyError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util_params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SafetyMonitor {
    /// Build a monitor directly from a parameter struct.
    ///
    /// Non-positive distances or cone angles are a configuration fault and
    /// are rejected here, before the control loop can start.
    pub fn from_params(params: Params) -> Result<Self, SafetyError> {
        if params.stop_distance_m <= 0.0 {
            return Err(SafetyError::InvalidParams(
                "stop_distance_m must be positive".into(),
            ));
        }
        if params.sensor_offset_m < 0.0 {
            return Err(SafetyError::InvalidParams(
                "sensor_offset_m must not be negative".into(),
            ));
        }
        if params.forward_cone_half_angle_rad <= 0.0 {
            return Err(SafetyError::InvalidParams(
                "forward_cone_half_angle_rad must be positive".into(),
            ));
        }

        Ok(Self { params })
    }
}

impl State for SafetyMonitor {
    type InitData = &'static str;
    type InitError = SafetyError;

    type InputData = Option<RangeScan>;
    type OutputData = bool;
    type StatusReport = StatusReport;
    type ProcError = SafetyError;

    /// Initialise the safety monitor.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), SafetyError> {
        let params = util_params::load(init_data).map_err(SafetyError::ParamLoadError)?;

        *self = Self::from_params(params)?;

        Ok(())
    }

    /// Check whether the robot is too close to an obstacle.
    ///
    /// The input is the latest scan snapshot from the data store, or `None`
    /// if no scan has arrived yet.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), SafetyError> {
        let mut report = StatusReport::default();

        let scan = match input_data {
            Some(s) => s,
            None => return Ok((false, report)),
        };

        let min_range_m = scan.min_forward_range_m(self.params.forward_cone_half_angle_rad);

        let too_close = match min_range_m {
            Some(range_m) => {
                let corrected_m = range_m - self.params.sensor_offset_m;
                report.min_forward_range_m = Some(corrected_m);
                corrected_m < self.params.stop_distance_m
            }
            // No usable reading - cannot assert danger from no data
            None => false,
        };

        Ok((too_close, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn monitor() -> SafetyMonitor {
        SafetyMonitor::from_params(Params::default()).unwrap()
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

    #[test]
    fn test_obstacle_within_stop_distance() {
        let mut mon = monitor();

        // 0.10 m observed, 0.12 m offset -> corrected is negative, well
        // below the 0.24 m threshold
        let (too_close, report) = mon.proc(&Some(forward_scan(0.10))).unwrap();
        assert!(too_close);
        assert!(report.min_forward_range_m.unwrap() < 0.24);
    }

    #[test]
    fn test_clear_ahead() {
        let mut mon = monitor();

        let (too_close, report) = mon.proc(&Some(forward_scan(2.0))).unwrap();
        assert!(!too_close);
        assert!((report.min_forward_range_m.unwrap() - 1.88).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_iff() {
        let mut mon = monitor();

        // Just inside the threshold: 0.24 + 0.12 - eps observed
        let (too_close, _) = mon.proc(&Some(forward_scan(0.3599))).unwrap();
        assert!(too_close);

        // Exactly at the threshold is not "too close" (strict less-than)
        let (too_close, _) = mon.proc(&Some(forward_scan(0.36))).unwrap();
        assert!(!too_close);
    }

    #[test]
    fn test_empty_scan_is_permissive() {
        let mut mon = monitor();

        let (too_close, report) = mon.proc(&Some(RangeScan::default())).unwrap();
        assert!(!too_close);
        assert!(report.min_forward_range_m.is_none());

        let (too_close, _) = mon.proc(&None).unwrap();
        assert!(!too_close);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Params {
            stop_distance_m: 0.0,
            ..Params::default()
        };
        assert!(SafetyMonitor::from_params(params).is_err());
    }
}
