//! # Velocity smoother module
//!
//! The smoother turns raw profile velocity lookups into a continuous
//! commanded speed. Profiles are regenerated wholesale and the tracked
//! profile index can jump, so the raw looked-up velocity may step between
//! ticks; the smoother slews the last commanded speed towards the target,
//! bounded by the same acceleration and jerk limits the generator enforces
//! along the profile itself.

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
use util::{maths, module::State, params as util_params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity smoother state
#[derive(Default)]
pub struct VelSmoother {
    params: Params,

    /// The last commanded velocity
    last_cmd_ms: f64,

    /// The acceleration applied on the last tick
    last_accel_mss: f64,

    /// The profile index used on the last tick
    last_index: Option<usize>,
}

/// Input data for one smoothing step.
#[derive(Debug, Copy, Clone)]
pub struct InputData {
    /// The raw velocity looked up from the profile
    pub target_vel_ms: f64,

    /// The profile index the target was looked up at
    pub index: usize,
}

/// Status report for one smoothing step.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the commanded velocity was slew-limited away from the raw
    /// target this tick
    pub slew_limited: bool,

    /// The profile index used this tick
    pub index: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during velocity smoothing.
#[derive(Debug, thiserror::Error)]
pub enum VelSmoothError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util_params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelSmoother {
    /// Build a smoother directly from a parameter struct.
    pub fn from_params(params: Params) -> Result<Self, VelSmoothError> {
        if params.max_vel_ms <= 0.0
            || params.max_accel_mss <= 0.0
            || params.max_jerk_msss <= 0.0
            || params.tick_period_s <= 0.0
        {
            return Err(VelSmoothError::InvalidParams(
                "all limits and the tick period must be positive".into(),
            ));
        }

        Ok(Self {
            params,
            ..Self::default()
        })
    }

    /// Reset the smoother state.
    ///
    /// Must be called when the profile is regenerated or the mission
    /// restarts, so stale slew state doesn't bleed into the new profile.
    pub fn reset(&mut self) {
        self.last_cmd_ms = 0.0;
        self.last_accel_mss = 0.0;
        self.last_index = None;
    }

    /// The last commanded velocity.
    pub fn last_cmd_ms(&self) -> f64 {
        self.last_cmd_ms
    }
}

impl State for VelSmoother {
    type InitData = &'static str;
    type InitError = VelSmoothError;

    type InputData = InputData;
    type OutputData = f64;
    type StatusReport = StatusReport;
    type ProcError = VelSmoothError;

    /// Initialise the velocity smoother.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), VelSmoothError> {
        let params = util_params::load(init_data).map_err(VelSmoothError::ParamLoadError)?;

        *self = Self::from_params(params)?;

        Ok(())
    }

    /// Produce the next commanded velocity for the given profile lookup.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), VelSmoothError> {
        let dt = self.params.tick_period_s;

        let accel_des_mss = maths::clamp(
            &((input_data.target_vel_ms - self.last_cmd_ms) / dt),
            &-self.params.max_accel_mss,
            &self.params.max_accel_mss,
        );

        let jerk_step_mss = self.params.max_jerk_msss * dt;
        let accel_mss = maths::clamp(
            &(self.last_accel_mss
                + maths::clamp(
                    &(accel_des_mss - self.last_accel_mss),
                    &-jerk_step_mss,
                    &jerk_step_mss,
                )),
            &-self.params.max_accel_mss,
            &self.params.max_accel_mss,
        );

        let cmd_ms = maths::clamp(
            &(self.last_cmd_ms + accel_mss * dt),
            &0.0,
            &self.params.max_vel_ms,
        );

        let report = StatusReport {
            slew_limited: (cmd_ms - input_data.target_vel_ms).abs() > 1e-9,
            index: input_data.index,
        };

        self.last_cmd_ms = cmd_ms;
        self.last_accel_mss = accel_mss;
        self.last_index = Some(input_data.index);

        Ok((cmd_ms, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn smoother() -> VelSmoother {
        VelSmoother::from_params(Params::default()).unwrap()
    }

    #[test]
    fn test_step_is_slew_limited() {
        let mut sm = smoother();
        let params = Params::default();

        // A step demand from rest to max must be chased gradually
        let (cmd, report) = sm
            .proc(&InputData {
                target_vel_ms: params.max_vel_ms,
                index: 0,
            })
            .unwrap();

        assert!(report.slew_limited);
        assert!(cmd <= params.max_accel_mss * params.tick_period_s + 1e-12);
        assert!(cmd > 0.0);
    }

    #[test]
    fn test_converges_to_target() {
        let mut sm = smoother();

        let mut cmd = 0.0;
        for _ in 0..100 {
            cmd = sm
                .proc(&InputData {
                    target_vel_ms: 0.2,
                    index: 0,
                })
                .unwrap()
                .0;
        }

        assert!((cmd - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_per_tick_bounds_hold() {
        let mut sm = smoother();
        let params = Params::default();
        let dt = params.tick_period_s;

        let mut last_cmd = 0.0;
        let mut last_accel = 0.0;

        // Alternate wildly between demands, every step stays bounded
        for i in 0..50 {
            let target = if i % 2 == 0 { params.max_vel_ms } else { 0.0 };
            let (cmd, _) = sm
                .proc(&InputData {
                    target_vel_ms: target,
                    index: i,
                })
                .unwrap();

            let accel = (cmd - last_cmd) / dt;
            assert!(accel.abs() <= params.max_accel_mss + 1e-9);
            assert!((accel - last_accel).abs() <= params.max_jerk_msss * dt + 1e-9);
            assert!(cmd >= 0.0 && cmd <= params.max_vel_ms);

            last_cmd = cmd;
            last_accel = accel;
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut sm = smoother();

        sm.proc(&InputData {
            target_vel_ms: 0.2,
            index: 3,
        })
        .unwrap();
        assert!(sm.last_cmd_ms() > 0.0);

        sm.reset();
        assert_eq!(sm.last_cmd_ms(), 0.0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Params {
            tick_period_s: 0.0,
            ..Params::default()
        };
        assert!(VelSmoother::from_params(params).is_err());
    }
}
