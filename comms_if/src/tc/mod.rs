//! # Telecommand module
//!
//! This module provides the telecommands accepted by the controller and the
//! acknowledgement shape returned for each request.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the controller by an external
/// operator or supervisor.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tc {
    /// Start (true) or stop (false) the mission.
    SetMissionActive(bool),

    /// Select the real (true) or simulated (false) actuation path.
    SetRealMode(bool),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The acknowledgement returned for every telecommand request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcResponse {
    /// True if the request was accepted
    pub accepted: bool,

    /// A human readable description of the outcome
    pub message: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialize this TC into a JSON packet
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl TcResponse {
    /// Build an accepted response with the given message.
    pub fn accepted<S: Into<String>>(message: S) -> Self {
        Self {
            accepted: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tc_json_round_trip() {
        let tc = Tc::SetMissionActive(true);
        let json = tc.to_json().unwrap();
        assert_eq!(Tc::from_json(&json).unwrap(), tc);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(Tc::from_json("not json").is_err());
    }
}
