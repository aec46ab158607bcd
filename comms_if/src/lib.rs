//! # Communications interface
//!
//! This crate defines the message shapes exchanged between the scout
//! controller and its external collaborators (sensor drivers, localisation,
//! mapping, actuation, and the ground). Transport and framing are the
//! responsibility of whatever layer carries these messages; the controller
//! only ever sees the deserialised values defined here.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Equipment messages - sensor and actuation data shapes
pub mod eqpt;

/// Telecommands - instructions sent to the controller
pub mod tc;

/// Telemetry - data projected out of the controller for observers
pub mod tm;
