//! # Equipment messages
//!
//! Data shapes produced by the robot's equipment (sensors and localisation)
//! and consumed by its actuation.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;
pub mod loc;
pub mod map;
pub mod scan;
