//! VU Meter Level Classification
//!
//! Maps a frame's decibel level to the three display zones the meter
//! renders. Pure mapping, no state.

use serde::{Deserialize, Serialize};

/// Levels below this are shown as the quiet zone.
pub const QUIET_CEILING_DB: f64 = -30.0;

/// Levels below this (but at or above [`QUIET_CEILING_DB`]) are moderate.
pub const MODERATE_CEILING_DB: f64 = -15.0;

/// Display zone for a signal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelZone {
    Quiet,
    Moderate,
    Loud,
}

/// Classify a decibel level into its display zone.
///
/// The silence sentinel (negative infinity) lands in `Quiet`.
pub fn classify(db: f64) -> LevelZone {
    if db < QUIET_CEILING_DB {
        LevelZone::Quiet
    } else if db < MODERATE_CEILING_DB {
        LevelZone::Moderate
    } else {
        LevelZone::Loud
    }
}
