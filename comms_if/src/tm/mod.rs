//! # Telemetry module
//!
//! Read-only projections of the controller's state for external observers.
//! Nothing in here feeds back into control decisions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A labeled, colored point marker representing one goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalMarker {
    /// Unique identifier of the marker within its set
    pub id: u32,

    /// World position of the marked goal
    pub position_m: (f64, f64),

    /// Marker color as RGB components in [0, 1]
    pub color_rgb: (f64, f64, f64),

    /// Human readable label
    pub label: String,
}

/// The full set of goal markers published when the goal set changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalMarkerSet {
    /// When this set was projected out of the controller
    pub timestamp: DateTime<Utc>,

    pub markers: Vec<GoalMarker>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalMarkerSet {
    /// Build a marker set from an ordered sequence of goal positions.
    ///
    /// The current (front) goal is colored green, all later goals red.
    pub fn from_goals<'a, I>(goals: I) -> Self
    where
        I: IntoIterator<Item = &'a (f64, f64)>,
    {
        let markers = goals
            .into_iter()
            .enumerate()
            .map(|(i, pos)| GoalMarker {
                id: i as u32,
                position_m: *pos,
                color_rgb: if i == 0 {
                    (0.0, 1.0, 0.0)
                } else {
                    (1.0, 0.0, 0.0)
                },
                label: format!("goal_{}", i),
            })
            .collect();

        Self {
            timestamp: Utc::now(),
            markers,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_front_goal_is_green() {
        let set = GoalMarkerSet::from_goals(&[(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(set.markers.len(), 2);
        assert_eq!(set.markers[0].color_rgb, (0.0, 1.0, 0.0));
        assert_eq!(set.markers[1].color_rgb, (1.0, 0.0, 0.0));
        assert_eq!(set.markers[1].label, "goal_1");
    }
}
