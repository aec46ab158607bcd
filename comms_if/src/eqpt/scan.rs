//! # Range scan messages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sweep of the robot's range sensor.
///
/// Scans are replaced wholesale on each sensor update, never partially
/// mutated. The default (empty) scan is the "no data yet" sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RangeScan {
    /// The range readings, ordered by beam angle
    pub ranges_m: Vec<f64>,

    /// The angle of the first beam relative to the sensor's forward axis
    pub angle_min_rad: f64,

    /// The angular separation between consecutive beams
    pub angle_increment_rad: f64,

    /// Readings below this range are invalid
    pub range_min_m: f64,

    /// Readings above this range are invalid
    pub range_max_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RangeScan {
    /// True if the scan contains no readings at all.
    pub fn is_empty(&self) -> bool {
        self.ranges_m.is_empty()
    }

    /// Get the angle of the beam at the given index.
    pub fn beam_angle_rad(&self, index: usize) -> f64 {
        self.angle_min_rad + (index as f64) * self.angle_increment_rad
    }

    /// Get the minimum valid range within the forward cone of the sensor.
    ///
    /// Only beams whose angle lies within `±cone_half_angle_rad` of the
    /// sensor's forward axis are considered, and readings outside the
    /// sensor's valid range band are discarded. Returns `None` if no valid
    /// reading exists in the cone, which consumers must treat as "no
    /// information", not as "clear".
    pub fn min_forward_range_m(&self, cone_half_angle_rad: f64) -> Option<f64> {
        let mut min_range_m: Option<f64> = None;

        for (i, range_m) in self.ranges_m.iter().enumerate() {
            if self.beam_angle_rad(i).abs() > cone_half_angle_rad {
                continue;
            }
            if *range_m < self.range_min_m || *range_m > self.range_max_m {
                continue;
            }
            if !range_m.is_finite() {
                continue;
            }

            min_range_m = Some(match min_range_m {
                Some(m) => m.min(*range_m),
                None => *range_m,
            });
        }

        min_range_m
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan_with(ranges_m: Vec<f64>) -> RangeScan {
        let num = ranges_m.len();
        RangeScan {
            ranges_m,
            angle_min_rad: -0.5 * (num.saturating_sub(1) as f64) * 0.1,
            angle_increment_rad: 0.1,
            range_min_m: 0.05,
            range_max_m: 10.0,
        }
    }

    #[test]
    fn test_min_forward_range() {
        let scan = scan_with(vec![2.0, 0.8, 1.5]);
        assert_eq!(scan.min_forward_range_m(1.0), Some(0.8));
    }

    #[test]
    fn test_empty_scan_has_no_range() {
        let scan = RangeScan::default();
        assert!(scan.is_empty());
        assert_eq!(scan.min_forward_range_m(1.0), None);
    }

    #[test]
    fn test_out_of_band_readings_discarded() {
        // First reading below range_min, last above range_max
        let scan = scan_with(vec![0.01, 1.2, 20.0]);
        assert_eq!(scan.min_forward_range_m(1.0), Some(1.2));
    }

    #[test]
    fn test_cone_restriction() {
        // Beams at -0.1, 0.0, +0.1 rad; tight cone sees only the centre one
        let scan = scan_with(vec![0.3, 1.0, 0.2]);
        assert_eq!(scan.min_forward_range_m(0.05), Some(1.0));
    }
}
