//! Core position types.

use chrono::{DateTime, Duration, Utc};

/// One reported GPS position sample.
///
/// Ephemeral; produced per incoming datagram and not retained. Coordinates
/// carry one fractional digit of precision (roughly 11 km of latitude),
/// which is all the controllers need for astronomic clock calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Whether the receiver reported an acquired fix.
    pub valid: bool,
}

impl PositionFix {
    /// Create a valid fix, rounding coordinates to one fractional digit.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_tenth(latitude),
            longitude: round_tenth(longitude),
            valid: true,
        }
    }

    /// Create an invalid fix (no position acquired).
    pub fn invalid() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            valid: false,
        }
    }
}

/// The last position successfully pushed to every controller.
///
/// Owned by the sync orchestrator and mutated only after a fully successful
/// sync across all targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptedPosition {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// When this position was accepted.
    pub accepted_at: DateTime<Utc>,
}

impl AcceptedPosition {
    /// Sentinel starting state: (0, 0) with an already-expired timestamp,
    /// so the very first valid fix always triggers a sync.
    pub fn sentinel(now: DateTime<Utc>, staleness_days: i64) -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            // One extra second past the threshold so age strictly exceeds
            // the staleness window even at construction time.
            accepted_at: now - Duration::days(staleness_days) - Duration::seconds(1),
        }
    }

    /// Age of this position relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.accepted_at
    }
}

/// Round to one fractional digit.
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fix_rounds_to_one_digit() {
        let fix = PositionFix::new(40.7128, -74.0060);
        assert_eq!(fix.latitude, 40.7);
        assert_eq!(fix.longitude, -74.0);
        assert!(fix.valid);
    }

    #[test]
    fn test_invalid_fix() {
        let fix = PositionFix::invalid();
        assert!(!fix.valid);
    }

    #[test]
    fn test_sentinel_is_already_stale() {
        let now = Utc::now();
        let accepted = AcceptedPosition::sentinel(now, 1);
        assert!(accepted.age(now) >= Duration::days(1));
        assert_eq!(accepted.latitude, 0.0);
        assert_eq!(accepted.longitude, 0.0);
    }

    #[test]
    fn test_round_tenth_negative() {
        assert_eq!(round_tenth(-74.06), -74.1);
        assert_eq!(round_tenth(-74.04), -74.0);
    }
}
