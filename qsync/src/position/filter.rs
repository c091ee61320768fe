//! The resync decision filter.
//!
//! Pure function: given a fix, the last accepted position, and the current
//! time, decide whether the controllers need a resync. The caller owns the
//! accepted position and mutates it only after a fully successful sync.

use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::{debug, warn};

use super::distance::distance_meters;
use super::fix::{AcceptedPosition, PositionFix};
use crate::config::defaults::{DEFAULT_DEVIATION_METERS, DEFAULT_STALENESS_DAYS};
use crate::timezone::{standard_offset_minutes, ZoneResolver};

/// Thresholds that trigger a resync.
#[derive(Debug, Clone)]
pub struct FilterThresholds {
    /// Maximum allowed distance from the last synced position, in meters.
    pub deviation_meters: f64,
    /// Maximum age of the last sync, in days.
    pub staleness_days: i64,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            deviation_meters: DEFAULT_DEVIATION_METERS,
            staleness_days: DEFAULT_STALENESS_DAYS,
        }
    }
}

/// Outcome of filtering one fix.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Nothing to do; the fix is invalid or within thresholds.
    Skip,
    /// Push these settings to every controller.
    Resync(ResyncPlan),
}

/// Everything the command batch needs for one resync.
#[derive(Debug, Clone, PartialEq)]
pub struct ResyncPlan {
    /// Latitude in decimal degrees, one fractional digit.
    pub latitude: f64,
    /// Longitude in decimal degrees, one fractional digit.
    pub longitude: f64,
    /// Standard-time UTC offset in minutes, evaluated at the start of the
    /// current year. The controllers apply daylight-saving on their own.
    pub utc_offset_minutes: i32,
    /// Local calendar date, `MM/DD/YYYY`.
    pub local_date: String,
    /// Local time of day, `HH:MM:SS`.
    pub local_time: String,
}

/// Decide whether `fix` warrants a resync relative to `accepted`.
///
/// A resync is warranted when the fix is valid and either deviates from the
/// accepted position by more than the deviation threshold, or the accepted
/// position is older than the staleness threshold. Fixes in a location with
/// no resolvable timezone are skipped.
pub fn decide(
    fix: &PositionFix,
    accepted: &AcceptedPosition,
    now: DateTime<Utc>,
    resolver: &dyn ZoneResolver,
    thresholds: &FilterThresholds,
) -> Decision {
    if !fix.valid {
        return Decision::Skip;
    }

    let distance = distance_meters(
        accepted.latitude,
        accepted.longitude,
        fix.latitude,
        fix.longitude,
    );
    let stale = accepted.age(now) > Duration::days(thresholds.staleness_days);

    if distance <= thresholds.deviation_meters && !stale {
        debug!(distance_m = distance.round(), "Fix within thresholds, skipping");
        return Decision::Skip;
    }

    let Some(tz) = resolver.resolve(fix.latitude, fix.longitude) else {
        warn!(
            lat = fix.latitude,
            lon = fix.longitude,
            "No timezone for coordinates, skipping resync"
        );
        return Decision::Skip;
    };

    let Some(utc_offset_minutes) = standard_offset_minutes(tz, now.year()) else {
        warn!(%tz, "Could not evaluate standard offset, skipping resync");
        return Decision::Skip;
    };

    let local = now.with_timezone(&tz);
    Decision::Resync(ResyncPlan {
        latitude: fix.latitude,
        longitude: fix.longitude,
        utc_offset_minutes,
        local_date: local.format("%m/%d/%Y").to_string(),
        local_time: local.format("%H:%M:%S").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::FixedZoneResolver;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn fresh_accepted(lat: f64, lon: f64) -> AcceptedPosition {
        AcceptedPosition {
            latitude: lat,
            longitude: lon,
            accepted_at: now(),
        }
    }

    fn resolver() -> FixedZoneResolver {
        FixedZoneResolver(chrono_tz::UTC)
    }

    #[test]
    fn test_invalid_fix_skips() {
        let decision = decide(
            &PositionFix::invalid(),
            &fresh_accepted(40.0, -74.0),
            now(),
            &resolver(),
            &FilterThresholds::default(),
        );
        assert_eq!(decision, Decision::Skip);
    }

    #[test]
    fn test_same_position_fresh_skips() {
        let decision = decide(
            &PositionFix::new(40.0, -74.0),
            &fresh_accepted(40.0, -74.0),
            now(),
            &resolver(),
            &FilterThresholds::default(),
        );
        assert_eq!(decision, Decision::Skip);
    }

    #[test]
    fn test_below_threshold_skips() {
        // ~111 km, below the 160,934 m default threshold.
        let decision = decide(
            &PositionFix::new(41.0, -74.0),
            &fresh_accepted(40.0, -74.0),
            now(),
            &resolver(),
            &FilterThresholds::default(),
        );
        assert_eq!(decision, Decision::Skip);
    }

    #[test]
    fn test_beyond_threshold_resyncs() {
        // ~278 km, above the threshold, regardless of staleness.
        let decision = decide(
            &PositionFix::new(42.5, -74.0),
            &fresh_accepted(40.0, -74.0),
            now(),
            &resolver(),
            &FilterThresholds::default(),
        );
        match decision {
            Decision::Resync(plan) => {
                assert_eq!(plan.latitude, 42.5);
                assert_eq!(plan.longitude, -74.0);
            }
            Decision::Skip => panic!("expected resync"),
        }
    }

    #[test]
    fn test_stale_position_resyncs_without_movement() {
        let accepted = AcceptedPosition {
            latitude: 40.0,
            longitude: -74.0,
            accepted_at: now() - Duration::days(2),
        };
        let decision = decide(
            &PositionFix::new(40.0, -74.0),
            &accepted,
            now(),
            &resolver(),
            &FilterThresholds::default(),
        );
        assert!(matches!(decision, Decision::Resync(_)));
    }

    #[test]
    fn test_sentinel_triggers_first_sync() {
        let accepted = AcceptedPosition::sentinel(now(), 1);
        let decision = decide(
            &PositionFix::new(40.0, -74.0),
            &accepted,
            now(),
            &resolver(),
            &FilterThresholds::default(),
        );
        assert!(matches!(decision, Decision::Resync(_)));
    }

    #[test]
    fn test_plan_carries_localized_clock() {
        let decision = decide(
            &PositionFix::new(40.7, -74.0),
            &AcceptedPosition::sentinel(now(), 1),
            now(),
            &FixedZoneResolver(chrono_tz::America::New_York),
            &FilterThresholds::default(),
        );
        match decision {
            Decision::Resync(plan) => {
                assert_eq!(plan.utc_offset_minutes, -300);
                // 12:00 UTC in June is 08:00 EDT.
                assert_eq!(plan.local_date, "06/15/2024");
                assert_eq!(plan.local_time, "08:00:00");
            }
            Decision::Skip => panic!("expected resync"),
        }
    }

    #[test]
    fn test_unresolvable_zone_skips() {
        struct NoZone;
        impl ZoneResolver for NoZone {
            fn resolve(&self, _: f64, _: f64) -> Option<chrono_tz::Tz> {
                None
            }
        }
        let decision = decide(
            &PositionFix::new(42.5, -74.0),
            &fresh_accepted(40.0, -74.0),
            now(),
            &NoZone,
            &FilterThresholds::default(),
        );
        assert_eq!(decision, Decision::Skip);
    }

    #[test]
    fn test_decide_is_deterministic() {
        let fix = PositionFix::new(42.5, -74.0);
        let accepted = fresh_accepted(40.0, -74.0);
        let a = decide(&fix, &accepted, now(), &resolver(), &FilterThresholds::default());
        let b = decide(&fix, &accepted, now(), &resolver(), &FilterThresholds::default());
        assert_eq!(a, b);
    }
}
