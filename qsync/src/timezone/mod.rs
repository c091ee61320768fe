//! Coordinate to IANA timezone resolution.
//!
//! The resync filter needs the UTC offset and wall-clock at the receiver's
//! location. Resolution goes through the [`ZoneResolver`] trait so the
//! filter stays deterministic under test; production code uses
//! [`GeoZoneResolver`], backed by the embedded timezone boundary data in
//! `tzf-rs`.

use std::str::FromStr;

use chrono::{Offset, TimeZone};
use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

/// Resolves geographic coordinates to an IANA timezone.
pub trait ZoneResolver {
    /// Resolve a coordinate to its timezone, if one is known.
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<Tz>;
}

/// Production resolver over the embedded timezone boundary dataset.
///
/// Construction parses the dataset and is relatively expensive; build one
/// and reuse it.
pub struct GeoZoneResolver {
    finder: DefaultFinder,
}

impl GeoZoneResolver {
    /// Create a resolver, loading the embedded boundary data.
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for GeoZoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneResolver for GeoZoneResolver {
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<Tz> {
        // tzf-rs takes (lng, lat) order.
        let name = self.finder.get_tz_name(longitude, latitude);
        if name.is_empty() {
            return None;
        }
        Tz::from_str(name).ok()
    }
}

/// Resolver that always answers with one fixed zone. A test seam; the
/// boundary dataset never has to load under test.
pub struct FixedZoneResolver(pub Tz);

impl ZoneResolver for FixedZoneResolver {
    fn resolve(&self, _latitude: f64, _longitude: f64) -> Option<Tz> {
        Some(self.0)
    }
}

/// UTC offset in minutes of `tz` at the start of `year`.
///
/// Evaluating at January 1 yields the standard-time offset in the northern
/// hemisphere, matching what the controllers expect: they apply their own
/// daylight-saving rules on top of it.
pub fn standard_offset_minutes(tz: Tz, year: i32) -> Option<i32> {
    let jan1 = tz.with_ymd_and_hms(year, 1, 1, 0, 0, 0).earliest()?;
    Some(jan1.offset().fix().local_minus_utc() / 60)
}
