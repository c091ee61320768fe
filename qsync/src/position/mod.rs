//! Position handling: fixes, distance, and the resync filter.
//!
//! A [`PositionFix`] is one GPS sample parsed from an inbound NMEA datagram.
//! The filter compares each valid fix against the last [`AcceptedPosition`]
//! and decides whether the controllers need a resync (the receiver moved past
//! the deviation threshold, or the last sync is stale).
//!
//! # Components
//!
//! - `fix` - `PositionFix` and `AcceptedPosition` types
//! - [`nmea`] - NMEA 0183 sentence parsing (RMC/GGA)
//! - `distance` - haversine great-circle distance
//! - `filter` - the pure resync decision function ([`decide`])

mod distance;
mod filter;
mod fix;
pub mod nmea;

pub use distance::distance_meters;
pub use filter::{decide, Decision, FilterThresholds, ResyncPlan};
pub use fix::{AcceptedPosition, PositionFix};
