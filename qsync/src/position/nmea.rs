//! NMEA 0183 sentence parsing.
//!
//! Supports the two sentence types that carry a position and a validity
//! indication:
//!
//! - **RMC** (recommended minimum) - status field `A`/`V`
//! - **GGA** (fix data) - fix quality field, `0` meaning no fix
//!
//! Each inbound UDP datagram is expected to hold exactly one sentence. The
//! optional `*hh` checksum is verified when present; sentences that fail
//! verification or do not parse are rejected.

use tracing::trace;

use super::fix::{round_tenth, PositionFix};

/// Parse one NMEA sentence into a position fix.
///
/// Returns `None` for payloads that are not a recognizable RMC or GGA
/// sentence. A well-formed sentence without an acquired fix parses to an
/// invalid [`PositionFix`], which the resync filter rejects downstream.
pub fn parse_sentence(payload: &[u8]) -> Option<PositionFix> {
    let text = std::str::from_utf8(payload).ok()?;
    let text = text.trim();
    let body = strip_framing(text)?;

    let fields: Vec<&str> = body.split(',').collect();
    let sentence_type = fields.first()?;

    if sentence_type.len() != 5 {
        trace!(sentence_type, "Unexpected NMEA sentence type");
        return None;
    }

    // get() rather than indexing: a multi-byte character straddling the
    // talker/type boundary is garbage, not a panic.
    match sentence_type.get(2..) {
        Some("RMC") => parse_rmc(&fields),
        Some("GGA") => parse_gga(&fields),
        other => {
            trace!(sentence = ?other, "Ignoring NMEA sentence type");
            None
        }
    }
}

/// Strip the leading `$` and trailing `*hh` checksum, verifying the
/// checksum when present.
fn strip_framing(text: &str) -> Option<&str> {
    let body = text.strip_prefix('$')?;

    match body.split_once('*') {
        Some((inner, checksum)) => {
            let expected = u8::from_str_radix(checksum.trim(), 16).ok()?;
            let actual = inner.bytes().fold(0u8, |acc, b| acc ^ b);
            if actual != expected {
                trace!(expected, actual, "NMEA checksum mismatch");
                return None;
            }
            Some(inner)
        }
        None => Some(body),
    }
}

/// Parse an RMC sentence: `xxRMC,time,status,lat,N/S,lon,E/W,...`
fn parse_rmc(fields: &[&str]) -> Option<PositionFix> {
    if fields.len() < 7 {
        return None;
    }

    if fields[2] != "A" {
        return Some(PositionFix::invalid());
    }

    let latitude = parse_coordinate(fields[3], fields[4], 2)?;
    let longitude = parse_coordinate(fields[5], fields[6], 3)?;
    Some(PositionFix::new(latitude, longitude))
}

/// Parse a GGA sentence: `xxGGA,time,lat,N/S,lon,E/W,quality,...`
fn parse_gga(fields: &[&str]) -> Option<PositionFix> {
    if fields.len() < 7 {
        return None;
    }

    let quality: u8 = fields[6].parse().ok()?;
    if quality == 0 {
        return Some(PositionFix::invalid());
    }

    let latitude = parse_coordinate(fields[2], fields[3], 2)?;
    let longitude = parse_coordinate(fields[4], fields[5], 3)?;
    Some(PositionFix::new(latitude, longitude))
}

/// Convert an NMEA `dddmm.mmmm` coordinate and hemisphere into signed
/// decimal degrees, rounded to one fractional digit.
///
/// `degree_digits` is 2 for latitude and 3 for longitude.
fn parse_coordinate(raw: &str, hemisphere: &str, degree_digits: usize) -> Option<f64> {
    if raw.len() <= degree_digits {
        return None;
    }

    let degrees: f64 = raw.get(..degree_digits)?.parse().ok()?;
    let minutes: f64 = raw.get(degree_digits..)?.parse().ok()?;
    if minutes >= 60.0 {
        return None;
    }

    let value = degrees + minutes / 60.0;
    let signed = match hemisphere {
        "N" | "E" => value,
        "S" | "W" => -value,
        _ => return None,
    };

    Some(round_tenth(signed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmc_with_fix() {
        let fix = parse_sentence(
            b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A",
        )
        .expect("should parse");
        assert!(fix.valid);
        assert_eq!(fix.latitude, 48.1);
        assert_eq!(fix.longitude, 11.5);
    }

    #[test]
    fn test_rmc_void_status_is_invalid_fix() {
        let fix = parse_sentence(b"$GPRMC,023042,V,,,,,,,120219,,,N").expect("should parse");
        assert!(!fix.valid);
    }

    #[test]
    fn test_gga_with_fix() {
        let fix = parse_sentence(
            b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47",
        )
        .expect("should parse");
        assert!(fix.valid);
        assert_eq!(fix.latitude, 48.1);
        assert_eq!(fix.longitude, 11.5);
    }

    #[test]
    fn test_gga_no_fix_quality_zero() {
        let fix = parse_sentence(b"$GPGGA,123519,,,,,0,00,,,M,,M,,").expect("should parse");
        assert!(!fix.valid);
    }

    #[test]
    fn test_southern_western_hemispheres() {
        let fix =
            parse_sentence(b"$GPRMC,123519,A,3351.000,S,15112.000,W,0.0,0.0,230394,,").unwrap();
        assert_eq!(fix.latitude, -33.9);
        assert_eq!(fix.longitude, -151.2);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let result = parse_sentence(
            b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*00",
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_sentence(b"not an nmea sentence").is_none());
        assert!(parse_sentence(b"$GPXYZ,1,2,3").is_none());
        assert!(parse_sentence(b"").is_none());
        assert!(parse_sentence(&[0xff, 0xfe, 0x00]).is_none());
    }

    #[test]
    fn test_multibyte_characters_rejected_not_fatal() {
        // UTF-8-valid payloads whose multi-byte characters land on the
        // fixed slice offsets must be rejected like any other garbage.
        let bad_type = "$GéMC,123519,A,4807.038,N,01131.000,E,0.0,0.0,230394,,";
        assert!(parse_sentence(bad_type.as_bytes()).is_none());

        let bad_latitude = "$GPRMC,123519,A,4é07.038,N,01131.000,E,0.0,0.0,230394,,";
        assert!(parse_sentence(bad_latitude.as_bytes()).is_none());

        let bad_longitude = "$GPGGA,123519,4807.038,N,0é131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert!(parse_sentence(bad_longitude.as_bytes()).is_none());
    }

    #[test]
    fn test_other_talker_prefix() {
        // GNSS receivers emit GN-prefixed sentences; only the type matters.
        let fix = parse_sentence(b"$GNRMC,123519,A,4807.038,N,01131.000,E,0.0,0.0,230394,,")
            .expect("should parse");
        assert!(fix.valid);
    }
}
