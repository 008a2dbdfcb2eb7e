//! Conversions from packed BGL field encodings to plain values.

use chrono::{DateTime, Utc};

const LON_DIVISOR: f64 = 3.0 * 0x1000_0000 as f64;
const LAT_DIVISOR: f64 = 2.0 * 0x1000_0000 as f64;

/// Seconds between 1601-01-01 and the Unix epoch.
const FILETIME_EPOCH_OFFSET: i64 = 11_644_473_600;

// ── Coordinates ───────────────────────────────────────────────────────────────

pub fn lon_x(raw: u32) -> f64 {
    f64::from(raw) * 360.0 / LON_DIVISOR - 180.0
}

pub fn lat_y(raw: u32) -> f64 {
    90.0 - f64::from(raw) * 180.0 / LAT_DIVISOR
}

pub fn lon_to_raw(lon: f64) -> u32 {
    ((lon + 180.0) * LON_DIVISOR / 360.0).round() as u32
}

pub fn lat_to_raw(lat: f64) -> u32 {
    ((90.0 - lat) * LAT_DIVISOR / 180.0).round() as u32
}

/// Altitude fields are stored in millimeters.
pub fn altitude_meter(raw: i32) -> f64 {
    f64::from(raw) / 1000.0
}

/// BGL stores east variation as `360 - value` and west as positive.
pub fn adjust_magvar(magvar: f32) -> f32 {
    if magvar > 180.0 {
        360.0 - magvar
    } else {
        -magvar
    }
}

// ── Packed identifiers ────────────────────────────────────────────────────────

fn decode_char(code: u32) -> char {
    match code {
        2..=11  => char::from(b'0' + (code - 2) as u8),
        12..=37 => char::from(b'A' + (code - 12) as u8),
        _       => ' ',
    }
}

fn encode_char(c: char) -> u32 {
    match c {
        '0'..='9' => c as u32 - '0' as u32 + 2,
        'A'..='Z' => c as u32 - 'A' as u32 + 12,
        'a'..='z' => c as u32 - 'a' as u32 + 12,
        _         => 0,
    }
}

/// Decode a base-38 packed ident. Most fields keep five flag bits below the
/// ident and need a shift; region and airport words do not.
pub fn int_to_icao(packed: u32, no_shift: bool) -> String {
    let mut value = if no_shift { packed } else { packed >> 5 };
    let mut out = Vec::new();
    if value > 37 {
        while value > 37 {
            let coded = value % 38;
            out.push(decode_char(coded));
            value = (value - coded) / 38;
            if value < 38 {
                out.push(decode_char(value));
            }
        }
    } else {
        out.push(decode_char(value));
    }
    out.iter().rev().collect::<String>().trim().to_string()
}

/// Inverse of [`int_to_icao`] with `no_shift = true`.
pub fn icao_to_int(ident: &str) -> u32 {
    ident.chars().fold(0u32, |acc, c| acc.wrapping_mul(38).wrapping_add(encode_char(c)))
}

/// Region is in the low 11 bits, the airport ident above.
pub fn region_and_airport(packed: u32) -> (String, String) {
    (int_to_icao(packed & 0x7ff, true), int_to_icao(packed >> 11, true))
}

pub fn pack_region_and_airport(region: &str, airport: &str) -> u32 {
    (icao_to_int(region) & 0x7ff) | (icao_to_int(airport) << 11)
}

// ── Runway names ──────────────────────────────────────────────────────────────

pub fn designator_to_str(designator: u8) -> &'static str {
    match designator {
        1 => "L",
        2 => "R",
        3 => "C",
        4 => "W",
        5 => "A",
        6 => "B",
        _ => "",
    }
}

/// Runway number 1-36 plus compass names for helipads and water lanes.
pub fn runway_to_str(number: u8, designator: u8) -> String {
    let base = match number {
        37 => "N".to_string(),
        38 => "NE".to_string(),
        39 => "E".to_string(),
        40 => "SE".to_string(),
        41 => "S".to_string(),
        42 => "SW".to_string(),
        43 => "W".to_string(),
        44 => "NW".to_string(),
        n  => format!("{n:02}"),
    };
    format!("{base}{}", designator_to_str(designator))
}

// ── Timestamps ────────────────────────────────────────────────────────────────

/// Windows FILETIME (100 ns ticks since 1601) to UTC.
pub fn filetime(low: u32, high: u32) -> Option<DateTime<Utc>> {
    let ticks = (u64::from(high) << 32) | u64::from(low);
    let secs = (ticks / 10_000_000) as i64 - FILETIME_EPOCH_OFFSET;
    let nanos = ((ticks % 10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}
