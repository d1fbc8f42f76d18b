//! Latitude/longitude text codecs.
//!
//! Two representations are supported:
//! - uncompressed `DDMM.mmH` (latitude) and `DDDMM.mmH` (longitude), accurate
//!   to a hundredth of a minute
//! - compressed four-digit base-91 values scaled over the axis range

use std::fmt;

use crate::base91;
use crate::error::{CodecError, Result};

/// Base-91 scale for compressed latitude: 91^4 spread over 180 degrees.
pub const LATITUDE_SCALE: f64 = 380_926.0;

/// Base-91 scale for compressed longitude: 91^4 spread over 360 degrees.
pub const LONGITUDE_SCALE: f64 = 190_463.0;

/// Width of a compressed coordinate in base-91 digits.
pub const COMPRESSED_WIDTH: usize = 4;

// Slack, in hundredths of a minute, absorbing binary float error before
// truncation. Without it 49.058333.. (decoded "4903.50N") encodes as 4903.49.
const TRUNCATION_SLACK: f64 = 1e-6;

/// Which axis a coordinate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Largest absolute value on this axis.
    pub fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    /// Zero-padded width of the degrees field.
    pub fn degree_width(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    /// Hemisphere letter for a value with the given sign.
    pub fn hemisphere(self, negative: bool) -> char {
        match (self, negative) {
            (Axis::Latitude, false) => 'N',
            (Axis::Latitude, true) => 'S',
            (Axis::Longitude, false) => 'E',
            (Axis::Longitude, true) => 'W',
        }
    }

    fn check(self, value: f64) -> Result<()> {
        if value.is_finite() && value.abs() <= self.limit() {
            Ok(())
        } else {
            Err(CodecError::CoordinateOutOfRange {
                value,
                limit: self.limit(),
            })
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Decode `DDMM.mmH` / `DDDMM.mmH` into signed decimal degrees.
///
/// `S` and `W` hemispheres are negative.
pub fn decode(text: &str) -> Result<f64> {
    let invalid = |reason| CodecError::InvalidCoordinate {
        text: text.to_string(),
        reason,
    };

    let mut chars = text.chars();
    let hemisphere = chars.next_back().ok_or_else(|| invalid("empty"))?;
    let negative = match hemisphere {
        'N' | 'E' => false,
        'S' | 'W' => true,
        _ => return Err(invalid("unknown hemisphere")),
    };

    let body = chars.as_str();
    if !body.is_ascii() {
        return Err(invalid("not ASCII"));
    }
    let (whole, fraction) = body
        .split_once('.')
        .ok_or_else(|| invalid("missing decimal point"))?;
    if whole.len() < 3 {
        return Err(invalid("degrees and minutes too short"));
    }
    if fraction.len() != 2 {
        return Err(invalid("expected two fractional digits"));
    }

    let (degrees, minutes) = whole.split_at(whole.len() - 2);
    let degrees = parse_digits(degrees).ok_or_else(|| invalid("non-digit degrees"))?;
    let minutes = parse_digits(minutes).ok_or_else(|| invalid("non-digit minutes"))?;
    let hundredths = parse_digits(fraction).ok_or_else(|| invalid("non-digit fraction"))?;

    let value = degrees as f64 + (minutes as f64 + hundredths as f64 / 100.0) / 60.0;
    Ok(if negative { -value } else { value })
}

/// Encode decimal degrees as `DDMM.mmH` (latitude) or `DDDMM.mmH` (longitude).
///
/// Minutes are truncated toward zero to the hundredth, never rounded.
pub fn encode(value: f64, axis: Axis) -> Result<String> {
    axis.check(value)?;

    let magnitude = value.abs();
    let mut degrees = magnitude.trunc() as u32;
    let hundredths = ((magnitude - degrees as f64) * 6000.0 + TRUNCATION_SLACK).trunc() as u32;
    let mut minutes = hundredths / 100;
    if minutes >= 60 {
        degrees += 1;
        minutes -= 60;
    }

    Ok(format!(
        "{degrees:0dw$}{minutes:02}.{:02}{}",
        hundredths % 100,
        axis.hemisphere(value < 0.0),
        dw = axis.degree_width(),
    ))
}

/// Compress a latitude into four base-91 digits.
pub fn compress_latitude(value: f64) -> Result<String> {
    Axis::Latitude.check(value)?;
    let scaled = (LATITUDE_SCALE * (90.0 - value)).round() as u64;
    Ok(base91::encode_padded(scaled, COMPRESSED_WIDTH))
}

/// Inverse of [`compress_latitude`].
pub fn decompress_latitude(code: &str) -> Result<f64> {
    Ok(90.0 - base91::decode(code)? as f64 / LATITUDE_SCALE)
}

/// Compress a longitude into four base-91 digits.
pub fn compress_longitude(value: f64) -> Result<String> {
    Axis::Longitude.check(value)?;
    let scaled = (LONGITUDE_SCALE * (180.0 + value)).round() as u64;
    Ok(base91::encode_padded(scaled, COMPRESSED_WIDTH))
}

/// Inverse of [`compress_longitude`].
pub fn decompress_longitude(code: &str) -> Result<f64> {
    Ok(-180.0 + base91::decode(code)? as f64 / LONGITUDE_SCALE)
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
