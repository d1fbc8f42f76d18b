//! Mic-E position decoding.
//!
//! Latitude and three flag bits travel in the six destination address
//! characters; longitude and the symbol are packed into the payload bytes
//! following the type marker. Message bits, speed, course and altitude are
//! not interpreted.

use crate::error::DecodeWarning;
use crate::position::{Position, Symbol};

/// Minimum destination length carrying the latitude digits.
pub const MIN_DESTINATION_LEN: usize = 6;

/// Minimum payload length, type marker included.
pub const MIN_PAYLOAD_LEN: usize = 10;

const DIGIT_MASK: u8 = 0x0F;
const FLAG_MASK: u8 = 0x50;

/// Latitude digits and flags carried by the destination field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestinationFields {
    /// Unsigned latitude in degrees.
    pub latitude: f64,
    /// Flag bit of the 4th character; selects a positive latitude when set.
    pub north: bool,
    /// Flag bit of the 5th character; adds 100 degrees of longitude.
    pub longitude_offset: bool,
    /// Flag bit of the 6th character; clear means east.
    pub east: bool,
}

impl DestinationFields {
    /// Parse the first six destination bytes.
    pub fn parse(destination: &[u8]) -> Result<Self, DecodeWarning> {
        let Some(b) = destination.get(..MIN_DESTINATION_LEN) else {
            return Err(DecodeWarning::InsufficientMicEDestination {
                len: destination.len(),
            });
        };

        let digit = |i: usize| f64::from(b[i] & DIGIT_MASK);
        let degrees = digit(0) * 10.0 + digit(1);
        let minutes = digit(2) * 10.0 + digit(3) + digit(4) * 0.1 + digit(5) * 0.01;

        Ok(Self {
            latitude: degrees + minutes / 60.0,
            north: b[3] & FLAG_MASK == FLAG_MASK,
            longitude_offset: b[4] & FLAG_MASK == FLAG_MASK,
            east: b[5] & FLAG_MASK != FLAG_MASK,
        })
    }

    /// Latitude with its sign applied.
    ///
    /// A set flag on the 4th character yields a positive value. This is the
    /// historical mapping of this decoder and is kept as is.
    pub fn signed_latitude(&self) -> f64 {
        if self.north {
            self.latitude
        } else {
            -self.latitude
        }
    }
}

/// Decode the longitude degrees byte (payload offset 1).
fn longitude_degrees(byte: u8, offset_100: bool) -> i32 {
    let d = i32::from(byte);
    if d >= 118 && offset_100 {
        // 0-9 degrees when the +100 flag is set (APRS 1.0.1, p. 47)
        d - 118
    } else {
        d - 28 + if offset_100 { 100 } else { 0 }
    }
}

/// Decode the longitude minutes byte (payload offset 2).
fn longitude_minutes(byte: u8) -> i32 {
    let m = i32::from(byte);
    if m >= 88 {
        m - 88
    } else {
        m - 28
    }
}

/// Decode a Mic-E position from the raw destination and payload bytes.
///
/// `payload[0]` is the type marker. Short inputs and out-of-range results are
/// reported as warnings, never as hard errors.
pub fn decode(destination: &[u8], payload: &[u8]) -> Result<Position, DecodeWarning> {
    let fields = DestinationFields::parse(destination)?;
    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(DecodeWarning::InsufficientMicEPayload { len: payload.len() });
    }

    let degrees = longitude_degrees(payload[1], fields.longitude_offset);
    let minutes = longitude_minutes(payload[2]);
    let hundredths = i32::from(payload[3]) - 28;

    let magnitude =
        f64::from(degrees) + (f64::from(minutes) + f64::from(hundredths) * 0.01) / 60.0;
    let latitude = fields.signed_latitude();
    let longitude = if fields.east { magnitude } else { -magnitude };

    let symbol = Symbol::new(char::from(payload[8]), char::from(payload[7]));
    Position::new(latitude, longitude, symbol).map_err(|_| DecodeWarning::OutOfRange {
        latitude,
        longitude,
    })
}
