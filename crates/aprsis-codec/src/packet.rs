use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{CodecError, DecodeWarning, Result};
use crate::mic_e;
use crate::position::{self, Position, Symbol};
use crate::time;

/// Separates the source address from the destination field.
pub const SOURCE_DELIMITER: u8 = b'>';

/// Separates the destination field from the payload.
pub const PAYLOAD_DELIMITER: u8 = b':';

/// Offsets of the seven-character timestamp in a timestamped position payload.
const TIMESTAMP: std::ops::Range<usize> = 1..8;

/// Coarse packet classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    MicE,
    Position,
    Unknown,
}

impl PacketType {
    pub fn as_str(self) -> &'static str {
        match self {
            PacketType::MicE => "mic-e",
            PacketType::Position => "position",
            PacketType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload layout selected by the first payload byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// `0x1C`, `0x1D`, `` ` `` or `'`.
    MicE,
    /// `!`, `=`, `/` or `@`.
    Position { timestamped: bool, messaging: bool },
    Unknown,
}

impl PayloadKind {
    /// Classify a payload by its first byte (`None` for an empty payload).
    pub fn classify(first: Option<u8>) -> Self {
        match first {
            Some(0x1c | 0x1d | b'`' | b'\'') => PayloadKind::MicE,
            Some(b'/') => PayloadKind::Position {
                timestamped: true,
                messaging: false,
            },
            Some(b'@') => PayloadKind::Position {
                timestamped: true,
                messaging: true,
            },
            Some(b'!') => PayloadKind::Position {
                timestamped: false,
                messaging: false,
            },
            Some(b'=') => PayloadKind::Position {
                timestamped: false,
                messaging: true,
            },
            _ => PayloadKind::Unknown,
        }
    }

    pub fn packet_type(self) -> PacketType {
        match self {
            PayloadKind::MicE => PacketType::MicE,
            PayloadKind::Position { .. } => PacketType::Position,
            PayloadKind::Unknown => PacketType::Unknown,
        }
    }
}

/// Type-specific decoded content.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketData {
    MicE {
        /// Absent when the destination or payload was too short.
        position: Option<Position>,
    },
    Position {
        /// Report time, or the decode-time clock for untimestamped reports.
        timestamp: DateTime<Utc>,
        messaging: bool,
        /// Absent when the position block was malformed.
        position: Option<Position>,
    },
    Unknown,
}

/// A decoded APRS frame.
///
/// The raw fields are slices of the frame the packet was decoded from; the
/// text fields are lossy UTF-8 views of the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    source: String,
    source_raw: Bytes,
    destination: String,
    destination_raw: Bytes,
    payload: String,
    payload_raw: Bytes,
    data: PacketData,
}

/// A packet plus the soft failures met while decoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub packet: Packet,
    pub warnings: Vec<DecodeWarning>,
}

impl Decoded {
    /// True when decoding met no soft failure.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Decode one frame (CR/LF already stripped) against the current clock.
pub fn decode_frame(frame: impl Into<Bytes>) -> Result<Decoded> {
    Packet::decode(frame)
}

impl Packet {
    /// Decode one frame against the current clock.
    pub fn decode(frame: impl Into<Bytes>) -> Result<Decoded> {
        Self::decode_at(frame, Utc::now())
    }

    /// Decode one frame; `now` fills timestamp fields the frame leaves out.
    pub fn decode_at(frame: impl Into<Bytes>, now: DateTime<Utc>) -> Result<Decoded> {
        let frame = frame.into();
        let (source, destination_raw, payload_raw) = split(&frame)?;

        let mut warnings = Vec::new();
        let kind = PayloadKind::classify(payload_raw.first().copied());
        let data = match kind {
            PayloadKind::MicE => {
                let position = match mic_e::decode(&destination_raw, &payload_raw) {
                    Ok(position) => Some(position),
                    Err(warning) => {
                        warnings.push(warning);
                        None
                    }
                };
                PacketData::MicE { position }
            }
            PayloadKind::Position {
                timestamped,
                messaging,
            } => {
                let (timestamp, block) = if timestamped {
                    let end = payload_raw.len().min(TIMESTAMP.end);
                    let token = String::from_utf8_lossy(
                        payload_raw.get(TIMESTAMP.start..end).unwrap_or_default(),
                    );
                    let timestamp = time::decode_at(Some(&token), now).unwrap_or_else(|err| {
                        warnings.push(DecodeWarning::MalformedTimestamp(err.to_string()));
                        now
                    });
                    (timestamp, payload_raw.get(TIMESTAMP.end..).unwrap_or_default())
                } else {
                    (now, &payload_raw[1..])
                };
                let position = match position::decode(block) {
                    Ok(position) => Some(position),
                    Err(err) => {
                        warnings.push(DecodeWarning::MalformedPosition(err.to_string()));
                        None
                    }
                };
                PacketData::Position {
                    timestamp,
                    messaging,
                    position,
                }
            }
            PayloadKind::Unknown => PacketData::Unknown,
        };

        let packet = Packet {
            source: String::from_utf8_lossy(&source).into_owned(),
            source_raw: source,
            destination: String::from_utf8_lossy(&destination_raw).into_owned(),
            payload: String::from_utf8_lossy(&payload_raw).into_owned(),
            destination_raw,
            payload_raw,
            data,
        };
        for warning in &warnings {
            debug!(source = %packet.source, %warning, "soft decode failure");
        }

        Ok(Decoded { packet, warnings })
    }

    /// Assemble `source>destination:payload` and decode it as a new packet.
    pub fn from_parts(source: &str, destination: &[u8], payload: &[u8]) -> Result<Decoded> {
        Self::decode(assemble(source.as_bytes(), destination, payload))
    }

    /// The wire form of this packet, without line terminator.
    pub fn to_frame(&self) -> Bytes {
        assemble(&self.source_raw, &self.destination_raw, &self.payload_raw)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_raw(&self) -> &Bytes {
        &self.source_raw
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn destination_raw(&self) -> &Bytes {
        &self.destination_raw
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn payload_raw(&self) -> &Bytes {
        &self.payload_raw
    }

    pub fn data(&self) -> &PacketData {
        &self.data
    }

    pub fn packet_type(&self) -> PacketType {
        match self.data {
            PacketData::MicE { .. } => PacketType::MicE,
            PacketData::Position { .. } => PacketType::Position,
            PacketData::Unknown => PacketType::Unknown,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match &self.data {
            PacketData::MicE { position } | PacketData::Position { position, .. } => {
                position.as_ref()
            }
            PacketData::Unknown => None,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self.data {
            PacketData::Position { timestamp, .. } => Some(timestamp),
            _ => None,
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        self.position().map(|p| p.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.position().map(|p| p.longitude)
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.position().map(|p| p.symbol)
    }
}

/// Split a frame into source, destination and payload slices.
fn split(frame: &Bytes) -> Result<(Bytes, Bytes, Bytes)> {
    let gt = frame
        .iter()
        .position(|&b| b == SOURCE_DELIMITER)
        .ok_or(CodecError::MissingSourceDelimiter)?;
    let colon = frame[gt + 1..]
        .iter()
        .position(|&b| b == PAYLOAD_DELIMITER)
        .map(|i| gt + 1 + i)
        .ok_or(CodecError::MissingPayloadDelimiter)?;

    Ok((
        frame.slice(..gt),
        frame.slice(gt + 1..colon),
        frame.slice(colon + 1..),
    ))
}

fn assemble(source: &[u8], destination: &[u8], payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(source.len() + destination.len() + payload.len() + 2);
    buf.put_slice(source);
    buf.put_u8(SOURCE_DELIMITER);
    buf.put_slice(destination);
    buf.put_u8(PAYLOAD_DELIMITER);
    buf.put_slice(payload);
    buf.freeze()
}
