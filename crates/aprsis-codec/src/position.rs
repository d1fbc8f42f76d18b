use std::fmt;

use chrono::{DateTime, Utc};

use crate::coordinate::{self, Axis};
use crate::error::{CodecError, Result};
use crate::time::{self, TimeFormat};

/// Length of the uncompressed position block: `lat[8] table[1] lon[9] code[1]`.
pub const BLOCK_LEN: usize = 19;

const LATITUDE: std::ops::Range<usize> = 0..8;
const TABLE: usize = 8;
const LONGITUDE: std::ops::Range<usize> = 9..18;
const CODE: usize = 18;

/// The two-character APRS map symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Table identifier (`/`, `\` or an overlay character).
    pub table: char,
    /// Symbol code within the table.
    pub code: char,
}

impl Symbol {
    pub fn new(table: char, code: char) -> Self {
        Self { table, code }
    }
}

impl Default for Symbol {
    /// Primary table, "dot" symbol.
    fn default() -> Self {
        Self::new('/', '-')
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.table, self.code)
    }
}

/// A decoded station position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub symbol: Symbol,
}

impl Position {
    /// Build a position, rejecting coordinates outside [-90, 90] / [-180, 180].
    pub fn new(latitude: f64, longitude: f64, symbol: Symbol) -> Result<Self> {
        for (value, axis) in [(latitude, Axis::Latitude), (longitude, Axis::Longitude)] {
            if !value.is_finite() || value.abs() > axis.limit() {
                return Err(CodecError::CoordinateOutOfRange {
                    value,
                    limit: axis.limit(),
                });
            }
        }
        Ok(Self {
            latitude,
            longitude,
            symbol,
        })
    }
}

/// Decode a 19-byte uncompressed position block.
///
/// Bytes past the block (comment text) are ignored.
pub fn decode(block: &[u8]) -> Result<Position> {
    if block.len() < BLOCK_LEN {
        return Err(CodecError::ShortPositionBlock {
            len: block.len(),
            need: BLOCK_LEN,
        });
    }

    let latitude = coordinate::decode(ascii_field(&block[LATITUDE])?)?;
    let longitude = coordinate::decode(ascii_field(&block[LONGITUDE])?)?;
    let symbol = Symbol::new(char::from(block[TABLE]), char::from(block[CODE]));
    Position::new(latitude, longitude, symbol)
}

/// Encode a 19-character uncompressed position block.
pub fn encode(latitude: f64, longitude: f64, symbol: Symbol) -> Result<String> {
    let mut out = String::with_capacity(BLOCK_LEN);
    out.push_str(&coordinate::encode(latitude, Axis::Latitude)?);
    out.push(symbol.table);
    out.push_str(&coordinate::encode(longitude, Axis::Longitude)?);
    out.push(symbol.code);
    Ok(out)
}

fn ascii_field(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| CodecError::InvalidCoordinate {
            text: String::from_utf8_lossy(bytes).into_owned(),
            reason: "not ASCII",
        })
}

/// An uncompressed position report ready to be encoded as a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub latitude: f64,
    pub longitude: f64,
    pub symbol: Symbol,
    /// Whether the station accepts APRS messages (`=`/`@` markers).
    pub messaging: bool,
    /// Optional report time; only the seven-character formats are allowed.
    pub timestamp: Option<(DateTime<Utc>, TimeFormat)>,
    pub comment: String,
}

impl PositionReport {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            symbol: Symbol::default(),
            messaging: false,
            timestamp: None,
            comment: String::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn with_messaging(mut self, messaging: bool) -> Self {
        self.messaging = messaging;
        self
    }

    pub fn with_timestamp(mut self, time: DateTime<Utc>, format: TimeFormat) -> Self {
        self.timestamp = Some((time, format));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Data type marker selected by timestamp presence and messaging support.
    pub fn marker(&self) -> char {
        match (self.timestamp.is_some(), self.messaging) {
            (false, false) => '!',
            (false, true) => '=',
            (true, false) => '/',
            (true, true) => '@',
        }
    }

    /// Encode the full payload: marker, optional timestamp, block, comment.
    pub fn encode_payload(&self) -> Result<String> {
        let block = encode(self.latitude, self.longitude, self.symbol)?;
        let mut out = String::with_capacity(1 + 7 + BLOCK_LEN + self.comment.len());
        out.push(self.marker());
        if let Some((at, format)) = &self.timestamp {
            if *format == TimeFormat::Mdhm {
                return Err(CodecError::UnsupportedTimeFormat(*format));
            }
            out.push_str(&time::encode(at, *format));
        }
        out.push_str(&block);
        out.push_str(&self.comment);
        Ok(out)
    }
}
