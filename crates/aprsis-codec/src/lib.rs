//! APRS frame codec.
//!
//! Splits an APRS-IS line into source, destination and payload, classifies
//! the payload by its first byte and decodes the position formats:
//! - Mic-E, packed into the destination and payload bytes
//! - ASCII positions (`!`, `=`, `/`, `@`), with or without a timestamp
//!
//! The coordinate, timestamp and base-91 codecs are exposed as independent
//! utilities for the encode direction. Nothing here performs I/O.

pub mod base91;
pub mod coordinate;
pub mod error;
pub mod mic_e;
pub mod packet;
pub mod position;
pub mod time;

pub use coordinate::{
    compress_latitude, compress_longitude, decompress_latitude, decompress_longitude, Axis,
};
pub use error::{CodecError, DecodeWarning, Result};
pub use packet::{decode_frame, Decoded, Packet, PacketData, PacketType, PayloadKind};
pub use position::{Position, PositionReport, Symbol};
pub use time::TimeFormat;
