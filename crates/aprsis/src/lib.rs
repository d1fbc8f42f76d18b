//! APRS-IS packet codec and client.
//!
//! aprsis decodes APRS frames as carried by the APRS-IS network (Mic-E and
//! ASCII position reports, timestamps, base-91 compressed coordinates) and
//! speaks the APRS-IS login protocol.
//!
//! # Crate Structure
//!
//! - [`codec`]: frame splitting, type dispatch and field codecs (no I/O)
//! - [`transport`]: TCP connection to an APRS-IS server
//! - [`session`]: line I/O, login exchange and packet events (behind `session` feature)

/// Re-export codec types.
pub mod codec {
    pub use aprsis_codec::*;
}

/// Re-export transport types.
pub mod transport {
    pub use aprsis_transport::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use aprsis_session::*;
}

pub use aprsis_codec::{decode_frame, CodecError, Decoded, Packet, PacketData, PacketType};
