//! TCP transport to an APRS-IS server.
//!
//! This is the lowest layer of aprsis. The session layer reads and writes
//! CRLF-terminated lines over the [`AprsStream`] returned here.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::AprsStream;
pub use tcp::{connect, ServerAddr};
