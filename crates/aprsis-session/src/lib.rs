//! APRS-IS client session.
//!
//! Connects to a server, performs the login exchange, sets filters and turns
//! every received line into an [`Event`]: server notices, decoded packets or
//! lines the codec rejected.

pub mod config;
pub mod connector;
pub mod error;
pub mod login;
pub mod reader;
pub mod session;
pub mod writer;

pub use config::{LineConfig, SessionConfig, DEFAULT_HOST, DEFAULT_MAX_LINE_LENGTH};
pub use connector::connect;
pub use error::{Result, SessionError};
pub use login::{filter_line, login_line, LoginState, ServerLine, RECEIVE_ONLY_PASSCODE};
pub use reader::LineReader;
pub use session::{Event, ServerInfo, Session, SessionState};
pub use writer::{LineWriter, LINE_TERMINATOR};
