use std::time::Duration;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] aprsis_transport::TransportError),

    /// I/O error while reading or writing lines.
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    #[error("line too long ({len} bytes, max {max})")]
    LineTooLong { len: usize, max: usize },

    /// A line to be sent contains CR or LF.
    #[error("line contains an embedded line break")]
    EmbeddedLineBreak,

    /// The server closed the connection.
    #[error("server disconnected")]
    Disconnected,

    /// The server answered the login with a state other than verified.
    #[error("login rejected: {0}")]
    LoginRejected(String),

    /// No line arrived within the read timeout.
    #[error("no data from server for {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, SessionError>;
