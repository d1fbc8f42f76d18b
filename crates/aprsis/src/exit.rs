use std::fmt;
use std::io;

use aprsis_codec::CodecError;
use aprsis_session::SessionError;
use aprsis_transport::TransportError;

// Exit codes: sysexits-style usage (64) and timeout (124) values.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { ref source, .. }
            if source.kind() == io::ErrorKind::TimedOut =>
        {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Io(err) => io_error(context, err),
        SessionError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        SessionError::LineTooLong { .. } | SessionError::EmbeddedLineBreak => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SessionError::Disconnected | SessionError::LoginRejected(_) => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn maps_session_errors() {
        assert_eq!(
            session_error("x", SessionError::Timeout(Duration::from_secs(1))).code,
            TIMEOUT
        );
        assert_eq!(
            session_error("x", SessionError::LoginRejected("denied".into())).code,
            FAILURE
        );
        let refused = TransportError::Connect {
            addr: "127.0.0.1:1".into(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(session_error("x", refused.into()).code, TRANSPORT_ERROR);
    }

    #[test]
    fn connect_timeout_maps_to_124() {
        let err = TransportError::Connect {
            addr: "192.0.2.1:14580".into(),
            source: io::Error::from(io::ErrorKind::TimedOut),
        };
        let cli = transport_error("connect failed", err);
        assert_eq!(cli.code, TIMEOUT);
        assert!(cli.message.starts_with("connect failed: "));
    }

    #[test]
    fn codec_errors_are_data_invalid() {
        assert_eq!(
            codec_error("decode", CodecError::MissingSourceDelimiter).code,
            DATA_INVALID
        );
    }
}
