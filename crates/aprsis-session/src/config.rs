use std::fmt;
use std::time::Duration;

use aprsis_transport::ServerAddr;

/// Default maximum line length in bytes, terminator excluded.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 512;

/// Default APRS-IS server.
pub const DEFAULT_HOST: &str = "noam.aprs2.net";

/// Configuration for line reading and writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineConfig {
    /// Maximum line length in bytes, terminator excluded. Default: 512.
    pub max_line_length: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<Duration>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// Everything needed to open and log in an APRS-IS session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Server to connect to.
    pub server: ServerAddr,
    /// Login callsign, with optional SSID.
    pub callsign: String,
    /// Numeric passcode. `None` logs in receive-only (`pass -1`).
    /// Treated as credential material and redacted in debug output.
    pub passcode: Option<String>,
    /// Software name announced in the login line.
    pub software_name: String,
    /// Software version announced in the login line.
    pub software_version: String,
    /// Filter expressions sent after login; empty sends no filter command.
    pub filter: Vec<String>,
    /// Fail the session unless the server reports a verified login.
    pub require_verified: bool,
    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Line I/O limits and socket timeouts.
    pub line: LineConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server: ServerAddr::new(DEFAULT_HOST, ServerAddr::DEFAULT_PORT),
            callsign: "N0CALL".to_string(),
            passcode: None,
            software_name: "aprsis".to_string(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            filter: Vec::new(),
            require_verified: false,
            connect_timeout: Duration::from_secs(30),
            line: LineConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(callsign: impl Into<String>) -> Self {
        Self {
            callsign: callsign.into(),
            ..Self::default()
        }
    }

    pub fn with_server(mut self, server: ServerAddr) -> Self {
        self.server = server;
        self
    }

    pub fn with_passcode(mut self, passcode: impl Into<String>) -> Self {
        self.passcode = Some(passcode.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter.push(filter.into());
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("SessionConfig");
        dbg.field("server", &self.server)
            .field("callsign", &self.callsign);
        if let Some(passcode) = &self.passcode {
            dbg.field(
                "passcode",
                &format_args!("<redacted:{} bytes>", passcode.len()),
            );
        } else {
            dbg.field("passcode", &Option::<String>::None);
        }
        dbg.field("software_name", &self.software_name)
            .field("software_version", &self.software_version)
            .field("filter", &self.filter)
            .field("require_verified", &self.require_verified)
            .field("connect_timeout", &self.connect_timeout)
            .field("line", &self.line)
            .finish()
    }
}
