//! APRS-IS login exchange and server (`#`) lines.
//!
//! After connecting, the server sends a banner (`# <software> <version>`).
//! The client answers with
//! `user <call> pass <passcode> vers <software> <version>` and the server
//! replies `# logresp <call> <state>, server <name>`. Filters are then set
//! with `# filter <expr>...`. Other `#` lines are comments and keepalives.

use std::fmt;

use crate::config::SessionConfig;

/// Passcode sent when none is configured (receive-only login).
pub const RECEIVE_ONLY_PASSCODE: &str = "-1";

/// Build the login line for `config`, terminator excluded.
pub fn login_line(config: &SessionConfig) -> String {
    format!(
        "user {} pass {} vers {} {}",
        config.callsign,
        config.passcode.as_deref().unwrap_or(RECEIVE_ONLY_PASSCODE),
        config.software_name,
        config.software_version
    )
}

/// Build the filter command, or `None` when there is nothing to filter.
pub fn filter_line<S: AsRef<str>>(filters: &[S]) -> Option<String> {
    if filters.is_empty() {
        return None;
    }
    let joined = filters
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    Some(format!("# filter {joined}"))
}

/// Login state reported by a `logresp` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoginState {
    Verified,
    Unverified,
    Other(String),
}

impl LoginState {
    /// Parse the state token; a trailing comma is ignored.
    pub fn parse(token: &str) -> Self {
        match token.trim_end_matches(',') {
            "verified" => LoginState::Verified,
            "unverified" => LoginState::Unverified,
            other => LoginState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LoginState::Verified => "verified",
            LoginState::Unverified => "unverified",
            LoginState::Other(state) => state,
        }
    }

    /// Whether the server accepted the login at all.
    pub fn is_logged_in(&self) -> bool {
        matches!(self, LoginState::Verified | LoginState::Unverified)
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified line starting with `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// `# logresp <call> <state>, server <name>`
    LoginResponse {
        callsign: String,
        state: LoginState,
        server: Option<String>,
    },
    /// `# <software> <version>`
    Banner { software: String, version: String },
    /// Anything else, with the leading `#` and whitespace removed.
    Comment(String),
}

impl ServerLine {
    /// Classify a server line; `None` when it does not start with `#`.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.strip_prefix('#')?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.get(1) == Some(&"logresp") && tokens.len() >= 4 {
            return Some(ServerLine::LoginResponse {
                callsign: tokens[2].to_string(),
                state: LoginState::parse(tokens[3]),
                server: tokens.get(5).map(|s| s.to_string()),
            });
        }
        if tokens.len() == 3 && tokens[0] == "#" {
            return Some(ServerLine::Banner {
                software: tokens[1].to_string(),
                version: tokens[2].to_string(),
            });
        }
        Some(ServerLine::Comment(body.trim().to_string()))
    }
}
