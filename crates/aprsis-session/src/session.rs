use std::io::{Read, Write};

use aprsis_codec::{decode_frame, CodecError, Decoded, Packet};
use aprsis_transport::AprsStream;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::login::{filter_line, login_line, LoginState, ServerLine};
use crate::reader::LineReader;
use crate::writer::LineWriter;

/// Where a session is in the login exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, waiting for the server banner.
    Connected,
    /// Login line sent, waiting for `logresp`.
    LoggingIn,
    /// The server accepted the login.
    LoggedIn(LoginState),
    Disconnected,
}

/// What the server has told us about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub software: Option<String>,
    pub version: Option<String>,
    /// Server name from the login response.
    pub name: Option<String>,
}

/// One line received from the server, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Server banner; the login line has been sent in reply.
    Banner { software: String, version: String },
    /// Login response; filters, if configured, have been sent.
    LoggedIn {
        callsign: String,
        state: LoginState,
        server: Option<String>,
    },
    /// Any other `#` line (keepalives, notices).
    Comment(String),
    /// A decoded packet, possibly carrying soft warnings.
    Packet(Decoded),
    /// A line the codec could not split into source, destination and payload.
    Invalid { line: Bytes, error: CodecError },
}

/// A client session over a line reader and writer.
///
/// The session answers the server banner with the login line and sends the
/// configured filter once logged in; everything else is surfaced as an
/// [`Event`].
pub struct Session<R, W> {
    reader: LineReader<R>,
    writer: LineWriter<W>,
    config: SessionConfig,
    state: SessionState,
    server: ServerInfo,
}

impl<R: Read, W: Write> Session<R, W> {
    /// Build a session over an already connected reader and writer.
    pub fn from_parts(reader: LineReader<R>, writer: LineWriter<W>, config: SessionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
            state: SessionState::Connected,
            server: ServerInfo::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send the login line now, without waiting for the banner.
    pub fn login(&mut self) -> Result<()> {
        info!(callsign = %self.config.callsign, "sending login");
        self.writer.send_line(login_line(&self.config).as_bytes())?;
        self.state = SessionState::LoggingIn;
        Ok(())
    }

    /// Replace the server-side filter.
    pub fn set_filter<S: AsRef<str>>(&mut self, filters: &[S]) -> Result<()> {
        if let Some(line) = filter_line(filters) {
            info!(filter = %line, "setting filter");
            self.writer.send_line(line.as_bytes())?;
        }
        Ok(())
    }

    /// Send a packet to the server.
    ///
    /// Servers drop packets from unverified logins; that is logged, not
    /// refused here.
    pub fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        if self.state != SessionState::LoggedIn(LoginState::Verified) {
            warn!(state = ?self.state, "sending packet without a verified login");
        }
        self.writer.send_line(&packet.to_frame())
    }

    /// Block until the next non-empty line and classify it.
    ///
    /// Returns `Err(SessionError::Disconnected)` once the server closes the
    /// connection.
    pub fn next_event(&mut self) -> Result<Event> {
        loop {
            let line = match self.reader.read_line() {
                Ok(line) => line,
                Err(SessionError::Disconnected) => {
                    if self.state != SessionState::Disconnected {
                        info!("server disconnected");
                        self.state = SessionState::Disconnected;
                    }
                    return Err(SessionError::Disconnected);
                }
                Err(err) => return Err(err),
            };
            if line.is_empty() {
                continue;
            }

            if line[0] == b'#' {
                if let Some(server_line) = ServerLine::parse(&String::from_utf8_lossy(&line)) {
                    return self.handle_server_line(server_line);
                }
            }

            return Ok(match decode_frame(line.clone()) {
                Ok(decoded) => {
                    for warning in &decoded.warnings {
                        warn!(source = decoded.packet.source(), %warning, "partially decoded packet");
                    }
                    Event::Packet(decoded)
                }
                Err(error) => {
                    warn!(%error, "undecodable line");
                    Event::Invalid { line, error }
                }
            });
        }
    }

    fn handle_server_line(&mut self, line: ServerLine) -> Result<Event> {
        match line {
            ServerLine::Banner { software, version } => {
                info!(%software, %version, "server banner");
                self.server.software = Some(software.clone());
                self.server.version = Some(version.clone());
                if self.state == SessionState::Connected {
                    self.login()?;
                }
                Ok(Event::Banner { software, version })
            }
            ServerLine::LoginResponse {
                callsign,
                state,
                server,
            } => {
                info!(%callsign, %state, server = ?server, "login response");
                self.server.name = server.clone();

                let rejected = !state.is_logged_in()
                    || (self.config.require_verified && state != LoginState::Verified);
                if rejected {
                    return Err(SessionError::LoginRejected(state.to_string()));
                }

                self.state = SessionState::LoggedIn(state.clone());
                if !self.config.filter.is_empty() {
                    let filters = self.config.filter.clone();
                    self.set_filter(&filters)?;
                }
                Ok(Event::LoggedIn {
                    callsign,
                    state,
                    server,
                })
            }
            ServerLine::Comment(text) => {
                debug!(%text, "server comment");
                Ok(Event::Comment(text))
            }
        }
    }

    /// Consume the session and return its reader and writer.
    pub fn into_parts(self) -> (LineReader<R>, LineWriter<W>) {
        (self.reader, self.writer)
    }
}

impl Session<AprsStream, AprsStream> {
    /// A handle on the connection whose `shutdown` unblocks a pending
    /// [`Session::next_event`] from another thread.
    pub fn shutdown_handle(&self) -> Result<AprsStream> {
        Ok(self.writer.get_ref().try_clone()?)
    }
}

/// Iterates events until the server disconnects.
impl<R: Read, W: Write> Iterator for Session<R, W> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Err(SessionError::Disconnected) => None,
            other => Some(other),
        }
    }
}
