use std::fmt;
use std::net::{TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::AprsStream;

/// Host and port of an APRS-IS server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddr {
    pub host: String,
    pub port: u16,
}

impl ServerAddr {
    /// User-defined filter port of the APRS-IS core and tier-2 servers.
    pub const DEFAULT_PORT: u16 = 14580;

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ServerAddr {
    type Err = String;

    /// Parse `host`, `host:port` or `[v6]:port`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty server address".to_string());
        }
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| format!("unterminated '[' in '{s}'"))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(port)?,
                None if tail.is_empty() => Self::DEFAULT_PORT,
                None => return Err(format!("unexpected '{tail}' after ']'")),
            };
            return Ok(Self::new(host, port));
        }
        match s.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => Ok(Self::new(host, parse_port(port)?)),
            Some(_) => Err(format!("ambiguous IPv6 address '{s}'; use [addr]:port")),
            None => Ok(Self::new(s, Self::DEFAULT_PORT)),
        }
    }
}

fn parse_port(text: &str) -> std::result::Result<u16, String> {
    text.parse().map_err(|_| format!("invalid port '{text}'"))
}

/// Connect to an APRS-IS server (blocking).
///
/// Every resolved address is tried in turn, each bounded by `timeout`; the
/// last failure is returned when none accepts.
pub fn connect(addr: &ServerAddr, timeout: Duration) -> Result<AprsStream> {
    let candidates = (addr.host.as_str(), addr.port)
        .to_socket_addrs()
        .map_err(|e| TransportError::Resolve {
            addr: addr.to_string(),
            source: e,
        })?;

    let mut last_error = None;
    for candidate in candidates {
        debug!(%candidate, "trying server address");
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => {
                // APRS-IS is line-interactive; small writes must not be delayed
                stream.set_nodelay(true)?;
                info!(server = %addr, peer = %candidate, "connected");
                return Ok(AprsStream::from_tcp(stream, candidate));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(TransportError::Connect {
        addr: addr.to_string(),
        source: last_error.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    fn test_connect_read_write() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            server.write_all(b"# aprsc 2.1.19\r\n").unwrap();
            let mut buf = [0u8; 5];
            server.read_exact(&mut buf).unwrap();
            buf
        });

        let addr = ServerAddr::new("127.0.0.1", port);
        let mut client = connect(&addr, Duration::from_secs(5)).unwrap();
        assert_eq!(client.peer_addr().port(), port);

        let mut banner = [0u8; 16];
        client.read_exact(&mut banner).unwrap();
        assert_eq!(&banner, b"# aprsc 2.1.19\r\n");
        client.write_all(b"hello").unwrap();

        assert_eq!(&handle.join().unwrap(), b"hello");
    }

    #[test]
    fn test_clone_shares_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            server.read_to_end(&mut buf).unwrap();
            buf
        });

        let client = connect(&ServerAddr::new("127.0.0.1", port), Duration::from_secs(5)).unwrap();
        let mut writer = client.try_clone().unwrap();
        writer.write_all(b"via clone").unwrap();
        client.shutdown().unwrap();

        assert_eq!(handle.join().unwrap(), b"via clone");
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to get a port that is very likely closed.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let result = connect(&ServerAddr::new("127.0.0.1", port), Duration::from_secs(1));
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn test_parse_server_addr() {
        assert_eq!(
            "rotate.aprs2.net".parse::<ServerAddr>().unwrap(),
            ServerAddr::new("rotate.aprs2.net", 14580)
        );
        assert_eq!(
            "euro.aprs2.net:10152".parse::<ServerAddr>().unwrap(),
            ServerAddr::new("euro.aprs2.net", 10152)
        );
        assert_eq!(
            "[::1]:14580".parse::<ServerAddr>().unwrap(),
            ServerAddr::new("::1", 14580)
        );
        assert!("host:notaport".parse::<ServerAddr>().is_err());
        assert!("::1".parse::<ServerAddr>().is_err());
        assert!("".parse::<ServerAddr>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["noam.aprs2.net:14580", "[::1]:10152"] {
            assert_eq!(text.parse::<ServerAddr>().unwrap().to_string(), text);
        }
    }
}
