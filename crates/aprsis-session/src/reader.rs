use std::io::{ErrorKind, Read};

use aprsis_transport::AprsStream;
use bytes::{Bytes, BytesMut};

use crate::config::LineConfig;
use crate::error::{Result, SessionError};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads LF- or CRLF-terminated lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete lines with
/// the terminator stripped. Line content is returned as raw bytes because
/// Mic-E payloads are not valid UTF-8.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
    // Set after an overlong line; input is dropped up to the next LF.
    discarding: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarding: false,
        }
    }

    /// Read the next complete line (blocking).
    ///
    /// Returns `Err(SessionError::Disconnected)` at EOF; an unterminated
    /// trailing fragment is dropped. An overlong line yields
    /// `LineTooLong` once and the reader resynchronizes on the next line.
    pub fn read_line(&mut self) -> Result<Bytes> {
        loop {
            if let Some(line) = self.take_line()? {
                return Ok(line);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(SessionError::Timeout(
                        self.config.read_timeout.unwrap_or_default(),
                    ));
                }
                Err(err) => return Err(SessionError::Io(err)),
            };

            if read == 0 {
                return Err(SessionError::Disconnected);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    fn take_line(&mut self) -> Result<Option<Bytes>> {
        let max = self.config.max_line_length;
        loop {
            let Some(pos) = self.buf.iter().position(|&b| b == b'\n') else {
                // One spare byte for a CR still waiting on its LF.
                if !self.discarding && self.buf.len() > max + 1 {
                    let len = self.buf.len();
                    self.buf.clear();
                    self.discarding = true;
                    return Err(SessionError::LineTooLong { len, max });
                }
                if self.discarding {
                    self.buf.clear();
                }
                return Ok(None);
            };

            let mut line = self.buf.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > max {
                return Err(SessionError::LineTooLong {
                    len: line.len(),
                    max,
                });
            }
            return Ok(Some(line.freeze()));
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl LineReader<AprsStream> {
    /// Create a line reader for `AprsStream` and apply read timeout from config.
    pub fn with_config_tcp(inner: AprsStream, config: LineConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use super::*;

    fn reader(bytes: &[u8]) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn read_crlf_and_lf_lines() {
        let mut r = reader(b"# aprsc 2.1.19\r\nN0CALL>APRS:>status\n");
        assert_eq!(r.read_line().unwrap().as_ref(), b"# aprsc 2.1.19");
        assert_eq!(r.read_line().unwrap().as_ref(), b"N0CALL>APRS:>status");
        assert!(matches!(r.read_line(), Err(SessionError::Disconnected)));
    }

    #[test]
    fn empty_lines_are_returned() {
        let mut r = reader(b"\r\n\nx\r\n");
        assert!(r.read_line().unwrap().is_empty());
        assert!(r.read_line().unwrap().is_empty());
        assert_eq!(r.read_line().unwrap().as_ref(), b"x");
    }

    #[test]
    fn binary_bytes_survive() {
        let mut r = reader(b"N0CALL>S32U6T:`vEr l\x1c>/]\xb0\r\n");
        assert_eq!(
            r.read_line().unwrap().as_ref(),
            b"N0CALL>S32U6T:`vEr l\x1c>/]\xb0"
        );
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: b"one\r\ntwo\r\n".to_vec(),
            pos: 0,
        };
        let mut r = LineReader::new(byte_reader);
        assert_eq!(r.read_line().unwrap().as_ref(), b"one");
        assert_eq!(r.read_line().unwrap().as_ref(), b"two");
    }

    #[test]
    fn unterminated_tail_is_dropped_at_eof() {
        let mut r = reader(b"complete\r\npartial");
        assert_eq!(r.read_line().unwrap().as_ref(), b"complete");
        assert!(matches!(r.read_line(), Err(SessionError::Disconnected)));
    }

    #[test]
    fn overlong_line_is_skipped() {
        let cfg = LineConfig {
            max_line_length: 8,
            ..LineConfig::default()
        };
        let wire = b"0123456789abcdef0123\r\nok\r\n".to_vec();
        let mut r = LineReader::with_config(Cursor::new(wire), cfg);
        assert!(matches!(
            r.read_line(),
            Err(SessionError::LineTooLong { max: 8, .. })
        ));
        assert_eq!(r.read_line().unwrap().as_ref(), b"ok");
    }

    #[test]
    fn overlong_line_across_reads_is_skipped() {
        let cfg = LineConfig {
            max_line_length: 4,
            ..LineConfig::default()
        };
        let byte_reader = ByteByByteReader {
            bytes: b"abcdefghij\r\nok\r\n".to_vec(),
            pos: 0,
        };
        let mut r = LineReader::with_config(byte_reader, cfg);
        assert!(matches!(r.read_line(), Err(SessionError::LineTooLong { .. })));
        assert_eq!(r.read_line().unwrap().as_ref(), b"ok");
    }

    #[test]
    fn line_at_limit_is_accepted() {
        let cfg = LineConfig {
            max_line_length: 4,
            ..LineConfig::default()
        };
        let byte_reader = ByteByByteReader {
            bytes: b"abcd\r\n".to_vec(),
            pos: 0,
        };
        let mut r = LineReader::with_config(byte_reader, cfg);
        assert_eq!(r.read_line().unwrap().as_ref(), b"abcd");
    }

    #[test]
    fn would_block_maps_to_timeout() {
        let cfg = LineConfig {
            read_timeout: Some(Duration::from_secs(3)),
            ..LineConfig::default()
        };
        let mut r = LineReader::with_config(FailOnce::new(ErrorKind::WouldBlock, b"x\n"), cfg);
        assert!(matches!(
            r.read_line(),
            Err(SessionError::Timeout(d)) if d == Duration::from_secs(3)
        ));
    }

    #[test]
    fn interrupted_read_retries() {
        let mut r = LineReader::new(FailOnce::new(ErrorKind::Interrupted, b"ok\r\n"));
        assert_eq!(r.read_line().unwrap().as_ref(), b"ok");
    }

    #[test]
    fn other_errors_propagate() {
        let mut r = LineReader::new(FailOnce::new(ErrorKind::ConnectionReset, b""));
        assert!(matches!(
            r.read_line(),
            Err(SessionError::Io(e)) if e.kind() == ErrorKind::ConnectionReset
        ));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut r = reader(b"");
        let _ = r.get_ref();
        let _ = r.get_mut();
        assert_eq!(r.config().max_line_length, 512);
        let _inner = r.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct FailOnce {
        kind: Option<ErrorKind>,
        data: Cursor<Vec<u8>>,
    }

    impl FailOnce {
        fn new(kind: ErrorKind, data: &[u8]) -> Self {
            Self {
                kind: Some(kind),
                data: Cursor::new(data.to_vec()),
            }
        }
    }

    impl Read for FailOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.kind.take() {
                Some(kind) => Err(std::io::Error::from(kind)),
                None => self.data.read(buf),
            }
        }
    }
}
