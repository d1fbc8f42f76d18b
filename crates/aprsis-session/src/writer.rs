use std::io::{ErrorKind, Write};

use aprsis_transport::AprsStream;
use bytes::{BufMut, BytesMut};

use crate::config::LineConfig;
use crate::error::{Result, SessionError};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Line terminator sent to APRS-IS servers.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Writes CRLF-terminated lines to any `Write` stream.
pub struct LineWriter<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line writer with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Send one line; the terminator is appended here.
    pub fn send_line(&mut self, line: &[u8]) -> Result<()> {
        if line.len() > self.config.max_line_length {
            return Err(SessionError::LineTooLong {
                len: line.len(),
                max: self.config.max_line_length,
            });
        }
        if line.iter().any(|&b| b == b'\r' || b == b'\n') {
            return Err(SessionError::EmbeddedLineBreak);
        }

        self.buf.clear();
        self.buf.put_slice(line);
        self.buf.put_slice(LINE_TERMINATOR);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(SessionError::Disconnected),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(self.timeout()),
                Err(err) => return Err(SessionError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(self.timeout()),
                Err(err) => return Err(SessionError::Io(err)),
            }
        }
    }

    // Sockets report an expired write timeout as WouldBlock or TimedOut.
    fn timeout(&self) -> SessionError {
        SessionError::Timeout(self.config.write_timeout.unwrap_or_default())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line writer configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl LineWriter<AprsStream> {
    /// Create a line writer for `AprsStream` and apply write timeout from config.
    pub fn with_config_tcp(inner: AprsStream, config: LineConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::reader::LineReader;

    fn written(writer: LineWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn appends_crlf() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        writer.send_line(b"# filter r/49/-72/50").unwrap();
        writer.send_line(b"N0CALL>APRS:>hi").unwrap();
        assert_eq!(
            written(writer),
            b"# filter r/49/-72/50\r\nN0CALL>APRS:>hi\r\n"
        );
    }

    #[test]
    fn rejects_overlong_line() {
        let cfg = LineConfig {
            max_line_length: 4,
            ..LineConfig::default()
        };
        let mut writer = LineWriter::with_config(Cursor::new(Vec::new()), cfg);
        assert!(matches!(
            writer.send_line(b"oversized"),
            Err(SessionError::LineTooLong { len: 9, max: 4 })
        ));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn rejects_embedded_line_break() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        assert!(matches!(
            writer.send_line(b"user N0CALL\r\nuser OTHER"),
            Err(SessionError::EmbeddedLineBreak)
        ));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = LineWriter::new(sink);
        writer.send_line(b"x").unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn retries_interrupted_write() {
        let mut writer = LineWriter::new(FailFirstWrite {
            kind: Some(ErrorKind::Interrupted),
            data: Vec::new(),
        });
        writer.send_line(b"retry").unwrap();
        assert_eq!(writer.into_inner().data, b"retry\r\n");
    }

    #[test]
    fn write_timeout_is_reported() {
        let cfg = LineConfig {
            write_timeout: Some(Duration::from_secs(2)),
            ..LineConfig::default()
        };
        for kind in [ErrorKind::WouldBlock, ErrorKind::TimedOut] {
            let mut writer = LineWriter::with_config(
                FailFirstWrite {
                    kind: Some(kind),
                    data: Vec::new(),
                },
                cfg.clone(),
            );
            assert!(matches!(
                writer.send_line(b"stalled"),
                Err(SessionError::Timeout(d)) if d == Duration::from_secs(2)
            ));
        }
    }

    #[test]
    fn disconnected_when_write_returns_zero() {
        let mut writer = LineWriter::new(ZeroWriter);
        assert!(matches!(
            writer.send_line(b"x"),
            Err(SessionError::Disconnected)
        ));
    }

    #[test]
    fn written_lines_read_back() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        writer.send_line(b"one").unwrap();
        writer.send_line(b"").unwrap();
        writer.send_line(b"three").unwrap();

        let mut reader = LineReader::new(Cursor::new(written(writer)));
        assert_eq!(reader.read_line().unwrap().as_ref(), b"one");
        assert!(reader.read_line().unwrap().is_empty());
        assert_eq!(reader.read_line().unwrap().as_ref(), b"three");
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailFirstWrite {
        kind: Option<ErrorKind>,
        data: Vec<u8>,
    }

    impl Write for FailFirstWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.kind.take() {
                return Err(std::io::Error::from(kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
