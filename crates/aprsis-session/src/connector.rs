use aprsis_transport::AprsStream;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::reader::LineReader;
use crate::session::Session;
use crate::writer::LineWriter;

/// Connect to the configured server and return a session waiting for the banner.
pub fn connect(config: SessionConfig) -> Result<Session<AprsStream, AprsStream>> {
    let stream = aprsis_transport::connect(&config.server, config.connect_timeout)?;
    let reader_stream = stream.try_clone()?;

    let reader = LineReader::with_config_tcp(reader_stream, config.line.clone())?;
    let writer = LineWriter::with_config_tcp(stream, config.line.clone())?;

    Ok(Session::from_parts(reader, writer, config))
}
