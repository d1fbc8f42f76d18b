use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames given as arguments, or one per stdin line.
    Decode(DecodeArgs),
    /// Encode coordinates, positions and timestamps.
    #[command(subcommand)]
    Encode(EncodeCommand),
    /// Connect to an APRS-IS server and print decoded packets.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(command) => encode::run(command, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frames to decode (`SOURCE>DEST:PAYLOAD`). Reads stdin when omitted.
    pub frames: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AxisArg {
    Latitude,
    Longitude,
}

#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// Encode decimal degrees as DDMM.mmH / DDDMM.mmH.
    Coordinate {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        #[arg(long, value_enum, default_value = "latitude")]
        axis: AxisArg,
    },
    /// Encode a position report payload.
    Position(PositionArgs),
    /// Encode a timestamp token.
    Time {
        /// HMS, MDHM, DHML or DHMZ.
        #[arg(long = "time-format", value_name = "FORMAT", default_value = "DHMZ")]
        time_format: aprsis_codec::TimeFormat,
        /// RFC 3339 time to encode. Default: now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Compress latitude and longitude to base-91.
    Compress {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Decompress four-character base-91 latitude and longitude.
    Decompress { latitude: String, longitude: String },
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,
    /// Symbol table identifier.
    #[arg(long, default_value = "/")]
    pub table: char,
    /// Symbol code.
    #[arg(long, default_value = "-")]
    pub code: char,
    /// Mark the station as message-capable.
    #[arg(long)]
    pub messaging: bool,
    /// Prefix a timestamp in this format (HMS, DHML or DHMZ).
    #[arg(long)]
    pub timestamp: Option<aprsis_codec::TimeFormat>,
    /// Free-text comment appended after the position.
    #[arg(long, default_value = "")]
    pub comment: String,
    /// Also print the complete frame from this source callsign.
    #[arg(long)]
    pub source: Option<String>,
    /// Destination used with --source.
    #[arg(long, default_value = "APRS")]
    pub destination: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Login callsign.
    #[arg(long, env = "APRSIS_CALLSIGN")]
    pub callsign: String,
    /// Passcode; omit for a receive-only login.
    #[arg(long, env = "APRSIS_PASSCODE", hide_env_values = true)]
    pub passcode: Option<String>,
    /// Server host, optionally with `:port`.
    #[arg(long, default_value = aprsis_session::DEFAULT_HOST)]
    pub host: String,
    /// Server port when --host has none.
    #[arg(long)]
    pub port: Option<u16>,
    /// Filter expression (repeatable), e.g. r/49/-72/50.
    #[arg(long = "filter", value_name = "EXPR")]
    pub filters: Vec<String>,
    /// Exit after printing N packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Connection timeout (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
    /// Give up when the server is silent this long (e.g. 90s).
    #[arg(long)]
    pub idle_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
