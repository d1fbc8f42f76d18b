use aprsis_codec::coordinate::{self, Axis};
use aprsis_codec::{position, time, Packet, PositionReport, Symbol, TimeFormat};
use chrono::{DateTime, Utc};

use crate::cmd::{AxisArg, EncodeCommand, PositionArgs};
use crate::exit::{codec_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_fields, OutputFormat};

pub fn run(command: EncodeCommand, format: OutputFormat) -> CliResult<i32> {
    let fields = match command {
        EncodeCommand::Coordinate { value, axis } => {
            let axis = match axis {
                AxisArg::Latitude => Axis::Latitude,
                AxisArg::Longitude => Axis::Longitude,
            };
            let text = coordinate::encode(value, axis)
                .map_err(|err| codec_error("encode failed", err))?;
            vec![(axis_name(axis), text)]
        }
        EncodeCommand::Position(args) => encode_position(args)?,
        EncodeCommand::Time { time_format, at } => {
            let at = match at {
                Some(text) => parse_time(&text)?,
                None => Utc::now(),
            };
            vec![("timestamp", time::encode(&at, time_format))]
        }
        EncodeCommand::Compress {
            latitude,
            longitude,
        } => vec![
            (
                "latitude",
                coordinate::compress_latitude(latitude)
                    .map_err(|err| codec_error("compress failed", err))?,
            ),
            (
                "longitude",
                coordinate::compress_longitude(longitude)
                    .map_err(|err| codec_error("compress failed", err))?,
            ),
        ],
        EncodeCommand::Decompress {
            latitude,
            longitude,
        } => vec![
            (
                "latitude",
                coordinate::decompress_latitude(&latitude)
                    .map_err(|err| codec_error("decompress failed", err))?
                    .to_string(),
            ),
            (
                "longitude",
                coordinate::decompress_longitude(&longitude)
                    .map_err(|err| codec_error("decompress failed", err))?
                    .to_string(),
            ),
        ],
    };

    print_fields(&fields, format);
    Ok(SUCCESS)
}

fn encode_position(args: PositionArgs) -> CliResult<Vec<(&'static str, String)>> {
    let symbol = Symbol::new(args.table, args.code);
    let block = position::encode(args.latitude, args.longitude, symbol)
        .map_err(|err| codec_error("encode failed", err))?;

    let mut report = PositionReport::new(args.latitude, args.longitude)
        .with_symbol(symbol)
        .with_messaging(args.messaging)
        .with_comment(args.comment);
    if let Some(format) = args.timestamp {
        if format == TimeFormat::Mdhm {
            return Err(CliError::new(
                USAGE,
                "MDHM timestamps cannot lead a position report",
            ));
        }
        report = report.with_timestamp(Utc::now(), format);
    }
    let payload = report
        .encode_payload()
        .map_err(|err| codec_error("encode failed", err))?;

    let frame = match args.source {
        Some(source) => {
            let decoded =
                Packet::from_parts(&source, args.destination.as_bytes(), payload.as_bytes())
                    .map_err(|err| codec_error("frame assembly failed", err))?;
            Some(String::from_utf8_lossy(&decoded.packet.to_frame()).into_owned())
        }
        None => None,
    };

    let mut fields = vec![("position", block), ("payload", payload)];
    if let Some(frame) = frame {
        fields.push(("frame", frame));
    }
    Ok(fields)
}

fn parse_time(text: &str) -> CliResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|err| CliError::new(USAGE, format!("invalid --at time '{text}': {err}")))
}

fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::Latitude => "latitude",
        Axis::Longitude => "longitude",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let t = parse_time("2024-03-09T23:45:00Z").unwrap();
        assert_eq!(time::encode(&t, TimeFormat::Dhmz), "092345z");
        let offset = parse_time("2024-03-10T01:45:00+02:00").unwrap();
        assert_eq!(offset, t);
        assert_eq!(parse_time("yesterday").unwrap_err().code, USAGE);
    }

    #[test]
    fn position_fields_with_frame() {
        let args = PositionArgs {
            latitude: 49.5,
            longitude: -72.75,
            table: '/',
            code: '>',
            messaging: true,
            timestamp: None,
            comment: "mobile".to_string(),
            source: Some("N0CALL".to_string()),
            destination: "APRS".to_string(),
        };
        let fields = encode_position(args).unwrap();
        assert_eq!(
            fields,
            vec![
                ("position", "4930.00N/07245.00W>".to_string()),
                ("payload", "=4930.00N/07245.00W>mobile".to_string()),
                ("frame", "N0CALL>APRS:=4930.00N/07245.00W>mobile".to_string()),
            ]
        );
    }

    #[test]
    fn position_rejects_mdhm() {
        let args = PositionArgs {
            latitude: 1.0,
            longitude: 2.0,
            table: '/',
            code: '-',
            messaging: false,
            timestamp: Some(TimeFormat::Mdhm),
            comment: String::new(),
            source: None,
            destination: "APRS".to_string(),
        };
        assert_eq!(encode_position(args).unwrap_err().code, USAGE);
    }
}
