use std::io::{IsTerminal, Write};

use aprsis_codec::{CodecError, Decoded, PacketData};
use chrono::SecondsFormat;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    source: &'a str,
    destination: &'a str,
    #[serde(rename = "type")]
    packet_type: &'static str,
    payload: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    messaging: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl<'a> PacketOutput<'a> {
    fn new(decoded: &'a Decoded) -> Self {
        let packet = &decoded.packet;
        let position = packet.position();
        let messaging = match packet.data() {
            PacketData::Position { messaging, .. } => Some(*messaging),
            _ => None,
        };
        Self {
            source: packet.source(),
            destination: packet.destination(),
            packet_type: packet.packet_type().as_str(),
            payload: packet.payload(),
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
            symbol: position.map(|p| p.symbol.to_string()),
            timestamp: packet
                .timestamp()
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            messaging,
            warnings: decoded.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Serialize)]
struct InvalidOutput<'a> {
    error: String,
    line: &'a str,
}

pub fn print_packet(decoded: &Decoded, format: OutputFormat) {
    let out = PacketOutput::new(decoded);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SOURCE", "DESTINATION", "TYPE", "LAT", "LON", "SYMBOL", "TIME"])
                .add_row(vec![
                    out.source.to_string(),
                    out.destination.to_string(),
                    out.packet_type.to_string(),
                    optional_coordinate(out.latitude),
                    optional_coordinate(out.longitude),
                    out.symbol.clone().unwrap_or_default(),
                    out.timestamp.clone().unwrap_or_default(),
                ]);
            println!("{table}");
            for warning in &out.warnings {
                println!("warning: {warning}");
            }
        }
        OutputFormat::Pretty => {
            let mut line = format!("{} > {} [{}]", out.source, out.destination, out.packet_type);
            if let (Some(lat), Some(lon)) = (out.latitude, out.longitude) {
                line.push_str(&format!(" lat={lat:.5} lon={lon:.5}"));
            }
            if let Some(symbol) = &out.symbol {
                line.push_str(&format!(" symbol={symbol}"));
            }
            if let Some(timestamp) = &out.timestamp {
                line.push_str(&format!(" time={timestamp}"));
            }
            for warning in &out.warnings {
                line.push_str(&format!(" warning=\"{warning}\""));
            }
            println!("{line}");
        }
        OutputFormat::Raw => {
            let mut frame = decoded.packet.to_frame().to_vec();
            frame.push(b'\n');
            print_raw(&frame);
        }
    }
}

pub fn print_invalid(line: &[u8], error: &CodecError, format: OutputFormat) {
    let text = String::from_utf8_lossy(line);
    match format {
        OutputFormat::Json => print_json(&InvalidOutput {
            error: error.to_string(),
            line: &text,
        }),
        _ => eprintln!("invalid frame ({error}): {text}"),
    }
}

/// Print named values, e.g. the result of an encode command.
pub fn print_fields(fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|(key, value)| (key.to_string(), serde_json::Value::from(value.as_str())))
                .collect();
            print_json(&map);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in fields {
                table.add_row(vec![key.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let parts: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("{}", parts.join(" "));
        }
        OutputFormat::Raw => {
            let values: Vec<&str> = fields.iter().map(|(_, v)| v.as_str()).collect();
            println!("{}", values.join(" "));
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn optional_coordinate(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.5}")).unwrap_or_default()
}
