use std::io::{self, BufRead};

use aprsis_codec::decode_frame;
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_invalid, print_packet, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut invalid = 0usize;

    if args.frames.is_empty() {
        let mut stdin = io::stdin().lock();
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = stdin
                .read_until(b'\n', &mut line)
                .map_err(|err| io_error("stdin read failed", err))?;
            if read == 0 {
                break;
            }
            if !decode_line(trim_line_ending(&line), format) {
                invalid += 1;
            }
        }
    } else {
        for frame in &args.frames {
            if !decode_line(frame.as_bytes(), format) {
                invalid += 1;
            }
        }
    }

    Ok(if invalid > 0 { DATA_INVALID } else { SUCCESS })
}

/// Decode and print one line; false when the line is not a frame.
fn decode_line(line: &[u8], format: OutputFormat) -> bool {
    if line.is_empty() || line[0] == b'#' {
        debug!("skipping empty or server line");
        return true;
    }
    match decode_frame(line.to_vec()) {
        Ok(decoded) => {
            print_packet(&decoded, format);
            true
        }
        Err(err) => {
            print_invalid(line, &err, format);
            false
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
