use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use aprsis_session::{connect, Event, SessionConfig, SessionError};
use aprsis_transport::{AprsStream, ServerAddr};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_invalid, print_packet, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let config = session_config(&args)?;
    let mut session = connect(config).map_err(|err| session_error("connect failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    let handle = session
        .shutdown_handle()
        .map_err(|err| session_error("connect failed", err))?;
    install_ctrlc_handler(running.clone(), handle)?;

    let mut printed = 0usize;

    loop {
        let event = match session.next_event() {
            Ok(event) => event,
            Err(SessionError::Disconnected) if !running.load(Ordering::SeqCst) => {
                return Ok(SUCCESS);
            }
            Err(err) => return Err(session_error("receive failed", err)),
        };

        match event {
            Event::Packet(decoded) => {
                print_packet(&decoded, format);
                printed = printed.saturating_add(1);

                if let Some(count) = args.count {
                    if printed >= count {
                        return Ok(SUCCESS);
                    }
                }
            }
            Event::Invalid { line, error } => print_invalid(&line, &error, format),
            Event::Banner { .. } | Event::LoggedIn { .. } | Event::Comment(_) => {}
        }
    }
}

fn session_config(args: &ListenArgs) -> CliResult<SessionConfig> {
    let mut server: ServerAddr = args
        .host
        .parse()
        .map_err(|err: String| CliError::new(USAGE, err))?;
    if let Some(port) = args.port {
        server.port = port;
    }

    let mut config = SessionConfig::new(&args.callsign).with_server(server);
    config.passcode = args.passcode.clone();
    config.filter = args.filters.clone();
    config.connect_timeout = parse_duration(&args.timeout)?;
    config.line.read_timeout = args
        .idle_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    Ok(config)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>, handle: AprsStream) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        // Unblocks the pending read; the loop then sees a disconnect.
        let _ = handle.shutdown();
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn args() -> ListenArgs {
        ListenArgs {
            callsign: "N0CALL-1".to_string(),
            passcode: None,
            host: "euro.aprs2.net".to_string(),
            port: None,
            filters: vec!["r/49/-72/50".to_string()],
            count: None,
            timeout: "5s".to_string(),
            idle_timeout: Some("90s".to_string()),
        }
    }

    #[test]
    fn builds_session_config() {
        let config = session_config(&args()).unwrap();
        assert_eq!(config.server.to_string(), "euro.aprs2.net:14580");
        assert_eq!(config.callsign, "N0CALL-1");
        assert_eq!(config.passcode, None);
        assert_eq!(config.filter, vec!["r/49/-72/50"]);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.line.read_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn port_flag_overrides_host_port() {
        let mut a = args();
        a.host = "localhost:10152".to_string();
        a.port = Some(14580);
        assert_eq!(session_config(&a).unwrap().server.port, 14580);
    }

    #[test]
    fn bad_host_is_usage_error() {
        let mut a = args();
        a.host = "host:notaport".to_string();
        assert_eq!(session_config(&a).unwrap_err().code, USAGE);
    }
}
