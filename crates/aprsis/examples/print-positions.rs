//! Log in receive-only and print station positions around a point.
//!
//! Run with:
//!   cargo run --example print-positions -- N0CALL r/49.06/-72.03/100

use aprsis::session::{connect, Event, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let callsign = args.next().unwrap_or_else(|| "N0CALL".to_string());
    let filter = args.next().unwrap_or_else(|| "r/49.06/-72.03/100".to_string());

    let session = connect(SessionConfig::new(callsign).with_filter(filter))?;
    eprintln!("Connected to {}", session.config().server);

    for event in session {
        match event? {
            Event::LoggedIn { state, server, .. } => {
                eprintln!("Logged in ({state}) on {}", server.unwrap_or_default());
            }
            Event::Packet(decoded) => {
                let packet = decoded.packet;
                if let Some(pos) = packet.position() {
                    println!(
                        "{:<9} {:>10.5} {:>11.5} {}",
                        packet.source(),
                        pos.latitude,
                        pos.longitude,
                        pos.symbol
                    );
                }
            }
            _ => {}
        }
    }

    eprintln!("Server closed the connection");
    Ok(())
}
