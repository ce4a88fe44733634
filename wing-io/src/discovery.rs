//! UDP broadcast discovery
//!
//! Consoles answer a 5-byte `WING?` broadcast on port 2222 with an ASCII
//! announcement:
//!
//! ```text
//! WING,<ip>,<name>,<model>,<serial>,<firmware>
//! ```
//!
//! The scan sends one probe, then polls the socket with a short receive
//! timeout for a bounded window (ten 500 ms polls by default). Responses
//! that do not parse are dropped and logged; the scan keeps going.

use crate::config::DiscoveryOptions;
use crate::error::{Error, Result};
use crate::protocol::constants::{DISCOVERY_PREFIX, DISCOVERY_PROBE, DISCOVERY_TOKENS};
use serde::Serialize;
use std::net::{Ipv4Addr, UdpSocket};
use std::time::Duration;

/// One console's answer to the discovery probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryInfo {
    pub ip: String,
    pub name: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
}

/// Broadcast a probe and collect console announcements.
///
/// With `stop_on_first` set the scan returns as soon as one console
/// answers; otherwise it collects everything received inside the poll
/// window. Socket errors other than the poll timeout abort the scan.
pub fn scan(options: &DiscoveryOptions) -> Result<Vec<DiscoveryInfo>> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.set_broadcast(true)?;
    socket.set_read_timeout(Some(Duration::from_millis(options.poll_interval_ms)))?;

    socket.send_to(DISCOVERY_PROBE, (Ipv4Addr::BROADCAST, options.port))?;
    log::info!("Sent discovery probe to 255.255.255.255:{}", options.port);

    let mut found = Vec::new();
    let mut polls = 0;
    let mut buf = [0u8; 1024];

    while polls < options.max_polls {
        match socket.recv_from(&mut buf) {
            Ok((received, from)) => match parse_response(&buf[..received]) {
                Ok(info) => {
                    log::info!("Discovered console \"{}\" at {}", info.name, info.ip);
                    found.push(info);
                    if options.stop_on_first {
                        break;
                    }
                }
                Err(e) => log::debug!("Dropping datagram from {}: {}", from, e),
            },
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                polls += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    log::info!("Discovery finished: {} console(s)", found.len());
    Ok(found)
}

/// Parse one announcement datagram
fn parse_response(payload: &[u8]) -> Result<DiscoveryInfo> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| Error::DiscoveryParse("payload is not valid UTF-8".to_string()))?;

    let tokens: Vec<&str> = text
        .trim_end_matches(&['\0', '\r', '\n'][..])
        .split(',')
        .collect();
    if tokens.len() != DISCOVERY_TOKENS {
        return Err(Error::DiscoveryParse(format!(
            "expected {} fields, got {}",
            DISCOVERY_TOKENS,
            tokens.len()
        )));
    }
    if tokens[0] != DISCOVERY_PREFIX {
        return Err(Error::DiscoveryParse(format!(
            "unexpected announcement tag {:?}",
            tokens[0]
        )));
    }

    Ok(DiscoveryInfo {
        ip: tokens[1].to_string(),
        name: tokens[2].to_string(),
        model: tokens[3].to_string(),
        serial: tokens[4].to_string(),
        firmware: tokens[5].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_announcement() {
        let info = parse_response(b"WING,10.0.0.5,Board,Wing,SN42,1.2.3").unwrap();
        assert_eq!(
            info,
            DiscoveryInfo {
                ip: "10.0.0.5".to_string(),
                name: "Board".to_string(),
                model: "Wing".to_string(),
                serial: "SN42".to_string(),
                firmware: "1.2.3".to_string(),
            }
        );
    }

    #[test]
    fn tolerates_trailing_terminators() {
        let info = parse_response(b"WING,10.0.0.5,Board,Wing,SN42,1.2.3\0\0").unwrap();
        assert_eq!(info.firmware, "1.2.3");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(matches!(
            parse_response(b"WING,10.0.0.5,Board"),
            Err(Error::DiscoveryParse(_))
        ));
        assert!(matches!(
            parse_response(b"WING,a,b,c,d,e,f"),
            Err(Error::DiscoveryParse(_))
        ));
    }

    #[test]
    fn rejects_wrong_tag() {
        assert!(matches!(
            parse_response(b"PING,10.0.0.5,Board,Wing,SN42,1.2.3"),
            Err(Error::DiscoveryParse(_))
        ));
    }

    #[test]
    fn rejects_binary_noise() {
        assert!(parse_response(&[0xFF, 0xFE, 0x00]).is_err());
    }
}
