//! Chromecast receiver discovery via mDNS.
//!
//! Chromecast devices advertise themselves on the `_googlecast._tcp.local`
//! service. [`discover`] browses that service for a bounded duration and
//! returns every receiver seen, deduplicated by display name: the first
//! advertisement for a name wins and later ones are discarded.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use futures_util::{pin_mut, StreamExt};
use mdns::RecordKind;
use tracing::{debug, warn};

mod error;

pub use error::DiscoveryError;

/// mDNS service type advertised by Chromecast receivers.
pub const SERVICE_NAME: &str = "_googlecast._tcp.local";

/// Cast protocol port, used when an advertisement carries no SRV record.
const DEFAULT_PORT: u16 = 8009;

/// A casting receiver discovered on the local link.
///
/// Identity is the display name. The value is frozen at the moment the
/// first advertisement for that name arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chromecast {
    pub name: String,
    pub host: String,
    pub addr_v4: Option<Ipv4Addr>,
    pub addr_v6: Option<Ipv6Addr>,
    pub port: u16,
}

impl Chromecast {
    /// Printable socket address, preferring IPv4.
    pub fn address(&self) -> String {
        match (self.addr_v4, self.addr_v6) {
            (Some(v4), _) => format!("{}:{}", v4, self.port),
            (None, Some(v6)) => format!("[{}]:{}", v6, self.port),
            (None, None) => format!("{}:{}", self.host, self.port),
        }
    }
}

/// Browse the LAN for Chromecast receivers for exactly `duration`.
///
/// Multicast advertisements only. The browse terminates on the first of:
/// `duration` elapsed, or the underlying browser completing. There is no
/// early exit once a receiver is found, since callers may need all of them.
/// Zero results are a normal outcome, not an error.
pub async fn discover(duration: Duration) -> Result<Vec<Chromecast>, DiscoveryError> {
    debug!("browsing {} for {:?}", SERVICE_NAME, duration);

    // One query at browse start; the re-query interval is past our window.
    let stream = mdns::discover::all(SERVICE_NAME, duration)?.listen();
    pin_mut!(stream);

    let deadline = tokio::time::Instant::now() + duration;
    let mut found: Vec<Chromecast> = Vec::new();

    loop {
        let response = match tokio::time::timeout_at(deadline, stream.next()).await {
            Err(_) => break,   // duration elapsed
            Ok(None) => break, // browser completed
            Ok(Some(response)) => response?,
        };

        if let Some(cast) = chromecast_from_response(&response) {
            remember(&mut found, cast);
        }
    }

    debug!("browse finished with {} receiver(s)", found.len());
    Ok(found)
}

/// Append `cast` unless a receiver with the same name was already seen.
fn remember(found: &mut Vec<Chromecast>, cast: Chromecast) {
    if found.iter().any(|seen| seen.name == cast.name) {
        debug!("duplicate advertisement for {}, keeping the first", cast.name);
        return;
    }
    debug!("discovered {} at {}", cast.name, cast.address());
    found.push(cast);
}

/// Build a [`Chromecast`] from one mDNS response, or `None` when the
/// response carries no usable address.
fn chromecast_from_response(response: &mdns::Response) -> Option<Chromecast> {
    let service_name = response.records().find_map(|record| match record.kind {
        RecordKind::PTR(ref name) => Some(name.clone()),
        _ => None,
    })?;

    let mut addr_v4 = None;
    let mut addr_v6 = None;
    let mut host = None;
    let mut port = None;
    let mut txt: HashMap<String, String> = HashMap::new();

    for record in response.records() {
        match record.kind {
            RecordKind::A(addr) => addr_v4 = addr_v4.or(Some(addr)),
            RecordKind::AAAA(addr) => addr_v6 = addr_v6.or(Some(addr)),
            RecordKind::SRV {
                port: srv_port,
                ref target,
                ..
            } => {
                port = port.or(Some(srv_port));
                host = host.or_else(|| Some(target.clone()));
            }
            RecordKind::TXT(ref data) => txt.extend(parse_txt(data)),
            _ => {}
        }
    }

    if addr_v4.is_none() && addr_v6.is_none() {
        warn!("no address in advertisement for {}", service_name);
        return None;
    }

    Some(Chromecast {
        name: friendly_name(&service_name, &txt),
        host: host.unwrap_or_else(|| service_name.clone()),
        addr_v4,
        addr_v6,
        port: port.unwrap_or(DEFAULT_PORT),
    })
}

/// Split `key=value` TXT entries into pairs; malformed entries are dropped.
fn parse_txt(data: &[String]) -> HashMap<String, String> {
    data.iter()
        .filter_map(|entry| {
            entry
                .split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Display name of a receiver.
///
/// Prefer the `fn` TXT record. Fall back to the service instance name,
/// dropping the service suffix and the 32-hex-character instance id that
/// receivers embed in it.
fn friendly_name(service_name: &str, txt: &HashMap<String, String>) -> String {
    if let Some(name) = txt.get("fn") {
        return name.clone();
    }

    let instance = service_name
        .split("._googlecast._tcp.local")
        .next()
        .unwrap_or_default();
    let name = instance
        .split('-')
        .take_while(|part| part.len() != 32)
        .collect::<Vec<_>>()
        .join("-")
        .trim()
        .to_string();

    if name.is_empty() {
        "Unknown Chromecast".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast(name: &str, last_octet: u8) -> Chromecast {
        Chromecast {
            name: name.to_string(),
            host: format!("{}.local", name.to_lowercase().replace(' ', "-")),
            addr_v4: Some(Ipv4Addr::new(1, 2, 3, last_octet)),
            addr_v6: None,
            port: 8009,
        }
    }

    #[test]
    fn test_friendly_name_prefers_txt_record() {
        let mut txt = HashMap::new();
        txt.insert("fn".to_string(), "Living Room".to_string());
        txt.insert("md".to_string(), "Chromecast Ultra".to_string());

        let name = friendly_name(
            "Living-Room-abcdef0123456789abcdef0123456789._googlecast._tcp.local",
            &txt,
        );
        assert_eq!(name, "Living Room");
    }

    #[test]
    fn test_friendly_name_strips_instance_suffix() {
        let name = friendly_name(
            "Kitchen-abcdef0123456789abcdef0123456789._googlecast._tcp.local",
            &HashMap::new(),
        );
        assert_eq!(name, "Kitchen");
    }

    #[test]
    fn test_friendly_name_falls_back_when_unparseable() {
        let name = friendly_name(
            "abcdef0123456789abcdef0123456789._googlecast._tcp.local",
            &HashMap::new(),
        );
        assert_eq!(name, "Unknown Chromecast");
    }

    #[test]
    fn test_parse_txt_keeps_well_formed_pairs() {
        let txt = parse_txt(&[
            "fn=Living Room".to_string(),
            "md=Chromecast".to_string(),
            "garbage".to_string(),
        ]);
        assert_eq!(txt.get("fn").map(String::as_str), Some("Living Room"));
        assert_eq!(txt.get("md").map(String::as_str), Some("Chromecast"));
        assert_eq!(txt.len(), 2);
    }

    #[test]
    fn test_remember_deduplicates_by_name_first_seen_wins() {
        let mut found = Vec::new();
        remember(&mut found, cast("Living Room", 4));
        remember(&mut found, cast("Kitchen", 5));
        remember(&mut found, cast("Living Room", 9));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Living Room");
        assert_eq!(found[0].addr_v4, Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(found[1].name, "Kitchen");
    }

    #[test]
    fn test_address_prefers_ipv4() {
        let mut receiver = cast("Living Room", 4);
        assert_eq!(receiver.address(), "1.2.3.4:8009");

        receiver.addr_v4 = None;
        receiver.addr_v6 = Some("fe80::1".parse().unwrap());
        assert_eq!(receiver.address(), "[fe80::1]:8009");

        receiver.addr_v6 = None;
        assert_eq!(receiver.address(), "living-room.local:8009");
    }
}
