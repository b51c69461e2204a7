//! OS family guess from the TTL of an echo reply.

use crate::scanner::{Liveness, Prober};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Coarse operating-system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OsLabel {
    #[serde(rename = "Linux/Unix")]
    LinuxUnix,
    #[serde(rename = "Windows")]
    Windows,
    #[serde(rename = "Unknown/Cisco")]
    UnknownCisco,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl fmt::Display for OsLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinuxUnix => write!(f, "Linux/Unix"),
            Self::Windows => write!(f, "Windows"),
            Self::UnknownCisco => write!(f, "Unknown/Cisco"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Map an observed TTL to an OS family.
///
/// Hosts start at 64 (Linux, BSD, macOS), 128 (Windows) or 255 (network
/// gear), so the observed value lands at or below its starting point.
pub fn classify_ttl(ttl: u8) -> OsLabel {
    match ttl {
        0..=64 => OsLabel::LinuxUnix,
        65..=128 => OsLabel::Windows,
        _ => OsLabel::UnknownCisco,
    }
}

/// Extract the TTL (or IPv6 hop limit) from `ping` output.
pub fn parse_ttl(output: &str) -> Option<u8> {
    let lower = output.to_ascii_lowercase();
    ["ttl=", "hlim="].iter().find_map(|key| {
        let idx = lower.find(key)?;
        let digits: String = lower[idx + key.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    })
}

/// Guess the OS of `target` from a single liveness probe.
///
/// Returns [`OsLabel::Unknown`] when the host does not answer or the reply
/// carries no TTL. Not authoritative: routers on the path lower the TTL and
/// many stacks let the initial value be tuned.
pub async fn detect_os(prober: &dyn Prober, target: IpAddr) -> OsLabel {
    match prober.probe_liveness(target).await {
        Liveness::Alive { ttl: Some(ttl) } => {
            let label = classify_ttl(ttl);
            tracing::info!(%target, ttl, os = %label, "detected OS");
            label
        }
        Liveness::Alive { ttl: None } => {
            tracing::debug!(%target, "echo reply carried no TTL");
            OsLabel::Unknown
        }
        Liveness::Dead => {
            tracing::debug!(%target, "no echo reply, OS unknown");
            OsLabel::Unknown
        }
    }
}
