//! Result records produced by a scan and handed to output and export.
//!
//! Field order here is the key order of the exported file.

use crate::fingerprint::OsLabel;
use crate::scanner::ScanMode;
use crate::types::Port;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// An open port with its service annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPort {
    pub port: Port,
    /// Service name from the well-known port table.
    pub service: String,
    /// First response from the service, when a banner was grabbed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl OpenPort {
    pub fn new(port: Port, service: impl Into<String>) -> Self {
        Self {
            port,
            service: service.into(),
            banner: None,
        }
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }
}

/// Outcome of scanning the ports of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Target as given (hostname or address).
    pub target: String,
    /// Address that was scanned; absent when the hostname did not resolve.
    pub ip_address: Option<IpAddr>,
    pub scan_type: ScanMode,
    pub os: OsLabel,
    /// Open ports in ascending order.
    pub open_ports: Vec<OpenPort>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Ports whose probe completed.
    pub ports_scanned: usize,
    /// The scan was stopped before every port was probed.
    #[serde(default)]
    pub interrupted: bool,
}

impl ScanResult {
    /// Open port numbers, ascending.
    pub fn open_port_numbers(&self) -> Vec<u16> {
        self.open_ports.iter().map(|p| p.port.as_u16()).collect()
    }

    /// One-line summary for logs and history views.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} open port(s), OS {} [{:.2}s]",
            self.target,
            self.open_ports.len(),
            self.os,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// Whether a host answered a liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Alive,
    Dead,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => write!(f, "alive"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

/// Outcome of a ping-only scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReport {
    pub target: String,
    pub ip_address: Option<IpAddr>,
    /// Status of a probe that finished; `dead` when it was cut short.
    pub status: HostStatus,
    pub checked_at: DateTime<Utc>,
    /// The probe was cancelled before the host answered or timed out.
    #[serde(default)]
    pub interrupted: bool,
}

/// Outcome of a network sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub network: String,
    /// Scan applied to each live host; `ping` means discovery only.
    pub depth: ScanMode,
    /// Hosts that answered, in address order.
    pub live_hosts: Vec<IpAddr>,
    /// Per-host results in address order.
    pub hosts: BTreeMap<IpAddr, ScanResult>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub interrupted: bool,
}

/// Anything a scan invocation can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScanReport {
    Ping(PingReport),
    Host(ScanResult),
    Sweep(SweepReport),
}

impl ScanReport {
    /// Whether the scan was cut short by an interrupt.
    pub fn interrupted(&self) -> bool {
        match self {
            Self::Ping(ping) => ping.interrupted,
            Self::Host(result) => result.interrupted,
            Self::Sweep(sweep) => sweep.interrupted,
        }
    }
}
