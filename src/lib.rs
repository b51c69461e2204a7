//! # netsweep - Host Discovery and TCP Port Scanning
//!
//! netsweep finds live hosts on a network and enumerates open TCP ports on
//! them, with coarse service banners and a TTL-based OS guess.
//!
//! ## Features
//!
//! - **Scan Modes**: ping-only, quick (20 common ports), full (port range)
//! - **Network Sweeps**: liveness sweep over a CIDR range, then a scan per live host
//! - **Bounded Concurrency**: a fixed-size worker pool with per-probe timeouts
//! - **Fingerprints**: service banners and a best-effort OS family guess
//! - **Export**: pretty-printed JSON reports, plus plain and CSV terminal output
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use netsweep::scanner::{NetProber, Orchestrator, ScanContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = ScanContext::new(Arc::new(NetProber::default()));
//!     let result = Orchestrator::new(ctx).quick("192.168.1.1").await;
//!
//!     for open in &result.open_ports {
//!         println!("{}/tcp open - {}", open.port, open.service);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port ranges, targets and network ranges
//! - [`scanner`] - Probes, the worker pool, the aggregator and scan modes
//! - [`fingerprint`] - OS guess from TTL and banner capture
//! - [`report`] - Result records
//! - [`export`] - JSON file export
//! - [`config`] - Settings file handling
//! - [`output`] - Terminal rendering
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod output;
pub mod report;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ExportError, RangeError};
pub use export::{export_report, load_report, ReportDocument};
pub use fingerprint::OsLabel;
pub use report::{OpenPort, PingReport, ScanReport, ScanResult, SweepReport};
pub use scanner::{NetProber, Orchestrator, ProbeOutcome, Prober, ScanContext, ScanMode};
pub use types::{NetworkRange, Port, PortSpec, ScanId, ScanTarget};
