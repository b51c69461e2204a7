//! Command-line interface.
//!
//! One command, two scopes:
//! - `netsweep -t <host> [-s ping|quick|full] [-p RANGE]` - Scan one target
//! - `netsweep -n <cidr> [--sweep-depth ping|quick|full]` - Sweep a network

mod scan;

use crate::scanner::ScanMode;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// netsweep - host discovery and TCP port scanning.
///
/// Scans a single host in ping, quick (common ports) or full (port range)
/// mode, or sweeps a network for live hosts and scans each one.
#[derive(Parser, Debug)]
#[command(name = "netsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Host discovery and TCP port scanner", long_about = None)]
#[command(group(ArgGroup::new("scope").required(true).args(["target", "network"])))]
pub struct Cli {
    /// Target to scan (IP address or hostname)
    #[arg(short, long, value_name = "HOST")]
    pub target: Option<String>,

    /// Network to sweep (CIDR notation, e.g. 192.168.1.0/24)
    #[arg(short, long, value_name = "CIDR")]
    pub network: Option<String>,

    /// Port range for full scans (e.g. "1-1024"); invalid input falls back to 1-1024
    #[arg(short, long, value_name = "RANGE")]
    pub ports: Option<String>,

    /// Scan type for a single target [default: quick]
    #[arg(short = 's', long = "scan-type", value_enum)]
    pub scan_type: Option<ScanMode>,

    /// Scan applied to each live host of a sweep (ping = discovery only)
    #[arg(long, value_enum, value_name = "MODE")]
    pub sweep_depth: Option<ScanMode>,

    /// Write the report as JSON to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for the terminal report
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Maximum number of concurrent probes
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_target_or_network_required() {
        assert!(Cli::try_parse_from(["netsweep"]).is_err());
        assert!(Cli::try_parse_from(["netsweep", "-t", "a", "-n", "10.0.0.0/24"]).is_err());
    }

    #[test]
    fn test_parse_single_target() {
        let cli = Cli::try_parse_from([
            "netsweep", "-t", "127.0.0.1", "-s", "full", "-p", "1-100", "-o", "out.json",
        ])
        .unwrap();
        assert_eq!(cli.target.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.scan_type, Some(ScanMode::Full));
        assert_eq!(cli.ports.as_deref(), Some("1-100"));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.format, OutputFormat::Plain);
    }

    #[test]
    fn test_parse_sweep() {
        let cli = Cli::try_parse_from([
            "netsweep", "-n", "10.0.0.0/28", "--sweep-depth", "ping", "-f", "csv", "-c", "20",
        ])
        .unwrap();
        assert_eq!(cli.network.as_deref(), Some("10.0.0.0/28"));
        assert_eq!(cli.sweep_depth, Some(ScanMode::Ping));
        assert_eq!(cli.format, OutputFormat::Csv);
        assert_eq!(cli.concurrency, Some(20));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["netsweep", "-t", "h", "-v", "-q"]).is_err());
    }
}
