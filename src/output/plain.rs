//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::export::ReportDocument;
use crate::fingerprint::OsLabel;
use crate::report::{HostStatus, PingReport, ScanReport, ScanResult, SweepReport};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print a report in human-readable plain text format.
pub fn print_plain(document: &ReportDocument) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plain(&mut out, document)
}

/// Render a report as plain text into `out`.
pub fn write_plain<W: Write>(out: &mut W, document: &ReportDocument) -> io::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("netsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    match &document.report {
        ScanReport::Ping(ping) => write_ping(out, ping)?,
        ScanReport::Host(result) => write_host(out, result)?,
        ScanReport::Sweep(sweep) => write_sweep(out, sweep)?,
    }

    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(document.scan_id.short()).dim()
    )?;
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

fn write_ping<W: Write>(out: &mut W, ping: &PingReport) -> io::Result<()> {
    let status = match ping.status {
        _ if ping.interrupted => style("Unknown (interrupted)").yellow(),
        HostStatus::Alive => style("Host is up").green().bold(),
        HostStatus::Dead => style("Host is down").red(),
    };

    writeln!(out, "  {} {}", style("Target:").bold(), ping.target)?;
    writeln!(
        out,
        "  {} {}",
        style("IP Address:").bold(),
        display_ip(ping.ip_address)
    )?;
    writeln!(out, "  {} {}", style("Status:").bold(), status)?;
    writeln!(out)?;
    Ok(())
}

fn write_host<W: Write>(out: &mut W, result: &ScanResult) -> io::Result<()> {
    writeln!(out, "  {} {}", style("Target:").bold(), result.target)?;
    writeln!(
        out,
        "  {} {}",
        style("IP Address:").bold(),
        display_ip(result.ip_address)
    )?;
    writeln!(out, "  {} {}", style("Scan Type:").bold(), result.scan_type)?;
    writeln!(
        out,
        "  {} {}",
        style("OS Guess:").bold(),
        os_style(result.os).apply_to(result.os)
    )?;
    writeln!(out)?;

    // Statistics
    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s, {} open",
        style("Statistics:").bold(),
        result.ports_scanned,
        result.duration_ms as f64 / 1000.0,
        style(result.open_ports.len()).green().bold()
    )?;
    writeln!(out)?;

    write_port_table(out, result)?;
    writeln!(out)?;
    Ok(())
}

fn write_sweep<W: Write>(out: &mut W, sweep: &SweepReport) -> io::Result<()> {
    writeln!(out, "  {} {}", style("Network:").bold(), sweep.network)?;
    writeln!(out, "  {} {}", style("Depth:").bold(), sweep.depth)?;
    writeln!(
        out,
        "  {} {}",
        style("Live Hosts:").bold(),
        style(sweep.live_hosts.len()).green().bold()
    )?;
    writeln!(out)?;

    if sweep.live_hosts.is_empty() {
        writeln!(out, "  {}", style("No live hosts found.").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    for ip in &sweep.live_hosts {
        match sweep.hosts.get(ip) {
            Some(result) => {
                writeln!(
                    out,
                    "  {} {}  {}",
                    style("•").dim(),
                    style(ip).white().bold(),
                    os_style(result.os).apply_to(result.os)
                )?;
                write_port_table(out, result)?;
            }
            None => writeln!(out, "  {} {}", style("•").dim(), style(ip).white().bold())?,
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_port_table<W: Write>(out: &mut W, result: &ScanResult) -> io::Result<()> {
    if result.open_ports.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
        return Ok(());
    }

    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    writeln!(
        out,
        "  {:>6}  {:<22}  {}",
        style("PORT").bold(),
        style("SERVICE").bold(),
        style("BANNER").bold()
    )?;
    writeln!(out, "  {}", style(THIN_RULE).dim())?;

    for open in &result.open_ports {
        let banner_display = open
            .banner
            .as_deref()
            .map(|b| truncate_string(b, 35))
            .unwrap_or_default();

        writeln!(
            out,
            "  {:>6}  {:<22}  {}",
            style(open.port).green().bold(),
            open.service,
            style(banner_display).dim()
        )?;
    }

    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    Ok(())
}

fn os_style(os: OsLabel) -> Style {
    match os {
        OsLabel::Unknown => Style::new().dim(),
        _ => Style::new().yellow(),
    }
}

fn display_ip(ip: Option<std::net::IpAddr>) -> String {
    ip.map_or_else(|| "unresolved".to_string(), |ip| ip.to_string())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, scan_type: &str, detail: &str) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("netsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Scan type: {}",
        style("•").dim(),
        style(scan_type).yellow()
    );
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(target).white().bold()
    );
    if !detail.is_empty() {
        println!("{} {}", style("•").dim(), detail);
    }
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to at most `max_len` characters, adding an ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OpenPort;
    use crate::scanner::ScanMode;
    use crate::types::Port;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::net::{IpAddr, Ipv4Addr};

    fn render(report: ScanReport) -> String {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write_plain(&mut buf, &ReportDocument::new(report)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn host(open: &[u16]) -> ScanResult {
        ScanResult {
            target: "db.internal".to_string(),
            ip_address: Some(IpAddr::V4(Ipv4Addr::new(10, 1, 1, 4))),
            scan_type: ScanMode::Full,
            os: OsLabel::Windows,
            open_ports: open
                .iter()
                .map(|p| OpenPort::new(Port::new(*p).unwrap(), "svc"))
                .collect(),
            started_at: Utc::now(),
            duration_ms: 2500,
            ports_scanned: 1024,
            interrupted: false,
        }
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_host_rendering() {
        let text = render(ScanReport::Host(host(&[3389, 445])));
        assert!(text.contains("db.internal"));
        assert!(text.contains("OS Guess: Windows"));
        assert!(text.contains("1024 ports scanned in 2.50s, 2 open"));
        assert!(text.contains("3389"));
    }

    #[test]
    fn test_host_without_open_ports() {
        let text = render(ScanReport::Host(host(&[])));
        assert!(text.contains("No open ports found."));
    }

    #[test]
    fn test_ping_rendering() {
        let text = render(ScanReport::Ping(PingReport {
            target: "gateway".to_string(),
            ip_address: None,
            status: HostStatus::Dead,
            checked_at: Utc::now(),
            interrupted: false,
        }));
        assert!(text.contains("Host is down"));
        assert!(text.contains("unresolved"));
    }

    #[test]
    fn test_interrupted_ping_rendering() {
        let text = render(ScanReport::Ping(PingReport {
            target: "gateway".to_string(),
            ip_address: "192.168.1.1".parse().ok(),
            status: HostStatus::Dead,
            checked_at: Utc::now(),
            interrupted: true,
        }));
        assert!(text.contains("Status: Unknown (interrupted)"));
        assert!(!text.contains("Host is down"));
    }

    #[test]
    fn test_sweep_rendering() {
        let ip = IpAddr::V4(Ipv4Addr::new(10, 1, 1, 4));
        let mut hosts = BTreeMap::new();
        hosts.insert(ip, host(&[22]));
        let text = render(ScanReport::Sweep(SweepReport {
            network: "10.1.1.0/24".to_string(),
            depth: ScanMode::Quick,
            live_hosts: vec![ip],
            hosts,
            started_at: Utc::now(),
            interrupted: false,
        }));
        assert!(text.contains("Network: 10.1.1.0/24"));
        assert!(text.contains("Live Hosts: 1"));
        assert!(text.contains("10.1.1.4"));
    }
}
