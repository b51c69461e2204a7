//! CSV output formatting.
//!
//! One row per open port; a host with no open ports still gets a row so
//! that its OS guess is not lost. Ping reports produce one row per target.

use crate::export::ReportDocument;
use crate::report::{ScanReport, ScanResult};
use std::io::{self, Write};

const HEADER: [&str; 6] = ["target", "ip_address", "os", "port", "service", "banner"];

/// Print a report in CSV format.
pub fn print_csv(document: &ReportDocument) -> io::Result<()> {
    let stdout = io::stdout();
    write_csv(stdout.lock(), document)
}

/// Write a report as CSV into `out`.
pub fn write_csv<W: Write>(out: W, document: &ReportDocument) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    match &document.report {
        ScanReport::Ping(ping) => {
            let ip = ping.ip_address.map(|ip| ip.to_string()).unwrap_or_default();
            let status = ping.status.to_string();
            let interrupted = ping.interrupted.to_string();
            wtr.write_record(["target", "ip_address", "status", "interrupted"])?;
            wtr.write_record([
                ping.target.as_str(),
                ip.as_str(),
                status.as_str(),
                interrupted.as_str(),
            ])?;
        }
        ScanReport::Host(result) => {
            wtr.write_record(HEADER)?;
            write_host_rows(&mut wtr, result)?;
        }
        ScanReport::Sweep(sweep) => {
            wtr.write_record(HEADER)?;
            for ip in &sweep.live_hosts {
                match sweep.hosts.get(ip) {
                    Some(result) => write_host_rows(&mut wtr, result)?,
                    None => {
                        let ip = ip.to_string();
                        wtr.write_record([ip.as_str(), ip.as_str(), "", "", "", ""])?;
                    }
                }
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

fn write_host_rows<W: Write>(wtr: &mut csv::Writer<W>, result: &ScanResult) -> io::Result<()> {
    let ip = result.ip_address.map(|ip| ip.to_string()).unwrap_or_default();
    let os = result.os.to_string();

    if result.open_ports.is_empty() {
        wtr.write_record([result.target.as_str(), ip.as_str(), os.as_str(), "", "", ""])?;
        return Ok(());
    }

    for open in &result.open_ports {
        let port = open.port.to_string();
        wtr.write_record([
            result.target.as_str(),
            ip.as_str(),
            os.as_str(),
            port.as_str(),
            open.service.as_str(),
            open.banner.as_deref().unwrap_or(""),
        ])?;
    }
    Ok(())
}
