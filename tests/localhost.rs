//! End-to-end scans against loopback listeners and a scripted prober.

use async_trait::async_trait;
use netsweep::scanner::{Liveness, ProbeOutcome, ProbeTimeouts};
use netsweep::{
    export_report, load_report, NetProber, Orchestrator, OsLabel, Port, PortSpec, Prober,
    ReportDocument, ScanContext, ScanMode, ScanReport,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn loopback_prober() -> Arc<NetProber> {
    Arc::new(NetProber::new(ProbeTimeouts {
        connect: Duration::from_millis(500),
        banner: Duration::from_millis(500),
        ping: Duration::from_secs(1),
    }))
}

/// Port range of `width` ports ending at `port`.
fn range_ending_at(port: u16, width: u16) -> PortSpec {
    let start = port.saturating_sub(width - 1).max(1);
    PortSpec::new(u32::from(start), u32::from(port)).unwrap()
}

#[tokio::test]
async fn full_scan_finds_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ports = range_ending_at(port, 16);

    let ctx = ScanContext::new(loopback_prober()).with_concurrency(8);
    let result = Orchestrator::new(ctx).full("127.0.0.1", ports).await;

    assert_eq!(result.scan_type, ScanMode::Full);
    assert_eq!(result.ports_scanned, ports.len());
    assert!(!result.interrupted);
    assert!(result.open_port_numbers().contains(&port));
    assert!(result
        .open_ports
        .iter()
        .all(|p| ports.contains(p.port) && p.banner.is_none()));
}

#[tokio::test]
async fn banner_is_captured_from_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let _ = stream.write_all(b"SSH-2.0-netsweep_test\r\n").await;
        }
    });

    let prober = loopback_prober();
    let target: IpAddr = "127.0.0.1".parse().unwrap();

    assert!(prober.probe_port(target, port).await.is_open());
    assert_eq!(
        prober.grab_banner(target, port).await,
        "SSH-2.0-netsweep_test"
    );
}

#[tokio::test]
async fn cancelled_scan_is_reported_as_interrupted() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let ctx = ScanContext::new(loopback_prober()).with_cancel(cancel);
    let result = Orchestrator::new(ctx)
        .full("127.0.0.1", PortSpec::new(1, 1024).unwrap())
        .await;

    assert!(result.interrupted);
    assert_eq!(result.ports_scanned, 0);
    assert!(result.open_ports.is_empty());
    assert_eq!(result.os, OsLabel::Unknown);
}

#[tokio::test]
async fn exported_scan_reloads_unchanged() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let ctx = ScanContext::new(loopback_prober());
    let result = Orchestrator::new(ctx)
        .full("127.0.0.1", range_ending_at(port, 1))
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let document = ReportDocument::new(ScanReport::Host(result.clone()));
    export_report(&document, &path).unwrap();

    match load_report(&path).unwrap().report {
        ScanReport::Host(loaded) => {
            assert_eq!(loaded.target, result.target);
            assert_eq!(loaded.os, result.os);
            assert_eq!(loaded.open_ports, result.open_ports);
            assert_eq!(loaded.open_port_numbers(), vec![port]);
        }
        other => panic!("unexpected report: {:?}", other),
    }
}

/// Host with only SSH listening; answers pings with a Linux TTL.
struct SshOnly;

#[async_trait]
impl Prober for SshOnly {
    async fn probe_liveness(&self, _target: IpAddr) -> Liveness {
        Liveness::Alive { ttl: Some(64) }
    }

    async fn probe_port(&self, _target: IpAddr, port: Port) -> ProbeOutcome {
        if port.as_u16() == 22 {
            ProbeOutcome::Open {
                port,
                service: "ssh",
            }
        } else {
            ProbeOutcome::Closed
        }
    }

    async fn grab_banner(&self, _target: IpAddr, _port: Port) -> String {
        "SSH-2.0-OpenSSH_9.6".to_string()
    }
}

#[test]
fn quick_scan_reports_only_ssh() {
    let ctx = ScanContext::new(Arc::new(SshOnly)).with_concurrency(3);
    let result = tokio_test::block_on(Orchestrator::new(ctx).quick("127.0.0.1"));

    assert_eq!(result.open_port_numbers(), vec![22]);
    assert_eq!(result.os, OsLabel::LinuxUnix);
    assert_eq!(
        result.open_ports[0].banner.as_deref(),
        Some("SSH-2.0-OpenSSH_9.6")
    );
}
