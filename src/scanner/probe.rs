//! Single-shot probes: host liveness, TCP connect, banner grab.
//!
//! Every probe is bounded by a timeout and resolves to an outcome value;
//! nothing here returns an error to the caller.

use crate::error::ProbeError;
use crate::fingerprint::{grab_banner, parse_ttl};
use crate::services::get_service_description;
use crate::types::Port;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;

/// Result of probing one TCP port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Handshake completed; a service is listening.
    Open { port: Port, service: &'static str },
    /// The host actively refused the connection.
    Closed,
    /// The connection failed for any other reason.
    Unreachable,
    /// No answer within the connect timeout.
    TimedOut,
}

impl ProbeOutcome {
    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { service, .. } => write!(f, "open ({})", service),
            Self::Closed => write!(f, "closed"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Result of a host liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The host answered; `ttl` is taken from the reply when reported.
    Alive { ttl: Option<u8> },
    Dead,
}

impl Liveness {
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive { .. })
    }
}

/// Per-operation time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    /// TCP connect during a port probe.
    pub connect: Duration,
    /// Connect and first read while grabbing a banner.
    pub banner: Duration,
    /// Wait for an echo reply.
    pub ping: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(1),
            banner: Duration::from_secs(3),
            ping: Duration::from_secs(1),
        }
    }
}

/// Trait for probe implementations.
///
/// The scan engine only talks to the network through this trait, so a
/// scripted implementation can stand in for it in tests.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Check whether `target` answers an echo request.
    async fn probe_liveness(&self, target: IpAddr) -> Liveness;

    /// Attempt a TCP handshake with `target:port`.
    async fn probe_port(&self, target: IpAddr, port: Port) -> ProbeOutcome;

    /// Read the service banner on an open port.
    async fn grab_banner(&self, target: IpAddr, port: Port) -> String;
}

/// Prober backed by real sockets and the system `ping` utility.
///
/// Does not require elevated privileges.
#[derive(Debug, Clone, Default)]
pub struct NetProber {
    timeouts: ProbeTimeouts,
}

impl NetProber {
    /// Create a new prober with the given time limits.
    pub fn new(timeouts: ProbeTimeouts) -> Self {
        Self { timeouts }
    }

    pub fn timeouts(&self) -> ProbeTimeouts {
        self.timeouts
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(&self, addr: SocketAddr) -> Result<TcpStream, ProbeError> {
        match timeout(self.timeouts.connect, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(match e.kind() {
                io::ErrorKind::ConnectionRefused => ProbeError::Refused,
                io::ErrorKind::TimedOut => ProbeError::Timeout,
                _ => ProbeError::Io(e),
            }),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

/// Map a connect attempt onto an outcome.
///
/// The stream of a successful connect is dropped here, closing it.
fn classify_connect(port: Port, result: Result<TcpStream, ProbeError>) -> ProbeOutcome {
    match result {
        Ok(_stream) => ProbeOutcome::Open {
            port,
            service: get_service_description(port.as_u16()),
        },
        Err(ProbeError::Refused) => ProbeOutcome::Closed,
        Err(ProbeError::Timeout) => ProbeOutcome::TimedOut,
        Err(e) => {
            tracing::trace!(%port, error = %e, "connect failed");
            ProbeOutcome::Unreachable
        }
    }
}

/// Build a single-echo `ping` invocation for the host platform.
fn ping_command(target: IpAddr, wait: Duration) -> Command {
    let secs = wait.as_secs().max(1).to_string();
    let mut cmd = Command::new("ping");

    if cfg!(windows) {
        cmd.args(["-n", "1", "-w", wait.as_millis().max(1).to_string().as_str()]);
    } else if cfg!(target_os = "macos") {
        cmd.args(["-c", "1", "-t", secs.as_str()]);
    } else {
        cmd.args(["-c", "1", "-W", secs.as_str()]);
    }
    if target.is_ipv6() {
        cmd.arg("-6");
    }

    cmd.arg(target.to_string())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    cmd
}

#[async_trait]
impl Prober for NetProber {
    async fn probe_liveness(&self, target: IpAddr) -> Liveness {
        // ping enforces its own wait; the outer bound covers process startup.
        let limit = self.timeouts.ping + Duration::from_secs(1);
        let mut cmd = ping_command(target, self.timeouts.ping);

        match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                Liveness::Alive {
                    ttl: parse_ttl(&stdout),
                }
            }
            Ok(Ok(_)) => Liveness::Dead,
            Ok(Err(e)) => {
                tracing::warn!(%target, error = %e, "could not run ping");
                Liveness::Dead
            }
            Err(_) => Liveness::Dead,
        }
    }

    async fn probe_port(&self, target: IpAddr, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::new(target, port.as_u16());
        classify_connect(port, self.attempt_connect(addr).await)
    }

    async fn grab_banner(&self, target: IpAddr, port: Port) -> String {
        grab_banner(SocketAddr::new(target, port.as_u16()), self.timeouts.banner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    fn local_prober() -> NetProber {
        NetProber::new(ProbeTimeouts {
            connect: Duration::from_millis(500),
            banner: Duration::from_millis(500),
            ping: Duration::from_secs(1),
        })
    }

    #[test]
    fn test_outcome_display() {
        let open = ProbeOutcome::Open {
            port: Port::new(22).unwrap(),
            service: "ssh",
        };
        assert_eq!(open.to_string(), "open (ssh)");
        assert!(open.is_open());
        assert_eq!(ProbeOutcome::Closed.to_string(), "closed");
        assert!(!ProbeOutcome::TimedOut.is_open());
    }

    #[test]
    fn test_classify_errors() {
        let port = Port::new(9).unwrap();
        assert_eq!(
            classify_connect(port, Err(ProbeError::Refused)),
            ProbeOutcome::Closed
        );
        assert_eq!(
            classify_connect(port, Err(ProbeError::Timeout)),
            ProbeOutcome::TimedOut
        );
        let other = io::Error::new(io::ErrorKind::Other, "no route to host");
        assert_eq!(
            classify_connect(port, Err(ProbeError::Io(other))),
            ProbeOutcome::Unreachable
        );
    }

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let outcome = local_prober()
            .probe_port(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
            .await;
        assert!(matches!(outcome, ProbeOutcome::Open { port: p, .. } if p == port));
    }

    #[tokio::test]
    async fn test_probe_closed_port_is_stable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let prober = local_prober();
        let target = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let first = prober.probe_port(target, port).await;
        let second = prober.probe_port(target, port).await;
        assert_eq!(first, ProbeOutcome::Closed);
        assert_eq!(second, ProbeOutcome::Closed);
    }

    #[test]
    fn test_default_timeouts() {
        let t = ProbeTimeouts::default();
        assert_eq!(t.connect, Duration::from_secs(1));
        assert_eq!(t.banner, Duration::from_secs(3));
        assert_eq!(t.ping, Duration::from_secs(1));
    }
}
