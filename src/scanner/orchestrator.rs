//! Scan modes: ping-only, quick common ports, full range, network sweep.
//!
//! An [`Orchestrator`] is built from a [`ScanContext`] owned by one
//! invocation. Each mode resolves its target, runs the probes through a
//! [`WorkerPool`] and freezes the aggregated state into a report once the
//! pool has joined. A failing target never aborts the others; its failure
//! shows up as an "Unknown" OS and an empty port list.

use super::aggregator::ResultAggregator;
use super::pool::{WorkerPool, DEFAULT_CONCURRENCY};
use super::probe::{ProbeOutcome, Prober};
use crate::error::{RangeError, RangeResult};
use crate::fingerprint::{self, OsLabel};
use crate::report::{HostStatus, OpenPort, PingReport, ScanReport, ScanResult, SweepReport};
use crate::types::{NetworkRange, Port, PortSpec, ScanTarget};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Ports probed by a quick scan.
pub const COMMON_PORTS: [u16; 20] = [
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 443, 445, 993, 995, 1723, 3306, 3389, 5900,
    8080,
];

/// Largest network a sweep will enumerate unless configured otherwise.
pub const DEFAULT_MAX_SWEEP_HOSTS: u128 = 65536;

/// Available scan modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Liveness probe only.
    Ping,
    /// OS guess plus the common ports, with banners.
    Quick,
    /// OS guess plus every port in the requested range.
    Full,
}

impl Default for ScanMode {
    fn default() -> Self {
        Self::Quick
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ping => write!(f, "ping"),
            Self::Quick => write!(f, "quick"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ping" => Ok(Self::Ping),
            "quick" => Ok(Self::Quick),
            "full" => Ok(Self::Full),
            _ => Err(format!("unknown scan mode: {}", s)),
        }
    }
}

/// What to scan.
#[derive(Debug, Clone)]
pub enum ScanRequest {
    /// One host, in the given mode. `ports` is only used by full scans.
    Single {
        target: String,
        mode: ScanMode,
        ports: PortSpec,
    },
    /// Every live host of a network, each scanned at `depth`.
    Sweep {
        network: NetworkRange,
        depth: ScanMode,
        ports: PortSpec,
    },
}

/// Everything one scan invocation needs, passed explicitly.
#[derive(Clone)]
pub struct ScanContext {
    pub prober: Arc<dyn Prober>,
    pub concurrency: usize,
    pub cancel: CancellationToken,
    pub show_progress: bool,
    pub max_sweep_hosts: u128,
}

impl ScanContext {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancellationToken::new(),
            show_progress: false,
            max_sweep_hosts: DEFAULT_MAX_SWEEP_HOSTS,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Share a cancellation token with the caller (e.g. a Ctrl-C handler).
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Show a progress bar for pool runs.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn with_max_sweep_hosts(mut self, max: u128) -> Self {
        self.max_sweep_hosts = max;
        self
    }
}

/// Sequences probes into scan modes.
pub struct Orchestrator {
    ctx: ScanContext,
}

impl Orchestrator {
    pub fn new(ctx: ScanContext) -> Self {
        Self { ctx }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.ctx.cancel
    }

    /// Run a request in its mode.
    ///
    /// Only a sweep over an oversized network fails; every probe failure is
    /// absorbed into the report.
    pub async fn run(&self, request: &ScanRequest) -> RangeResult<ScanReport> {
        match request {
            ScanRequest::Single {
                target,
                mode: ScanMode::Ping,
                ..
            } => Ok(ScanReport::Ping(self.ping(target).await)),
            ScanRequest::Single {
                target,
                mode: ScanMode::Quick,
                ..
            } => Ok(ScanReport::Host(self.quick(target).await)),
            ScanRequest::Single {
                target,
                mode: ScanMode::Full,
                ports,
            } => Ok(ScanReport::Host(self.full(target, *ports).await)),
            ScanRequest::Sweep {
                network,
                depth,
                ports,
            } => Ok(ScanReport::Sweep(self.sweep(network, *depth, *ports).await?)),
        }
    }

    /// Single liveness probe against one target.
    pub async fn ping(&self, input: &str) -> PingReport {
        let checked_at = Utc::now();
        let (ip_address, status, interrupted) = match ScanTarget::resolve(input).await {
            Ok(target) => {
                let liveness = tokio::select! {
                    _ = self.ctx.cancel.cancelled() => None,
                    l = self.ctx.prober.probe_liveness(target.ip) => Some(l),
                };
                let status = match liveness {
                    Some(l) if l.is_alive() => HostStatus::Alive,
                    _ => HostStatus::Dead,
                };
                (Some(target.ip), status, liveness.is_none())
            }
            Err(e) => {
                tracing::warn!(host = input, error = %e, "could not resolve target");
                (None, HostStatus::Dead, false)
            }
        };

        if interrupted {
            tracing::warn!(host = input, "ping interrupted before an answer");
        } else {
            tracing::info!(host = input, %status, "ping finished");
        }
        PingReport {
            target: input.to_string(),
            ip_address,
            status,
            checked_at,
            interrupted,
        }
    }

    /// OS guess, then the common ports with a banner for each open one.
    pub async fn quick(&self, input: &str) -> ScanResult {
        match ScanTarget::resolve(input).await {
            Ok(target) => self.scan_host(&target, ScanMode::Quick, common_ports()).await,
            Err(e) => unresolved(input, ScanMode::Quick, &e),
        }
    }

    /// OS guess, then every port of `ports`.
    pub async fn full(&self, input: &str, ports: PortSpec) -> ScanResult {
        match ScanTarget::resolve(input).await {
            Ok(target) => {
                self.scan_host(&target, ScanMode::Full, ports.iter().collect())
                    .await
            }
            Err(e) => unresolved(input, ScanMode::Full, &e),
        }
    }

    /// Discover live hosts of `network`, then scan each at `depth`.
    ///
    /// Hosts are scanned one after another in address order; the ports of
    /// each host go through the worker pool.
    pub async fn sweep(
        &self,
        network: &NetworkRange,
        depth: ScanMode,
        ports: PortSpec,
    ) -> RangeResult<SweepReport> {
        let candidates = network.host_count();
        if candidates > self.ctx.max_sweep_hosts {
            return Err(RangeError::TooLarge(candidates, self.ctx.max_sweep_hosts));
        }

        let started_at = Utc::now();
        tracing::info!(%network, %candidates, %depth, "starting ping sweep");

        let aggregator = Arc::new(ResultAggregator::new());
        let hosts: Vec<IpAddr> = network.hosts().collect();
        let progress = self.progress_bar(hosts.len(), "sweeping");
        let pool = self.pool(progress.as_ref());

        let prober = Arc::clone(&self.ctx.prober);
        let agg = Arc::clone(&aggregator);
        let stats = pool
            .run(hosts, move |ip| {
                let prober = Arc::clone(&prober);
                let agg = Arc::clone(&agg);
                async move {
                    let alive = prober.probe_liveness(ip).await.is_alive();
                    if alive {
                        tracing::info!(host = %ip, "host is alive");
                    }
                    agg.record_liveness(ip, alive);
                }
            })
            .await;
        finish(progress);

        let live_hosts: Vec<IpAddr> = aggregator.live_hosts().into_iter().collect();
        if live_hosts.is_empty() {
            tracing::info!(%network, "no live hosts found");
        }

        let mut results = BTreeMap::new();
        if depth != ScanMode::Ping {
            for ip in &live_hosts {
                if self.ctx.cancel.is_cancelled() {
                    break;
                }
                let target = ScanTarget::from(*ip);
                let ports = match depth {
                    ScanMode::Full => ports.iter().collect(),
                    _ => common_ports(),
                };
                let result = self.scan_host(&target, depth, ports).await;
                results.insert(*ip, result);
            }
        }

        Ok(SweepReport {
            network: network.to_string(),
            depth,
            live_hosts,
            hosts: results,
            started_at,
            interrupted: stats.interrupted || self.ctx.cancel.is_cancelled(),
        })
    }

    /// Detect the OS, probe `ports` through the pool, freeze the result.
    async fn scan_host(&self, target: &ScanTarget, mode: ScanMode, ports: Vec<Port>) -> ScanResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let ip = target.ip;
        let grab_banners = mode == ScanMode::Quick;

        tracing::info!(host = %target, %mode, ports = ports.len(), "starting port scan");
        let os = self.detect_os(ip).await;

        let aggregator = Arc::new(ResultAggregator::new());
        let progress = self.progress_bar(ports.len(), "scanning");
        let pool = self.pool(progress.as_ref());

        let prober = Arc::clone(&self.ctx.prober);
        let agg = Arc::clone(&aggregator);
        let stats = pool
            .run(ports, move |port| {
                let prober = Arc::clone(&prober);
                let agg = Arc::clone(&agg);
                async move {
                    let outcome = prober.probe_port(ip, port).await;
                    tracing::debug!(%ip, %port, %outcome, "probe finished");

                    if let ProbeOutcome::Open { port, service } = outcome {
                        tracing::info!(%ip, "port {}/tcp open - {}", port, service);
                        // Recorded before the grab so a cancelled grab keeps the port.
                        agg.record(ip, OpenPort::new(port, service));
                        if grab_banners {
                            let banner = prober.grab_banner(ip, port).await;
                            agg.set_banner(ip, port, banner);
                        }
                    }
                }
            })
            .await;
        finish(progress);

        let result = ScanResult {
            target: target.original.clone(),
            ip_address: Some(ip),
            scan_type: mode,
            os,
            open_ports: aggregator.open_ports(ip),
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            ports_scanned: stats.processed,
            interrupted: stats.interrupted,
        };
        tracing::info!("{}", result.summary());
        result
    }

    async fn detect_os(&self, ip: IpAddr) -> OsLabel {
        tokio::select! {
            _ = self.ctx.cancel.cancelled() => OsLabel::Unknown,
            label = fingerprint::detect_os(self.ctx.prober.as_ref(), ip) => label,
        }
    }

    fn pool(&self, progress: Option<&ProgressBar>) -> WorkerPool {
        let pool = WorkerPool::new(self.ctx.concurrency, self.ctx.cancel.clone());
        match progress {
            Some(pb) => pool.with_progress(pb.clone()),
            None => pool,
        }
    }

    fn progress_bar(&self, len: usize, message: &'static str) -> Option<ProgressBar> {
        if !self.ctx.show_progress {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message(message);
        Some(pb)
    }
}

fn finish(progress: Option<ProgressBar>) {
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
}

fn common_ports() -> Vec<Port> {
    COMMON_PORTS.iter().copied().filter_map(Port::new).collect()
}

/// Result for a target whose name did not resolve.
fn unresolved(input: &str, mode: ScanMode, error: &dyn std::error::Error) -> ScanResult {
    tracing::warn!(host = input, error = %error, "could not resolve target");
    ScanResult {
        target: input.to_string(),
        ip_address: None,
        scan_type: mode,
        os: OsLabel::Unknown,
        open_ports: Vec::new(),
        started_at: Utc::now(),
        duration_ms: 0,
        ports_scanned: 0,
        interrupted: false,
    }
}
