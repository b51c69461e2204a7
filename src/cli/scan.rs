//! Scan command implementation.
//!
//! Turns parsed flags and settings into a [`ScanRequest`], runs it, prints
//! the report and optionally exports it.

use super::{Cli, OutputFormat};
use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::export::{export_report, ReportDocument};
use crate::output;
use crate::scanner::{NetProber, Orchestrator, ScanContext, ScanMode, ScanRequest, COMMON_PORTS};
use crate::types::{NetworkRange, PortSpec, ScanId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

impl Cli {
    /// Build the scan request from flags, falling back to `settings`.
    ///
    /// The sweep depth comes from `--sweep-depth`, else `-s`, else the
    /// `sweep_depth` setting.
    pub fn request(&self, settings: &AppSettings) -> CliResult<ScanRequest> {
        let ports = match &self.ports {
            Some(spec) => PortSpec::parse_or_default(spec),
            None => settings.default_port_spec(),
        };

        match (&self.network, &self.target) {
            (Some(network), _) => Ok(ScanRequest::Sweep {
                network: NetworkRange::parse(network)?,
                depth: self
                    .sweep_depth
                    .or(self.scan_type)
                    .unwrap_or(settings.sweep_depth),
                ports,
            }),
            (None, Some(target)) => Ok(ScanRequest::Single {
                target: target.clone(),
                mode: self.scan_type.unwrap_or_default(),
                ports,
            }),
            (None, None) => Err(CliError::Usage(
                "either a target (-t) or a network (-n) is required".to_string(),
            )),
        }
    }

    /// Execute the scan command.
    pub async fn execute(&self) -> CliResult<()> {
        let settings = AppSettings::load(self.config.as_deref())?;
        let request = self.request(&settings)?;
        let concurrency = self.concurrency.unwrap_or(settings.concurrency);

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping scan");
                interrupt.cancel();
            }
        });

        let prober = Arc::new(NetProber::new(settings.timeouts()));
        let mut ctx = ScanContext::new(prober)
            .with_concurrency(concurrency)
            .with_cancel(cancel)
            .with_max_sweep_hosts(u128::from(settings.max_sweep_hosts));
        if self.verbose {
            ctx = ctx.with_progress();
        }

        let plain = self.format == OutputFormat::Plain;
        if !self.quiet && plain {
            print_header(&request);
        }

        let scan_id = ScanId::new();
        let span = tracing::info_span!("scan", id = %scan_id.short());
        let result = Orchestrator::new(ctx).run(&request).instrument(span).await;
        ctrl_c.abort();

        let document = ReportDocument::new(result?).with_scan_id(scan_id);
        if document.report.interrupted() {
            output::print_warning("scan interrupted, showing partial results");
        }

        output::format_report(&document, self.format)?;

        if let Some(path) = &self.output {
            export_report(&document, path)?;
            if !self.quiet && plain {
                output::print_success(&format!("Results saved to {}", path.display()));
            }
        }

        Ok(())
    }
}

fn print_header(request: &ScanRequest) {
    match request {
        ScanRequest::Single {
            target,
            mode,
            ports,
        } => {
            let detail = match mode {
                ScanMode::Ping => String::new(),
                ScanMode::Quick => format!("Scanning {} common ports...", COMMON_PORTS.len()),
                ScanMode::Full => format!("Scanning {} ports ({})...", ports.len(), ports),
            };
            output::print_scan_header(target, &mode.to_string(), &detail);
        }
        ScanRequest::Sweep { network, depth, .. } => {
            output::print_scan_header(
                &network.to_string(),
                &format!("sweep ({})", depth),
                &format!("Checking {} hosts...", network.host_count()),
            );
        }
    }
}
