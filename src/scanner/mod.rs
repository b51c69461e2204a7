//! Scanner module - probes, the worker pool and the scan modes built on them.
//!
//! Probes go through the [`Prober`] trait, work is spread over a bounded
//! [`WorkerPool`], findings land in a shared [`ResultAggregator`], and the
//! [`Orchestrator`] sequences all of it into ping, quick, full and sweep
//! scans.

pub mod aggregator;
pub mod orchestrator;
pub mod pool;
pub mod probe;

pub use aggregator::ResultAggregator;
pub use orchestrator::{
    Orchestrator, ScanContext, ScanMode, ScanRequest, COMMON_PORTS, DEFAULT_MAX_SWEEP_HOSTS,
};
pub use pool::{PoolStats, WorkerPool, DEFAULT_CONCURRENCY};
pub use probe::{Liveness, NetProber, ProbeOutcome, ProbeTimeouts, Prober};
