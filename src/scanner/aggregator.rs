//! Thread-safe collection of probe results shared by pool workers.

use crate::report::OpenPort;
use crate::types::Port;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct TargetEntry {
    open: BTreeMap<Port, OpenPort>,
    alive: Option<bool>,
}

/// Per-target open ports and liveness, written concurrently by workers.
///
/// A single lock guards all state and is held only for the insert or copy
/// itself. Ports are kept ordered and unique per target; readers get
/// snapshots, never the backing collection.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    targets: Mutex<HashMap<IpAddr, TargetEntry>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an open port for `target`.
    ///
    /// Returns `false` if the port was already recorded; the first record wins.
    pub fn record_open(&self, target: IpAddr, port: Port, service: impl Into<String>) -> bool {
        self.record(target, OpenPort::new(port, service))
    }

    /// Record an open port with its annotations.
    pub fn record(&self, target: IpAddr, open: OpenPort) -> bool {
        let mut targets = self.lock();
        let entry = targets.entry(target).or_default();
        if entry.open.contains_key(&open.port) {
            return false;
        }
        entry.open.insert(open.port, open);
        true
    }

    /// Attach a banner to a port already recorded as open.
    ///
    /// Returns `false` when the port was never recorded.
    pub fn set_banner(&self, target: IpAddr, port: Port, banner: String) -> bool {
        match self
            .lock()
            .get_mut(&target)
            .and_then(|entry| entry.open.get_mut(&port))
        {
            Some(open) => {
                open.banner = Some(banner);
                true
            }
            None => false,
        }
    }

    /// Record the liveness verdict for `target`.
    pub fn record_liveness(&self, target: IpAddr, alive: bool) {
        self.lock().entry(target).or_default().alive = Some(alive);
    }

    /// Open ports of `target`, ascending by port.
    pub fn open_ports(&self, target: IpAddr) -> Vec<OpenPort> {
        self.lock()
            .get(&target)
            .map(|entry| entry.open.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Targets recorded as alive, in address order.
    pub fn live_hosts(&self) -> BTreeSet<IpAddr> {
        self.lock()
            .iter()
            .filter(|(_, entry)| entry.alive == Some(true))
            .map(|(ip, _)| *ip)
            .collect()
    }

    /// Liveness verdict for `target`, if one was recorded.
    pub fn is_alive(&self, target: IpAddr) -> Option<bool> {
        self.lock().get(&target).and_then(|entry| entry.alive)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, TargetEntry>> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
