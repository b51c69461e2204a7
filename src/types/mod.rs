//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep ports, port ranges and networks valid by construction.

mod network;
mod port;
mod scan_id;
mod target;

pub use network::NetworkRange;
pub use port::{Port, PortSpec};
pub use scan_id::{ScanId, ScanIdError};
pub use target::{ScanTarget, TargetError};
