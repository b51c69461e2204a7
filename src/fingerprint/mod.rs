//! Best-effort host and service fingerprinting.
//!
//! Both heuristics here are coarse: the OS guess only looks at the initial
//! TTL of an echo reply, and banners are whatever a service volunteers (or
//! answers to a minimal probe) in its first read.

pub mod banner;
pub mod os;

pub use banner::{decode_banner, grab_banner, probe_payload, NO_BANNER, UNKNOWN_BANNER};
pub use os::{classify_ttl, detect_os, parse_ttl, OsLabel};
