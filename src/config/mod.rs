//! Configuration management for netsweep.
//!
//! Provides XDG-compliant settings storage; CLI flags override what is read
//! here.

mod settings;

pub use settings::{AppSettings, Paths};
