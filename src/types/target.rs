//! Scan targets: an IP address or a hostname resolved to one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A single scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }

    /// Resolve user input to a target.
    ///
    /// IP literals are taken as-is; anything else must look like a hostname
    /// and is resolved through DNS, keeping the first address returned.
    pub async fn resolve(input: &str) -> Result<Self, TargetError> {
        let input = input.trim();

        if let Ok(ip) = input.parse::<IpAddr>() {
            return Ok(Self::from(ip));
        }

        if !is_valid_hostname(input) {
            return Err(TargetError::InvalidFormat(input.to_string()));
        }

        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

        let response = resolver
            .lookup_ip(input)
            .await
            .map_err(|e| TargetError::DnsResolutionFailed(input.to_string(), e.to_string()))?;

        let ip = response
            .iter()
            .next()
            .ok_or_else(|| TargetError::NoAddressesFound(input.to_string()))?;

        tracing::debug!(hostname = input, %ip, "resolved target");
        Ok(Self::new(input, ip))
    }
}

impl From<IpAddr> for ScanTarget {
    fn from(ip: IpAddr) -> Self {
        Self::new(ip.to_string(), ip)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// Check if a string is a syntactically valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().last().is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
