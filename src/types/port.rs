//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSpec` is the inclusive range a scan covers.

use crate::error::{RangeError, RangeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None for port 0.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = RangeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(RangeError::PortOutOfRange(value.into()))
    }
}

impl TryFrom<u32> for Port {
    type Error = RangeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(RangeError::PortOutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// An inclusive port range `[start, end]` with `1 <= start <= end <= 65535`.
///
/// Accepts `"start-end"` or a single port. Callers that must never fail
/// use [`PortSpec::parse_or_default`], which falls back to `1-1024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    start: Port,
    end: Port,
}

impl PortSpec {
    /// The range used when no valid range was supplied.
    pub const DEFAULT: PortSpec = PortSpec {
        start: Port(1),
        end: Port(1024),
    };

    /// Validate raw bounds into a range.
    ///
    /// Takes `u32` so that out-of-range input such as 65536 is rejected
    /// rather than silently truncated.
    pub fn new(start: u32, end: u32) -> RangeResult<Self> {
        let start_port = Port::try_from(start)?;
        let end_port = Port::try_from(end)?;
        if start > end {
            return Err(RangeError::InvertedRange(start, end));
        }
        Ok(Self {
            start: start_port,
            end: end_port,
        })
    }

    /// Parse `s`, falling back to [`PortSpec::DEFAULT`] on malformed input.
    pub fn parse_or_default(s: &str) -> Self {
        match s.parse() {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(input = s, error = %e, "invalid port range, using default {}", Self::DEFAULT);
                Self::DEFAULT
            }
        }
    }

    pub const fn start(&self) -> Port {
        self.start
    }

    pub const fn end(&self) -> Port {
        self.end
    }

    /// Number of ports in the range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// Always false; a valid range holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }

    pub fn contains(&self, port: Port) -> bool {
        self.start <= port && port <= self.end
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for PortSpec {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RangeError::Empty);
        }

        let parse_bound = |b: &str| -> RangeResult<u32> {
            b.trim()
                .parse()
                .map_err(|_| RangeError::InvalidPort(b.to_string()))
        };

        match s.split_once('-') {
            Some((start, end)) => Self::new(parse_bound(start)?, parse_bound(end)?),
            None => {
                let port = parse_bound(s)?;
                Self::new(port, port)
            }
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
        assert!(Port::try_from(65536u32).is_err());
    }

    #[test]
    fn test_spec_boundaries() {
        assert_eq!(PortSpec::new(0, 10), Err(RangeError::PortOutOfRange(0)));
        assert_eq!(
            PortSpec::new(1, 65536),
            Err(RangeError::PortOutOfRange(65536))
        );

        let full = PortSpec::new(1, 65535).unwrap();
        assert_eq!(full.len(), 65535);
        assert_eq!(full.start().as_u16(), 1);
        assert_eq!(full.end().as_u16(), 65535);
    }

    #[test]
    fn test_spec_inverted() {
        assert_eq!(
            PortSpec::new(100, 50),
            Err(RangeError::InvertedRange(100, 50))
        );
    }

    #[test]
    fn test_spec_parsing() {
        let spec: PortSpec = "1-100".parse().unwrap();
        assert_eq!(spec.len(), 100);

        let spec: PortSpec = " 20 - 25 ".parse().unwrap();
        assert_eq!(spec.iter().map(u16::from).collect::<Vec<_>>(), vec![20, 21, 22, 23, 24, 25]);

        let spec: PortSpec = "443".parse().unwrap();
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.to_string(), "443");

        assert!("abc".parse::<PortSpec>().is_err());
        assert!("1-2-3".parse::<PortSpec>().is_err());
        assert_eq!("".parse::<PortSpec>(), Err(RangeError::Empty));
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(PortSpec::parse_or_default("garbage"), PortSpec::DEFAULT);
        assert_eq!(PortSpec::parse_or_default("0-80"), PortSpec::DEFAULT);
        assert_eq!(PortSpec::parse_or_default("1-70000"), PortSpec::DEFAULT);
        assert_eq!(PortSpec::parse_or_default("22-80").to_string(), "22-80");
        assert_eq!(PortSpec::DEFAULT.to_string(), "1-1024");
    }

    #[test]
    fn test_port_serde_rejects_zero() {
        assert!(serde_json::from_str::<Port>("0").is_err());
        assert_eq!(serde_json::from_str::<Port>("22").unwrap().as_u16(), 22);
    }
}
