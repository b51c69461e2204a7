//! Network ranges and host enumeration for sweeps.

use crate::error::{RangeError, RangeResult};
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A network given as `address/prefix`, expanded lazily into host addresses.
///
/// Host bits in the address are ignored. A bare address is treated as a
/// single-host network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkRange {
    network: IpNetwork,
}

impl NetworkRange {
    /// Parse a network specification such as `192.168.1.0/24` or `fd00::/120`.
    pub fn parse(s: &str) -> RangeResult<Self> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };

        let addr: IpAddr = addr
            .trim()
            .parse()
            .map_err(|_| RangeError::InvalidNetwork(s.to_string()))?;

        let max: u8 = if addr.is_ipv4() { 32 } else { 128 };
        let prefix = match prefix {
            Some(p) => p
                .trim()
                .parse::<u32>()
                .map_err(|_| RangeError::InvalidNetwork(s.to_string()))?,
            None => u32::from(max),
        };
        if prefix > u32::from(max) {
            return Err(RangeError::PrefixOutOfRange { prefix, max });
        }

        let prefix = prefix as u8;
        let masked = IpNetwork::new(addr, prefix)
            .map_err(|e| RangeError::InvalidNetwork(e.to_string()))?;
        let network = IpNetwork::new(masked.network(), prefix)
            .map_err(|e| RangeError::InvalidNetwork(e.to_string()))?;

        Ok(Self { network })
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    /// The network address.
    pub fn network_address(&self) -> IpAddr {
        self.network.network()
    }

    /// Number of addresses [`hosts`](Self::hosts) will yield.
    pub fn host_count(&self) -> u128 {
        match self.network {
            IpNetwork::V4(net) => match net.prefix() {
                32 => 1,
                31 => 2,
                p => (1u128 << (32 - u32::from(p))) - 2,
            },
            IpNetwork::V6(net) => match net.prefix() {
                128 => 1,
                127 => 2,
                // 2^128 - 1 is exactly u128::MAX.
                0 => u128::MAX,
                p => (1u128 << (128 - u32::from(p))) - 1,
            },
        }
    }

    /// Iterate over the usable host addresses in ascending order.
    ///
    /// Each call starts a fresh iteration. For IPv4 the network and
    /// broadcast addresses are skipped unless the prefix is /31 or /32; for
    /// IPv6 the subnet-router address is skipped unless the prefix is /127
    /// or /128.
    pub fn hosts(&self) -> impl Iterator<Item = IpAddr> {
        let excluded = self.excluded();
        self.network
            .iter()
            .filter(move |ip| !excluded.contains(&Some(*ip)))
    }

    fn excluded(&self) -> [Option<IpAddr>; 2] {
        match self.network {
            IpNetwork::V4(net) if net.prefix() < 31 => [
                Some(IpAddr::V4(net.network())),
                Some(IpAddr::V4(net.broadcast())),
            ],
            IpNetwork::V6(net) if net.prefix() < 127 => [Some(IpAddr::V6(net.network())), None],
            _ => [None, None],
        }
    }
}

impl FromStr for NetworkRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_ipv4_host_counts() {
        for prefix in 20..=30u32 {
            let net = NetworkRange::parse(&format!("10.1.0.0/{}", prefix)).unwrap();
            let expected = (1u128 << (32 - prefix)) - 2;
            assert_eq!(net.host_count(), expected, "/{}", prefix);
            assert_eq!(net.hosts().count() as u128, expected, "/{}", prefix);
        }
    }

    #[test]
    fn test_count_without_iterating() {
        let net = NetworkRange::parse("0.0.0.0/0").unwrap();
        assert_eq!(net.host_count(), (1u128 << 32) - 2);
        let net = NetworkRange::parse("::/0").unwrap();
        assert_eq!(net.host_count(), u128::MAX);
    }

    #[test]
    fn test_excludes_network_and_broadcast() {
        let net = NetworkRange::parse("192.168.1.0/30").unwrap();
        let hosts: Vec<IpAddr> = net.hosts().collect();
        assert_eq!(
            hosts,
            vec![
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)),
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2)),
            ]
        );
    }

    #[test]
    fn test_point_to_point_and_single() {
        assert_eq!(NetworkRange::parse("10.0.0.0/31").unwrap().hosts().count(), 2);

        let single = NetworkRange::parse("10.0.0.7").unwrap();
        assert_eq!(single.prefix(), 32);
        assert_eq!(
            single.hosts().collect::<Vec<_>>(),
            vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))]
        );
    }

    #[test]
    fn test_host_bits_are_masked() {
        let net = NetworkRange::parse("192.168.1.77/24").unwrap();
        assert_eq!(net.to_string(), "192.168.1.0/24");
        assert_eq!(
            net.hosts().next(),
            Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)))
        );
    }

    #[test]
    fn test_restartable() {
        let net = NetworkRange::parse("172.16.0.0/29").unwrap();
        let first: Vec<_> = net.hosts().collect();
        let second: Vec<_> = net.hosts().collect();
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ipv6() {
        let net = NetworkRange::parse("fd00::/124").unwrap();
        assert_eq!(net.host_count(), 15);
        assert_eq!(net.hosts().count(), 15);
    }

    #[test]
    fn test_invalid_specs() {
        assert_eq!(
            NetworkRange::parse("10.0.0.0/33"),
            Err(RangeError::PrefixOutOfRange { prefix: 33, max: 32 })
        );
        assert_eq!(
            NetworkRange::parse("fd00::/129"),
            Err(RangeError::PrefixOutOfRange { prefix: 129, max: 128 })
        );
        assert!(matches!(
            NetworkRange::parse("10.0.0/24"),
            Err(RangeError::InvalidNetwork(_))
        ));
        assert!(matches!(
            NetworkRange::parse("10.0.0.0/-1"),
            Err(RangeError::InvalidNetwork(_))
        ));
        assert!(matches!(
            NetworkRange::parse("10.0.0.0/abc"),
            Err(RangeError::InvalidNetwork(_))
        ));
    }
}
