//! The two subnet categories share one generator and one CIDR parser.

use std::net::Ipv4Addr;

use rand::Rng;

const PREFIX_RANGE: std::ops::RangeInclusive<u8> = 8..=30;

pub(crate) fn generate(rng: &mut impl Rng) -> String {
    let addr = Ipv4Addr::from(rng.random::<u32>());
    let prefix = rng.random_range(PREFIX_RANGE);
    format!("{addr}/{prefix}")
}

/// An IPv4 address with a prefix length, e.g. `192.168.1.37/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Subnet {
    addr: u32,
    prefix: u8,
}

impl Subnet {
    pub(crate) fn parse(cidr: &str) -> Result<Self, String> {
        let (addr, prefix) = cidr
            .split_once('/')
            .ok_or_else(|| format!("{cidr:?} is not in a.b.c.d/n form"))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("{addr:?} is not an IPv4 address"))?;
        let prefix: u8 = prefix
            .parse()
            .ok()
            .filter(|p| *p <= 32)
            .ok_or_else(|| format!("{prefix:?} is not a prefix length"))?;

        Ok(Self {
            addr: addr.into(),
            prefix,
        })
    }

    fn mask(self) -> u32 {
        u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0)
    }

    pub(crate) fn network(self) -> Ipv4Addr {
        Ipv4Addr::from(self.addr & self.mask())
    }

    pub(crate) fn broadcast(self) -> Ipv4Addr {
        Ipv4Addr::from(self.addr | !self.mask())
    }

    /// Addresses in the block minus network and broadcast, floored at 0.
    pub(crate) fn usable_hosts(self) -> u64 {
        (1u64 << (32 - u32::from(self.prefix))).saturating_sub(2)
    }
}
