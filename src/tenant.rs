// VlanCheck: VLAN membership check for Junos switches
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Planning of tenant subnets. A tenant network is a large address block (the tenant CIDR) that is
//! split into smaller subnets of `mask_bits` each. Tests create their subnets from this block and
//! then check that the switch learned the corresponding VLAN.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

use ipnet::{IpNet, Ipv4Net, Ipv6Net, PrefixLenError};
use rand::Rng;
use thiserror::Error;

/// The block from which tenant subnets are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TenantNetwork {
    cidr: IpNet,
    mask_bits: u8,
}

/// Range of addresses handed out to ports on a subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocationPool {
    /// First address of the pool
    pub start: IpAddr,
    /// Last address of the pool (inclusive)
    pub end: IpAddr,
}

impl fmt::Display for AllocationPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl TenantNetwork {
    /// Create a new tenant network. `mask_bits` must be at least the prefix length of `cidr`, and
    /// at most the address width. Host bits of `cidr` are cleared.
    pub fn new(cidr: IpNet, mask_bits: u8) -> Result<Self, TenantError> {
        if mask_bits < cidr.prefix_len() || mask_bits > cidr.max_prefix_len() {
            return Err(TenantError::InvalidMaskBits(cidr, mask_bits));
        }
        Ok(Self {
            cidr: cidr.trunc(),
            mask_bits,
        })
    }

    /// The default IPv4 tenant network: `10.100.0.0/16`, split into `/28` subnets.
    pub fn ipv4() -> Self {
        Self {
            cidr: Ipv4Net::new(Ipv4Addr::new(10, 100, 0, 0), 16)
                .expect("16 is a valid IPv4 prefix length")
                .into(),
            mask_bits: 28,
        }
    }

    /// The default IPv6 tenant network: `2003::/48`, split into `/64` subnets.
    pub fn ipv6() -> Self {
        Self {
            cidr: Ipv6Net::new(Ipv6Addr::new(0x2003, 0, 0, 0, 0, 0, 0, 0), 48)
                .expect("48 is a valid IPv6 prefix length")
                .into(),
            mask_bits: 64,
        }
    }

    /// The tenant CIDR.
    pub fn cidr(&self) -> IpNet {
        self.cidr
    }

    /// The prefix length of the subnets.
    pub fn mask_bits(&self) -> u8 {
        self.mask_bits
    }

    /// The first subnet block of the tenant network.
    pub fn first_subnet_block(&self) -> Result<IpNet, TenantError> {
        Ok(IpNet::new(self.cidr.network(), self.mask_bits)?)
    }

    /// The last subnet block of the tenant network. Tests use this block, since it is the least
    /// likely to collide with subnets created by other tests.
    pub fn last_subnet_block(&self) -> Result<IpNet, TenantError> {
        Ok(IpNet::new(self.cidr.broadcast(), self.mask_bits)?.trunc())
    }

    /// The gateway of the first subnet block, i.e., the address following its network address.
    pub fn first_gateway(&self) -> Result<IpAddr, TenantError> {
        offset(self.cidr.network(), 1)
    }

    /// The gateway of the last subnet block.
    pub fn last_subnet_gateway(&self) -> Result<IpAddr, TenantError> {
        offset(self.last_subnet_block()?.network(), 1)
    }

    /// The allocation pool of the first subnet: two addresses, starting two addresses after the
    /// gateway.
    pub fn allocation_pool(&self) -> Result<AllocationPool, TenantError> {
        let gateway = self.first_gateway()?;
        let pool = AllocationPool {
            start: offset(gateway, 2)?,
            end: offset(gateway, 3)?,
        };
        let block = self.first_subnet_block()?;
        if block.contains(&pool.end) {
            Ok(pool)
        } else {
            Err(TenantError::PoolOutsideBlock(pool, block))
        }
    }
}

/// Add `n` to `addr`.
fn offset(addr: IpAddr, n: u32) -> Result<IpAddr, TenantError> {
    match addr {
        IpAddr::V4(a) => u32::from(a)
            .checked_add(n)
            .map(|x| IpAddr::V4(Ipv4Addr::from(x))),
        IpAddr::V6(a) => u128::from(a)
            .checked_add(n as u128)
            .map(|x| IpAddr::V6(Ipv6Addr::from(x))),
    }
    .ok_or(TenantError::Overflow(addr, n))
}

/// Generate a random resource name: `<name>-<random number>`. If `name` is empty, only the number
/// is returned.
pub fn rand_name(name: &str) -> String {
    let n: u32 = rand::thread_rng().gen_range(1..=0x7fff_ffff);
    if name.is_empty() {
        n.to_string()
    } else {
        format!("{name}-{n}")
    }
}

/// Error thrown while planning tenant subnets.
#[derive(Debug, Error)]
pub enum TenantError {
    /// The subnet prefix length does not fit the tenant CIDR.
    #[error("Cannot split {0} into subnets with prefix length {1}")]
    InvalidMaskBits(IpNet, u8),
    /// Invalid prefix length
    #[error("Invalid prefix length: {0}")]
    PrefixLen(#[from] PrefixLenError),
    /// Address arithmetic overflowed
    #[error("Cannot add {1} to {0}")]
    Overflow(IpAddr, u32),
    /// The allocation pool does not fit into the subnet.
    #[error("Allocation pool {0} does not fit into {1}")]
    PoolOutsideBlock(AllocationPool, IpNet),
}
