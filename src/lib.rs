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

//! # VlanCheck: VLAN membership check for Junos switches
//!
//! Integration tests of the cloud networking API create networks and subnets, wait for the
//! configuration to reach the physical network, and then verify that the top-of-rack switch
//! carries the tenant VLAN on the interface towards the compute nodes. After cleaning up, they
//! verify that the VLAN is gone again. This crate implements that verification.
//!
//! ## Structure
//! - The module [`checker`] contains the membership check itself ([`checker::check_vlan`]), as
//!   well as the variants that wait for the configuration to settle
//!   ([`checker::wait_and_check`]) and that compare against an expected state
//!   ([`checker::expect_vlan`]).
//! - The module [`tenant`] computes the subnets, gateways and allocation pools that tests use when
//!   creating tenant networks.
//! - Everything that talks to the switch lives in a separate crate: [`junos_lab`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use vlan_check::checker::{expect_vlan, VlanCheck, VlanState};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let check = VlanCheck::load(None)?;
//! // after creating the subnet
//! expect_vlan(&check, Duration::from_secs(60), VlanState::Present).await?;
//! // after the cleanup
//! expect_vlan(&check, Duration::from_secs(60), VlanState::Absent).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_debug_implementations, rust_2018_idioms)]
#![warn(missing_docs)]

pub mod checker;
pub mod tenant;
#[cfg(test)]
mod test;

pub use checker::{check_vlan, Overrides, VlanCheck, VlanCheckError, VlanState};
pub use tenant::{rand_name, TenantNetwork};
