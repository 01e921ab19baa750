// VlanCheck: VLAN membership check for Junos switches
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
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

//! This library contains the methods for talking to a Junos switch in the lab over SSH.
//!
//! # Configuration
//!
//! A device is described by a [`config::DeviceConfig`]: the SSH host name, the user name and an
//! optional password. All values have defaults that point to the EX4200 top-of-rack switch of the
//! lab. The configuration can be read from a TOML file, whose path is either given explicitly or
//! taken from the environment variable `VLAN_CHECK_CONFIG`. The password can be overwritten with
//! the environment variable `VLAN_CHECK_PASSWORD`.
//!
//! ```toml
//! interface = "ge-0/0/10"
//! vlan_tags = [1001, 1002, 1003, 1004, 1005]
//!
//! [device]
//! host = "dc-nm-ex4200-a"
//! username = "root"
//! password = "..."
//! ```
//!
//! # Sessions
//!
//! A [`switch::JunosSession`] wraps the system `ssh` client. Calling `open` starts an SSH control
//! master on a private control socket, every `cli` call is multiplexed over that master, and
//! `close` shuts the master down again. If a password is configured, the master is started through
//! `sshpass`, so make sure it is installed on the machine running the checks. Without a password,
//! the host must be reachable with key authentication (`BatchMode=yes`). The host key of a switch
//! that is not yet in `known_hosts` is accepted and added on the first connection
//! (`StrictHostKeyChecking=accept-new`). A changed host key still fails the connection.
//!
//! Logging in as `root` lands in the FreeBSD shell of the switch instead of the Junos CLI. For that
//! user, all commands are wrapped into `cli -c '...'`.
//!
//! # Locking
//!
//! There is no locking. Every session owns its own control socket, so multiple sessions to the
//! same switch do not interfere with each other.

pub mod config;
pub mod ssh;
pub mod switch;

#[cfg(test)]
mod test;

pub use config::{ConfigError, DeviceConfig};
pub use ssh::SshError;
pub use switch::{DeviceTransport, JunosError, JunosSession, SwitchingMember, TableParseError};
