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

//! Check whether a switch interface is a member of one of the tenant VLANs.
//!
//! The check opens a session to the switch, executes `show ethernet-switching interface <iface>`,
//! closes the session, and then searches the output for any of the configured VLAN tags. A tag only
//! matches if it is surrounded by single spaces (`" 1005 "`), so that `11005` or `10050` are never
//! mistaken for `1005`.

use std::{collections::BTreeSet, fmt, path::Path, time::Duration};

use clap::{Args, ValueEnum};
use itertools::Itertools;
use junos_lab::{
    config::{check_interface, load_config, ConfigError},
    switch::show_ethernet_switching,
    DeviceConfig, DeviceTransport, JunosError, JunosSession, SwitchingMember, TableParseError,
};
use serde::Deserialize;
use thiserror::Error;

/// Interface of the switch that connects the compute nodes.
pub const DEFAULT_INTERFACE: &str = "ge-0/0/10";
/// VLAN tags assigned to tenant networks.
pub const DEFAULT_VLAN_TAGS: [u16; 5] = [1001, 1002, 1003, 1004, 1005];

/// Everything needed to perform a VLAN membership check: which device to ask, which interface to
/// look at, and which VLAN tags to look for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VlanCheck {
    /// The switch to connect to.
    pub device: DeviceConfig,
    /// Interface to inspect.
    pub interface: String,
    /// VLAN tags of interest. The interface is a member if any of them shows up.
    pub vlan_tags: BTreeSet<u16>,
}

impl Default for VlanCheck {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            interface: DEFAULT_INTERFACE.to_string(),
            vlan_tags: DEFAULT_VLAN_TAGS.into_iter().collect(),
        }
    }
}

impl VlanCheck {
    /// Load the check from a TOML file (see [`junos_lab::config::load_config`]). Missing values are
    /// replaced by their defaults, and the password is taken from `VLAN_CHECK_PASSWORD` if set.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut check: Self = load_config(path)?;
        check.device.apply_env();
        Ok(check)
    }

    /// The CLI command that is executed on the switch.
    pub fn command(&self) -> String {
        show_ethernet_switching(&self.interface)
    }

    /// Replace the configured values with those given in `overrides`. Values that are not set in
    /// `overrides` are kept. If `overrides` contains any VLAN tag, the configured tags are replaced
    /// entirely.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.device.host = host;
        }
        if let Some(user) = overrides.user {
            self.device.username = user;
        }
        if let Some(interface) = overrides.interface {
            self.interface = interface;
        }
        if !overrides.tags.is_empty() {
            self.vlan_tags = overrides.tags.into_iter().collect();
        }
    }

    /// Make sure that the check can be performed.
    pub fn validate(&self) -> Result<(), VlanCheckError> {
        check_interface(&self.interface)?;
        if self.vlan_tags.is_empty() {
            return Err(VlanCheckError::NoVlanTags);
        }
        Ok(())
    }
}

/// Values that overwrite the configuration, usually given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct Overrides {
    /// SSH host name of the switch.
    #[clap(long = "host")]
    pub host: Option<String>,
    /// User to log in with.
    #[clap(long = "user", short = 'u')]
    pub user: Option<String>,
    /// Interface to inspect.
    #[clap(long = "interface", short = 'i')]
    pub interface: Option<String>,
    /// VLAN tag to look for. Can be given multiple times and replaces the configured tags.
    #[clap(long = "tag", short = 't')]
    pub tags: Vec<u16>,
}

/// Whether the VLAN is configured on the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum VlanState {
    /// At least one of the VLAN tags is configured on the interface.
    Present,
    /// None of the VLAN tags is configured on the interface.
    Absent,
}

impl From<bool> for VlanState {
    fn from(found: bool) -> Self {
        if found {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

impl fmt::Display for VlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
        }
    }
}

/// The pattern searched for in the CLI output.
pub fn vlan_pattern(tag: u16) -> String {
    format!(" {tag} ")
}

/// Get all tags that appear in `output`, surrounded by single spaces.
pub fn matching_tags<'a>(output: &str, tags: impl IntoIterator<Item = &'a u16>) -> Vec<u16> {
    tags.into_iter()
        .copied()
        .filter(|tag| output.contains(&vlan_pattern(*tag)))
        .collect()
}

/// Check if any of the tags appears in `output`. Empty or malformed output never matches.
pub fn contains_vlan_tag<'a>(output: &str, tags: impl IntoIterator<Item = &'a u16>) -> bool {
    tags.into_iter().any(|tag| output.contains(&vlan_pattern(*tag)))
}

/// Open the transport, execute the command of `check`, and close the transport again. The transport
/// is closed exactly once if it was opened, no matter whether the command succeeded.
async fn run_command<T>(transport: &mut T, check: &VlanCheck) -> Result<String, VlanCheckError>
where
    T: DeviceTransport + ?Sized,
{
    transport.open().await.map_err(VlanCheckError::Connect)?;
    let output = transport.cli(&check.command()).await;
    if let Err(e) = transport.close().await {
        log::warn!("[{}] Cannot close the session: {e}", check.device.host);
    }
    output.map_err(VlanCheckError::Command)
}

/// Perform the check over the given transport.
///
/// The transport is opened, used for exactly one command, and closed again before the output is
/// inspected. The transport is closed exactly once, even if the command fails. If opening the
/// transport fails, it is not closed, and [`VlanCheckError::Connect`] is returned.
///
/// Whatever text the device returns is searched for the tags, including device-side error
/// messages. Only a failure of the transport itself results in [`VlanCheckError::Command`].
pub async fn check_vlan_with<T>(
    transport: &mut T,
    check: &VlanCheck,
) -> Result<bool, VlanCheckError>
where
    T: DeviceTransport + ?Sized,
{
    check.validate()?;
    let host = check.device.host.as_str();
    let output = run_command(transport, check).await?;

    let found = matching_tags(&output, &check.vlan_tags);
    if found.is_empty() {
        log::debug!(
            "[{host}] None of the VLANs {} is configured on {}",
            check.vlan_tags.iter().join(", "),
            check.interface
        );
    } else {
        log::debug!(
            "[{host}] VLAN {} configured on {}",
            found.iter().join(", "),
            check.interface
        );
    }
    Ok(!found.is_empty())
}

/// Perform the check on the switch described in `check.device`.
pub async fn check_vlan(check: &VlanCheck) -> Result<bool, VlanCheckError> {
    let mut session = JunosSession::new(&check.device).map_err(VlanCheckError::Connect)?;
    check_vlan_with(&mut session, check).await
}

/// Wait for `settle` to let the configuration propagate to the switch, then perform the check over
/// the given transport.
pub async fn wait_and_check_with<T>(
    transport: &mut T,
    check: &VlanCheck,
    settle: Duration,
) -> Result<bool, VlanCheckError>
where
    T: DeviceTransport + ?Sized,
{
    if !settle.is_zero() {
        log::info!(
            "[{}] Waiting {}s for the configuration to settle.",
            check.device.host,
            settle.as_secs_f64()
        );
        tokio::time::sleep(settle).await;
    }
    check_vlan_with(transport, check).await
}

/// Wait for `settle`, then perform the check on the switch described in `check.device`.
pub async fn wait_and_check(check: &VlanCheck, settle: Duration) -> Result<bool, VlanCheckError> {
    let mut session = JunosSession::new(&check.device).map_err(VlanCheckError::Connect)?;
    wait_and_check_with(&mut session, check, settle).await
}

/// Wait for `settle`, perform the check, and make sure the VLAN is in the `expected` state.
pub async fn expect_vlan_with<T>(
    transport: &mut T,
    check: &VlanCheck,
    settle: Duration,
    expected: VlanState,
) -> Result<(), VlanCheckError>
where
    T: DeviceTransport + ?Sized,
{
    let found = VlanState::from(wait_and_check_with(transport, check, settle).await?);
    if found == expected {
        Ok(())
    } else {
        log::error!(
            "[{}] Expected the VLAN to be {expected} on {}, but it is {found}!",
            check.device.host,
            check.interface
        );
        Err(VlanCheckError::Unexpected { expected, found })
    }
}

/// Like [`expect_vlan_with`], on the switch described in `check.device`.
pub async fn expect_vlan(
    check: &VlanCheck,
    settle: Duration,
    expected: VlanState,
) -> Result<(), VlanCheckError> {
    let mut session = JunosSession::new(&check.device).map_err(VlanCheckError::Connect)?;
    expect_vlan_with(&mut session, check, settle, expected).await
}

/// Get the parsed VLAN memberships of the interface over the given transport. The transport is
/// closed before the output is parsed.
pub async fn list_members_with<T>(
    transport: &mut T,
    check: &VlanCheck,
) -> Result<Vec<SwitchingMember>, VlanCheckError>
where
    T: DeviceTransport + ?Sized,
{
    check_interface(&check.interface)?;
    let output = run_command(transport, check).await?;
    Ok(SwitchingMember::from_table(&output)?)
}

/// Get the parsed VLAN memberships of the interface on the switch described in `check.device`.
pub async fn list_members(check: &VlanCheck) -> Result<Vec<SwitchingMember>, VlanCheckError> {
    let mut session = JunosSession::new(&check.device).map_err(VlanCheckError::Connect)?;
    list_members_with(&mut session, check).await
}

/// Error thrown while checking VLAN membership.
#[derive(Debug, Error)]
pub enum VlanCheckError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// No VLAN tags were configured.
    #[error("No VLAN tags to look for!")]
    NoVlanTags,
    /// Cannot connect or authenticate to the switch.
    #[error("Cannot connect to the switch: {0}")]
    Connect(JunosError),
    /// The command could not be executed.
    #[error("Cannot execute the command: {0}")]
    Command(JunosError),
    /// The output of the switch is not the expected table.
    #[error("Cannot parse the output of the switch: {0}")]
    Parse(#[from] TableParseError),
    /// The VLAN is not in the expected state.
    #[error("Expected the VLAN to be {expected}, but it is {found}")]
    Unexpected {
        /// The expected state
        expected: VlanState,
        /// The actual state
        found: VlanState,
    },
}
