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

//! This module contains the code for reading the configuration.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

/// Environment variable pointing to the TOML configuration file.
pub const CONFIG_ENV: &str = "VLAN_CHECK_CONFIG";
/// Environment variable that overwrites the configured device password.
pub const PASSWORD_ENV: &str = "VLAN_CHECK_PASSWORD";

/// Host name of the switch in the lab.
pub const DEFAULT_HOST: &str = "dc-nm-ex4200-a";
/// User name used to log into the switch.
pub const DEFAULT_USERNAME: &str = "root";
/// Password used to log into the switch.
pub const DEFAULT_PASSWORD: &str = "Embe1mpls";

lazy_static! {
    /// Path of the configuration file given by `VLAN_CHECK_CONFIG`, if set.
    pub static ref CONFIG_PATH: Option<PathBuf> = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    static ref IFACE_RE: Regex =
        Regex::new(r"^(?:[a-z]{2,4}-[0-9]+/[0-9]+/[0-9]+|ae[0-9]+)(?:\.[0-9]+)?$").unwrap();
}

/// Connection properties of a switch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// The ssh hostname to reach the switch
    pub host: String,
    /// The user to log in with.
    pub username: String,
    /// Password of the user. If `None`, the session relies on key authentication.
    pub password: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: Some(DEFAULT_PASSWORD.to_string()),
        }
    }
}

impl DeviceConfig {
    /// The SSH destination, i.e., `user@host`.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }

    /// Whether the user lands in the FreeBSD shell after login, rather than in the Junos CLI.
    pub fn root_shell(&self) -> bool {
        self.username == "root"
    }

    /// Replace the password with the content of `VLAN_CHECK_PASSWORD`, if that variable is set.
    pub fn apply_env(&mut self) {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            log::debug!("[{}] Using password from {}", self.host, PASSWORD_ENV);
            self.password = Some(password);
        }
    }
}

/// Read a configuration of type `T` from the given TOML file. If no path is given, the file
/// pointed to by `VLAN_CHECK_CONFIG` is read instead. If neither exists, the default configuration
/// is returned.
pub fn load_config<T>(path: Option<&Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let path = match path.or(CONFIG_PATH.as_deref()) {
        Some(p) => p,
        None => {
            log::debug!("No configuration file given, using the defaults.");
            return Ok(T::default());
        }
    };
    log::debug!("Reading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
    load_config_str(&content)
}

/// Parse a configuration of type `T` from a TOML string.
pub fn load_config_str<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Check that `iface` is a valid Junos interface name, like `ge-0/0/10`, `xe-0/1/0.0` or `ae0`.
pub fn check_interface(iface: &str) -> Result<(), ConfigError> {
    if IFACE_RE.is_match(iface) {
        Ok(())
    } else {
        Err(ConfigError::InvalidInterface(iface.to_string()))
    }
}

/// Error while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Cannot read the configuration file
    #[error("Cannot read '{0}': {1}")]
    Read(String, std::io::Error),
    /// Cannot parse the configuration file
    #[error("Cannot parse the configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The interface name is not a Junos interface name.
    #[error("Invalid interface string: {0} (should be 'ge-X/Y/Z')")]
    InvalidInterface(String),
}
