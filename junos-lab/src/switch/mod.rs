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

//! This module implements an SSH session for Junos switches. The session exposes the three
//! operations `open`, `cli` and `close` through the [`DeviceTransport`] trait.

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;

use crate::{
    config::DeviceConfig,
    ssh::{SshError, SshSession},
};

mod ethernet_switching;
pub(crate) mod table_parser;
pub use ethernet_switching::SwitchingMember;
pub use table_parser::TableParseError;

/// A transport to a network device that can execute CLI commands.
///
/// A transport is used for a single exchange: it is opened, used to execute commands with
/// [`DeviceTransport::cli`], and then closed again.
#[async_trait]
pub trait DeviceTransport: Send {
    /// Establish the session with the device.
    async fn open(&mut self) -> Result<(), JunosError>;

    /// Execute a CLI command and return its textual output.
    async fn cli(&mut self, command: &str) -> Result<String, JunosError>;

    /// Tear down the session.
    async fn close(&mut self) -> Result<(), JunosError>;
}

/// The CLI command that shows the VLAN membership of an interface.
pub fn show_ethernet_switching(iface: &str) -> String {
    format!("show ethernet-switching interface {iface}")
}

/// An SSH session to a Junos switch.
///
/// The session owns a private temporary directory which holds the control socket and the ssh log
/// file. The directory is removed once the session is dropped. Dropping an open session will close
/// the connection.
///
/// ```rust,no_run
/// use junos_lab::{DeviceConfig, DeviceTransport, JunosSession};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
///
/// let mut s = JunosSession::new(&DeviceConfig::default())?;
/// s.open().await?;
/// let uptime = s.cli("show system uptime").await?;
/// s.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JunosSession {
    ssh: SshSession,
    root_shell: bool,
    control_dir: TempDir,
    open: bool,
}

impl JunosSession {
    /// Prepare a new session to the given device. This will not yet connect to the device.
    pub fn new(device: &DeviceConfig) -> Result<Self, JunosError> {
        let control_dir = tempfile::Builder::new().prefix("vlan-check").tempdir()?;
        let ssh = SshSession::new(
            device.destination(),
            device.password.clone(),
            control_dir.path().join("ctl"),
        );
        Ok(Self {
            ssh,
            root_shell: device.root_shell(),
            control_dir,
            open: false,
        })
    }

    /// Get the SSH destination of the session.
    pub fn name(&self) -> &str {
        self.ssh.name()
    }

    /// Check whether the session is currently open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Get the command that is sent over SSH to execute `command` in the Junos CLI. Users landing
    /// in the FreeBSD shell need to go through `cli -c`.
    pub fn remote_command(&self, command: &str) -> String {
        if self.root_shell {
            format!("cli -c '{}'", command.replace('\'', r"'\''"))
        } else {
            command.to_string()
        }
    }
}

#[async_trait]
impl DeviceTransport for JunosSession {
    async fn open(&mut self) -> Result<(), JunosError> {
        if self.open {
            return Ok(());
        }
        log::debug!("[{}] Open session", self.name());
        self.ssh
            .start_master(self.control_dir.path().join("ssh.log"))
            .await?;
        self.open = true;
        Ok(())
    }

    async fn cli(&mut self, command: &str) -> Result<String, JunosError> {
        if !self.open {
            return Err(JunosError::NotConnected(self.name().to_string()));
        }
        let output = self
            .ssh
            .execute_cmd_output(&[self.remote_command(command)])
            .await?;

        if !output.status.success() {
            log::warn!(
                "[{}] {} exited with exit code {}",
                self.name(),
                command,
                output.status.code().unwrap_or_default()
            );
        }
        if !output.stderr.is_empty() {
            log::warn!(
                "[{}] {} returned non-empty stderr:\n{}",
                self.name(),
                command,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn close(&mut self) -> Result<(), JunosError> {
        if !self.open {
            return Ok(());
        }
        log::debug!("[{}] Close session", self.name());
        // the master is gone either way, even if `-O exit` reports an error.
        self.open = false;
        self.ssh.stop_master().await?;
        Ok(())
    }
}

impl Drop for JunosSession {
    fn drop(&mut self) {
        if self.open {
            self.ssh.stop_master_blocking();
        }
    }
}

/// Error type thrown by the Junos session
#[derive(Debug, Error)]
pub enum JunosError {
    /// The session was used before it was opened.
    #[error("The session to {0} is not open")]
    NotConnected(String),
    /// Error of the SSH transport
    #[error("Session error: {0}")]
    Ssh(#[from] SshError),
    /// I/O Error occurred while preparing the session
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}
