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

//! Module for managing SSH sessions.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command as StdCommand, Output, Stdio},
    time::Duration,
};

use itertools::Itertools;
use thiserror::Error;
use tokio::{process::Command, time::timeout};

pub const EMPTY: &[&str] = &[];

/// Exit code of `ssh` itself when the connection fails.
const SSH_FAILURE: i32 = 255;

/// Time to wait for the control master to be established.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// This is an SSH session with a remote host that runs over an explicitly managed control master.
///
/// The control master is started with [`SshSession::start_master`] and stopped with
/// [`SshSession::stop_master`]. All commands are multiplexed over the control socket at
/// `control_path`, so they never need to authenticate themselves. If a password is given, the
/// master is started with `sshpass -e`, which reads the password from the `SSHPASS` environment
/// variable.
#[derive(Clone)]
pub struct SshSession {
    /// SSH destination (`user@host`)
    destination: String,
    /// Password used to authenticate the control master
    password: Option<String>,
    /// Path of the control socket
    control_path: PathBuf,
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession")
            .field("destination", &self.destination)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("control_path", &self.control_path)
            .finish()
    }
}

impl SshSession {
    /// Create a new SSH Session with the destination. This does not connect to the host yet.
    pub fn new(
        destination: impl Into<String>,
        password: Option<String>,
        control_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            destination: destination.into(),
            password,
            control_path: control_path.into(),
        }
    }

    /// Get the destination of the session.
    pub fn name(&self) -> &str {
        &self.destination
    }

    /// Get the path of the control socket.
    pub fn control_path(&self) -> &Path {
        &self.control_path
    }

    /// Start the control master in the background (`ssh -M -N -f`). This returns as soon as the
    /// master is authenticated. Diagnostic output of ssh is written to `log_file`, since the
    /// background process would otherwise keep stderr open.
    pub async fn start_master(&self, log_file: impl AsRef<Path>) -> Result<(), SshError> {
        log::trace!("[{}] connecting...", self.name());

        let mut cmd = Command::from(self.master_command(log_file.as_ref()));
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let status = match timeout(CONNECT_TIMEOUT, cmd.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                log::error!("[{}] Cannot spawn the ssh client: {e}", self.name());
                return Err(SshError::Setup(e));
            }
            Err(_) => {
                log::error!("[{}] connection timeout!", self.name());
                return Err(SshError::Timeout);
            }
        };

        if status.success() {
            log::trace!("[{}] connection established!", self.name());
            Ok(())
        } else {
            let reason = std::fs::read_to_string(log_file.as_ref()).unwrap_or_default();
            let code = status.code().unwrap_or_default();
            log::error!(
                "[{}] Cannot establish the connection (exit code {code}){}",
                self.name(),
                if reason.trim().is_empty() {
                    String::new()
                } else {
                    format!(":\n{}", reason.trim())
                }
            );
            Err(SshError::Connect(self.name().to_string(), code))
        }
    }

    /// Stop the control master (`ssh -O exit`).
    pub async fn stop_master(&self) -> Result<(), SshError> {
        log::trace!("[{}] disconnecting...", self.name());
        let mut cmd = Command::from(self.std_command(&["-O", "exit"]));
        cmd.kill_on_drop(true);
        let output = cmd.output().await?;
        check_output(self.name(), output, || "ssh -O exit").map(|_| ())
    }

    /// Stop the control master without an async runtime. Errors are ignored. This is used when
    /// dropping a session that was not closed.
    pub fn stop_master_blocking(&self) {
        log::debug!("[{}] Closing the connection (drop)", self.name());
        let _ = self
            .std_command(&["-O", "exit"])
            .stdin(Stdio::null())
            .output();
    }

    /// Create a raw `ssh` command that is multiplexed over the control master, with
    /// `kill_on_drop = true` to kill the process once it is dropped.
    pub(crate) fn raw_command(&self, args: &[impl AsRef<OsStr>]) -> Command {
        let mut cmd = Command::from(self.std_command(args));
        log::trace!("[tokio::process::Command] {:?}", cmd);
        cmd.kill_on_drop(true);
        cmd
    }

    /// Execute a command on the remote host and return its raw output. This function will **not**
    /// check the exit code of the remote command. Only if `ssh` itself fails (exit code 255), an
    /// error is returned.
    pub async fn execute_cmd_output(
        &self,
        args: &[impl AsRef<str> + Sync],
    ) -> Result<Output, SshError> {
        let cmd_str = || args.iter().map(AsRef::as_ref).join(" ");

        log::trace!("[{}] `{}`", self.name(), cmd_str());
        let mut cmd = self.raw_command(EMPTY);
        for arg in args {
            cmd.arg(arg.as_ref());
        }
        let output = match cmd.output().await {
            Ok(out) => out,
            Err(e) => {
                log::error!("[{}] {} failed: {}", self.name(), cmd_str(), e);
                Err(e)?
            }
        };

        if output.status.code() == Some(SSH_FAILURE) {
            log::error!(
                "[{}] {} failed: ssh exited with exit code {SSH_FAILURE}{}",
                self.name(),
                cmd_str(),
                if output.stderr.is_empty() {
                    String::new()
                } else {
                    format!("\nSTDERR:\n{}", String::from_utf8_lossy(&output.stderr))
                }
            );
            return Err(SshError::CommandError(
                self.name().to_string(),
                cmd_str(),
                SSH_FAILURE,
            ));
        }
        Ok(output)
    }

    /// Create a raw `ssh` command for a slave connection with the following attributes set:
    /// - `oControlMaster=no`
    /// - `oControlPath=<control_path>`
    /// - `oBatchMode=yes`
    /// - `args` as given by the other arguments.
    /// - `destination` to connect to.
    pub fn std_command(&self, args: &[impl AsRef<OsStr>]) -> StdCommand {
        let mut cmd = StdCommand::new("ssh");
        cmd.arg("-oControlMaster=no")
            .arg(self.control_path_arg())
            .arg("-oBatchMode=yes")
            .args(args)
            .arg(self.name());
        cmd
    }

    /// Create the command that starts the control master. With a password, this is
    /// `sshpass -e ssh ...` with `SSHPASS` set in the environment of the child. Unknown host keys
    /// are accepted and stored, since `sshpass` cannot answer the confirmation prompt.
    pub fn master_command(&self, log_file: &Path) -> StdCommand {
        let mut cmd = match self.password.as_ref() {
            Some(password) => {
                let mut cmd = StdCommand::new("sshpass");
                cmd.env("SSHPASS", password).arg("-e").arg("ssh");
                cmd.arg("-oBatchMode=no")
                    .arg("-oPubkeyAuthentication=no")
                    .arg("-oNumberOfPasswordPrompts=1");
                cmd
            }
            None => {
                let mut cmd = StdCommand::new("ssh");
                cmd.arg("-oBatchMode=yes");
                cmd
            }
        };
        cmd.arg("-oStrictHostKeyChecking=accept-new")
            .arg("-oControlMaster=yes")
            .arg(self.control_path_arg())
            .arg(format!("-oConnectTimeout={}", CONNECT_TIMEOUT.as_secs()))
            .arg("-E")
            .arg(log_file)
            .arg("-M")
            .arg("-N")
            .arg("-f")
            .arg(self.name());
        cmd
    }

    fn control_path_arg(&self) -> String {
        format!("-oControlPath={}", self.control_path.display())
    }
}

/// Check the output for successful exit code
pub fn check_output<F, S>(
    host: &str,
    output: Output,
    cmd: F,
) -> Result<(Vec<u8>, Vec<u8>), SshError>
where
    F: FnOnce() -> S,
    S: std::fmt::Display,
{
    if output.status.success() {
        Ok((output.stdout, output.stderr))
    } else {
        let cmd = cmd().to_string();
        log::error!(
            "[{}] {} exited with exit code {}{}{}",
            host,
            cmd,
            output.status.code().unwrap_or_default(),
            if !output.stdout.is_empty() {
                format!("\nSTDOUT:\n{}", String::from_utf8_lossy(&output.stdout))
            } else {
                String::new()
            },
            if !output.stderr.is_empty() {
                format!("\nSTDERR:\n{}", String::from_utf8_lossy(&output.stderr))
            } else {
                String::new()
            }
        );
        Err(SshError::CommandError(
            host.to_string(),
            cmd,
            output.status.code().unwrap_or_default(),
        ))
    }
}

/// Error kind returned by [`SshSession`].
#[derive(Debug, Error)]
pub enum SshError {
    /// Error while spawning the ssh client
    #[error("Error while establishing the connection: {0}")]
    Setup(std::io::Error),
    /// The control master could not be established (e.g., authentication failure).
    #[error("Cannot connect to {0} (exit code {1})")]
    Connect(String, i32),
    /// Timeout while establishing the session
    #[error("Timeout while establishing the session.")]
    Timeout,
    /// Error while interacting with the main connection
    #[error("SSH Client error: {0}")]
    Client(#[from] std::io::Error),
    /// Error while executing a command.
    #[error("Non-zero exit code of command {1} on {0}: {2}")]
    CommandError(String, String, i32),
}

impl SshError {
    /// Return the status code if the error was a [`SshError::CommandError`]. Otherwise, return
    /// `None`.
    pub fn status(&self) -> Option<i32> {
        if let SshError::CommandError(_, _, status) = self {
            Some(*status)
        } else {
            None
        }
    }
}
