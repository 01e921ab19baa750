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

use std::{error::Error, path::PathBuf, process::ExitCode, time::Duration};

use clap::{Args, Parser, Subcommand};
use ipnet::IpNet;
use junos_lab::ConfigError;

use vlan_check::{
    checker::{expect_vlan, list_members, wait_and_check, VlanCheck, VlanCheckError, VlanState},
    rand_name, Overrides, TenantNetwork,
};

/// Exit code if the VLAN is not in the state given with `--expect`.
const EXIT_UNEXPECTED: u8 = 1;
/// Exit code if the check could not be performed.
const EXIT_ERROR: u8 = 2;

/// Check the VLAN configuration of the lab switch.
#[derive(Debug, Parser)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check if any of the VLAN tags is configured on the interface. Prints `true` or `false`.
    Check {
        #[clap(flatten)]
        target: Target,
        /// Seconds to wait before asking the switch, to let the configuration propagate.
        #[clap(long = "settle", short = 's', default_value_t = 0)]
        settle: u64,
        /// Expected state of the VLAN. If it does not match, the program exits with code 1. Errors
        /// exit with code 2.
        #[clap(long = "expect", short = 'e')]
        expect: Option<VlanState>,
    },
    /// Print all VLAN memberships of the interface.
    Members {
        #[clap(flatten)]
        target: Target,
    },
    /// Plan the subnet of a new tenant network.
    PlanSubnet {
        /// The tenant CIDR from which subnets are allocated.
        #[clap(long = "cidr", default_value = "10.100.0.0/16")]
        cidr: IpNet,
        /// The prefix length of each subnet.
        #[clap(long = "mask-bits", default_value_t = 28)]
        mask_bits: u8,
        /// Base name of the network.
        #[clap(long = "name", default_value = "Juniper-network")]
        name: String,
    },
}

/// The switch and interface to look at.
#[derive(Debug, Args)]
struct Target {
    /// TOML configuration file. Defaults to `$VLAN_CHECK_CONFIG`.
    #[clap(long = "config", short = 'c')]
    config: Option<PathBuf>,
    #[clap(flatten)]
    overrides: Overrides,
}

impl Target {
    /// Load the configuration and apply the command line overrides.
    fn build(self) -> Result<VlanCheck, ConfigError> {
        let mut check = VlanCheck::load(self.config.as_deref())?;
        check.apply(self.overrides);
        Ok(check)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init_timed();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(args: Cli) -> Result<ExitCode, Box<dyn Error>> {
    match args.command {
        Command::Check {
            target,
            settle,
            expect,
        } => {
            let check = target.build()?;
            let settle = Duration::from_secs(settle);
            match expect {
                Some(expected) => match expect_vlan(&check, settle, expected).await {
                    Ok(()) => println!("{}", expected == VlanState::Present),
                    Err(VlanCheckError::Unexpected { found, .. }) => {
                        println!("{}", found == VlanState::Present);
                        return Ok(ExitCode::from(EXIT_UNEXPECTED));
                    }
                    Err(e) => return Err(e.into()),
                },
                None => println!("{}", wait_and_check(&check, settle).await?),
            }
        }
        Command::Members { target } => {
            let check = target.build()?;
            for m in list_members(&check).await? {
                println!(
                    "{:<14} {:<5} {:<20} {:<5} {:<9} {}",
                    m.interface,
                    m.state,
                    m.vlan,
                    m.tag.map(|t| t.to_string()).unwrap_or_default(),
                    m.tagging,
                    m.blocking,
                );
            }
        }
        Command::PlanSubnet {
            cidr,
            mask_bits,
            name,
        } => {
            let tenant = TenantNetwork::new(cidr, mask_bits)?;
            println!("name:          {}", rand_name(&name));
            println!(
                "subnet:        {} (gateway {})",
                tenant.last_subnet_block()?,
                tenant.last_subnet_gateway()?
            );
            println!("first gateway: {}", tenant.first_gateway()?);
            println!("allocation:    {}", tenant.allocation_pool()?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
