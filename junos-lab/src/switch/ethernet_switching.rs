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

//! Module to parse the ethernet-switching output of Junos switches

use super::table_parser::{parse_table, TableParseError};

/// A single VLAN membership of an interface, as reported by `show ethernet-switching interface` on
/// an EX switch (non-ELS output format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwitchingMember {
    /// Logical interface, e.g., `ge-0/0/10.0`
    pub interface: String,
    /// State of the interface (`up` or `down`)
    pub state: String,
    /// Name of the VLAN
    pub vlan: String,
    /// VLAN tag. The default VLAN has no tag.
    pub tag: Option<u16>,
    /// `tagged` or `untagged`
    pub tagging: String,
    /// `blocked` or `unblocked`
    pub blocking: String,
}

impl SwitchingMember {
    /// Parse the output of `show ethernet-switching interface`. An interface with multiple VLANs is
    /// printed with one row per VLAN, where only the first row names the interface and its state.
    ///
    /// ```text
    /// Interface    State  VLAN members        Tag   Tagging  Blocking
    /// ge-0/0/10.0  up     v1001               1001  tagged   unblocked
    ///                     v1002               1002  tagged   unblocked
    /// ```
    pub fn from_table(table: &str) -> Result<Vec<Self>, TableParseError> {
        let rows = parse_table(
            table,
            [
                "Interface",
                "State",
                "VLAN members",
                "Tag",
                "Tagging",
                "Blocking",
            ],
        )?;

        let mut results: Vec<Self> = Vec::with_capacity(rows.len());
        for [interface, state, vlan, tag, tagging, blocking] in rows {
            // prompt lines like `{master:0}`
            if interface.starts_with('{') {
                continue;
            }
            let (interface, state) = if interface.is_empty() {
                let last = results
                    .last()
                    .ok_or_else(|| TableParseError::MissingInterface(vlan.to_string()))?;
                (last.interface.clone(), last.state.clone())
            } else {
                (interface.to_string(), state.to_string())
            };
            let tag = if tag.is_empty() {
                None
            } else {
                Some(
                    tag.parse::<u16>()
                        .map_err(|e| TableParseError::InvalidCell(tag.to_string(), e))?,
                )
            };
            results.push(Self {
                interface,
                state,
                vlan: vlan.to_string(),
                tag,
                tagging: tagging.to_string(),
                blocking: blocking.to_string(),
            });
        }

        Ok(results)
    }

    /// Check if the membership is currently forwarding traffic.
    pub fn is_active(&self) -> bool {
        self.state == "up" && self.blocking == "unblocked"
    }
}
