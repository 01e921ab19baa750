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

use pretty_assertions::assert_eq;

use crate::switch::{SwitchingMember, TableParseError};

#[test]
fn single_interface() {
    let table = "\
Interface    State  VLAN members        Tag   Tagging  Blocking
ge-0/0/10.0  up     tenant-1005         1005  tagged   unblocked
                    tenant-1001         1001  tagged   unblocked
                    default                   untagged unblocked

{master:0}";
    let parsed = SwitchingMember::from_table(table).unwrap();
    assert_eq!(
        parsed,
        vec![
            SwitchingMember {
                interface: String::from("ge-0/0/10.0"),
                state: String::from("up"),
                vlan: String::from("tenant-1005"),
                tag: Some(1005),
                tagging: String::from("tagged"),
                blocking: String::from("unblocked"),
            },
            SwitchingMember {
                interface: String::from("ge-0/0/10.0"),
                state: String::from("up"),
                vlan: String::from("tenant-1001"),
                tag: Some(1001),
                tagging: String::from("tagged"),
                blocking: String::from("unblocked"),
            },
            SwitchingMember {
                interface: String::from("ge-0/0/10.0"),
                state: String::from("up"),
                vlan: String::from("default"),
                tag: None,
                tagging: String::from("untagged"),
                blocking: String::from("unblocked"),
            },
        ]
    );
    assert!(parsed.iter().all(SwitchingMember::is_active));
}

#[test]
fn down_interface() {
    let table = "\
Interface    State  VLAN members        Tag   Tagging  Blocking
ge-0/0/11.0  down   tenant-1002         1002  tagged   blocked by STP";
    let parsed = SwitchingMember::from_table(table).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].state, "down");
    assert_eq!(parsed[0].blocking, "blocked by STP");
    assert!(!parsed[0].is_active());
}

#[test]
fn continuation_without_interface() {
    let table = "\
Interface    State  VLAN members        Tag   Tagging  Blocking
                    tenant-1001         1001  tagged   unblocked";
    assert!(matches!(
        SwitchingMember::from_table(table),
        Err(TableParseError::MissingInterface(v)) if v == "tenant-1001"
    ));
}

#[test]
fn invalid_tag() {
    let table = "\
Interface    State  VLAN members        Tag   Tagging  Blocking
ge-0/0/10.0  up     tenant-x            10x5  tagged   unblocked";
    assert!(matches!(
        SwitchingMember::from_table(table),
        Err(TableParseError::InvalidCell(c, _)) if c == "10x5"
    ));
}
