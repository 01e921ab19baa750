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

use crate::switch::table_parser::{parse_table, TableParseError};

#[test]
fn skip_preamble() {
    let table = "\
{master:0}
Name     Value
foo      1
bar      22";
    let parsed = parse_table(table, ["Name", "Value"]).unwrap();
    assert_eq!(parsed, vec![["foo", "1"], ["bar", "22"]]);
}

#[test]
fn short_rows() {
    let table = "\
Name     Value   Comment
foo      1
bar";
    let parsed = parse_table(table, ["Name", "Value", "Comment"]).unwrap();
    assert_eq!(parsed, vec![["foo", "1", ""], ["bar", "", ""]]);
}

#[test]
fn header_prefix_of_other_header() {
    let table = "\
Tag   Tagging
1001  tagged";
    let parsed = parse_table(table, ["Tag", "Tagging"]).unwrap();
    assert_eq!(parsed, vec![["1001", "tagged"]]);
}

#[test]
fn missing_header() {
    let table = "error: device ge-0/0/99 not found";
    match parse_table(table, ["Interface", "State"]) {
        Err(TableParseError::InvalidHeader(h)) => assert_eq!(h, table),
        x => panic!("Unexpected result: {x:?}"),
    }
}

#[test]
fn empty_output() {
    assert!(matches!(
        parse_table("", ["Interface"]),
        Err(TableParseError::InvalidHeader(h)) if h.is_empty()
    ));
}
