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

//! Module for parsing Junos tables.

use itertools::Itertools;
use thiserror::Error;

pub struct Assert<const N: usize>;
impl<const N: usize> Assert<N> {
    pub const NON_ZERO: usize = N - 1;
}

/// Parse a table with fixed-width columns using the given header field names. All lines before the
/// header line are skipped (Junos likes to print things like `{master:0}` before the table). The
/// column boundaries are taken from the position of the header names in the header line. The
/// function returns the trimmed cells of each non-empty line after the header.
pub fn parse_table<'a, const N: usize>(
    table: &'a str,
    headers: [&'static str; N],
) -> Result<Vec<[&'a str; N]>, TableParseError> {
    _ = Assert::<N>::NON_ZERO;

    let expected = headers.iter().join(" ");
    let mut lines = table.lines();
    let header = lines
        .by_ref()
        .find(|l| l.split_whitespace().join(" ") == expected)
        .ok_or_else(|| {
            TableParseError::InvalidHeader(
                table
                    .lines()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or_default()
                    .to_string(),
            )
        })?;

    // search the headers from left to right, such that `Tag` does not match `Tagging`.
    let mut positions = [0; N];
    let mut start = 0;
    for (i, h) in headers.iter().enumerate() {
        let pos = header[start..]
            .find(h)
            .map(|p| p + start)
            .ok_or_else(|| TableParseError::InvalidHeader(header.to_string()))?;
        positions[i] = pos;
        start = pos + h.len();
    }

    let mut idx = 0;
    let ranges = positions.map(|low| {
        let range = (low, positions.get(idx + 1).copied());
        idx += 1;
        range
    });

    let mut results = Vec::new();
    for row in lines {
        if row.trim().is_empty() {
            continue;
        }
        results.push(ranges.map(|(low, high)| cell(row, low, high)));
    }

    Ok(results)
}

/// Get the trimmed content of `row` between `low` and `high`. Rows may be shorter than the header,
/// in which case the missing cells are empty.
fn cell(row: &str, low: usize, high: Option<usize>) -> &str {
    let high = high.unwrap_or(row.len()).min(row.len());
    row.get(low.min(high)..high).unwrap_or_default().trim()
}

/// Error while parsing a Junos table
#[derive(Debug, Error)]
pub enum TableParseError {
    /// Invalid header line.
    #[error("Invalid header line: {0}")]
    InvalidHeader(String),
    /// A continuation row appears before any row that names the interface.
    #[error("Row without an interface: {0}")]
    MissingInterface(String),
    /// A cell contains an unexpected value.
    #[error("Cannot parse cell {0:?}: {1}")]
    InvalidCell(String, std::num::ParseIntError),
}
