// Copyright (c) 2026 MCU-Debug Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Line classification for GNU ld map files.
//!
//! Two independent rules, each tried at most once per line:
//!
//! * the symbol rule, for input-section entries in the memory map:
//!   ` .text.app_main  0x400d0010  0x20 esp-idf/main/libmain.a(main.c.obj)`
//! * the region rule, for rows of the memory configuration table:
//!   `iram0_0_seg  0x0000000040080000 0x0000000000020000 xr`
//!
//! The archive part of a symbol line is an optional group of the one pattern,
//! so bare objects (`CMakeFiles/app.dir/app.c.obj`) cost the same single
//! attempt as archived ones. There is no wildcard between the name and the
//! address; each field is anchored on the whitespace that separates it.

use std::sync::LazyLock;

use regex::{CaptureLocations, Regex};

use crate::error::LineError;
use crate::memory::MemoryRegion;
use crate::symbols::SymbolRecord;

static SYMBOL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?P<name>\S*)",
        r"\s+0x(?P<addr>[0-9A-Fa-f]+)",
        r"\s+0x(?P<size>[0-9A-Fa-f]+)",
        r"\s+(?:\S*/)?(?:(?P<archive>[^\s/()]+\.a)\()?(?P<object>[^\s/()]+\.(?:o|obj))\)?\s*$",
    ))
    .expect("symbol line pattern")
});

static REGION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>\S+)\s+0x(?P<origin>\S+)\s+0x(?P<length>\S+)(?:\s+(?P<attrs>\S+))?\s*$")
        .expect("region line pattern")
});

// Group indices, in pattern order
const SYM_NAME: usize = 1;
const SYM_ADDR: usize = 2;
const SYM_SIZE: usize = 3;
const SYM_ARCHIVE: usize = 4;
const SYM_OBJECT: usize = 5;

const REG_NAME: usize = 1;
const REG_ORIGIN: usize = 2;
const REG_LENGTH: usize = 3;
const REG_ATTRS: usize = 4;

/// Applies the compiled rules. Holds reusable capture slots so a match does
/// not allocate.
pub struct Classifier {
    symbol_locs: CaptureLocations,
    region_locs: CaptureLocations,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            symbol_locs: SYMBOL_LINE.capture_locations(),
            region_locs: REGION_LINE.capture_locations(),
        }
    }

    /// Match a memory-map entry line. `Ok(None)` means the line is noise.
    pub fn classify_symbol<'a>(
        &mut self,
        line: &'a str,
    ) -> Result<Option<SymbolRecord<'a>>, LineError> {
        if SYMBOL_LINE
            .captures_read(&mut self.symbol_locs, line)
            .is_none()
        {
            return Ok(None);
        }
        let locs = &self.symbol_locs;
        let (Some(addr), Some(size), Some(object_file)) = (
            group(locs, line, SYM_ADDR),
            group(locs, line, SYM_SIZE),
            group(locs, line, SYM_OBJECT),
        ) else {
            return Ok(None);
        };

        Ok(Some(SymbolRecord {
            name: group(locs, line, SYM_NAME).unwrap_or(""),
            address: parse_hex(addr).map_err(|_| LineError::MalformedSymbolLine {
                field: "address",
                value: addr.to_string(),
            })?,
            size: parse_hex(size).map_err(|_| LineError::MalformedSymbolLine {
                field: "size",
                value: size.to_string(),
            })?,
            archive: group(locs, line, SYM_ARCHIVE),
            object_file,
        }))
    }

    /// Match a memory-configuration row. Rows that have the right shape but
    /// carry non-hex origin/length are reported as malformed.
    pub fn classify_region(&mut self, line: &str) -> Result<Option<MemoryRegion>, LineError> {
        if REGION_LINE
            .captures_read(&mut self.region_locs, line)
            .is_none()
        {
            return Ok(None);
        }
        let locs = &self.region_locs;
        let (Some(name), Some(origin), Some(length)) = (
            group(locs, line, REG_NAME),
            group(locs, line, REG_ORIGIN),
            group(locs, line, REG_LENGTH),
        ) else {
            return Ok(None);
        };

        let origin = parse_hex(origin).map_err(|_| LineError::MalformedRegionLine {
            field: "origin",
            value: origin.to_string(),
        })?;
        let length = parse_hex(length).map_err(|_| LineError::MalformedRegionLine {
            field: "length",
            value: length.to_string(),
        })?;

        Ok(Some(MemoryRegion::new(
            name.to_string(),
            origin,
            length,
            group(locs, line, REG_ATTRS).map(str::to_string),
        )))
    }
}

/// A long input-section name that ld wrapped onto its own line, e.g.
/// ` .text.esp_partition_find_first` or ` COMMON`. The next entry line
/// carries its address and size with an empty name field. Wildcard patterns
/// (`*(.text)`, `*fill*`) and bare addresses are not names.
pub fn wrapped_section_name(line: &str) -> Option<&str> {
    if !line.starts_with(char::is_whitespace) {
        return None;
    }
    let name = line.trim();
    if name.is_empty()
        || name.starts_with('*')
        || name.starts_with("0x")
        || name.contains(char::is_whitespace)
    {
        None
    } else {
        Some(name)
    }
}

fn group<'a>(locs: &CaptureLocations, line: &'a str, index: usize) -> Option<&'a str> {
    locs.get(index).map(|(start, end)| &line[start..end])
}

fn parse_hex(digits: &str) -> Result<u64, std::num::ParseIntError> {
    u64::from_str_radix(digits, 16)
}
