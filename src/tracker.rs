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

/// Tracks which part of the map file we are in, so only the memory
/// configuration table and the memory map are ever classified.
///
/// ```text
/// Preamble --"Memory Configuration"--> MemoryConfig
///     |                                    |
///     +--"Linker script and memory map"--> SymbolTable
///
/// any state --"Cross Reference Table"--> Trailer (terminal, stop reading)
/// ```
use log::debug;
use serde::Serialize;

use crate::config::MapFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanState {
    Preamble,
    MemoryConfig,
    SymbolTable,
    Trailer,
}

/// What the driver should do with the line it just showed the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineScope {
    /// Outside any region of interest.
    Skip,
    /// A heading line; consumed by the transition.
    Marker,
    MemoryConfig,
    SymbolTable,
    /// The trailer heading was seen. Nothing after it is read.
    Stop,
}

pub struct RegionTracker<'f> {
    state: ScanState,
    format: &'f MapFormat,
}

impl<'f> RegionTracker<'f> {
    pub fn new(format: &'f MapFormat) -> Self {
        Self {
            state: ScanState::Preamble,
            format,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn observe(&mut self, line: &str) -> LineScope {
        if self.state == ScanState::Trailer {
            return LineScope::Stop;
        }
        if line.starts_with(self.format.trailer_heading.as_str()) {
            self.transition(ScanState::Trailer);
            return LineScope::Stop;
        }

        match self.state {
            ScanState::Preamble => {
                if line.starts_with(self.format.memory_config_heading.as_str()) {
                    self.transition(ScanState::MemoryConfig);
                    LineScope::Marker
                } else if line.starts_with(self.format.memory_map_heading.as_str()) {
                    self.transition(ScanState::SymbolTable);
                    LineScope::Marker
                } else {
                    LineScope::Skip
                }
            }
            ScanState::MemoryConfig => {
                if line.starts_with(self.format.memory_map_heading.as_str()) {
                    self.transition(ScanState::SymbolTable);
                    LineScope::Marker
                } else {
                    LineScope::MemoryConfig
                }
            }
            ScanState::SymbolTable => LineScope::SymbolTable,
            ScanState::Trailer => LineScope::Stop,
        }
    }

    fn transition(&mut self, next: ScanState) {
        debug!("map scan: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
