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

//! Format constants for the map files we understand.
//!
//! The defaults match the section headings GNU ld writes with `-Map`. Other
//! toolchains (or localized builds) can override them with a small JSON file:
//!
//! ```json
//! { "trailer_heading": "Cross Reference Table" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapFormat {
    /// Heading that opens the memory region table.
    pub memory_config_heading: String,
    /// Heading that opens the section/symbol layout.
    pub memory_map_heading: String,
    /// Heading after which nothing relevant follows. Seeing it ends the scan.
    pub trailer_heading: String,
    /// Region names that are parsed but never registered, e.g. ld's catch-all.
    pub ignored_regions: Vec<String>,
}

impl Default for MapFormat {
    fn default() -> Self {
        Self {
            memory_config_heading: "Memory Configuration".to_string(),
            memory_map_heading: "Linker script and memory map".to_string(),
            trailer_heading: "Cross Reference Table".to_string(),
            ignored_regions: vec!["*default*".to_string()],
        }
    }
}

impl MapFormat {
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = fs::read_to_string(path).map_err(|e| MapError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|message| MapError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        let format: MapFormat = serde_json::from_str(text).map_err(|e| e.to_string())?;
        for (field, value) in [
            ("memory_config_heading", &format.memory_config_heading),
            ("memory_map_heading", &format.memory_map_heading),
            ("trailer_heading", &format.trailer_heading),
        ] {
            // An empty heading would match every line
            if value.is_empty() {
                return Err(format!("{} must not be empty", field));
            }
        }
        Ok(format)
    }

    pub fn is_ignored_region(&self, name: &str) -> bool {
        self.ignored_regions.iter().any(|r| r == name)
    }
}
