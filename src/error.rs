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

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. A run that hits one of these produces no summary at all.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map input{}: {source}", display_path(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid map format config at {path}: {message}")]
    Config { path: PathBuf, message: String },
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" {}", p.display()),
        None => String::new(),
    }
}

/// Line-level anomalies. These are recovered locally: the line is skipped
/// and counted, and the scan continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("malformed memory region line: bad {field} value {value:?}")]
    MalformedRegionLine { field: &'static str, value: String },

    #[error("malformed symbol line: bad {field} value {value:?}")]
    MalformedSymbolLine { field: &'static str, value: String },
}
