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

/// Object-file suffixes a symbol line must end with. The classifier's symbol
/// rule accepts exactly these.
pub const OBJECT_SUFFIXES: [&str; 2] = [".o", ".obj"];

/// Cheap "maybe a symbol line" test run before the symbol rule.
///
/// Accepts any line ending in an object-file suffix, optionally followed by
/// `)` and trailing whitespace. Every line the symbol rule accepts passes;
/// false positives are fine.
#[inline]
pub fn maybe_symbol_line(line: &str) -> bool {
    let tail = line.trim_end();
    let tail = tail.strip_suffix(')').unwrap_or(tail);
    OBJECT_SUFFIXES.iter().any(|suffix| tail.ends_with(suffix))
}
