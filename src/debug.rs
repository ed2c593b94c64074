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

/// Logger setup for the binary. Everything goes to stderr so stdout stays
/// clean for the report (and for `--json`).
use flexi_logger::{Logger, LoggerHandle};

/// Default log spec for the given debug flag. `RUST_LOG` wins when set.
pub fn log_spec(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Initialize logging. Must be called once at startup; keep the handle alive
/// for the life of the process.
pub fn init_logging(debug: bool) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    Logger::try_with_env_or_str(log_spec(debug))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
}
