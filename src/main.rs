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

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use mcu_map_size::debug::init_logging;
use mcu_map_size::report::{render_text, ReportOptions};
use mcu_map_size::{resolve_map_path, MapFormat, MapScanner};

/// Report IRAM/DRAM/flash usage from a GNU ld map file.
#[derive(Parser, Debug)]
#[command(name = "mcu-map-size", version, about)]
struct Cli {
    /// Path (or file:// URI) of the linker map file
    map_file: String,

    /// Print the full summary as JSON instead of tables
    #[arg(long = "json", default_value_t = false)]
    json: bool,

    /// Include the per-archive breakdown
    #[arg(long = "archives", default_value_t = false)]
    archives: bool,

    /// Include the per-object-file breakdown
    #[arg(long = "files", default_value_t = false)]
    files: bool,

    /// JSON file overriding the map section headings
    #[arg(long = "format-config")]
    format_config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.debug).context("failed to initialize logging")?;

    let format = match &cli.format_config {
        Some(path) => MapFormat::load(path)?,
        None => MapFormat::default(),
    };

    let map_path = resolve_map_path(&cli.map_file);
    let summary = MapScanner::new(format)
        .scan_file(&map_path)
        .with_context(|| format!("failed to analyze {}", map_path.display()))?;

    if summary.stats.malformed_region_lines > 0 || summary.stats.malformed_symbol_lines > 0 {
        warn!(
            "Skipped {} malformed region line(s) and {} malformed symbol line(s)",
            summary.stats.malformed_region_lines, summary.stats.malformed_symbol_lines
        );
    }
    if summary.stats.unclassified_records > 0 {
        warn!(
            "{} record(s), {} bytes, fall outside every memory region",
            summary.stats.unclassified_records,
            summary.unclassified.total()
        );
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!(
            "{}",
            render_text(
                &summary,
                ReportOptions {
                    archives: cli.archives,
                    files: cli.files,
                },
            )
        );
    }
    Ok(())
}
