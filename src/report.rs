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

/// Plain-text rendering of a [`MapSummary`] for the command line.
use std::fmt::Write;

use indexmap::IndexMap;

use crate::aggregate::{MapSummary, SectionTotals};
use crate::symbols::SectionKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub archives: bool,
    pub files: bool,
}

pub fn render_text(summary: &MapSummary, options: ReportOptions) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<20} {:>18} {:>10} {:>10} {:>10} {:>7}",
        "Region", "Origin", "Length", "Used", "Free", "Used%"
    );
    for region in &summary.regions {
        let _ = writeln!(
            out,
            "{:<20} {:>#18x} {:>10} {:>10} {:>10} {:>6.2}%",
            region.name, region.origin, region.length, region.used, region.free, region.percent_used
        );
    }
    if summary.unclassified.total() > 0 {
        let _ = writeln!(
            out,
            "{:<20} {:>18} {:>10} {:>10}",
            "(unclassified)",
            "-",
            "-",
            summary.unclassified.total()
        );
    }

    out.push('\n');
    let totals = summary.totals_by_kind();
    for kind in SectionKind::ALL {
        let _ = writeln!(out, "{:>8}: {:>10} bytes", kind.as_str(), totals.get(kind));
    }
    let _ = writeln!(out, "{:>8}: {:>10} bytes", "total", totals.total());

    if options.archives {
        out.push('\n');
        render_breakdown(&mut out, "Archive", &summary.archives);
    }
    if options.files {
        out.push('\n');
        render_breakdown(&mut out, "Object file", &summary.object_files);
    }
    out
}

/// Largest first. `sort_by` is stable, so ties keep first-seen order.
fn render_breakdown(out: &mut String, heading: &str, breakdown: &IndexMap<String, SectionTotals>) {
    let mut rows: Vec<(&String, &SectionTotals)> = breakdown.iter().collect();
    rows.sort_by(|a, b| b.1.total().cmp(&a.1.total()));

    let _ = writeln!(
        out,
        "{:<40} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        heading, "code", "data", "bss", "rodata", "other", "total"
    );
    for (name, t) in rows {
        let _ = writeln!(
            out,
            "{:<40} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            name,
            t.code,
            t.data,
            t.bss,
            t.rodata,
            t.other,
            t.total()
        );
    }
}
