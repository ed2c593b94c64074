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

//! Single-pass driver: every line goes through
//! region tracker -> pre-filter -> classifier -> aggregator, and is then
//! dropped. Only the current line is ever held in memory.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Instant;

use log::{debug, info, trace};

use crate::aggregate::{Aggregator, MapSummary, ScanStats};
use crate::classifier::{wrapped_section_name, Classifier};
use crate::config::MapFormat;
use crate::error::MapError;
use crate::prefilter::maybe_symbol_line;
use crate::tracker::{LineScope, RegionTracker};

/// Reusable entry point. Each scan builds its own aggregator, so runs never
/// share totals.
#[derive(Debug, Clone, Default)]
pub struct MapScanner {
    format: MapFormat,
}

impl MapScanner {
    pub fn new(format: MapFormat) -> Self {
        Self { format }
    }

    pub fn scan_file(&self, path: &Path) -> Result<MapSummary, MapError> {
        let file = File::open(path).map_err(|source| MapError::Io {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let now = Instant::now();
        let reader = BufReader::with_capacity(64 * 1024, file);
        let summary = self.scan_reader(reader).map_err(|e| match e {
            MapError::Io { source, .. } => MapError::Io {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })?;
        info!(
            "Scanned {}: {} lines, {} symbols in {:.2?}",
            path.display(),
            summary.stats.lines_read,
            summary.stats.symbols_matched,
            now.elapsed()
        );
        Ok(summary)
    }

    /// Scan a byte stream. Non-UTF-8 bytes are replaced; the format is ASCII.
    pub fn scan_reader<R: BufRead>(&self, mut reader: R) -> Result<MapSummary, MapError> {
        let mut session = ScanSession::new(&self.format);
        let mut buf: Vec<u8> = Vec::with_capacity(512);
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| MapError::Io { path: None, source })?;
            if n == 0 {
                break;
            }
            while buf
                .last()
                .map(|b| *b == b'\n' || *b == b'\r')
                .unwrap_or(false)
            {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf);
            if session.feed(&line).is_break() {
                break;
            }
        }
        Ok(session.finish())
    }

    /// Scan lines supplied by the caller. The first `Err` aborts the scan.
    pub fn scan_lines<I, S>(&self, lines: I) -> Result<MapSummary, MapError>
    where
        I: IntoIterator<Item = io::Result<S>>,
        S: AsRef<str>,
    {
        let mut session = ScanSession::new(&self.format);
        for line in lines {
            let line = line.map_err(|source| MapError::Io { path: None, source })?;
            let line = line.as_ref();
            let line = line.strip_suffix('\n').unwrap_or(line);
            let line = line.strip_suffix('\r').unwrap_or(line);
            if session.feed(line).is_break() {
                break;
            }
        }
        Ok(session.finish())
    }
}

/// State owned by a single run.
struct ScanSession<'f> {
    tracker: RegionTracker<'f>,
    classifier: Classifier,
    aggregator: Aggregator,
    stats: ScanStats,
    format: &'f MapFormat,
    // Section name ld wrapped onto the previous line
    pending_name: String,
}

impl<'f> ScanSession<'f> {
    fn new(format: &'f MapFormat) -> Self {
        Self {
            tracker: RegionTracker::new(format),
            classifier: Classifier::new(),
            aggregator: Aggregator::new(),
            stats: ScanStats::default(),
            format,
            pending_name: String::new(),
        }
    }

    fn feed(&mut self, line: &str) -> ControlFlow<()> {
        self.stats.lines_read += 1;
        match self.tracker.observe(line) {
            LineScope::Skip | LineScope::Marker => {}
            LineScope::Stop => {
                self.stats.early_exit = true;
                debug!(
                    "Trailer heading at line {}, stopping scan",
                    self.stats.lines_read
                );
                return ControlFlow::Break(());
            }
            LineScope::MemoryConfig => {
                self.stats.lines_in_scope += 1;
                self.memory_config_line(line);
            }
            LineScope::SymbolTable => {
                self.stats.lines_in_scope += 1;
                self.symbol_table_line(line);
            }
        }
        ControlFlow::Continue(())
    }

    fn memory_config_line(&mut self, line: &str) {
        match self.classifier.classify_region(line) {
            Ok(Some(region)) => {
                if self.format.is_ignored_region(&region.name) {
                    return;
                }
                debug!(
                    "Region {} origin=0x{:x} length=0x{:x}",
                    region.name, region.origin, region.length
                );
                self.aggregator.add_region(region);
            }
            Ok(None) => {}
            Err(e) => {
                self.stats.malformed_region_lines += 1;
                trace!("line {}: {}", self.stats.lines_read, e);
            }
        }
    }

    fn symbol_table_line(&mut self, line: &str) {
        if !maybe_symbol_line(line) {
            match wrapped_section_name(line) {
                Some(name) => {
                    self.pending_name.clear();
                    self.pending_name.push_str(name);
                }
                None => self.pending_name.clear(),
            }
            return;
        }

        self.stats.candidates += 1;
        match self.classifier.classify_symbol(line) {
            Ok(Some(mut record)) => {
                if record.name.is_empty() {
                    record.name = self.pending_name.as_str();
                }
                self.stats.symbols_matched += 1;
                self.aggregator.add_symbol(&record);
            }
            Ok(None) => self.stats.unmatched_candidates += 1,
            Err(e) => {
                self.stats.malformed_symbol_lines += 1;
                trace!("line {}: {}", self.stats.lines_read, e);
            }
        }
        self.pending_name.clear();
    }

    fn finish(self) -> MapSummary {
        let mut stats = self.stats;
        stats.final_state = self.tracker.state();
        debug!(
            "Scan finished in {:?}: {} of {} lines in scope, {} candidates, {} matched",
            stats.final_state,
            stats.lines_in_scope,
            stats.lines_read,
            stats.candidates,
            stats.symbols_matched
        );
        self.aggregator.finish(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
Archive member included to satisfy reference by file (symbol)

esp-idf/main/libmain.a(main.c.obj)
 .text.stale    0x400d0000       0x40 esp-idf/main/libmain.a(old.c.obj)

Memory Configuration

Name             Origin             Length             Attributes
iram0_0_seg      0x0000000040080000 0x0000000000020000 xr
dram0_0_seg      0x000000003ffb0000 0x000000000002c200 rw
*default*        0x0000000000000000 0xffffffffffffffff

Linker script and memory map

LOAD esp-idf/main/libmain.a

.iram0.vectors  0x0000000040080000      0x400
 *(.iram0.vectors)
 .iram0.vectors
                0x0000000040080000      0x400 esp-idf/freertos/libfreertos.a(xtensa_vectors.S.obj)
                0x0000000040080000                _WindowOverflow4
 .iram1.0       0x0000000040080400       0x6c esp-idf/freertos/libfreertos.a(port.c.obj)
 .dram0.bss     0x000000003ffb1000       0x20 esp-idf/main/libmain.a(main.c.obj)
 COMMON         0x000000003ffb1020        0x8 CMakeFiles/app.elf.dir/project_elf_src.c.obj
 .text          0x0000000040080470        0x0 esp-idf/xtensa/libxtensa.a(eri.c.obj)

Cross Reference Table

Symbol                                            File
 .text.late     0x40080500       0x99 esp-idf/main/libmain.a(late.c.obj)
";

    #[test]
    fn scans_sample_map() {
        let scanner = MapScanner::default();
        let s = scanner.scan_reader(Cursor::new(SAMPLE)).unwrap();

        assert_eq!(s.regions.len(), 2);
        let iram = s.region("iram0_0_seg").unwrap();
        assert_eq!(iram.totals.code, 0x400 + 0x6c);
        let dram = s.region("dram0_0_seg").unwrap();
        assert_eq!(dram.totals.bss, 0x28);

        assert_eq!(s.archive("libfreertos.a").unwrap().total(), 0x46c);
        assert_eq!(s.archive("libmain.a").unwrap().total(), 0x20);
        assert!(s.archive("libxtensa.a").is_some());
        assert!(s.object_file("old.c.obj").is_none());
        assert!(s.object_file("libmain.a:old.c.obj").is_none());
        assert!(s.object_file("libmain.a:late.c.obj").is_none());
        assert_eq!(s.object_file("project_elf_src.c.obj").unwrap().bss, 8);

        assert!(s.stats.early_exit);
        assert_eq!(s.stats.symbols_matched, 5);
        assert_eq!(s.attributed_bytes(), s.stats.accepted_bytes);
    }

    #[test]
    fn wrapped_name_is_carried_to_next_line() {
        let scanner = MapScanner::default();
        let s = scanner.scan_reader(Cursor::new(SAMPLE)).unwrap();
        // ".iram0.vectors" was on its own line; it classifies as code
        assert_eq!(
            s.object_file("libfreertos.a:xtensa_vectors.S.obj").unwrap().code,
            0x400
        );
    }

    #[test]
    fn wrapped_common_keeps_bss_kind() {
        let text = "\
Memory Configuration
dram0_0_seg      0x000000003ffb0000 0x000000000002c200 rw
Linker script and memory map
 COMMON
                0x000000003ffb1000       0x30 esp-idf/lwip/liblwip.a(tcp.c.obj)
";
        let s = MapScanner::default().scan_reader(Cursor::new(text)).unwrap();
        assert_eq!(s.region("dram0_0_seg").unwrap().totals.bss, 0x30);
        assert_eq!(s.archive("liblwip.a").unwrap().other, 0);
    }

    #[test]
    fn crlf_input_is_handled() {
        let text = SAMPLE.replace('\n', "\r\n");
        let s = MapScanner::default().scan_reader(Cursor::new(text)).unwrap();
        assert_eq!(s.stats.symbols_matched, 5);
        assert_eq!(s.regions.len(), 2);
    }

    #[test]
    fn read_failure_returns_no_summary() {
        let lines: Vec<io::Result<&str>> = vec![
            Ok("Linker script and memory map"),
            Ok(" .text 0x0 0x4 libx.a(x.o)"),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")),
            Ok(" .text 0x4 0x4 libx.a(x.o)"),
        ];
        let err = MapScanner::default().scan_lines(lines).unwrap_err();
        assert!(matches!(err, MapError::Io { path: None, .. }));
    }
}
