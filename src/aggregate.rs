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

//! Running totals for one scan, and the immutable summary handed out at the end.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::memory::MemoryRegion;
use crate::symbols::{SectionKind, SymbolRecord};
use crate::tracker::ScanState;

/// Byte counters per section kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionTotals {
    pub code: u64,
    pub data: u64,
    pub bss: u64,
    pub rodata: u64,
    pub other: u64,
}

impl SectionTotals {
    pub fn add(&mut self, kind: SectionKind, size: u64) {
        let slot = match kind {
            SectionKind::Code => &mut self.code,
            SectionKind::Data => &mut self.data,
            SectionKind::Bss => &mut self.bss,
            SectionKind::Rodata => &mut self.rodata,
            SectionKind::Other => &mut self.other,
        };
        *slot = slot.saturating_add(size);
    }

    pub fn get(&self, kind: SectionKind) -> u64 {
        match kind {
            SectionKind::Code => self.code,
            SectionKind::Data => self.data,
            SectionKind::Bss => self.bss,
            SectionKind::Rodata => self.rodata,
            SectionKind::Other => self.other,
        }
    }

    pub fn total(&self) -> u64 {
        SectionKind::ALL
            .iter()
            .fold(0u64, |acc, kind| acc.saturating_add(self.get(*kind)))
    }

    pub fn merge(&mut self, other: &SectionTotals) {
        for kind in SectionKind::ALL {
            self.add(kind, other.get(kind));
        }
    }
}

/// Counters describing the scan itself, so every line is accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub lines_read: u64,
    pub lines_in_scope: u64,
    /// Lines that passed the pre-filter.
    pub candidates: u64,
    pub symbols_matched: u64,
    pub unmatched_candidates: u64,
    pub malformed_region_lines: u64,
    pub malformed_symbol_lines: u64,
    /// Symbol records outside every registered region.
    pub unclassified_records: u64,
    /// Sum of the sizes of all accepted symbol records.
    pub accepted_bytes: u64,
    pub final_state: ScanState,
    pub early_exit: bool,
}

impl Default for ScanStats {
    fn default() -> Self {
        Self {
            lines_read: 0,
            lines_in_scope: 0,
            candidates: 0,
            symbols_matched: 0,
            unmatched_candidates: 0,
            malformed_region_lines: 0,
            malformed_symbol_lines: 0,
            unclassified_records: 0,
            accepted_bytes: 0,
            final_state: ScanState::Preamble,
            early_exit: false,
        }
    }
}

struct RegionUsage {
    region: MemoryRegion,
    totals: SectionTotals,
}

/// Folds classified records into per-region, per-archive and per-object
/// totals. One instance per scan; breakdowns keep first-seen order.
#[derive(Default)]
pub struct Aggregator {
    regions: IndexMap<String, RegionUsage>,
    // (origin, registration seq) -> index into `regions`
    spans: BTreeMap<(u64, u64), usize>,
    next_seq: u64,
    archives: IndexMap<String, SectionTotals>,
    objects: IndexMap<String, SectionTotals>,
    unclassified: SectionTotals,
    unclassified_records: u64,
    accepted_bytes: u64,
    key_buf: String,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a memory region. A second definition with the same name
    /// replaces the span and attributes but keeps its position and totals.
    /// Other regions, including ones sharing the origin, are untouched.
    pub fn add_region(&mut self, region: MemoryRegion) {
        let origin = region.origin;
        let seq = self.next_seq;
        self.next_seq += 1;
        let index = match self.regions.get_full_mut(&region.name) {
            Some((index, _, usage)) => {
                usage.region = region;
                self.spans.retain(|_, i| *i != index);
                index
            }
            None => {
                let name = region.name.clone();
                let (index, _) = self.regions.insert_full(
                    name,
                    RegionUsage {
                        region,
                        totals: SectionTotals::default(),
                    },
                );
                index
            }
        };
        self.spans.insert((origin, seq), index);
    }

    /// Innermost region containing `addr`. Among equally sized candidates
    /// the one with the higher origin, then the later registration, wins.
    fn region_index(&self, addr: u64) -> Option<usize> {
        self.spans
            .range(..=(addr, u64::MAX))
            .rev()
            .map(|(_, &index)| index)
            .filter(|&index| self.regions[index].region.contains(addr))
            .min_by_key(|&index| self.regions[index].region.length)
    }

    pub fn add_symbol(&mut self, record: &SymbolRecord<'_>) {
        let kind = record.kind();
        let size = record.size;
        self.accepted_bytes = self.accepted_bytes.saturating_add(size);

        match self.region_index(record.address) {
            Some(index) => self.regions[index].totals.add(kind, size),
            None => {
                self.unclassified.add(kind, size);
                self.unclassified_records += 1;
            }
        }

        if let Some(archive) = record.archive {
            bump(&mut self.archives, archive, kind, size);
        }

        self.key_buf.clear();
        record.write_object_key(&mut self.key_buf);
        bump(&mut self.objects, &self.key_buf, kind, size);
    }

    pub fn finish(self, mut stats: ScanStats) -> MapSummary {
        stats.unclassified_records = self.unclassified_records;
        stats.accepted_bytes = self.accepted_bytes;

        let regions = self
            .regions
            .into_values()
            .map(|usage| RegionSummary::new(usage.region, usage.totals))
            .collect();

        MapSummary {
            regions,
            archives: self.archives,
            object_files: self.objects,
            unclassified: self.unclassified,
            stats,
        }
    }
}

fn bump(map: &mut IndexMap<String, SectionTotals>, key: &str, kind: SectionKind, size: u64) {
    if let Some(totals) = map.get_mut(key) {
        totals.add(kind, size);
        return;
    }
    let mut totals = SectionTotals::default();
    totals.add(kind, size);
    map.insert(key.to_string(), totals);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub name: String,
    pub origin: u64,
    pub length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
    pub totals: SectionTotals,
    pub used: u64,
    pub free: u64,
    pub percent_used: f64,
}

impl RegionSummary {
    fn new(region: MemoryRegion, totals: SectionTotals) -> Self {
        let used = totals.total();
        let percent_used = if region.length == 0 {
            0.0
        } else {
            used as f64 * 100.0 / region.length as f64
        };
        Self {
            name: region.name,
            origin: region.origin,
            length: region.length,
            attributes: region.attributes,
            totals,
            used,
            free: region.length.saturating_sub(used),
            percent_used,
        }
    }
}

/// Immutable result of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    /// In memory-configuration order.
    pub regions: Vec<RegionSummary>,
    pub archives: IndexMap<String, SectionTotals>,
    /// Keyed `archive:object`, or the bare object name.
    pub object_files: IndexMap<String, SectionTotals>,
    pub unclassified: SectionTotals,
    pub stats: ScanStats,
}

impl MapSummary {
    pub fn region(&self, name: &str) -> Option<&RegionSummary> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn archive(&self, name: &str) -> Option<&SectionTotals> {
        self.archives.get(name)
    }

    pub fn object_file(&self, key: &str) -> Option<&SectionTotals> {
        self.object_files.get(key)
    }

    /// Everything attributed to a region or to the unclassified bucket.
    pub fn attributed_bytes(&self) -> u64 {
        self.regions
            .iter()
            .fold(self.unclassified.total(), |acc, r| acc.saturating_add(r.used))
    }

    /// Totals per kind across all regions plus unclassified.
    pub fn totals_by_kind(&self) -> SectionTotals {
        let mut all = self.unclassified;
        for region in &self.regions {
            all.merge(&region.totals);
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec<'a>(name: &'a str, address: u64, size: u64, archive: Option<&'a str>, object_file: &'a str) -> SymbolRecord<'a> {
        SymbolRecord {
            name,
            address,
            size,
            archive,
            object_file,
        }
    }

    fn region(name: &str, origin: u64, length: u64) -> MemoryRegion {
        MemoryRegion::new(name.to_string(), origin, length, None)
    }

    #[test]
    fn attributes_by_address_and_kind() {
        let mut agg = Aggregator::new();
        agg.add_region(region("IRAM", 0x4008_0000, 0x2_0000));
        agg.add_region(region("DRAM", 0x3ffb_0000, 0x2_c200));
        agg.add_symbol(&rec(".iram1.0", 0x4008_0010, 0x100, Some("libmain.a"), "main.o"));
        agg.add_symbol(&rec(".dram0.bss", 0x3ffb_1000, 0x40, Some("libmain.a"), "main.o"));
        agg.add_symbol(&rec(".data.x", 0x3ffb_2000, 0x8, None, "app.o"));

        let s = agg.finish(ScanStats::default());
        let iram = s.region("IRAM").unwrap();
        assert_eq!(iram.used, 0x100);
        assert_eq!(iram.totals.code, 0x100);
        assert_eq!(iram.free, 0x2_0000 - 0x100);
        let dram = s.region("DRAM").unwrap();
        assert_eq!(dram.totals.bss, 0x40);
        assert_eq!(dram.totals.data, 0x8);

        assert_eq!(s.archive("libmain.a").unwrap().total(), 0x140);
        assert_eq!(s.archives.len(), 1);
        assert_eq!(s.object_file("libmain.a:main.o").unwrap().total(), 0x140);
        assert_eq!(s.object_file("app.o").unwrap().data, 0x8);
        assert_eq!(s.attributed_bytes(), s.stats.accepted_bytes);
    }

    #[test]
    fn out_of_range_goes_to_unclassified() {
        let mut agg = Aggregator::new();
        agg.add_region(region("IRAM", 0x4008_0000, 0x100));
        agg.add_symbol(&rec(".text", 0x4008_0100, 0x20, None, "edge.o"));
        agg.add_symbol(&rec(".text", 0x1000, 0x10, None, "low.o"));
        let s = agg.finish(ScanStats::default());
        assert_eq!(s.region("IRAM").unwrap().used, 0);
        assert_eq!(s.unclassified.code, 0x30);
        assert_eq!(s.stats.unclassified_records, 2);
        assert_eq!(s.attributed_bytes(), 0x30);
    }

    #[test]
    fn nested_regions_pick_the_innermost_containing_origin() {
        let mut agg = Aggregator::new();
        agg.add_region(region("FLASH", 0x0, 0x10_0000));
        agg.add_region(region("BOOT", 0x8000, 0x1000));
        agg.add_symbol(&rec(".text", 0x8010, 4, None, "boot.o"));
        agg.add_symbol(&rec(".text", 0x9010, 4, None, "app.o"));
        let s = agg.finish(ScanStats::default());
        assert_eq!(s.region("BOOT").unwrap().used, 4);
        assert_eq!(s.region("FLASH").unwrap().used, 4);
    }

    #[test]
    fn duplicate_region_name_is_overwritten_in_place() {
        let mut agg = Aggregator::new();
        agg.add_region(region("IRAM", 0x1000, 0x100));
        agg.add_region(region("DRAM", 0x2000, 0x100));
        agg.add_region(region("IRAM", 0x4000, 0x100));
        agg.add_symbol(&rec(".text", 0x1010, 4, None, "old.o"));
        agg.add_symbol(&rec(".text", 0x4010, 8, None, "new.o"));
        let s = agg.finish(ScanStats::default());
        assert_eq!(s.regions.len(), 2);
        assert_eq!(s.regions[0].name, "IRAM");
        assert_eq!(s.regions[0].origin, 0x4000);
        assert_eq!(s.regions[0].used, 8);
        assert_eq!(s.unclassified.total(), 4);
    }

    #[test]
    fn regions_sharing_an_origin_are_both_reachable() {
        let mut agg = Aggregator::new();
        agg.add_region(region("FLASH", 0x0800_0000, 0x10_0000));
        agg.add_region(region("BOOT", 0x0800_0000, 0x4000));
        agg.add_symbol(&rec(".text.app", 0x0801_0000, 0x200, None, "app.o"));
        agg.add_symbol(&rec(".text.boot", 0x0800_0100, 0x10, None, "boot.o"));
        let s = agg.finish(ScanStats::default());
        assert_eq!(s.region("FLASH").unwrap().used, 0x200);
        assert_eq!(s.region("BOOT").unwrap().used, 0x10);
        assert_eq!(s.unclassified.total(), 0);
    }

    #[test]
    fn redefined_region_moving_onto_another_origin_keeps_both() {
        let mut agg = Aggregator::new();
        agg.add_region(region("DRAM", 0x3ffb_0000, 0x1_0000));
        agg.add_region(region("IRAM", 0x4008_0000, 0x2_0000));
        agg.add_region(region("IRAM", 0x3ffb_0000, 0x100));
        agg.add_symbol(&rec(".data.x", 0x3ffb_8000, 0x40, None, "x.o"));
        agg.add_symbol(&rec(".text.y", 0x3ffb_0010, 0x8, None, "y.o"));
        agg.add_symbol(&rec(".text.z", 0x4008_0010, 0x4, None, "z.o"));
        let s = agg.finish(ScanStats::default());
        assert_eq!(s.region("DRAM").unwrap().used, 0x40);
        assert_eq!(s.region("IRAM").unwrap().used, 0x8);
        assert_eq!(s.unclassified.total(), 0x4);
    }

    #[test]
    fn zero_size_records_create_entries() {
        let mut agg = Aggregator::new();
        agg.add_region(region("IRAM", 0x1000, 0x100));
        agg.add_symbol(&rec(".text", 0x1000, 0, Some("libxtensa.a"), "eri.o"));
        let s = agg.finish(ScanStats::default());
        assert_eq!(s.archive("libxtensa.a").map(|t| t.total()), Some(0));
        assert_eq!(s.region("IRAM").unwrap().used, 0);
    }

    #[test]
    fn breakdowns_keep_first_seen_order() {
        let mut agg = Aggregator::new();
        for archive in ["libz.a", "liba.a", "libm.a", "liba.a"] {
            agg.add_symbol(&rec(".text", 0, 1, Some(archive), "x.o"));
        }
        let s = agg.finish(ScanStats::default());
        let order: Vec<&str> = s.archives.keys().map(String::as_str).collect();
        assert_eq!(order, ["libz.a", "liba.a", "libm.a"]);
        assert_eq!(s.archive("liba.a").unwrap().total(), 2);
    }

    #[test]
    fn same_object_name_in_different_archives() {
        let mut agg = Aggregator::new();
        agg.add_symbol(&rec(".text", 0, 1, Some("liba.a"), "init.o"));
        agg.add_symbol(&rec(".text", 0, 2, Some("libb.a"), "init.o"));
        agg.add_symbol(&rec(".text", 0, 4, None, "init.o"));
        let s = agg.finish(ScanStats::default());
        assert_eq!(s.object_files.len(), 3);
        assert_eq!(s.object_file("libb.a:init.o").unwrap().total(), 2);
        assert_eq!(s.object_file("init.o").unwrap().total(), 4);
    }

    #[test]
    fn empty_scan_is_all_zero() {
        let s = Aggregator::new().finish(ScanStats::default());
        assert!(s.regions.is_empty());
        assert_eq!(s.totals_by_kind().total(), 0);
        assert_eq!(s.attributed_bytes(), 0);
    }
}
