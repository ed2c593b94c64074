use serde::Serialize;

/// Coarse classification of an input section, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Code,
    Data,
    Bss,
    Rodata,
    Other,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Code,
        SectionKind::Data,
        SectionKind::Bss,
        SectionKind::Rodata,
        SectionKind::Other,
    ];

    /// Classify an input-section name such as `.text.app_main`, `.dram0.bss`
    /// or `COMMON`. Order matters: `.rodata` also contains "data" and
    /// `.dram0.bss` also starts with `.dram`.
    pub fn from_section_name(name: &str) -> Self {
        if name == "COMMON" || name.contains("bss") {
            SectionKind::Bss
        } else if name.contains("rodata") {
            SectionKind::Rodata
        } else if name.contains("text")
            || name.contains("literal")
            || name.contains("vectors")
            || name.starts_with(".iram")
        {
            SectionKind::Code
        } else if name.contains("data") || name.starts_with(".dram") {
            SectionKind::Data
        } else {
            SectionKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Code => "code",
            SectionKind::Data => "data",
            SectionKind::Bss => "bss",
            SectionKind::Rodata => "rodata",
            SectionKind::Other => "other",
        }
    }
}

/// One classified entry line from the memory map. Borrows from the line
/// buffer; the aggregator consumes it before the next line is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord<'a> {
    /// Input-section name. Empty when ld wrapped it onto the previous line.
    pub name: &'a str,
    pub address: u64,
    pub size: u64,
    pub archive: Option<&'a str>,
    pub object_file: &'a str,
}

impl<'a> SymbolRecord<'a> {
    pub fn kind(&self) -> SectionKind {
        SectionKind::from_section_name(self.name)
    }

    /// Breakdown key for the object file. Qualified with the archive so
    /// identically named objects from different libraries stay apart.
    /// Appended to `out` so the aggregator can reuse one buffer per line.
    pub fn write_object_key(&self, out: &mut String) {
        if let Some(archive) = self.archive {
            out.push_str(archive);
            out.push(':');
        }
        out.push_str(self.object_file);
    }
}
