use serde::Serialize;

/// A named hardware memory area from the map's memory configuration table,
/// e.g. `iram0_0_seg 0x40080000 0x20000 xr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub name: String,
    pub origin: u64,
    pub length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
}

impl MemoryRegion {
    pub fn new(name: String, origin: u64, length: u64, attributes: Option<String>) -> Self {
        Self {
            name,
            origin,
            length,
            attributes,
        }
    }

    /// One past the last address. Saturates for regions running to the top of
    /// the address space.
    pub fn end(&self) -> u64 {
        self.origin.saturating_add(self.length)
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.origin && addr < self.end()
    }
}
