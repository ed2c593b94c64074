// Crate root: declare modules and control visibility
pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod debug;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod prefilter;
pub mod report;
pub mod symbols;
pub mod tracker;
pub mod utils;

// Re-export commonly used API from the library for binaries/tests
pub use aggregate::{Aggregator, MapSummary, RegionSummary, ScanStats, SectionTotals};
pub use config::MapFormat;
pub use error::{LineError, MapError};
pub use memory::MemoryRegion;
pub use pipeline::MapScanner;
pub use symbols::{SectionKind, SymbolRecord};
pub use tracker::ScanState;
pub use utils::resolve_map_path;
