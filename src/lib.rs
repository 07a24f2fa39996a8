pub mod analysis;
pub mod cancel;
pub mod config;
pub mod content;
pub mod error;
pub mod languages;
pub mod model;
pub mod output;
pub mod scanner;

use once_cell::sync::Lazy;

pub use cancel::CancelToken;
pub use content::PatternMatcher;
pub use error::{Result, ScanError};
pub use languages::LanguageRegistry;
pub use model::{
    CountEntry, DirNode, FileChunk, FileEntry, GraphEntry, LanguageStats,
    LargestFile, MetaInfo, OutputEnvelope, StatsReport, StatsTotals,
    SymbolEntry, SymbolFile,
};
pub use output::OutputFormat;
pub use scanner::{ExclusionFilter, FileTarget, FileWalker};

/// Global language registry instance (lazily initialized).
pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(LanguageRegistry::new);
