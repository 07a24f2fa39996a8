pub mod exclusion;
pub mod glob;
pub mod paths;
pub mod walker;

pub use exclusion::ExclusionFilter;
pub use walker::{FileTarget, FileWalker};
