pub mod lines;
pub mod matcher;
pub mod reader;
pub mod search;

pub use matcher::PatternMatcher;

use crate::error::Result;

/// Dedicated pool for per-file content work, capped at twice the logical
/// processor count so deep trees of small files cannot fan out unbounded.
pub fn worker_pool() -> Result<rayon::ThreadPool> {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cpus * 2)
        .thread_name(|i| format!("content-{i}"))
        .build()?;
    Ok(pool)
}
