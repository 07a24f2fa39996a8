use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("Empty search pattern")]
    EmptyPattern,

    #[error("Invalid line spec: {0}")]
    LineSpec(String),

    #[error("Directory not found: {0}")]
    RootNotFound(String),

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
