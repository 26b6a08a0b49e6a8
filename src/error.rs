use thiserror::Error;

/// Failures are limited to configuration and the optional perf log. Pagination itself
/// never fails.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
