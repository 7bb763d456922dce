use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnifiedIOError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("operation timed out")]
    Timeout,
    #[error("connection closed by peer")]
    Closed,
}

pub type UnifiedIOResult<T> = Result<T, UnifiedIOError>;
