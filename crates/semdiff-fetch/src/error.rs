use thiserror::Error;

/// Errors produced while fetching one file at one revision.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{path} not found at {rev}")]
    NotFound { path: String, rev: String },

    #[error("{path} is a directory, not a file")]
    NotAFile { path: String },

    #[error("{path} is {size} bytes, exceeding the maximum of {max} bytes")]
    SizeExceeded { path: String, size: u64, max: u64 },

    #[error("{path} could not be decoded as text")]
    Decode { path: String },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Errors from comparing a file between two revisions.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Only raised when neither side could be fetched; a single failure
    /// is treated as an added or deleted file.
    #[error("failed to get file at both refs: base {base_ref:?}: {base}, head {head_ref:?}: {head}")]
    BothSidesFailed {
        path: String,
        base_ref: String,
        base: FetchError,
        head_ref: String,
        head: FetchError,
    },
}

pub type CompareResult<T> = Result<T, CompareError>;
