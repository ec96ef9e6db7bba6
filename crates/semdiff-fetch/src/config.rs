use serde::{Deserialize, Serialize};

/// Largest file, in bytes, a fetcher will return.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Limits applied to every fetched file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Content above this size is rejected with `SizeExceeded`.
    pub max_file_size: u64,
    /// Reject content that is not valid UTF-8 with `Decode`.
    pub require_text: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            require_text: true,
        }
    }
}

impl FetchConfig {
    /// A configuration that also passes binary content through.
    pub fn allow_binary() -> Self {
        Self {
            require_text: false,
            ..Default::default()
        }
    }
}
