use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};

/// Source of file content at a revision.
///
/// Implementations must enforce their [`FetchConfig`]: oversized content is
/// an error, never truncated, and directories are reported as `NotAFile`.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the full content of `path` at `rev`.
    async fn fetch(&self, path: &str, rev: &str) -> FetchResult<Vec<u8>>;
}

/// Apply the size and text checks of `config` to fetched content.
pub fn validate_content(config: &FetchConfig, path: &str, content: Vec<u8>) -> FetchResult<Vec<u8>> {
    let size = content.len() as u64;
    if size > config.max_file_size {
        return Err(FetchError::SizeExceeded {
            path: path.to_string(),
            size,
            max: config.max_file_size,
        });
    }
    if config.require_text && std::str::from_utf8(&content).is_err() {
        return Err(FetchError::Decode {
            path: path.to_string(),
        });
    }
    Ok(content)
}
