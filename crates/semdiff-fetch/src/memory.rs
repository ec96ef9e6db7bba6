use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::traits::{validate_content, ContentFetcher};

#[derive(Clone, Debug)]
enum Entry {
    File(Vec<u8>),
    Directory,
}

/// In-memory fetcher keyed by `(rev, path)`.
///
/// Intended for tests and embedding. Entries live behind a `RwLock` so the
/// fetcher can be shared across concurrent comparisons.
pub struct InMemoryFetcher {
    entries: RwLock<HashMap<(String, String), Entry>>,
    config: FetchConfig,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Store file content for `path` at `rev`, replacing any previous entry.
    pub fn insert_file(&self, rev: &str, path: &str, content: impl Into<Vec<u8>>) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert((rev.to_string(), path.to_string()), Entry::File(content.into()));
    }

    /// Mark `path` as a directory at `rev`.
    pub fn insert_directory(&self, rev: &str, path: &str) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert((rev.to_string(), path.to_string()), Entry::Directory);
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for InMemoryFetcher {
    async fn fetch(&self, path: &str, rev: &str) -> FetchResult<Vec<u8>> {
        let entry = self
            .entries
            .read()
            .expect("lock poisoned")
            .get(&(rev.to_string(), path.to_string()))
            .cloned();

        match entry {
            Some(Entry::File(content)) => validate_content(&self.config, path, content),
            Some(Entry::Directory) => Err(FetchError::NotAFile {
                path: path.to_string(),
            }),
            None => Err(FetchError::NotFound {
                path: path.to_string(),
                rev: rev.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_by_rev_and_path() {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert_file("main", "a.json", "{}");
        fetcher.insert_file("feature", "a.json", "{\"a\": 1}");

        assert_eq!(fetcher.fetch("a.json", "main").await.unwrap(), b"{}");
        assert_eq!(fetcher.fetch("a.json", "feature").await.unwrap(), b"{\"a\": 1}");
        assert_eq!(fetcher.len(), 2);
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let fetcher = InMemoryFetcher::new();
        let err = fetcher.fetch("a.json", "main").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn directory_is_not_a_file() {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert_directory("main", "src");
        let err = fetcher.fetch("src", "main").await.unwrap_err();
        assert_eq!(err.to_string(), "src is a directory, not a file");
    }

    #[tokio::test]
    async fn size_cap_is_enforced() {
        let fetcher = InMemoryFetcher::with_config(FetchConfig {
            max_file_size: 4,
            ..Default::default()
        });
        fetcher.insert_file("main", "big.txt", "too large");
        let err = fetcher.fetch("big.txt", "main").await.unwrap_err();
        assert!(matches!(err, FetchError::SizeExceeded { size: 9, .. }));
    }
}
