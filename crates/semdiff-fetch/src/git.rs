//! Fetch file content from a local git repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::traits::{validate_content, ContentFetcher};

/// Reads blobs with `git cat-file`.
///
/// Revisions are anything git accepts as a tree-ish (branch, tag, commit
/// id, `HEAD~2`). The object type and size are checked before the content
/// is read, so directories and oversized files never reach memory.
#[derive(Clone, Debug)]
pub struct GitFetcher {
    repo: PathBuf,
    config: FetchConfig,
}

impl GitFetcher {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self::with_config(repo, FetchConfig::default())
    }

    pub fn with_config(repo: impl Into<PathBuf>, config: FetchConfig) -> Self {
        Self {
            repo: repo.into(),
            config,
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    async fn cat_file(&self, args: &[&str]) -> FetchResult<std::process::Output> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .arg("cat-file")
            .args(args)
            .output()
            .await?;
        Ok(output)
    }

    async fn cat_file_text(&self, flag: &str, object: &str) -> FetchResult<Option<String>> {
        let output = self.cat_file(&[flag, object]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not a git repository") {
                return Err(FetchError::Backend(stderr.trim().to_string()));
            }
            debug!(object, stderr = %stderr.trim(), "git object lookup failed");
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }
}

#[async_trait]
impl ContentFetcher for GitFetcher {
    async fn fetch(&self, path: &str, rev: &str) -> FetchResult<Vec<u8>> {
        let path = path.trim_start_matches('/');
        let object = format!("{rev}:{path}");
        let not_found = || FetchError::NotFound {
            path: path.to_string(),
            rev: rev.to_string(),
        };

        let kind = self.cat_file_text("-t", &object).await?.ok_or_else(not_found)?;
        match kind.as_str() {
            "blob" => {}
            "tree" => {
                return Err(FetchError::NotAFile {
                    path: path.to_string(),
                })
            }
            other => {
                return Err(FetchError::Backend(format!(
                    "{object} is a {other}, expected a blob"
                )))
            }
        }

        let size = self.cat_file_text("-s", &object).await?.ok_or_else(not_found)?;
        let size: u64 = size
            .parse()
            .map_err(|_| FetchError::Backend(format!("unexpected object size {size:?}")))?;
        if size > self.config.max_file_size {
            return Err(FetchError::SizeExceeded {
                path: path.to_string(),
                size,
                max: self.config.max_file_size,
            });
        }

        let output = self.cat_file(&["blob", object.as_str()]).await?;
        if !output.status.success() {
            return Err(not_found());
        }
        debug!(path, rev, size, "fetched blob");
        validate_content(&self.config, path, output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn git(dir: &Path, args: &[&str]) -> bool {
        StdCommand::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// A repository with two commits touching `config.json`, or `None` when
    /// git is unavailable.
    fn fixture_repo() -> Option<tempfile::TempDir> {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        if !git(root, &["init", "-q"]) {
            return None;
        }
        git(root, &["config", "user.email", "dev@example.com"]);
        git(root, &["config", "user.name", "dev"]);
        git(root, &["config", "commit.gpgsign", "false"]);

        std::fs::create_dir(root.join("conf")).unwrap();
        std::fs::write(root.join("conf/config.json"), r#"{"a": 1, "b": 2}"#).unwrap();
        std::fs::write(root.join("logo.bin"), [0xffu8, 0x00, 0xfe]).unwrap();
        git(root, &["add", "."]);
        git(root, &["commit", "-q", "-m", "first"]);
        git(root, &["tag", "v1"]);

        std::fs::write(root.join("conf/config.json"), r#"{"b": 2, "a": 1, "c": 3}"#).unwrap();
        git(root, &["commit", "-q", "-am", "second"]);
        Some(dir)
    }

    #[tokio::test]
    async fn fetches_blob_at_each_revision() {
        let Some(repo) = fixture_repo() else { return };
        let fetcher = GitFetcher::new(repo.path());

        let old = fetcher.fetch("conf/config.json", "v1").await.unwrap();
        let new = fetcher.fetch("conf/config.json", "HEAD").await.unwrap();
        assert_eq!(old, br#"{"a": 1, "b": 2}"#);
        assert_eq!(new, br#"{"b": 2, "a": 1, "c": 3}"#);
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let Some(repo) = fixture_repo() else { return };
        let fetcher = GitFetcher::new(repo.path());
        let err = fetcher.fetch("nope.json", "HEAD").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn directory_is_not_a_file() {
        let Some(repo) = fixture_repo() else { return };
        let fetcher = GitFetcher::new(repo.path());
        let err = fetcher.fetch("conf", "HEAD").await.unwrap_err();
        assert!(matches!(err, FetchError::NotAFile { .. }));
    }

    #[tokio::test]
    async fn size_and_text_checks() {
        let Some(repo) = fixture_repo() else { return };

        let small = GitFetcher::with_config(
            repo.path(),
            FetchConfig {
                max_file_size: 8,
                ..Default::default()
            },
        );
        let err = small.fetch("conf/config.json", "HEAD").await.unwrap_err();
        assert!(matches!(err, FetchError::SizeExceeded { .. }));

        let fetcher = GitFetcher::new(repo.path());
        let err = fetcher.fetch("logo.bin", "HEAD").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn outside_a_repository_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        if !git(dir.path(), &["--version"]) {
            return;
        }
        let fetcher = GitFetcher::new(dir.path());
        let err = fetcher.fetch("a.json", "HEAD").await.unwrap_err();
        assert!(matches!(err, FetchError::Backend(_)));
    }
}
