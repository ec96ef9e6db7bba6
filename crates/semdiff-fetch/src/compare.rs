use semdiff_diff::{semantic_diff_with, DiffOptions, DiffResult};
use tracing::{debug, warn};

use crate::error::{CompareError, CompareResult, FetchResult};
use crate::traits::ContentFetcher;

/// Compare `path` between two revisions with default diff options.
pub async fn compare_two_revisions<F>(
    fetcher: &F,
    path: &str,
    base_ref: &str,
    head_ref: &str,
) -> CompareResult<DiffResult>
where
    F: ContentFetcher + ?Sized,
{
    compare_two_revisions_with(&DiffOptions::default(), fetcher, path, base_ref, head_ref).await
}

/// Compare `path` between two revisions.
///
/// Both sides are fetched concurrently. If exactly one fetch fails, that
/// side is treated as absent and the file shows up as added or deleted;
/// only a failure on both sides is an error.
pub async fn compare_two_revisions_with<F>(
    options: &DiffOptions,
    fetcher: &F,
    path: &str,
    base_ref: &str,
    head_ref: &str,
) -> CompareResult<DiffResult>
where
    F: ContentFetcher + ?Sized,
{
    let (base, head) = tokio::join!(fetcher.fetch(path, base_ref), fetcher.fetch(path, head_ref));

    let (base, head) = match (base, head) {
        (Err(base), Err(head)) => {
            return Err(CompareError::BothSidesFailed {
                path: path.to_string(),
                base_ref: base_ref.to_string(),
                base,
                head_ref: head_ref.to_string(),
                head,
            })
        }
        (base, head) => (
            present(base, path, "base", base_ref),
            present(head, path, "head", head_ref),
        ),
    };

    debug!(path, base_ref, head_ref, "comparing revisions");
    Ok(semantic_diff_with(options, path, base.as_deref(), head.as_deref()))
}

fn present(fetched: FetchResult<Vec<u8>>, path: &str, side: &str, rev: &str) -> Option<Vec<u8>> {
    fetched
        .map_err(|error| warn!(path, side, rev, %error, "fetch failed, treating side as absent"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryFetcher;
    use semdiff_diff::DiffFormat;

    fn fetcher() -> InMemoryFetcher {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert_file("main", "config.json", r#"{"a":1,"b":2}"#);
        fetcher.insert_file("feature", "config.json", r#"{"b":2,"a":1,"c":3}"#);
        fetcher.insert_file("feature", "new.yaml", "a: 1\n");
        fetcher
    }

    #[tokio::test]
    async fn both_sides_present() {
        let result = compare_two_revisions(&fetcher(), "config.json", "main", "feature")
            .await
            .unwrap();
        assert_eq!(result.format, DiffFormat::Json);
        assert!(!result.used_fallback);
        assert_eq!(result.render(), "c: added 3");
    }

    #[tokio::test]
    async fn single_failure_is_an_added_file() {
        let result = compare_two_revisions(&fetcher(), "new.yaml", "main", "feature")
            .await
            .unwrap();
        assert_eq!(result.format, DiffFormat::Yaml);
        assert!(result.used_fallback);
        assert_eq!(result.message.as_deref(), Some("file added"));
    }

    #[tokio::test]
    async fn both_failures_are_reported_together() {
        let err = compare_two_revisions(&fetcher(), "missing.json", "main", "feature")
            .await
            .unwrap_err();
        let CompareError::BothSidesFailed {
            base_ref, head_ref, ..
        } = &err;
        assert_eq!((base_ref.as_str(), head_ref.as_str()), ("main", "feature"));
        assert_eq!(
            err.to_string(),
            "failed to get file at both refs: base \"main\": missing.json not found at main, \
             head \"feature\": missing.json not found at feature"
        );
    }

    #[tokio::test]
    async fn works_through_trait_objects() {
        let fetcher: Box<dyn ContentFetcher> = Box::new(fetcher());
        let result = compare_two_revisions(fetcher.as_ref(), "config.json", "feature", "main")
            .await
            .unwrap();
        assert_eq!(result.render(), "c: removed (was 3)");
    }
}
