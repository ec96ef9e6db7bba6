//! Content fetching for semdiff.
//!
//! The diff engine works on bytes; this crate supplies them. A
//! [`ContentFetcher`] returns a file's content at a revision, enforcing a
//! size cap and rejecting directories, and [`compare_two_revisions`] runs
//! both fetches concurrently before handing the result to the semantic
//! differ.
//!
//! # Fetchers
//!
//! - [`InMemoryFetcher`] -- `HashMap`-based fetcher for tests and embedding
//! - [`GitFetcher`] -- reads blobs from a local repository with `git cat-file`

pub mod compare;
pub mod config;
pub mod error;
pub mod git;
pub mod memory;
pub mod traits;

pub use compare::{compare_two_revisions, compare_two_revisions_with};
pub use config::{FetchConfig, MAX_FILE_SIZE};
pub use error::{CompareError, CompareResult, FetchError, FetchResult};
pub use git::GitFetcher;
pub use memory::InMemoryFetcher;
pub use traits::{validate_content, ContentFetcher};
