//! Git query abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of
//! read-only git queries ci-publish needs, so that version generation and
//! artifact metadata can be tested without a real repository.
//!
//! # Overview
//!
//! - [Repository]: the query trait
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! The free functions [collect_version_inputs] and [GitMetadata::collect]
//! run the queries once at the call site and hand plain values to the
//! pure domain code.
//!
//! ```rust
//! # use ci_publish::git::{collect_version_inputs, Repository};
//! # use ci_publish::domain::DevVersion;
//! # fn example<R: Repository>(repo: &R) -> ci_publish::Result<()> {
//! let inputs = collect_version_inputs(repo, chrono::Local::now().naive_local())?;
//! println!("{}", DevVersion::from_inputs(inputs));
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use chrono::NaiveDateTime;

use crate::domain::dev_version::DETACHED_BRANCH;
use crate::domain::VersionInputs;
use crate::error::Result;

/// Remote whose URL is attached to pushed artifacts
pub const ORIGIN: &str = "origin";

/// Read-only git queries
///
/// All implementors must be `Send + Sync`. Implementations map underlying
/// errors (like `git2::Error`) to [crate::error::CiPublishError].
pub trait Repository: Send + Sync {
    /// Nearest tag reachable from HEAD whose name matches `v*`
    ///
    /// Like `git describe --tags --abbrev=0 --match 'v*'`: the first tagged
    /// commit in a topological walk from HEAD. When several release tags
    /// share that commit, the highest version wins.
    ///
    /// # Returns
    /// * `Ok(Some(name))` - Full tag name
    /// * `Ok(None)` - No matching tag in history
    /// * `Err` - Git error, including a repository without commits
    fn latest_release_tag(&self) -> Result<Option<String>>;

    /// Number of commits in `tag..HEAD`
    ///
    /// Counts commits reachable from HEAD but not from the tag, so the
    /// tagged commit itself is excluded and HEAD is included.
    fn commits_since(&self, tag: &str) -> Result<u64>;

    /// Abbreviated HEAD hash using the repository's `core.abbrev`
    fn short_head_hash(&self) -> Result<String>;

    /// Full 40-character HEAD hash
    fn head_hash(&self) -> Result<String>;

    /// Checked-out branch name, or an empty string when HEAD is detached
    fn current_branch(&self) -> Result<String>;

    /// Fetch URL of a remote, or `None` if the remote is not configured
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;
}

/// Gather generator inputs from git.
///
/// The commit count query is skipped when no release tag exists.
pub fn collect_version_inputs<R: Repository + ?Sized>(
    repo: &R,
    now: NaiveDateTime,
) -> Result<VersionInputs> {
    // Fails first on an empty repository, before any other query.
    let short_sha = repo.short_head_hash()?;
    let current_branch = repo.current_branch()?;
    let last_tag = repo.latest_release_tag()?;

    let commits_since_tag = match last_tag.as_deref() {
        Some(tag) => repo.commits_since(tag)?,
        None => 0,
    };

    tracing::debug!(
        branch = %current_branch,
        tag = ?last_tag,
        commits = commits_since_tag,
        sha = %short_sha,
        "collected version inputs"
    );

    Ok(VersionInputs {
        current_branch,
        last_tag,
        commits_since_tag,
        short_sha,
        now,
    })
}

/// Descriptive source metadata attached to pushed GitOps artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitMetadata {
    pub branch: String,
    pub long_sha: String,
    pub origin_url: Option<String>,
}

impl GitMetadata {
    pub fn collect<R: Repository + ?Sized>(repo: &R) -> Result<Self> {
        Ok(GitMetadata {
            branch: repo.current_branch()?,
            long_sha: repo.head_hash()?,
            origin_url: repo.remote_url(ORIGIN)?,
        })
    }

    /// Flux revision string, e.g. `main@sha1:<full hash>`
    ///
    /// A detached HEAD is reported as `detached@sha1:<full hash>`.
    pub fn revision(&self) -> String {
        let branch = if self.branch.is_empty() {
            DETACHED_BRANCH
        } else {
            self.branch.as_str()
        };
        format!("{}@sha1:{}", branch, self.long_sha)
    }
}
