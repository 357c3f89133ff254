use crate::error::{CiPublishError, Result};
use crate::git::Repository;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock repository for testing without actual git operations
///
/// An instance without a head behaves like a repository with no commits.
pub struct MockRepository {
    head: Option<String>,
    branch: String,
    tag: Option<(String, u64)>,
    remotes: HashMap<String, String>,
    count_queries: AtomicUsize,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            head: None,
            branch: String::new(),
            tag: None,
            remotes: HashMap::new(),
            count_queries: AtomicUsize::new(0),
        }
    }

    /// Set the full HEAD hash
    pub fn with_head(mut self, hash: impl Into<String>) -> Self {
        self.head = Some(hash.into());
        self
    }

    /// Set the checked-out branch; leave unset for a detached HEAD
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the nearest release tag and the commit count since it
    pub fn with_tag(mut self, name: impl Into<String>, commits_since: u64) -> Self {
        self.tag = Some((name.into(), commits_since));
        self
    }

    pub fn with_remote(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.remotes.insert(name.into(), url.into());
        self
    }

    /// How many times `commits_since` was called
    pub fn count_queries(&self) -> usize {
        self.count_queries.load(Ordering::SeqCst)
    }

    fn require_head(&self) -> Result<&str> {
        self.head
            .as_deref()
            .ok_or_else(|| CiPublishError::Git(git2::Error::from_str("repository has no commits")))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn latest_release_tag(&self) -> Result<Option<String>> {
        self.require_head()?;
        Ok(self.tag.as_ref().map(|(name, _)| name.clone()))
    }

    fn commits_since(&self, tag: &str) -> Result<u64> {
        self.count_queries.fetch_add(1, Ordering::SeqCst);
        match &self.tag {
            Some((name, count)) if name == tag => Ok(*count),
            _ => Err(CiPublishError::Git(git2::Error::from_str(&format!(
                "tag not found: {}",
                tag
            )))),
        }
    }

    fn short_head_hash(&self) -> Result<String> {
        Ok(self.require_head()?.chars().take(7).collect())
    }

    fn head_hash(&self) -> Result<String> {
        Ok(self.require_head()?.to_string())
    }

    fn current_branch(&self) -> Result<String> {
        self.require_head()?;
        Ok(self.branch.clone())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        Ok(self.remotes.get(remote).cloned())
    }
}
