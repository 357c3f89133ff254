use crate::domain::tag::RELEASE_TAG_GLOB;
use crate::error::{CiPublishError, Result};
use git2::{ErrorCode, Oid, Repository as Git2Repo, Sort};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
        }
    }

    fn repo(&self) -> MutexGuard<'_, Git2Repo> {
        self.repo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolve HEAD to a commit, reporting an empty repository explicitly
fn head_commit(repo: &Git2Repo) -> Result<git2::Commit<'_>> {
    let head = repo.head().map_err(|e| match e.code() {
        ErrorCode::UnbornBranch | ErrorCode::NotFound => {
            CiPublishError::Git(git2::Error::from_str("repository has no commits"))
        }
        _ => CiPublishError::Git(e),
    })?;

    Ok(head.peel_to_commit()?)
}

/// Commits carrying a `v*` tag, with every matching tag name per commit.
///
/// Tags pointing at trees or blobs are ignored.
fn release_tag_targets(repo: &Git2Repo) -> Result<HashMap<Oid, Vec<String>>> {
    let mut targets: HashMap<Oid, Vec<String>> = HashMap::new();

    for name in repo.tag_names(Some(RELEASE_TAG_GLOB))?.iter().flatten() {
        let target = repo
            .revparse_single(&format!("refs/tags/{}", name))
            .and_then(|object| object.peel_to_commit());
        if let Ok(commit) = target {
            targets.entry(commit.id()).or_default().push(name.to_string());
        }
    }

    Ok(targets)
}

/// Order tags on the same commit by version, falling back to name
fn compare_tags(a: &str, b: &str) -> Ordering {
    let parse = |name: &str| semver::Version::parse(name.strip_prefix('v').unwrap_or(name)).ok();
    match (parse(a), parse(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => a.cmp(b),
    }
}

impl super::Repository for Git2Repository {
    fn latest_release_tag(&self) -> Result<Option<String>> {
        let repo = self.repo();
        let head = head_commit(&repo)?.id();

        let targets = release_tag_targets(&repo)?;
        if targets.is_empty() {
            return Ok(None);
        }

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;

        for oid in revwalk {
            if let Some(names) = targets.get(&oid?) {
                return Ok(names.iter().max_by(|a, b| compare_tags(a, b)).cloned());
            }
        }

        Ok(None)
    }

    fn commits_since(&self, tag: &str) -> Result<u64> {
        let repo = self.repo();
        let tag_commit = repo
            .revparse_single(&format!("refs/tags/{}", tag))
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| CiPublishError::Git(git2::Error::from_str(&format!(
                "Cannot resolve tag '{}': {}",
                tag,
                e.message()
            ))))?;

        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.hide(tag_commit.id())?;

        let mut count = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }

        Ok(count)
    }

    fn short_head_hash(&self) -> Result<String> {
        let repo = self.repo();
        let commit = head_commit(&repo)?;
        let short = commit.as_object().short_id()?;

        short
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CiPublishError::Git(git2::Error::from_str("short id is not UTF-8")))
    }

    fn head_hash(&self) -> Result<String> {
        let repo = self.repo();
        let id = head_commit(&repo)?.id();
        Ok(id.to_string())
    }

    fn current_branch(&self) -> Result<String> {
        let repo = self.repo();
        head_commit(&repo)?;

        if repo.head_detached()? {
            return Ok(String::new());
        }

        let head = repo.head()?;
        Ok(head.shorthand().unwrap_or_default().to_string())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        let repo = self.repo();
        let result = match repo.find_remote(remote) {
            Ok(found) => Ok(found.url().map(str::to_string)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        };
        result
    }
}
