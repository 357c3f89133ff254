//! Development version strings
//!
//! A development version looks like
//! `v1.2.0-DEV.20250101120000.main.5.sha-abcd123`: the nearest release tag,
//! the literal `DEV`, a fixed-width build timestamp, the branch slug, the
//! number of commits since the tag and the abbreviated commit hash.
//!
//! The timestamp is the first identifier after `DEV`, so builds of the same
//! branch compare by build time under semver pre-release ordering.

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::branch::BranchSlug;
use crate::domain::tag::ReleaseTag;
use crate::error::{CiPublishError, Result};

/// Pre-release marker separating development builds from real pre-releases
pub const DEV_MARKER: &str = "DEV";

/// Build timestamp layout: fixed width, no separators
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Prefix keeping the hash segment from being read as a numeric identifier
pub const SHA_PREFIX: &str = "sha-";

/// Branch segment used when HEAD is detached
pub const DETACHED_BRANCH: &str = "detached";

/// Everything the generator needs, gathered once from git and the clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInputs {
    /// Checked-out branch; empty when HEAD is detached
    pub current_branch: String,
    /// Nearest reachable `v*` tag, if any
    pub last_tag: Option<String>,
    /// Commits in `last_tag..HEAD`; ignored when there is no tag
    pub commits_since_tag: u64,
    /// Abbreviated HEAD hash
    pub short_sha: String,
    pub now: NaiveDateTime,
}

/// A rendered-on-demand development version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevVersion {
    base_tag: ReleaseTag,
    timestamp: NaiveDateTime,
    branch_slug: BranchSlug,
    commits_since_tag: u64,
    short_sha: String,
}

impl DevVersion {
    /// Build a development version from collected inputs.
    ///
    /// Without a release tag the base is `v0.0.0` and the commit count is
    /// forced to zero. A detached HEAD uses the `detached` branch segment so
    /// the result never contains an empty identifier.
    pub fn from_inputs(inputs: VersionInputs) -> Self {
        let commits_since_tag = if inputs.last_tag.is_some() {
            inputs.commits_since_tag
        } else {
            0
        };

        let branch_slug = if inputs.current_branch.is_empty() {
            BranchSlug::new(DETACHED_BRANCH)
        } else {
            BranchSlug::new(&inputs.current_branch)
        };

        DevVersion {
            base_tag: ReleaseTag::or_fallback(inputs.last_tag),
            timestamp: inputs.now,
            branch_slug,
            commits_since_tag,
            short_sha: inputs.short_sha,
        }
    }

    pub fn base_tag(&self) -> &ReleaseTag {
        &self.base_tag
    }

    pub fn branch_slug(&self) -> &BranchSlug {
        &self.branch_slug
    }

    pub fn commits_since_tag(&self) -> u64 {
        self.commits_since_tag
    }

    pub fn short_sha(&self) -> &str {
        &self.short_sha
    }

    /// The `YYYYMMDDHHMMSS` segment
    pub fn timestamp_segment(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Parse the rendered string as a semantic version (leading `v` dropped)
    pub fn to_semver(&self) -> Result<semver::Version> {
        let rendered = self.to_string();
        let bare = rendered.strip_prefix('v').unwrap_or(&rendered);
        semver::Version::parse(bare).map_err(|e| {
            CiPublishError::version(format!("'{}' is not valid semver: {}", rendered, e))
        })
    }
}

impl fmt::Display for DevVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}.{}.{}.{}.{}{}",
            self.base_tag,
            DEV_MARKER,
            self.timestamp_segment(),
            self.branch_slug,
            self.commits_since_tag,
            SHA_PREFIX,
            self.short_sha
        )
    }
}
