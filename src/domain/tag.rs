use std::fmt;

/// Glob used to find release tags in history
pub const RELEASE_TAG_GLOB: &str = "v*";

/// Base tag used when history has no release tag
pub const FALLBACK_TAG: &str = "v0.0.0";

/// The release tag a development version is based on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
}

impl ReleaseTag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        ReleaseTag { name: name.into() }
    }

    /// Tag to use when no release tag is reachable
    pub fn fallback() -> Self {
        ReleaseTag::new(FALLBACK_TAG)
    }

    /// Resolve an optional lookup result, falling back to `v0.0.0`
    pub fn or_fallback(found: Option<String>) -> Self {
        found.map(ReleaseTag::new).unwrap_or_else(ReleaseTag::fallback)
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
