use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Branch name reduced to characters that are legal in a semver
/// pre-release identifier (`[A-Za-z0-9-]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSlug(String);

fn illegal_chars() -> &'static Regex {
    static ILLEGAL: OnceLock<Regex> = OnceLock::new();
    ILLEGAL.get_or_init(|| Regex::new(r"[^A-Za-z0-9-]").expect("static pattern"))
}

impl BranchSlug {
    /// Slug a branch name, replacing every illegal character with `-`
    pub fn new(branch: &str) -> Self {
        BranchSlug(illegal_chars().replace_all(branch, "-").into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BranchSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
