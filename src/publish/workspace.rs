use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CiPublishError, Result};

pub const CHART_SUBDIR: &str = "chart";
pub const FLUX_SUBDIR: &str = "flux";

/// Build directory holding packaged charts and the staged Flux bundle.
///
/// Artifacts are left in place after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create `<root>/chart` and `<root>/flux`, emptying any previous contents
    pub fn prepare(root: &Path) -> Result<Self> {
        for sub in [CHART_SUBDIR, FLUX_SUBDIR] {
            let dir = root.join(sub);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
            fs::create_dir_all(&dir)?;
        }

        tracing::debug!(root = %root.display(), "prepared build workspace");

        Ok(Workspace {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn chart_dir(&self) -> PathBuf {
        self.root.join(CHART_SUBDIR)
    }

    pub fn flux_dir(&self) -> PathBuf {
        self.root.join(FLUX_SUBDIR)
    }
}

/// Fail if `source` lies in a directory that [Workspace::prepare] empties.
///
/// Paths that do not exist yet cannot be clobbered and are accepted.
pub fn ensure_outside_staging(root: &Path, source: &Path) -> Result<()> {
    let Ok(source) = source.canonicalize() else {
        return Ok(());
    };

    for sub in [CHART_SUBDIR, FLUX_SUBDIR] {
        let Ok(staging) = root.join(sub).canonicalize() else {
            continue;
        };
        if source.starts_with(&staging) {
            return Err(CiPublishError::config(format!(
                "'{}' is inside the build directory '{}', which is emptied before publishing",
                source.display(),
                staging.display()
            )));
        }
    }

    Ok(())
}

/// Recursively copy the contents of `from` into `to`.
///
/// Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(CiPublishError::config(format!(
            "'{}' is not a directory",
            from.display()
        )));
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| CiPublishError::config(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}
