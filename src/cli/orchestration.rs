//! Workflow orchestration logic
//!
//! Entry points for the `version` and `publish` commands, decoupled from
//! clap so they can be driven programmatically and from tests.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::config::{load_config, PublishConfig, PublishSettings};
use crate::domain::DevVersion;
use crate::error::Result;
use crate::git::{collect_version_inputs, Git2Repository, GitMetadata, Repository};
use crate::publish::{Pipeline, PublishReport};
use crate::tools::ToolRunner;

/// Arguments for the publish workflow
///
/// Mirrors the CLI flags (or their environment variables) without
/// depending on clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Settings from flags and environment; these win over the file
    pub settings: PublishSettings,

    /// Directory inside the repository that supplies artifact metadata
    pub repo_path: PathBuf,
}

/// Compute the development version of the repository at `repo_path`.
pub fn run_version(repo_path: &Path, now: NaiveDateTime) -> Result<DevVersion> {
    let repo = Git2Repository::open(repo_path)?;
    version_for(&repo, now)
}

/// Compute the development version from any [Repository].
pub fn version_for<R: Repository + ?Sized>(repo: &R, now: NaiveDateTime) -> Result<DevVersion> {
    let inputs = collect_version_inputs(repo, now)?;
    Ok(DevVersion::from_inputs(inputs))
}

/// Merge the config file with flag/env settings and validate the result.
///
/// Fails with `MissingSettings` before any tool is looked up.
pub fn resolve_publish_config(args: &PublishWorkflowArgs) -> Result<PublishConfig> {
    let file = load_config(args.config_path.as_deref())?;
    let settings = file.publish.overlay(args.settings.clone());
    PublishConfig::resolve(settings, file.tools)
}

/// Main publish workflow
///
/// 1. Resolve and validate configuration
/// 2. Check that every external tool is installed
/// 3. Run the image, chart and flux steps that are configured
///
/// Git is only opened when the flux step needs artifact metadata.
pub fn run_publish_workflow<R: ToolRunner>(
    args: &PublishWorkflowArgs,
    runner: &R,
) -> Result<PublishReport> {
    let config = resolve_publish_config(args)?;
    publish_with(&config, runner, || {
        let repo = Git2Repository::open(&args.repo_path)?;
        GitMetadata::collect(&repo)
    })
}

/// Run the pipeline for an already validated configuration.
pub fn publish_with<R, F>(config: &PublishConfig, runner: &R, metadata: F) -> Result<PublishReport>
where
    R: ToolRunner,
    F: FnOnce() -> Result<GitMetadata>,
{
    tracing::info!(
        registry = %config.registry,
        version = %config.version,
        app = %config.app_name,
        "publishing"
    );
    Pipeline::new(config, runner).run(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use chrono::NaiveDate;

    #[test]
    fn test_version_for_mock_repository() {
        let repo = MockRepository::new()
            .with_head("abcd1234567890abcd1234567890abcd12345678")
            .with_branch("main")
            .with_tag("v1.2.0", 5);
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let version = version_for(&repo, now).unwrap();
        assert_eq!(
            version.to_string(),
            "v1.2.0-DEV.20250101120000.main.5.sha-abcd123"
        );
    }
}
