//! Publish pipeline: image, chart and Flux bundle, in that order
//!
//! Steps whose setting is absent are skipped. Once a step starts, the first
//! failing action aborts the whole run; nothing already pushed is undone.

pub mod steps;
pub mod workspace;

pub use steps::{Action, StepKind};
pub use workspace::Workspace;

use crate::config::PublishConfig;
use crate::error::Result;
use crate::git::GitMetadata;
use crate::tools::ToolRunner;
use crate::ui;

/// What happened to a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Published,
    Skipped,
}

/// Result of a successful publish run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub version: String,
    pub steps: Vec<(StepKind, StepOutcome)>,
}

impl PublishReport {
    pub fn outcome(&self, kind: StepKind) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| *outcome)
    }

    pub fn published(&self) -> Vec<StepKind> {
        self.steps
            .iter()
            .filter(|(_, outcome)| *outcome == StepOutcome::Published)
            .map(|(kind, _)| *kind)
            .collect()
    }
}

/// Sequential publish step chain
pub struct Pipeline<'a, R: ToolRunner> {
    config: &'a PublishConfig,
    runner: &'a R,
}

impl<'a, R: ToolRunner> Pipeline<'a, R> {
    pub fn new(config: &'a PublishConfig, runner: &'a R) -> Self {
        Pipeline { config, runner }
    }

    /// Check every configured tool, whether or not its step will run
    pub fn check_tools(&self) -> Result<()> {
        for program in self.config.tools.all() {
            self.runner.ensure_available(program)?;
        }
        Ok(())
    }

    /// Run all steps.
    ///
    /// `metadata` supplies the source commit of the Flux artifact. It is
    /// called once, after the tool check, and only when the flux step is
    /// configured.
    pub fn run<F>(&self, metadata: F) -> Result<PublishReport>
    where
        F: FnOnce() -> Result<GitMetadata>,
    {
        self.check_tools()?;

        let metadata = match self.config.flux_dir {
            Some(_) => Some(metadata()?),
            None => None,
        };

        if self.config.chart_dir.is_some() && !is_semver(&self.config.version) {
            ui::display_warning(&format!(
                "Version '{}' is not semver; helm may reject it",
                self.config.version
            ));
        }

        if let Some(bundle) = &self.config.flux_dir {
            workspace::ensure_outside_staging(&self.config.build_dir, bundle)?;
        }
        let workspace = Workspace::prepare(&self.config.build_dir)?;
        let mut report = PublishReport {
            version: self.config.version.clone(),
            steps: Vec::new(),
        };

        for kind in StepKind::ALL {
            let Some(actions) = steps::plan(kind, self.config, &workspace, metadata.as_ref()) else {
                tracing::info!(step = %kind, "skipped");
                ui::display_status(&format!("Skipping {} step ({} not set)", kind, kind.gate()));
                report.steps.push((kind, StepOutcome::Skipped));
                continue;
            };

            tracing::info!(step = %kind, actions = actions.len(), "starting");
            ui::display_status(&format!("Publishing {}", kind));
            for action in &actions {
                self.execute(action)?;
            }
            ui::display_success(&format!("Published {} {}", kind, self.config.version));
            report.steps.push((kind, StepOutcome::Published));
        }

        Ok(report)
    }

    fn execute(&self, action: &Action) -> Result<()> {
        tracing::debug!(%action, "executing");
        match action {
            Action::Run(invocation) => self.runner.run(invocation),
            Action::CopyTree { from, to } => {
                let copied = workspace::copy_tree(from, to)?;
                tracing::debug!(files = copied, "copied bundle");
                Ok(())
            }
        }
    }
}

fn is_semver(version: &str) -> bool {
    semver::Version::parse(version.strip_prefix('v').unwrap_or(version)).is_ok()
}
