//! Per-step action planning
//!
//! Each publish step turns into an ordered list of [Action]s, or `None` when
//! the step's gating setting is absent.

use std::fmt;
use std::path::PathBuf;

use crate::config::PublishConfig;
use crate::git::GitMetadata;
use crate::publish::workspace::Workspace;
use crate::tools::Invocation;

/// The three optional publish steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Image,
    Chart,
    Flux,
}

impl StepKind {
    /// Every step, in execution order
    pub const ALL: [StepKind; 3] = [StepKind::Image, StepKind::Chart, StepKind::Flux];

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Image => "image",
            StepKind::Chart => "chart",
            StepKind::Flux => "flux",
        }
    }

    /// Setting whose presence enables this step
    pub fn gate(&self) -> &'static str {
        match self {
            StepKind::Image => "DOCKERFILE",
            StepKind::Chart => "HELM_CHART_DIR",
            StepKind::Flux => "FLUX_DIR",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One unit of work inside a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(Invocation),
    CopyTree { from: PathBuf, to: PathBuf },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Run(invocation) => write!(f, "{}", invocation),
            Action::CopyTree { from, to } => {
                write!(f, "copy {} -> {}", from.display(), to.display())
            }
        }
    }
}

/// `<registry>/<app>:<version>`
pub fn image_reference(config: &PublishConfig) -> String {
    format!("{}/{}:{}", config.registry, config.app_name, config.version)
}

/// OCI repository charts are pushed under
pub fn chart_repository(config: &PublishConfig) -> String {
    format!("oci://{}/charts", config.registry)
}

/// `oci://<registry>/flux/<app>:<version>`
pub fn flux_artifact(config: &PublishConfig) -> String {
    format!(
        "oci://{}/flux/{}:{}",
        config.registry, config.app_name, config.version
    )
}

/// Plan the actions for one step; `None` means the step is skipped
pub fn plan(
    kind: StepKind,
    config: &PublishConfig,
    workspace: &Workspace,
    metadata: Option<&GitMetadata>,
) -> Option<Vec<Action>> {
    match kind {
        StepKind::Image => config.dockerfile.as_ref().map(|dockerfile| {
            let image = image_reference(config);
            let container = config.tools.container.as_str();
            vec![
                Action::Run(Invocation::new(container).args([
                    "build".to_string(),
                    "-f".to_string(),
                    dockerfile.display().to_string(),
                    "-t".to_string(),
                    image.clone(),
                    config.build_context.display().to_string(),
                ])),
                Action::Run(Invocation::new(container).args(["push".to_string(), image])),
            ]
        }),
        StepKind::Chart => config.chart_dir.as_ref().map(|parent| {
            let chart = parent.join(&config.app_name).display().to_string();
            let helm = config.tools.helm.as_str();
            let package = workspace
                .chart_dir()
                .join(format!("{}-{}.tgz", config.app_name, config.version));
            vec![
                Action::Run(Invocation::new(helm).args(["lint".to_string(), chart.clone()])),
                Action::Run(Invocation::new(helm).args([
                    "package".to_string(),
                    chart,
                    "--version".to_string(),
                    config.version.clone(),
                    "--app-version".to_string(),
                    config.version.clone(),
                    "--destination".to_string(),
                    workspace.chart_dir().display().to_string(),
                ])),
                Action::Run(Invocation::new(helm).args([
                    "push".to_string(),
                    package.display().to_string(),
                    chart_repository(config),
                ])),
            ]
        }),
        StepKind::Flux => config.flux_dir.as_ref().map(|bundle| {
            let artifact = flux_artifact(config);
            let flux = config.tools.flux.as_str();

            let mut push = Invocation::new(flux).args([
                "push".to_string(),
                "artifact".to_string(),
                artifact.clone(),
                format!("--path={}", workspace.flux_dir().display()),
            ]);
            if let Some(metadata) = metadata {
                if let Some(url) = &metadata.origin_url {
                    push = push.arg(format!("--source={}", url));
                }
                push = push.arg(format!("--revision={}", metadata.revision()));
            }

            vec![
                Action::CopyTree {
                    from: bundle.clone(),
                    to: workspace.flux_dir(),
                },
                Action::Run(push),
                Action::Run(Invocation::new(flux).args([
                    "tag".to_string(),
                    "artifact".to_string(),
                    artifact,
                    "--tag".to_string(),
                    config.flux_tag.clone(),
                ])),
            ]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PublishSettings, ToolsConfig};

    fn config(settings: PublishSettings) -> PublishConfig {
        PublishConfig::resolve(
            PublishSettings {
                registry: Some("ghcr.io/acme".to_string()),
                version: Some("v1.2.0".to_string()),
                app_name: Some("api".to_string()),
                ..settings
            },
            ToolsConfig::default(),
        )
        .unwrap()
    }

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::prepare(dir.path()).unwrap();
        (dir, ws)
    }

    fn lines(actions: &[Action]) -> Vec<String> {
        actions.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_unconfigured_steps_are_skipped() {
        let (_dir, ws) = workspace();
        let cfg = config(PublishSettings::default());
        for kind in StepKind::ALL {
            assert!(plan(kind, &cfg, &ws, None).is_none(), "{} should skip", kind);
        }
    }

    #[test]
    fn test_image_actions() {
        let (_dir, ws) = workspace();
        let cfg = config(PublishSettings {
            dockerfile: Some(PathBuf::from("Dockerfile")),
            ..Default::default()
        });

        let actions = plan(StepKind::Image, &cfg, &ws, None).unwrap();
        assert_eq!(
            lines(&actions),
            vec![
                "docker build -f Dockerfile -t ghcr.io/acme/api:v1.2.0 .",
                "docker push ghcr.io/acme/api:v1.2.0",
            ]
        );
    }

    #[test]
    fn test_chart_actions_lint_first() {
        let (_dir, ws) = workspace();
        let cfg = config(PublishSettings {
            chart_dir: Some(PathBuf::from("charts")),
            ..Default::default()
        });

        let actions = plan(StepKind::Chart, &cfg, &ws, None).unwrap();
        let rendered = lines(&actions);
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[0], "helm lint charts/api");
        assert!(rendered[1].starts_with("helm package charts/api --version v1.2.0 --app-version v1.2.0"));
        assert!(rendered[2].ends_with("api-v1.2.0.tgz oci://ghcr.io/acme/charts"));
    }

    #[test]
    fn test_flux_actions_with_metadata() {
        let (_dir, ws) = workspace();
        let cfg = config(PublishSettings {
            flux_dir: Some(PathBuf::from("deploy")),
            ..Default::default()
        });
        let metadata = GitMetadata {
            branch: "main".to_string(),
            long_sha: "abcd1234567890".to_string(),
            origin_url: Some("https://example.com/acme/api.git".to_string()),
        };

        let actions = plan(StepKind::Flux, &cfg, &ws, Some(&metadata)).unwrap();
        assert!(matches!(actions[0], Action::CopyTree { .. }));

        let rendered = lines(&actions);
        assert!(rendered[1].starts_with("flux push artifact oci://ghcr.io/acme/flux/api:v1.2.0 --path="));
        assert!(rendered[1].contains("--source=https://example.com/acme/api.git"));
        assert!(rendered[1].ends_with("--revision=main@sha1:abcd1234567890"));
        assert_eq!(
            rendered[2],
            "flux tag artifact oci://ghcr.io/acme/flux/api:v1.2.0 --tag latest"
        );
    }

    #[test]
    fn test_flux_push_without_metadata_omits_source() {
        let (_dir, ws) = workspace();
        let cfg = config(PublishSettings {
            flux_dir: Some(PathBuf::from("deploy")),
            ..Default::default()
        });

        let actions = plan(StepKind::Flux, &cfg, &ws, None).unwrap();
        let push = actions[1].to_string();
        assert!(!push.contains("--source"));
        assert!(!push.contains("--revision"));
    }
}
