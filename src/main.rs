use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ci_publish::cli::orchestration::{self, PublishWorkflowArgs};
use ci_publish::config::PublishSettings;
use ci_publish::tools::ProcessRunner;
use ci_publish::{ui, CiPublishError};

/// Environment variable holding the log filter
const LOG_ENV: &str = "CI_PUBLISH_LOG";

#[derive(Parser)]
#[command(
    name = "ci-publish",
    version,
    about = "Compute development versions and publish images, charts and Flux bundles"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log every external command")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a sortable development version for the current commit
    Version {
        #[arg(short = 'C', long = "repo", default_value = ".", help = "Repository path")]
        repo: PathBuf,
    },

    /// Build and push the configured artifacts
    Publish(PublishArgs),
}

#[derive(clap::Args)]
struct PublishArgs {
    #[arg(long, env = "REGISTRY", help = "Destination OCI registry root")]
    registry: Option<String>,

    #[arg(long = "version", env = "VERSION", help = "Tag applied to every artifact")]
    release: Option<String>,

    #[arg(long, env = "APP_NAME", help = "Application name for image, chart and bundle")]
    app_name: Option<String>,

    #[arg(long, env = "DOCKERFILE", help = "Image build file; enables the image step")]
    dockerfile: Option<PathBuf>,

    #[arg(long = "context", env = "BUILD_CONTEXT", help = "Image build context [default: .]")]
    build_context: Option<PathBuf>,

    #[arg(long, env = "HELM_CHART_DIR", help = "Chart parent directory; enables the chart step")]
    chart_dir: Option<PathBuf>,

    #[arg(long, env = "FLUX_DIR", help = "Flux bundle directory; enables the flux step")]
    flux_dir: Option<PathBuf>,

    #[arg(long, env = "BUILD_DIR", help = "Working build directory [default: build]")]
    build_dir: Option<PathBuf>,

    #[arg(long, env = "FLUX_TAG", help = "Extra tag for the Flux artifact [default: latest]")]
    flux_tag: Option<String>,

    #[arg(short = 'C', long = "repo", default_value = ".", help = "Repository path")]
    repo: PathBuf,
}

impl PublishArgs {
    fn into_workflow_args(self, config_path: Option<PathBuf>) -> PublishWorkflowArgs {
        PublishWorkflowArgs {
            config_path,
            settings: PublishSettings {
                registry: self.registry,
                version: self.release,
                app_name: self.app_name,
                dockerfile: self.dockerfile,
                build_context: self.build_context,
                chart_dir: self.chart_dir,
                flux_dir: self.flux_dir,
                build_dir: self.build_dir,
                flux_tag: self.flux_tag,
            },
            repo_path: self.repo,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Version { repo } => {
            let now = chrono::Local::now().naive_local();
            let version = orchestration::run_version(&repo, now)
                .with_context(|| format!("Failed to compute version for {}", repo.display()))?;
            println!("{}", version);
        }
        Command::Publish(publish) => {
            let workflow_args = publish.into_workflow_args(args.config);
            let report = orchestration::run_publish_workflow(&workflow_args, &ProcessRunner::new())
                .context("Publish failed")?;
            ui::display_report(&report);
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        let code = e
            .downcast_ref::<CiPublishError>()
            .map(CiPublishError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}
