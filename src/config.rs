use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CiPublishError, Result};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "cipublish.toml";

pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_BUILD_CONTEXT: &str = ".";
pub const DEFAULT_FLUX_TAG: &str = "latest";

/// Represents the complete configuration file for ci-publish.
///
/// Every publish setting may be left out of the file and supplied through
/// the environment or the command line instead.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub publish: PublishSettings,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Publish settings before validation; any of them may be absent
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PublishSettings {
    pub registry: Option<String>,
    pub version: Option<String>,
    pub app_name: Option<String>,
    pub dockerfile: Option<PathBuf>,
    pub build_context: Option<PathBuf>,
    pub chart_dir: Option<PathBuf>,
    pub flux_dir: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub flux_tag: Option<String>,
}

fn default_container_tool() -> String {
    "docker".to_string()
}

fn default_helm_tool() -> String {
    "helm".to_string()
}

fn default_flux_tool() -> String {
    "flux".to_string()
}

/// Names of the external programs the pipeline calls
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_container_tool")]
    pub container: String,

    #[serde(default = "default_helm_tool")]
    pub helm: String,

    #[serde(default = "default_flux_tool")]
    pub flux: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            container: default_container_tool(),
            helm: default_helm_tool(),
            flux: default_flux_tool(),
        }
    }
}

impl ToolsConfig {
    /// Every tool, in pipeline order
    pub fn all(&self) -> [&str; 3] {
        [&self.container, &self.helm, &self.flux]
    }
}

fn present_str(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn present_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}

impl PublishSettings {
    /// Layer `overrides` on top of `self`; present override values win.
    ///
    /// Empty strings count as absent on both sides.
    pub fn overlay(self, overrides: PublishSettings) -> PublishSettings {
        PublishSettings {
            registry: present_str(overrides.registry).or(present_str(self.registry)),
            version: present_str(overrides.version).or(present_str(self.version)),
            app_name: present_str(overrides.app_name).or(present_str(self.app_name)),
            dockerfile: present_path(overrides.dockerfile).or(present_path(self.dockerfile)),
            build_context: present_path(overrides.build_context)
                .or(present_path(self.build_context)),
            chart_dir: present_path(overrides.chart_dir).or(present_path(self.chart_dir)),
            flux_dir: present_path(overrides.flux_dir).or(present_path(self.flux_dir)),
            build_dir: present_path(overrides.build_dir).or(present_path(self.build_dir)),
            flux_tag: present_str(overrides.flux_tag).or(present_str(self.flux_tag)),
        }
    }
}

/// Validated publish configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PublishConfig {
    pub registry: String,
    pub version: String,
    pub app_name: String,
    pub dockerfile: Option<PathBuf>,
    pub build_context: PathBuf,
    pub chart_dir: Option<PathBuf>,
    pub flux_dir: Option<PathBuf>,
    pub build_dir: PathBuf,
    pub flux_tag: String,
    pub tools: ToolsConfig,
}

impl PublishConfig {
    /// Validate settings, reporting every missing required value at once.
    ///
    /// A trailing `/` on the registry is dropped so references join cleanly.
    pub fn resolve(settings: PublishSettings, tools: ToolsConfig) -> Result<Self> {
        let settings = PublishSettings::default().overlay(settings);

        let mut missing = Vec::new();
        if settings.registry.is_none() {
            missing.push("REGISTRY".to_string());
        }
        if settings.version.is_none() {
            missing.push("VERSION".to_string());
        }
        if settings.app_name.is_none() {
            missing.push("APP_NAME".to_string());
        }

        match (settings.registry, settings.version, settings.app_name) {
            (Some(registry), Some(version), Some(app_name)) => Ok(PublishConfig {
                registry: registry.trim_end_matches('/').to_string(),
                version,
                app_name,
                dockerfile: settings.dockerfile,
                build_context: settings
                    .build_context
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_CONTEXT)),
                chart_dir: settings.chart_dir,
                flux_dir: settings.flux_dir,
                build_dir: settings
                    .build_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR)),
                flux_tag: settings
                    .flux_tag
                    .unwrap_or_else(|| DEFAULT_FLUX_TAG.to_string()),
                tools,
            }),
            _ => Err(CiPublishError::MissingSettings(missing)),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `cipublish.toml` in current directory
/// 3. `ci-publish/config.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join("ci-publish").join("config.toml");
        if user_config.exists() {
            user_config
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    tracing::debug!(path = %path.display(), "loading configuration");

    let config_str = fs::read_to_string(&path).map_err(|e| {
        CiPublishError::config(format!("cannot read {}: {}", path.display(), e))
    })?;

    toml::from_str(&config_str)
        .map_err(|e| CiPublishError::config(format!("cannot parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> PublishSettings {
        PublishSettings {
            registry: Some("ghcr.io/acme/".to_string()),
            version: Some("v1.0.0".to_string()),
            app_name: Some("api".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let config = PublishConfig::resolve(required(), ToolsConfig::default()).unwrap();
        assert_eq!(config.registry, "ghcr.io/acme");
        assert_eq!(config.build_dir, PathBuf::from("build"));
        assert_eq!(config.build_context, PathBuf::from("."));
        assert_eq!(config.flux_tag, "latest");
        assert_eq!(config.dockerfile, None);
        assert_eq!(config.tools.container, "docker");
    }

    #[test]
    fn test_resolve_reports_all_missing() {
        let err = PublishConfig::resolve(PublishSettings::default(), ToolsConfig::default())
            .unwrap_err();
        match err {
            CiPublishError::MissingSettings(names) => {
                assert_eq!(names, vec!["REGISTRY", "VERSION", "APP_NAME"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let settings = PublishSettings {
            version: Some("  ".to_string()),
            dockerfile: Some(PathBuf::new()),
            ..required()
        };
        let err = PublishConfig::resolve(settings.clone(), ToolsConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required setting(s): VERSION");

        let ok = PublishConfig::resolve(
            PublishSettings {
                version: Some("v1".to_string()),
                ..settings
            },
            ToolsConfig::default(),
        )
        .unwrap();
        assert_eq!(ok.dockerfile, None);
    }

    #[test]
    fn test_overlay_prefers_overrides() {
        let file = PublishSettings {
            registry: Some("file.example".to_string()),
            flux_tag: Some("stable".to_string()),
            ..Default::default()
        };
        let env = PublishSettings {
            registry: Some("env.example".to_string()),
            flux_tag: Some(String::new()),
            ..Default::default()
        };

        let merged = file.overlay(env);
        assert_eq!(merged.registry.as_deref(), Some("env.example"));
        assert_eq!(merged.flux_tag.as_deref(), Some("stable"));
    }

    #[test]
    fn test_tools_all_in_order() {
        assert_eq!(ToolsConfig::default().all(), ["docker", "helm", "flux"]);
    }
}
