//! Configuration loading
//!
//! Settings come from a TOML file, then environment overrides:
//! `SCENE_LAYOUT_PROVIDER`, `SCENE_LAYOUT_MODEL`, `SCENE_LAYOUT_BASE_URL`.

use crate::collision::DEFAULT_EPSILON;
use crate::error::LayoutError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "scene-layout.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub layout: LayoutSettings,
    pub model: ModelConfig,
    pub paths: PathsConfig,
}

/// Engine behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Overlap tolerance for collision checks
    pub collision_epsilon: f64,
    /// Stop after sequencing, without the correction sweep
    pub skip_refinement: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            collision_epsilon: DEFAULT_EPSILON,
            skip_refinement: false,
        }
    }
}

/// Which oracle backs the run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// "mock", "replay" or "ollama"
    pub provider: String,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    /// Placement script for the "replay" provider
    pub replay_file: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model_name: None,
            base_url: None,
            temperature: 0.2,
            replay_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Asset catalog JSON
    pub assets: PathBuf,
    /// Where output records are written
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("data/assets.json"),
            output_dir: PathBuf::from("results"),
        }
    }
}

impl LayoutConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Otherwise `./scene-layout.toml` and then
    /// the platform config directory are tried, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::discover() {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: LayoutConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        ProjectDirs::from("", "", "scene-layout")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    /// Environment variables take precedence over file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("SCENE_LAYOUT_PROVIDER") {
            self.model.provider = provider;
        }
        if let Ok(model) = std::env::var("SCENE_LAYOUT_MODEL") {
            self.model.model_name = Some(model);
        }
        if let Ok(url) = std::env::var("SCENE_LAYOUT_BASE_URL") {
            self.model.base_url = Some(url);
        }
    }

    pub fn validate(&self) -> std::result::Result<(), LayoutError> {
        let epsilon = self.layout.collision_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(LayoutError::Config(format!(
                "collision_epsilon must be a non-negative number, got {}",
                epsilon
            )));
        }
        if self.model.provider.trim().is_empty() {
            return Err(LayoutError::Config("model.provider is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.layout.collision_epsilon, 0.1);
        assert!(!config.layout.skip_refinement);
        assert_eq!(config.model.provider, "mock");
        assert_eq!(config.paths.output_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
            [layout]
            skip_refinement = true

            [model]
            provider = "replay"
            replay_file = "placements.json"
            "#,
        );

        let config = LayoutConfig::from_file(file.path()).unwrap();
        assert!(config.layout.skip_refinement);
        assert_eq!(config.layout.collision_epsilon, 0.1);
        assert_eq!(config.model.provider, "replay");
        assert_eq!(config.model.replay_file, Some(PathBuf::from("placements.json")));
        assert_eq!(config.paths.assets, PathBuf::from("data/assets.json"));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[layout\ncollision_epsilon = ");
        assert!(LayoutConfig::from_file(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_explicit_missing_file_fails() {
        assert!(LayoutConfig::load(Some(Path::new("/nonexistent/scene-layout.toml"))).is_err());
    }

    #[test]
    fn test_negative_epsilon_rejected() {
        let mut config = LayoutConfig::default();
        config.layout.collision_epsilon = -0.5;
        assert!(matches!(config.validate(), Err(LayoutError::Config(_))));

        config.layout.collision_epsilon = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let file = write_config(
            r#"
            [model]
            provider = "mock"
            model_name = "from-file"
            "#,
        );

        unsafe {
            std::env::set_var("SCENE_LAYOUT_PROVIDER", "ollama");
            std::env::set_var("SCENE_LAYOUT_MODEL", "from-env");
        }
        let config = LayoutConfig::load(Some(file.path()));
        unsafe {
            std::env::remove_var("SCENE_LAYOUT_PROVIDER");
            std::env::remove_var("SCENE_LAYOUT_MODEL");
        }

        let config = config.unwrap();
        assert_eq!(config.model.provider, "ollama");
        assert_eq!(config.model.model_name.as_deref(), Some("from-env"));
    }
}
