use collab_cursors_engine::{CollaboratorId, Color, OverlayOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// A simulated collaborator to start the demo with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorPreset {
    pub id: CollaboratorId,
    pub label: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Width of the text area in cells
    pub wrap_columns: u16,
    /// How long a flashed tooltip stays up
    pub tooltip_seconds: f64,
    pub tooltip_margin: f32,
    /// Where to write logs. Logging is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub collaborators: Vec<CollaboratorPreset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wrap_columns: 60,
            tooltip_seconds: 2.0,
            tooltip_margin: OverlayOptions::default().tooltip_margin,
            log_file: None,
            collaborators: vec![
                CollaboratorPreset {
                    id: CollaboratorId::from("ada"),
                    label: "Ada".to_string(),
                    color: Color::rgb(0xe6, 0x19, 0x4b),
                },
                CollaboratorPreset {
                    id: CollaboratorId::from("grace"),
                    label: "Grace".to_string(),
                    color: Color::rgb(0x3c, 0xb4, 0x4b),
                },
            ],
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the log path
        config.log_file = config
            .log_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/collab-cursors");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            tooltip_margin: self.tooltip_margin,
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
