//! Viewer configuration.
//!
//! Loaded from TOML. Every section and field has a default, so an empty
//! or missing file yields [`Config::default`].

use crate::errors::ViewerError;
use radic_common::Size;
use radic_display::{CompositorConfig, ResizeConfig, ScaleFilter};
use radic_input::RouterConfig;
use radic_session::MonitorLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Complete viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub input: RouterConfig,
    #[serde(default)]
    pub resize: ResizeConfig,
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Integer presentation scale.
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default)]
    pub filter: ScaleFilter,
    /// Show the frames-per-second overlay.
    #[serde(default = "default_true")]
    pub fps_overlay: bool,
    /// Initial viewport width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Initial viewport height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_scale() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    1024
}

fn default_height() -> u32 {
    768
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            filter: ScaleFilter::default(),
            fps_overlay: default_true(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl DisplayConfig {
    pub fn viewport(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn compositor(&self) -> CompositorConfig {
        CompositorConfig {
            scale: self.scale,
            filter: self.filter,
        }
    }
}

impl Config {
    /// `~/.config/radic/config.toml` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "radic")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`. A missing default file gives the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ViewerError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No configuration file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ViewerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ViewerError::Config(msg) => {
                ViewerError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ViewerError> {
        toml::from_str(content)
            .map_err(|e| ViewerError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String, ViewerError> {
        toml::to_string_pretty(self)
            .map_err(|e| ViewerError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.display.scale == 0 {
            return Err(ViewerError::Config("Scale must be at least 1".to_string()));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ViewerError::Config(
                "Viewport dimensions must be non-zero".to_string(),
            ));
        }
        if self.resize.debounce_ticks == 0 {
            return Err(ViewerError::Config(
                "Resize debounce must be at least one tick".to_string(),
            ));
        }
        if self.resize.tick_interval_ms == 0 {
            return Err(ViewerError::Config(
                "Tick interval must be at least 1 ms".to_string(),
            ));
        }

        let limits = &self.resize.limits;
        let floor = MonitorLimits::MIN_DIMENSION;
        let ceiling = MonitorLimits::MAX_DIMENSION;
        let in_range = |v: u32| (floor..=ceiling).contains(&v);
        if ![limits.min.width, limits.min.height, limits.max.width, limits.max.height]
            .into_iter()
            .all(in_range)
        {
            return Err(ViewerError::Config(format!(
                "Monitor limits must lie within {}..={}",
                floor, ceiling
            )));
        }
        if limits.min.width > limits.max.width || limits.min.height > limits.max.height {
            return Err(ViewerError::Config(format!(
                "Monitor limit minimum {} exceeds maximum {}",
                limits.min, limits.max
            )));
        }
        Ok(())
    }
}
