use crate::domain::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Height of every visual row, spacers included (px).
    pub row_height: f32,
    pub connector_inset: f32,
    pub anchor_half_band: f32,
    pub gutter_width: f32,
    pub curve_margin: f32,
    pub connector_opacity: f32,
    /// Context radius requested from the diff generator.
    pub context_lines: u32,
    pub colors: PaletteConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            row_height: 20.0,
            connector_inset: 1.0,
            anchor_half_band: 2.0,
            gutter_width: 48.0,
            curve_margin: 4.0,
            connector_opacity: 0.25,
            context_lines: 3,
            colors: PaletteConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub change: String,
    pub removed: String,
    pub added: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            change: "#3b82f6".to_string(),
            removed: "#ef4444".to_string(),
            added: "#22c55e".to_string(),
        }
    }
}

/// Loads the config, falling back to defaults when it is missing or invalid.
pub fn load_config() -> AppConfig {
    let path = config_path();
    if !path.exists() {
        return AppConfig::default();
    }
    load_config_from(&path).unwrap_or_else(|err| {
        log::warn!("Ignoring configuration: {}", err);
        AppConfig::default()
    })
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("DIFFPANE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

fn app_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("DIFFPANE_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("diffpane");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("diffpane");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("diffpane");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".config").join("diffpane");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".diffpane")
}
