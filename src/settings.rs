use log::{debug, error, info, warn};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pdfnotes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Share of the terminal width given to the note list
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width_percent: u16,

    /// `#RRGGBB`
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,

    #[serde(default = "default_highlight_opacity")]
    pub highlight_opacity: f32,

    /// Page height in points covered by one terminal row
    #[serde(default = "default_points_per_row")]
    pub points_per_row: f32,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_sidebar_width() -> u16 {
    25
}

fn default_highlight_color() -> String {
    "#FFFF00".to_string()
}

fn default_highlight_opacity() -> f32 {
    0.4
}

fn default_points_per_row() -> f32 {
    12.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            sidebar_width_percent: default_sidebar_width(),
            highlight_color: default_highlight_color(),
            highlight_opacity: default_highlight_opacity(),
            points_per_row: default_points_per_row(),
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load settings from `path`, or from the default config location.
///
/// A missing file is created with defaults. A file that fails to parse is
/// left alone and defaults stay in effect.
pub fn load_settings(path: Option<&Path>) {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let Some(p) = preferred_config_path() else {
                warn!("Could not determine config directory, using default settings");
                return;
            };
            p
        }
    };

    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        save_settings_to_file(&get_settings(), &path);
    }
}

fn load_settings_from_path(path: &Path) {
    match fs::read_to_string(path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {path:?}");
                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
        }
    }
}

pub fn parse_settings(content: &str) -> Result<Settings, serde_yaml::Error> {
    let mut settings: Settings = serde_yaml::from_str(content)?;
    if settings.version < CURRENT_VERSION {
        info!(
            "Migrating settings from v{} to v{}",
            settings.version, CURRENT_VERSION
        );
        settings.version = CURRENT_VERSION;
    }
    Ok(settings)
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            error!("Failed to create config directory {parent:?}: {e}");
            return;
        }
    }

    let yaml = match serde_yaml::to_string(settings) {
        Ok(yaml) => yaml,
        Err(e) => {
            error!("Failed to serialize settings: {e}");
            return;
        }
    };

    let content = format!(
        "# pdfnotes settings\n# highlight_color is #RRGGBB, highlight_opacity is 0.0-1.0\n\n{yaml}"
    );
    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to write settings file {path:?}: {e}"),
    }
}

pub fn get_settings() -> Settings {
    SETTINGS.read().map(|s| s.clone()).unwrap_or_default()
}

pub fn set_settings(settings: Settings) {
    if let Ok(mut global) = SETTINGS.write() {
        *global = settings;
    }
}

impl Settings {
    pub fn sidebar_width_percent(&self) -> u16 {
        self.sidebar_width_percent.clamp(10, 60)
    }

    pub fn highlight_opacity(&self) -> f32 {
        if self.highlight_opacity.is_finite() {
            self.highlight_opacity.clamp(0.0, 1.0)
        } else {
            default_highlight_opacity()
        }
    }

    pub fn points_per_row(&self) -> f32 {
        if self.points_per_row.is_finite() && self.points_per_row >= 1.0 {
            self.points_per_row
        } else {
            default_points_per_row()
        }
    }

    /// Parsed highlight colour; falls back to yellow on bad input
    pub fn highlight_color(&self) -> Color {
        parse_hex_color(&self.highlight_color).unwrap_or(Color::Rgb(0xFF, 0xFF, 0x00))
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Color::Rgb(
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    ))
}
