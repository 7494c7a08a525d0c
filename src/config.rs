//! Configuration file handling.
//!
//! Loads configuration from `<config dir>/matrix-cam/config.toml` or a custom path.
//! Every field is optional; command-line flags override what the file says.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::export::DEFAULT_PREFIX;
use crate::ramp::DensityRamp;
use crate::settings::{RenderSettings, DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::source::CameraRequest;
use crate::types::Color;

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct RenderConfig {
    pub font_size: Option<f32>,
    /// CSS-style color, e.g. "#00ff41" or "amber".
    pub color: Option<String>,
    /// "default" or "complex".
    pub ramp: Option<String>,
    /// Any non-empty string, densest glyph first. Wins over `ramp`.
    pub custom_ramp: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { device: 0, width: default_width(), height: default_height(), fps: default_fps() }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ExportConfig {
    pub directory: Option<PathBuf>,
    pub prefix: Option<String>,
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_fps() -> u32 {
    30
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        log::debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse { path, source })
    }

    /// Initial render settings. The font size is clamped to the supported range.
    pub fn render_settings(&self) -> Result<RenderSettings, Error> {
        let font_size = self
            .render
            .font_size
            .unwrap_or(DEFAULT_FONT_SIZE)
            .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        let color = match &self.render.color {
            Some(c) => Color::parse(c)?,
            None => Color::default(),
        };
        let ramp = match (&self.render.custom_ramp, &self.render.ramp) {
            (Some(custom), _) => DensityRamp::new(custom)?,
            (None, Some(name)) => ramp_by_name(name)?,
            (None, None) => DensityRamp::standard(),
        };
        Ok(RenderSettings { font_size, color, ramp })
    }

    pub fn camera_request(&self) -> CameraRequest {
        CameraRequest {
            device: self.camera.device,
            width: self.camera.width,
            height: self.camera.height,
            fps: self.camera.fps,
        }
    }

    pub fn export_directory(&self) -> PathBuf {
        self.export.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn export_prefix(&self) -> String {
        self.export.prefix.clone().unwrap_or_else(|| DEFAULT_PREFIX.to_string())
    }
}

/// Look up a built-in ramp by name.
pub fn ramp_by_name(name: &str) -> Result<DensityRamp, Error> {
    match name.trim().to_ascii_lowercase().as_str() {
        "default" | "standard" => Ok(DensityRamp::standard()),
        "complex" => Ok(DensityRamp::complex()),
        _ => Err(Error::UnknownRamp(name.to_string())),
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("matrix-cam").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("matrix-cam.toml"))
}
