//! Command-line arguments. Anything given here overrides the config file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Config;

/// Parse and validate a font size (6-24 px).
fn parse_font_size(s: &str) -> Result<f32, String> {
    let size: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(6.0..=24.0).contains(&size) {
        return Err(format!("Font size must be between 6 and 24 px, got {}", size));
    }
    Ok(size)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RampChoice {
    /// Short ramp, bold look
    Default,
    /// Long ramp, finer gradation
    Complex,
}

impl RampChoice {
    fn name(self) -> &'static str {
        match self {
            RampChoice::Default => "default",
            RampChoice::Complex => "complex",
        }
    }
}

/// matrix-cam: live camera feed as monospace character art
#[derive(Parser, Debug)]
#[command(name = "matrix-cam")]
#[command(version, about = "Live camera feed as monospace character art")]
#[command(after_help = "CONTROLS:
    +/-     font size          M   toggle density ramp
    C       cycle color        S   save snapshot (PNG)
    V       use camera         I   use --image still
    H       toggle overlay     Esc quit

EXAMPLES:
    matrix-cam
    matrix-cam --font-size 8 --color amber --ramp complex
    matrix-cam --image photo.jpg --output-dir ~/Pictures")]
pub struct Args {
    /// Render a still image instead of the camera
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Glyph height in pixels (6-24)
    #[arg(short = 's', long, value_parser = parse_font_size)]
    pub font_size: Option<f32>,

    /// Output color (#rgb, #rrggbb or a color name)
    #[arg(short, long)]
    pub color: Option<String>,

    /// Built-in density ramp
    #[arg(short, long, value_enum)]
    pub ramp: Option<RampChoice>,

    /// Custom density ramp, densest glyph first
    #[arg(long, conflicts_with = "ramp")]
    pub custom_ramp: Option<String>,

    /// Camera device index
    #[arg(short, long)]
    pub device: Option<u32>,

    /// Directory snapshots are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File name prefix for snapshots
    #[arg(long)]
    pub prefix: Option<String>,

    /// Config file (default: <config dir>/matrix-cam/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(size) = self.font_size {
            config.render.font_size = Some(size);
        }
        if let Some(color) = &self.color {
            config.render.color = Some(color.clone());
        }
        if let Some(ramp) = self.ramp {
            config.render.ramp = Some(ramp.name().to_string());
            config.render.custom_ramp = None;
        }
        if let Some(custom) = &self.custom_ramp {
            config.render.custom_ramp = Some(custom.clone());
        }
        if let Some(device) = self.device {
            config.camera.device = device;
        }
        if let Some(dir) = &self.output_dir {
            config.export.directory = Some(dir.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.export.prefix = Some(prefix.clone());
        }
    }
}
