//! The render loop: one cycle per display refresh, strictly one after another.
//!
//! Each cycle reads one settings snapshot, asks the source manager for a frame, fits
//! the grid, rasterizes, and publishes the result to the screen and the snapshot
//! cache. Any not-ready step just skips the rest of the cycle; the next one retries.

use std::path::PathBuf;

use crate::draw::{paint_centered, paint_frame, paint_overlay};
use crate::error::{Error, NotReady};
use crate::export::SnapshotExporter;
use crate::grid_fit::{GlyphMetrics, GridFitter};
use crate::raster::rasterize;
use crate::ramp::RampKind;
use crate::settings::{RenderSettings, SharedSettings};
use crate::source::{SourceKind, SourceManager};
use crate::types::{CharacterFrame, Color, FrameBuffer, Viewport};

/// Color used for the camera error message.
const ERROR_COLOR: Color = Color(0x00_FF_55_55);

/// Shown in the middle of the window until the first frame is rendered.
pub const PLACEHOLDER_MESSAGE: &str = "Initializing System...";

/// User intents delivered by the frontend between cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    FontLarger,
    FontSmaller,
    NextRamp,
    NextColor,
    Capture,
    UseCamera,
    UseImage,
    ToggleOverlay,
    Quit,
}

/// The surface the loop draws into and takes input from.
pub trait Frontend {
    fn is_open(&self) -> bool;
    fn viewport(&self) -> Viewport;
    fn poll_commands(&mut self) -> Vec<Command>;
    /// Show a finished frame. Also paces the loop to the display refresh.
    fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error>;
}

pub struct RenderLoop<M> {
    settings: SharedSettings,
    sources: SourceManager,
    fitter: GridFitter,
    exporter: SnapshotExporter,
    metrics: M,
    image_path: Option<PathBuf>,
    // Last rendered grid; kept on screen while cycles are skipped.
    grid: FrameBuffer,
    // What gets presented: `grid` plus the overlay.
    screen: FrameBuffer,
    last_mirrored: bool,
    overlay_visible: bool,
    running: bool,
}

impl<M: GlyphMetrics> RenderLoop<M> {
    pub fn new(settings: SharedSettings, sources: SourceManager, exporter: SnapshotExporter, metrics: M) -> Self {
        Self {
            settings,
            sources,
            fitter: GridFitter::new(),
            exporter,
            metrics,
            image_path: None,
            grid: FrameBuffer::filled(0, 0, Color::BLACK),
            screen: FrameBuffer::filled(0, 0, Color::BLACK),
            last_mirrored: false,
            overlay_visible: true,
            running: true,
        }
    }

    /// Still image the `UseImage` command switches to.
    pub fn with_image_path(mut self, path: Option<PathBuf>) -> Self {
        self.image_path = path;
        self
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    pub fn sources(&self) -> &SourceManager {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceManager {
        &mut self.sources
    }

    pub fn exporter(&self) -> &SnapshotExporter {
        &self.exporter
    }

    /// The last presented surface.
    pub fn screen(&self) -> &FrameBuffer {
        &self.screen
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// One pipeline cycle for `viewport`. The frame is also cached for snapshots.
    pub fn cycle(&mut self, viewport: Viewport) -> Result<&CharacterFrame, NotReady> {
        let settings = self.settings.snapshot();
        self.run_pipeline(viewport, &settings)
    }

    fn run_pipeline(&mut self, viewport: Viewport, settings: &RenderSettings) -> Result<&CharacterFrame, NotReady> {
        let source = self.sources.current_frame()?;
        let geometry = self.fitter.fit(viewport, &self.metrics, settings.font_size)?;

        let frame = rasterize(&source.pixels, &geometry, &settings.ramp);
        self.last_mirrored = source.is_mirrored();
        self.exporter.publish(frame);
        self.exporter.last_frame().ok_or(NotReady::NoSource)
    }

    /// Run a cycle and compose the screen for it, all from one settings snapshot.
    pub fn step(&mut self, viewport: Viewport) -> Result<(), NotReady> {
        let settings = self.settings.snapshot();
        // minifb wants at least one pixel even while the window is minimized.
        self.grid.ensure_size(viewport.width.max(1), viewport.height.max(1), Color::BLACK);

        let outcome = self.run_pipeline(viewport, &settings).map(|_| ());
        if outcome.is_ok() {
            self.grid.clear(Color::BLACK);
            if let Some(frame) = self.exporter.last_frame() {
                paint_frame(&mut self.grid, frame, settings.color, settings.font_size, false);
            }
            if self.last_mirrored {
                self.grid.mirror_horizontal();
            }
        }

        self.compose_screen(&settings);
        outcome
    }

    fn compose_screen(&mut self, settings: &RenderSettings) {
        self.screen.clone_from(&self.grid);

        match self.sources.error() {
            Some(message) => paint_centered(&mut self.screen, message, ERROR_COLOR),
            None if self.exporter.last_frame().is_none() => {
                paint_centered(&mut self.screen, PLACEHOLDER_MESSAGE, settings.color)
            }
            None => {}
        }

        let lines = if self.overlay_visible {
            let mode = match settings.ramp.kind() {
                RampKind::Default => "STANDARD",
                RampKind::Complex => "COMPLEX",
                RampKind::Custom => "CUSTOM",
            };
            let source = match self.sources.kind() {
                Some(SourceKind::Camera) => "CAMERA",
                Some(SourceKind::Image) => "IMAGE",
                None => "NONE",
            };
            vec![
                format!("FONT_SIZE: {}px | MODE: {mode} | SOURCE: {source}", settings.font_size),
                "+/- size  M mode  C color  S snap  V camera  I image  H hide".to_string(),
            ]
        } else {
            vec!["Press 'H' for controls".to_string()]
        };
        paint_overlay(&mut self.screen, &lines, Color::WHITE);
    }

    /// Apply one user command. Runs between cycles, never during one.
    pub fn handle(&mut self, command: Command, viewport: Viewport) {
        match command {
            Command::FontLarger => self.settings.update(|s| s.with_font_step(1.0)),
            Command::FontSmaller => self.settings.update(|s| s.with_font_step(-1.0)),
            Command::NextRamp => self.settings.update(|s| s.with_next_ramp()),
            Command::NextColor => self.settings.update(|s| s.with_next_color()),
            Command::ToggleOverlay => self.overlay_visible = !self.overlay_visible,
            Command::Capture => {
                let settings = self.settings.snapshot();
                if let Err(e) =
                    self.exporter.capture(viewport, settings.color, settings.font_size, self.last_mirrored)
                {
                    log::warn!("snapshot failed: {e}");
                }
            }
            Command::UseCamera => {
                // A failure is recorded on the source manager and shown on screen.
                let _ = self.sources.use_camera_source();
            }
            Command::UseImage => match &self.image_path {
                Some(path) => {
                    if let Err(e) = self.sources.use_image_path(path) {
                        log::warn!("could not load still image: {e}");
                    }
                }
                None => log::info!("no still image configured; pass --image to enable"),
            },
            Command::Quit => self.running = false,
        }
    }

    /// Drive cycles until the frontend closes or a quit command arrives, then
    /// release the camera.
    pub fn run(&mut self, frontend: &mut impl Frontend) -> Result<(), Error> {
        let result = self.run_cycles(frontend);
        self.sources.release();
        result
    }

    fn run_cycles(&mut self, frontend: &mut impl Frontend) -> Result<(), Error> {
        while self.running && frontend.is_open() {
            let viewport = frontend.viewport();
            for command in frontend.poll_commands() {
                self.handle(command, viewport);
            }
            if !self.running {
                break;
            }

            // Not-ready is the normal startup state; just try again next refresh.
            let _ = self.step(viewport);
            frontend.present(&self.screen)?;
        }
        Ok(())
    }
}
