// What you SEE:
// • A window filled edge to edge with your camera feed drawn as characters (mirrored, like a selfie).
// • +/- change the glyph size, M swaps the density ramp, C cycles the color.
// • S saves a PNG snapshot of exactly what's on screen. ESC quits.
// • With --image, a still picture is shown instead (not mirrored); V/I switch sources live.

use clap::Parser;

use matrix_cam::camera::NokhwaBackend;
use matrix_cam::cli::Args;
use matrix_cam::config::Config;
use matrix_cam::draw::Drawer;
use matrix_cam::error::Error;
use matrix_cam::export::SnapshotExporter;
use matrix_cam::font::BitmapFont;
use matrix_cam::render_loop::RenderLoop;
use matrix_cam::settings::SharedSettings;
use matrix_cam::source::SourceManager;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    /* --- Settings: config file, then flags on top --- */
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    let settings = SharedSettings::new(config.render_settings()?);

    /* --- Source: the still image if given, otherwise the camera ---
       Visual: a camera failure leaves a black window with the error message centered. */
    let mut sources = SourceManager::new(Box::new(NokhwaBackend), config.camera_request());
    match &args.image {
        Some(path) => sources.use_image_path(path)?,
        None => {
            // Failure is non-fatal: the message is shown and V retries.
            let _ = sources.use_camera_source();
        }
    }

    let exporter = SnapshotExporter::new(config.export_directory(), config.export_prefix());
    log::info!("snapshots go to {}", exporter.directory().display());

    /* --- Window + loop ---
       Visual: window opens; the grid appears as soon as the first frame arrives. */
    let mut drawer = Drawer::new("MATRIX_CAM", 1280, 720)?;
    let mut render_loop =
        RenderLoop::new(settings, sources, exporter, BitmapFont).with_image_path(args.image.clone());

    render_loop.run(&mut drawer)
}
