//! Visual source management.
//!
//! Exactly one source is active at a time: a live camera stream or a decoded still
//! image. Switching only changes which source the next cycle reads; the render loop
//! keeps running. Camera streams are stopped exactly once, either when superseded or
//! when the manager is released/dropped.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, NotReady};
use crate::types::{Color, FrameBuffer};

/// Message shown to the user when the camera can't be acquired.
pub const CAMERA_ERROR_MESSAGE: &str = "Could not access camera. Please allow permissions.";

/// What to ask the camera for. A hint; the device may pick something close.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraRequest {
    pub device: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self { device: 0, width: 1280, height: 720, fps: 30 }
    }
}

/// A live camera stream.
pub trait CameraStream {
    /// The most recent decoded frame, or `None` while nothing is buffered yet.
    fn latest_frame(&self) -> Option<Arc<FrameBuffer>>;

    /// An acquisition failure that happened after the stream was handed out
    /// (e.g. the device refused to open). Reported at most once.
    fn poll_failure(&mut self) -> Option<Error>;

    /// Stop every underlying track. Safe to call more than once.
    fn stop(&mut self);

    fn is_stopped(&self) -> bool;
}

/// Produces camera streams.
pub trait CameraBackend {
    fn acquire(&mut self, request: &CameraRequest) -> Result<Box<dyn CameraStream>, Error>;
}

/// Which kind of source is bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Image,
}

enum ActiveSource {
    Camera(Box<dyn CameraStream>),
    Image(Arc<FrameBuffer>),
}

/// One cycle's view of the active source.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    pub kind: SourceKind,
    pub pixels: Arc<FrameBuffer>,
}

impl SourceFrame {
    pub fn natural_width(&self) -> usize {
        self.pixels.width
    }

    pub fn natural_height(&self) -> usize {
        self.pixels.height
    }

    /// Live camera output is shown (and exported) mirrored; stills are not.
    pub fn is_mirrored(&self) -> bool {
        self.kind == SourceKind::Camera
    }
}

/// Owns the active source and the camera backend used to acquire new streams.
pub struct SourceManager {
    backend: Box<dyn CameraBackend>,
    request: CameraRequest,
    active: Option<ActiveSource>,
    error: Option<String>,
}

impl std::fmt::Debug for SourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceManager")
            .field("request", &self.request)
            .field("kind", &self.kind())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl SourceManager {
    pub fn new(backend: Box<dyn CameraBackend>, request: CameraRequest) -> Self {
        Self { backend, request, active: None, error: None }
    }

    /// Kind of the bound source, if any.
    pub fn kind(&self) -> Option<SourceKind> {
        match self.active {
            Some(ActiveSource::Camera(_)) => Some(SourceKind::Camera),
            Some(ActiveSource::Image(_)) => Some(SourceKind::Image),
            None => None,
        }
    }

    /// User-visible error from the last failed camera acquisition.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Request a live camera stream and bind it.
    ///
    /// On failure the message is recorded for the UI, nothing is bound, and the
    /// pipeline stays not-ready. The error is also returned for logging.
    pub fn use_camera_source(&mut self) -> Result<(), Error> {
        self.release();
        match self.backend.acquire(&self.request) {
            Ok(stream) => {
                log::info!("camera source requested (device {})", self.request.device);
                self.error = None;
                self.active = Some(ActiveSource::Camera(stream));
                Ok(())
            }
            Err(e) => {
                self.record_camera_failure(&e);
                Err(e)
            }
        }
    }

    /// Decode `bytes` and bind the image. A running camera is stopped first.
    ///
    /// A decode failure leaves the current source as it was.
    pub fn use_image_source(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let decoded = image::load_from_memory(bytes)?.to_rgb8();
        let (w, h) = decoded.dimensions();
        let pixels = decoded.pixels().map(|p| Color::rgb(p[0], p[1], p[2]).0).collect();
        self.bind_image(FrameBuffer { width: w as usize, height: h as usize, pixels });
        Ok(())
    }

    /// Read a file and bind it with `use_image_source`.
    pub fn use_image_path(&mut self, path: &Path) -> Result<(), Error> {
        let bytes = std::fs::read(path).map_err(|source| Error::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.use_image_source(&bytes)?;
        log::info!("still image source: {}", path.display());
        Ok(())
    }

    /// Bind already-decoded pixels as the still source.
    pub fn bind_image(&mut self, frame: FrameBuffer) {
        self.release();
        log::debug!("binding still image {}x{}", frame.width, frame.height);
        self.error = None;
        self.active = Some(ActiveSource::Image(Arc::new(frame)));
    }

    /// Unbind the active source, stopping a camera stream if there is one.
    /// No-op when nothing is bound.
    pub fn release(&mut self) {
        if let Some(ActiveSource::Camera(mut stream)) = self.active.take() {
            if !stream.is_stopped() {
                stream.stop();
                log::info!("camera released");
            }
        }
    }

    /// The frame this cycle should render, or why there isn't one.
    pub fn current_frame(&mut self) -> Result<SourceFrame, NotReady> {
        let failure = match &mut self.active {
            None => return Err(NotReady::NoSource),
            Some(ActiveSource::Image(pixels)) => {
                return Ok(SourceFrame { kind: SourceKind::Image, pixels: Arc::clone(pixels) });
            }
            Some(ActiveSource::Camera(stream)) if stream.is_stopped() => return Err(NotReady::NoSource),
            Some(ActiveSource::Camera(stream)) => match stream.poll_failure() {
                Some(e) => e,
                None => {
                    return match stream.latest_frame() {
                        Some(pixels) if pixels.width > 0 && pixels.height > 0 => {
                            Ok(SourceFrame { kind: SourceKind::Camera, pixels })
                        }
                        _ => Err(NotReady::SourceBuffering),
                    };
                }
            },
        };

        // The device failed after the stream was handed out.
        self.release();
        self.record_camera_failure(&failure);
        Err(NotReady::NoSource)
    }

    fn record_camera_failure(&mut self, e: &Error) {
        log::warn!("camera acquisition failed: {e}");
        // Device and permission problems get the fixed prompt; anything else is shown as is.
        self.error = Some(if e.is_source_acquisition() {
            CAMERA_ERROR_MESSAGE.to_string()
        } else {
            e.to_string()
        });
    }
}

impl Drop for SourceManager {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Shared view of a stub stream so the test can watch it after handing it out.
    #[derive(Clone, Default)]
    struct Tracks {
        stopped: Arc<AtomicBool>,
        stop_calls: Arc<AtomicUsize>,
    }

    struct StubStream {
        tracks: Tracks,
        frame: Option<Arc<FrameBuffer>>,
        failure: Option<Error>,
    }

    impl CameraStream for StubStream {
        fn latest_frame(&self) -> Option<Arc<FrameBuffer>> {
            self.frame.clone()
        }
        fn poll_failure(&mut self) -> Option<Error> {
            self.failure.take()
        }
        fn stop(&mut self) {
            self.tracks.stopped.store(true, Ordering::SeqCst);
            self.tracks.stop_calls.fetch_add(1, Ordering::SeqCst);
        }
        fn is_stopped(&self) -> bool {
            self.tracks.stopped.load(Ordering::SeqCst)
        }
    }

    enum Plan {
        Frame(FrameBuffer),
        Buffering,
        FailLater,
        FailNow,
        FailOther,
        AlreadyStopped,
    }

    struct StubBackend {
        tracks: Tracks,
        plan: Plan,
    }

    impl CameraBackend for StubBackend {
        fn acquire(&mut self, _request: &CameraRequest) -> Result<Box<dyn CameraStream>, Error> {
            let (frame, failure) = match &self.plan {
                Plan::Frame(f) => (Some(Arc::new(f.clone())), None),
                Plan::Buffering => (None, None),
                Plan::FailLater => (None, Some(Error::CameraPermissionDenied)),
                Plan::FailNow => return Err(Error::CameraInit("no device".into())),
                Plan::FailOther => return Err(Error::WindowUpdate("display lost".into())),
                Plan::AlreadyStopped => {
                    self.tracks.stopped.store(true, Ordering::SeqCst);
                    (Some(Arc::new(FrameBuffer::filled(1, 1, Color::WHITE))), None)
                }
            };
            Ok(Box::new(StubStream { tracks: self.tracks.clone(), frame, failure }))
        }
    }

    fn manager(plan: Plan) -> (SourceManager, Tracks) {
        let tracks = Tracks::default();
        let backend = StubBackend { tracks: tracks.clone(), plan };
        (SourceManager::new(Box::new(backend), CameraRequest::default()), tracks)
    }

    fn gray(w: usize, h: usize, v: u8) -> FrameBuffer {
        FrameBuffer::from_rgb8(w, h, &vec![v; w * h * 3]).unwrap()
    }

    #[test]
    fn nothing_bound_is_not_ready() {
        let (mut sources, _) = manager(Plan::Buffering);
        assert_eq!(sources.current_frame().unwrap_err(), NotReady::NoSource);
        assert_eq!(sources.kind(), None);
    }

    #[test]
    fn buffering_camera_is_not_ready() {
        let (mut sources, _) = manager(Plan::Buffering);
        sources.use_camera_source().unwrap();
        assert_eq!(sources.current_frame().unwrap_err(), NotReady::SourceBuffering);
        assert_eq!(sources.kind(), Some(SourceKind::Camera));
    }

    #[test]
    fn camera_frame_is_mirrored() {
        let (mut sources, _) = manager(Plan::Frame(gray(4, 3, 10)));
        sources.use_camera_source().unwrap();
        let frame = sources.current_frame().unwrap();
        assert!(frame.is_mirrored());
        assert_eq!((frame.natural_width(), frame.natural_height()), (4, 3));
    }

    #[test]
    fn immediate_failure_sets_message() {
        let (mut sources, _) = manager(Plan::FailNow);
        assert!(sources.use_camera_source().is_err());
        assert_eq!(sources.error(), Some(CAMERA_ERROR_MESSAGE));
        assert_eq!(sources.current_frame().unwrap_err(), NotReady::NoSource);
    }

    #[test]
    fn late_failure_releases_and_sets_message() {
        let (mut sources, tracks) = manager(Plan::FailLater);
        sources.use_camera_source().unwrap();
        assert_eq!(sources.error(), None);
        assert_eq!(sources.current_frame().unwrap_err(), NotReady::NoSource);
        assert_eq!(sources.error(), Some(CAMERA_ERROR_MESSAGE));
        assert!(tracks.stopped.load(Ordering::SeqCst));
        assert_eq!(sources.kind(), None);
    }

    #[test]
    fn image_supersedes_camera_and_stops_tracks() {
        let (mut sources, tracks) = manager(Plan::Frame(gray(4, 3, 0)));
        sources.use_camera_source().unwrap();
        assert!(sources.current_frame().unwrap().is_mirrored());

        sources.bind_image(gray(2, 2, 255));
        assert!(tracks.stopped.load(Ordering::SeqCst));
        assert_eq!(tracks.stop_calls.load(Ordering::SeqCst), 1);

        let frame = sources.current_frame().unwrap();
        assert_eq!(frame.kind, SourceKind::Image);
        assert!(!frame.is_mirrored());
        assert_eq!(frame.pixels.get(0, 0), 0xFFFFFF);
    }

    #[test]
    fn release_is_idempotent() {
        let (mut sources, tracks) = manager(Plan::Frame(gray(1, 1, 0)));
        sources.release();
        sources.use_camera_source().unwrap();
        sources.release();
        sources.release();
        assert_eq!(tracks.stop_calls.load(Ordering::SeqCst), 1);
        drop(sources);
        assert_eq!(tracks.stop_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_camera() {
        let (mut sources, tracks) = manager(Plan::Frame(gray(1, 1, 0)));
        sources.use_camera_source().unwrap();
        drop(sources);
        assert_eq!(tracks.stop_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bad_image_bytes_keep_current_source() {
        let (mut sources, tracks) = manager(Plan::Frame(gray(1, 1, 0)));
        sources.use_camera_source().unwrap();
        assert!(matches!(sources.use_image_source(b"not an image"), Err(Error::ImageDecode(_))));
        assert_eq!(sources.kind(), Some(SourceKind::Camera));
        assert!(!tracks.stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_image_file_is_reported() {
        let (mut sources, _) = manager(Plan::Buffering);
        let err = sources.use_image_path(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::ImageRead { .. }));
    }

    #[test]
    fn unexpected_failure_shows_its_own_text() {
        let (mut sources, _) = manager(Plan::FailOther);
        assert!(sources.use_camera_source().is_err());
        assert_eq!(sources.error(), Some("Window update error: display lost"));
    }

    #[test]
    fn stopped_stream_is_not_read_or_stopped_again() {
        let (mut sources, tracks) = manager(Plan::AlreadyStopped);
        sources.use_camera_source().unwrap();
        assert_eq!(sources.current_frame().unwrap_err(), NotReady::NoSource);
        sources.release();
        assert_eq!(tracks.stop_calls.load(Ordering::SeqCst), 0);
    }
}
