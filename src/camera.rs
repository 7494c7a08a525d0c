// Opens a camera with nokhwa on a background thread and keeps the latest decoded
// frame in a shared slot. The render loop only peeks at the slot, so it never waits
// on the device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

use crate::error::Error;
use crate::source::{CameraBackend, CameraRequest, CameraStream};
use crate::types::FrameBuffer;

type FrameSlot = Arc<Mutex<Option<Arc<FrameBuffer>>>>;

/// Consecutive failed reads after which the device counts as gone (~0.5 s).
const MAX_FAILED_READS: u32 = 100;

/// Pause between failed reads.
const RETRY_DELAY: Duration = Duration::from_millis(5);

/// How long `stop` waits for the capture thread before leaving it behind.
const STOP_TIMEOUT: Duration = Duration::from_millis(500);

/// What the capture thread reports back to the render side.
#[derive(Debug)]
enum CaptureEvent {
    Opened(u32, u32),
    Failed(Error),
}

/// Acquires real cameras through nokhwa.
#[derive(Debug, Default)]
pub struct NokhwaBackend;

impl CameraBackend for NokhwaBackend {
    fn acquire(&mut self, request: &CameraRequest) -> Result<Box<dyn CameraStream>, Error> {
        Ok(Box::new(CameraCapture::start(request.clone())?))
    }
}

/// A running capture: the device stream plus the thread that drains it.
pub struct CameraCapture {
    frame_slot: FrameSlot,
    stop_signal: Arc<AtomicBool>,
    capture_thread: Option<JoinHandle<()>>,
    // Open result, then at most one late failure. Dropped once a failure is read.
    events: Option<Receiver<CaptureEvent>>,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("live", &self.capture_thread.is_some())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Spawn the capture thread. Opening the device happens on that thread; the
    /// outcome, and a device that dies later, are picked up by `poll_failure`.
    pub fn start(request: CameraRequest) -> Result<Self, Error> {
        let frame_slot: FrameSlot = Arc::new(Mutex::new(None));
        let stop_signal = Arc::new(AtomicBool::new(false));
        let (event_tx, event_rx) = mpsc::channel();

        let slot = Arc::clone(&frame_slot);
        let stop = Arc::clone(&stop_signal);
        let handle = thread::Builder::new()
            .name("camera-capture".into())
            .spawn(move || run_capture_loop(request, slot, stop, event_tx))
            .map_err(|e| Error::CameraStream(format!("spawn capture thread: {e}")))?;

        Ok(Self {
            frame_slot,
            stop_signal,
            capture_thread: Some(handle),
            events: Some(event_rx),
        })
    }
}

impl CameraStream for CameraCapture {
    fn latest_frame(&self) -> Option<Arc<FrameBuffer>> {
        if self.capture_thread.is_none() {
            return None;
        }
        self.frame_slot.lock().ok()?.clone()
    }

    fn poll_failure(&mut self) -> Option<Error> {
        let rx = self.events.as_ref()?;
        match rx.try_recv() {
            Ok(CaptureEvent::Opened(w, h)) => {
                log::info!("camera streaming at {w}x{h}");
                None
            }
            Ok(CaptureEvent::Failed(e)) => {
                self.events = None;
                Some(e)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.events = None;
                Some(Error::CameraStream("capture thread terminated unexpectedly".into()))
            }
        }
    }

    fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.capture_thread.take() {
            // A stalled device can hold the thread inside a blocking read; don't hang
            // the window on it. A left-behind thread exits after its read returns.
            if !join_within(handle, STOP_TIMEOUT) {
                log::warn!("camera thread still busy after {STOP_TIMEOUT:?}, leaving it to finish");
            }
        }
        if let Ok(mut slot) = self.frame_slot.lock() {
            *slot = None;
        }
    }

    fn is_stopped(&self) -> bool {
        self.capture_thread.is_none()
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Join `handle` if the thread finishes within `timeout`. Returns false (and
/// detaches the thread) otherwise.
fn join_within(handle: JoinHandle<()>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(2));
    }
    let _ = handle.join();
    true
}

/// Body of the capture thread: open, report, then decode frames until told to stop.
fn run_capture_loop(
    request: CameraRequest,
    slot: FrameSlot,
    stop: Arc<AtomicBool>,
    events: Sender<CaptureEvent>,
) {
    let mut cam = match open_camera(&request) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = events.send(CaptureEvent::Failed(e));
            return;
        }
    };

    // Start streaming frames from the camera.
    if let Err(e) = cam.open_stream() {
        let _ = events.send(CaptureEvent::Failed(Error::CameraStream(format!("Open stream: {e}"))));
        return;
    }

    // The actual stream might choose a slightly different resolution.
    let actual = cam.resolution();
    let _ = events.send(CaptureEvent::Opened(actual.width(), actual.height()));

    pump_frames(&slot, &stop, &events, || {
        // Blocks until the device delivers the next frame.
        let raw = cam.frame().map_err(|e| e.to_string())?;
        // Decode to RGB (handles MJPEG, YUYV, NV12...). Corrupt frames are skipped.
        let Ok(rgb) = raw.decode_image::<RgbFormat>() else { return Ok(None) };
        let (w, h) = rgb.dimensions();
        Ok(FrameBuffer::from_rgb8(w as usize, h as usize, &rgb.into_raw()))
    });

    let _ = cam.stop_stream();
    log::debug!("camera stream closed");
}

/// Keep the slot filled from `read` until `stop` is set.
///
/// `read` yields `Err` when the device read fails and `Ok(None)` for a frame that
/// couldn't be decoded. After `MAX_FAILED_READS` failures in a row the device is
/// treated as gone: the slot is emptied and a failure event is sent.
fn pump_frames<F>(slot: &FrameSlot, stop: &AtomicBool, events: &Sender<CaptureEvent>, mut read: F)
where
    F: FnMut() -> Result<Option<FrameBuffer>, String>,
{
    let mut failed_reads = 0;
    while !stop.load(Ordering::Relaxed) {
        let frame = match read() {
            Ok(frame) => {
                failed_reads = 0;
                frame
            }
            Err(e) => {
                failed_reads += 1;
                if failed_reads >= MAX_FAILED_READS {
                    if let Ok(mut latest) = slot.lock() {
                        *latest = None;
                    }
                    let msg = format!("camera stopped delivering frames: {e}");
                    let _ = events.send(CaptureEvent::Failed(Error::CameraStream(msg)));
                    return;
                }
                thread::sleep(RETRY_DELAY);
                continue;
            }
        };

        let Some(frame) = frame else { continue };
        if let Ok(mut latest) = slot.lock() {
            *latest = Some(Arc::new(frame));
        }
    }
}

/// Try the requested size in a couple of common formats, then anything the device offers.
fn open_camera(request: &CameraRequest) -> Result<Camera, Error> {
    let index = CameraIndex::Index(request.device);
    let closest = |format: FrameFormat| {
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(request.width, request.height),
            format,
            request.fps,
        )))
    };
    let attempts = [
        closest(FrameFormat::MJPEG),
        closest(FrameFormat::YUYV),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
    ];

    let mut last_error = String::from("no format attempted");
    for requested in attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => last_error = e.to_string(),
        }
    }

    let msg = last_error.to_lowercase();
    if msg.contains("permission") || msg.contains("denied") || msg.contains("authoriz") {
        Err(Error::CameraPermissionDenied)
    } else {
        Err(Error::CameraInit(format!("Create camera: {last_error}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn slot() -> FrameSlot {
        Arc::new(Mutex::new(None))
    }

    #[test]
    fn frames_land_in_slot_until_stopped() {
        let (slot, stop) = (slot(), AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let mut reads = 0;
        pump_frames(&slot, &stop, &tx, || {
            reads += 1;
            if reads == 3 {
                stop.store(true, Ordering::Relaxed);
            }
            Ok(Some(FrameBuffer::filled(2, 2, Color::WHITE)))
        });
        assert_eq!(reads, 3);
        assert!(slot.lock().unwrap().is_some());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dead_device_clears_slot_and_reports() {
        let (slot, stop) = (slot(), AtomicBool::new(false));
        *slot.lock().unwrap() = Some(Arc::new(FrameBuffer::filled(1, 1, Color::WHITE)));
        let (tx, rx) = mpsc::channel();
        let mut reads = 0;
        pump_frames(&slot, &stop, &tx, || {
            reads += 1;
            Err("device unplugged".to_string())
        });
        assert_eq!(reads, MAX_FAILED_READS);
        assert!(slot.lock().unwrap().is_none());
        match rx.try_recv() {
            Ok(CaptureEvent::Failed(Error::CameraStream(msg))) => assert!(msg.contains("device unplugged")),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn occasional_failures_are_tolerated() {
        let (slot, stop) = (slot(), AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let mut reads = 0u32;
        pump_frames(&slot, &stop, &tx, || {
            reads += 1;
            if reads == 2 * MAX_FAILED_READS {
                stop.store(true, Ordering::Relaxed);
            }
            // Every other read fails, so the run never gets long enough to give up.
            if reads % 2 == 0 { Err("glitch".into()) } else { Ok(None) }
        });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn join_gives_up_on_a_stuck_thread() {
        let quick = thread::spawn(|| {});
        assert!(join_within(quick, Duration::from_secs(2)));

        let release = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&release);
        let stuck = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(1));
            }
        });
        assert!(!join_within(stuck, Duration::from_millis(20)));
        release.store(true, Ordering::Relaxed);
    }
}
