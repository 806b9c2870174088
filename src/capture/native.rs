//! Native webcam capture using nokhwa
//!
//! Frames are requested in MJPEG and forwarded unchanged as fragments, so a
//! finished artifact is a motion-JPEG stream. The camera is opened on the
//! capture thread and closed when the recorder stops or the track is stopped.

use super::traits::{
    CameraInfo, CaptureError, CaptureResult, MediaConstraints, MediaHost, MediaRecorder,
    MediaStream, MediaTrack, RecorderEvent, TrackInfo, TrackKind,
};
use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Consecutive frame errors tolerated before the capture loop gives up
const MAX_FRAME_FAILURES: u32 = 50;
const FRAME_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Tracks consecutive frame errors on the capture thread
#[derive(Debug, Default)]
struct FrameFailures {
    consecutive: u32,
}

impl FrameFailures {
    fn success(&mut self) {
        self.consecutive = 0;
    }

    /// Count a failed frame. Returns false once the camera should be abandoned.
    fn failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive < MAX_FRAME_FAILURES
    }
}

/// Get list of available cameras
pub fn get_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .into_iter()
            .map(|info| CameraInfo {
                id: camera_index_id(info.index()),
                name: info.human_name(),
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

fn camera_index_id(index: &CameraIndex) -> String {
    match index {
        CameraIndex::Index(i) => i.to_string(),
        CameraIndex::String(s) => s.clone(),
    }
}

fn parse_camera_index(id: &str) -> CameraIndex {
    match id.parse::<u32>() {
        Ok(i) => CameraIndex::Index(i),
        Err(_) => CameraIndex::String(id.to_string()),
    }
}

/// Host backed by the local webcam
pub struct NativeHost {
    /// Device ID to capture from (None = first camera)
    device_id: Option<String>,
    width: u32,
    height: u32,
    fps: u32,
}

impl NativeHost {
    pub fn new(device_id: Option<String>) -> Self {
        Self {
            device_id,
            width: 1280,
            height: 720,
            fps: 30,
        }
    }

    pub fn with_format(mut self, width: u32, height: u32, fps: u32) -> Self {
        self.width = width;
        self.height = height;
        self.fps = fps;
        self
    }
}

#[async_trait]
impl MediaHost for NativeHost {
    async fn request_media(
        &self,
        constraints: MediaConstraints,
    ) -> CaptureResult<Box<dyn MediaStream>> {
        if !constraints.video {
            return Err(CaptureError::DeviceUnavailable(
                "native host only records video".to_string(),
            ));
        }
        if constraints.audio {
            tracing::warn!("Native host has no microphone track; recording video only");
        }

        let cameras = tokio::task::spawn_blocking(get_cameras)
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let camera = match &self.device_id {
            Some(id) => cameras.into_iter().find(|c| &c.id == id),
            None => cameras.into_iter().next(),
        }
        .ok_or_else(|| CaptureError::DeviceUnavailable("No cameras found".to_string()))?;

        tracing::info!("Using camera {} ({})", camera.name, camera.id);

        let live = Arc::new(AtomicBool::new(true));
        let track = NativeTrack {
            info: TrackInfo {
                id: Uuid::new_v4().to_string(),
                kind: TrackKind::Video,
                label: camera.name.clone(),
            },
            live: live.clone(),
        };

        Ok(Box::new(NativeStream {
            id: Uuid::new_v4().to_string(),
            camera_index: parse_camera_index(&camera.id),
            format: CameraFormat::new(
                Resolution::new(self.width, self.height),
                FrameFormat::MJPEG,
                self.fps,
            ),
            live,
            tracks: vec![Box::new(track)],
        }))
    }
}

struct NativeTrack {
    info: TrackInfo,
    live: Arc<AtomicBool>,
}

impl MediaTrack for NativeTrack {
    fn info(&self) -> &TrackInfo {
        &self.info
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

struct NativeStream {
    id: String,
    camera_index: CameraIndex,
    format: CameraFormat,
    live: Arc<AtomicBool>,
    tracks: Vec<Box<dyn MediaTrack>>,
}

impl MediaStream for NativeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks_mut(&mut self) -> &mut [Box<dyn MediaTrack>] {
        &mut self.tracks
    }

    // Always MJPEG; the requested container type is only a label
    fn recorder(&self, _mime_type: &str) -> CaptureResult<Box<dyn MediaRecorder>> {
        Ok(Box::new(NativeRecorder {
            camera_index: self.camera_index.clone(),
            format: self.format,
            live: self.live.clone(),
            is_recording: Arc::new(AtomicBool::new(false)),
            capture_thread: None,
        }))
    }
}

struct NativeRecorder {
    camera_index: CameraIndex,
    format: CameraFormat,
    live: Arc<AtomicBool>,
    is_recording: Arc<AtomicBool>,
    capture_thread: Option<std::thread::JoinHandle<()>>,
}

impl MediaRecorder for NativeRecorder {
    fn start(&mut self, events: mpsc::UnboundedSender<RecorderEvent>) -> CaptureResult<()> {
        if self.is_recording.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyActive);
        }

        let camera_index = self.camera_index.clone();
        let format = self.format;
        let live = self.live.clone();
        let is_recording = self.is_recording.clone();

        let handle = std::thread::spawn(move || {
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

            let mut camera = match Camera::new(camera_index.clone(), requested) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to open camera {:?}: {:?}", camera_index, e);
                    let _ = events.send(RecorderEvent::Stopped);
                    return;
                }
            };

            if let Err(e) = camera.open_stream() {
                tracing::error!("Failed to open camera stream: {:?}", e);
                let _ = events.send(RecorderEvent::Stopped);
                return;
            }

            let actual = camera.camera_format();
            tracing::info!(
                "Webcam opened: {}x{} @ {}fps, format={:?}",
                actual.resolution().width(),
                actual.resolution().height(),
                actual.frame_rate(),
                actual.format()
            );

            let mut frame_count: u64 = 0;
            let mut failures = FrameFailures::default();
            while is_recording.load(Ordering::SeqCst) && live.load(Ordering::SeqCst) {
                match camera.frame() {
                    Ok(frame) => {
                        failures.success();
                        if events
                            .send(RecorderEvent::DataAvailable(frame.buffer().to_vec()))
                            .is_err()
                        {
                            break;
                        }
                        frame_count += 1;
                    }
                    Err(e) => {
                        if !failures.failure() {
                            tracing::error!(
                                "Camera stopped delivering frames after {} errors: {:?}",
                                MAX_FRAME_FAILURES,
                                e
                            );
                            break;
                        }
                        tracing::debug!("Failed to capture frame: {:?}", e);
                        std::thread::sleep(FRAME_RETRY_DELAY);
                    }
                }
            }
            is_recording.store(false, Ordering::SeqCst);

            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Error stopping camera stream: {:?}", e);
            }

            tracing::info!("Webcam captured {} frames", frame_count);
            let _ = events.send(RecorderEvent::Stopped);
        });

        self.capture_thread = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> CaptureResult<()> {
        // The capture thread sends `Stopped` once the camera is closed
        self.is_recording.store(false, Ordering::SeqCst);
        self.capture_thread.take();
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }
}

impl Drop for NativeRecorder {
    fn drop(&mut self) {
        self.is_recording.store(false, Ordering::SeqCst);
    }
}
