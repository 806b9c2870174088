//! Scripted in-memory capture host used by the test suites

use super::traits::{
    CaptureError, CaptureResult, MediaConstraints, MediaHost, MediaRecorder, MediaStream,
    MediaTrack, RecorderEvent, TrackInfo, TrackKind,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Granted,
    Denied,
    Unavailable,
}

struct Shared {
    access: Mutex<Access>,
    fragments: Vec<Vec<u8>>,
    trailing: Option<Vec<u8>>,
    /// Never report `Stopped`, like a host whose recorder hangs on stop
    hold_stop: bool,
    live_tracks: AtomicUsize,
    requests: AtomicUsize,
    sender: Mutex<Option<mpsc::UnboundedSender<RecorderEvent>>>,
}

/// Host that grants or refuses access as scripted and replays fixed fragments
#[derive(Clone)]
pub(crate) struct ScriptedHost {
    shared: Arc<Shared>,
}

impl ScriptedHost {
    fn build(
        access: Access,
        fragments: Vec<Vec<u8>>,
        trailing: Option<Vec<u8>>,
        hold_stop: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                access: Mutex::new(access),
                fragments,
                trailing,
                hold_stop,
                live_tracks: AtomicUsize::new(0),
                requests: AtomicUsize::new(0),
                sender: Mutex::new(None),
            }),
        }
    }

    /// Grants access; the recorder emits `fragments` as soon as it starts
    pub(crate) fn granted(fragments: Vec<Vec<u8>>) -> Self {
        Self::build(Access::Granted, fragments, None, false)
    }

    /// Grants access; `trailing` is flushed when the recorder is stopped
    pub(crate) fn granted_with_trailing(fragments: Vec<Vec<u8>>, trailing: Vec<u8>) -> Self {
        Self::build(Access::Granted, fragments, Some(trailing), false)
    }

    /// Grants access; the recorder never confirms that it has stopped
    pub(crate) fn granted_never_stopping(fragments: Vec<Vec<u8>>) -> Self {
        Self::build(Access::Granted, fragments, None, true)
    }

    pub(crate) fn denied() -> Self {
        Self::build(Access::Denied, Vec::new(), None, false)
    }

    pub(crate) fn unavailable() -> Self {
        Self::build(Access::Unavailable, Vec::new(), None, false)
    }

    pub(crate) fn set_access(&self, access: Access) {
        *self.shared.access.lock() = access;
    }

    /// Number of device tracks that have not been stopped
    pub(crate) fn live_tracks(&self) -> usize {
        self.shared.live_tracks.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> usize {
        self.shared.requests.load(Ordering::SeqCst)
    }

    /// Push an extra fragment through the last recorder's channel
    pub(crate) fn deliver(&self, bytes: Vec<u8>) -> bool {
        match self.shared.sender.lock().as_ref() {
            Some(tx) => tx.send(RecorderEvent::DataAvailable(bytes)).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl MediaHost for ScriptedHost {
    async fn request_media(
        &self,
        constraints: MediaConstraints,
    ) -> CaptureResult<Box<dyn MediaStream>> {
        self.shared.requests.fetch_add(1, Ordering::SeqCst);
        let access = *self.shared.access.lock();
        match access {
            Access::Denied => {
                return Err(CaptureError::PermissionDenied(
                    "user dismissed the prompt".to_string(),
                ))
            }
            Access::Unavailable => {
                return Err(CaptureError::DeviceUnavailable(
                    "no camera attached".to_string(),
                ))
            }
            Access::Granted => {}
        }

        let mut tracks: Vec<Box<dyn MediaTrack>> = Vec::new();
        if constraints.video {
            tracks.push(Box::new(ScriptedTrack::new(TrackKind::Video, &self.shared)));
        }
        if constraints.audio {
            tracks.push(Box::new(ScriptedTrack::new(TrackKind::Audio, &self.shared)));
        }

        Ok(Box::new(ScriptedStream {
            id: format!("stream-{}", self.requests()),
            tracks,
            shared: self.shared.clone(),
        }))
    }
}

struct ScriptedStream {
    id: String,
    tracks: Vec<Box<dyn MediaTrack>>,
    shared: Arc<Shared>,
}

impl MediaStream for ScriptedStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks_mut(&mut self) -> &mut [Box<dyn MediaTrack>] {
        &mut self.tracks
    }

    fn recorder(&self, _mime_type: &str) -> CaptureResult<Box<dyn MediaRecorder>> {
        Ok(Box::new(ScriptedRecorder {
            shared: self.shared.clone(),
            events: None,
        }))
    }
}

struct ScriptedTrack {
    info: TrackInfo,
    live: bool,
    shared: Arc<Shared>,
}

impl ScriptedTrack {
    fn new(kind: TrackKind, shared: &Arc<Shared>) -> Self {
        shared.live_tracks.fetch_add(1, Ordering::SeqCst);
        Self {
            info: TrackInfo {
                id: format!("{kind:?}").to_lowercase(),
                kind,
                label: "scripted".to_string(),
            },
            live: true,
            shared: shared.clone(),
        }
    }
}

impl MediaTrack for ScriptedTrack {
    fn info(&self) -> &TrackInfo {
        &self.info
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.shared.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

struct ScriptedRecorder {
    shared: Arc<Shared>,
    events: Option<mpsc::UnboundedSender<RecorderEvent>>,
}

impl MediaRecorder for ScriptedRecorder {
    fn start(&mut self, events: mpsc::UnboundedSender<RecorderEvent>) -> CaptureResult<()> {
        for fragment in &self.shared.fragments {
            let _ = events.send(RecorderEvent::DataAvailable(fragment.clone()));
        }
        *self.shared.sender.lock() = Some(events.clone());
        self.events = Some(events);
        Ok(())
    }

    fn stop(&mut self) -> CaptureResult<()> {
        if self.shared.hold_stop {
            self.events = None;
            return Ok(());
        }
        if let Some(events) = self.events.take() {
            if let Some(trailing) = &self.shared.trailing {
                let _ = events.send(RecorderEvent::DataAvailable(trailing.clone()));
            }
            let _ = events.send(RecorderEvent::Stopped);
        }
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.events.is_some()
    }
}
