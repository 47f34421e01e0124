use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::RecordingSession;

/// Raw capture handle for the candidate's camera/microphone. Owned by the
/// controller; consumers never touch it directly, only the controller's
/// operations.
#[async_trait]
pub trait MediaDevice: Send + 'static {
    /// Prompts for capture permission. Denial is a normal outcome, not an
    /// error.
    async fn request_permission(&mut self) -> Result<bool>;
    async fn begin_capture(&mut self) -> Result<()>;
    async fn end_capture(&mut self) -> Result<()>;
}

struct RecordingInner {
    session: RecordingSession,
    device: Box<dyn MediaDevice>,
}

/// Recording lifecycle for one interview. Shared via Clone so the chat panel
/// and the coding IDE reuse the same recording session.
#[derive(Clone)]
pub struct RecordingController {
    inner: Arc<Mutex<RecordingInner>>,
}

impl RecordingController {
    pub fn new(device: Box<dyn MediaDevice>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecordingInner {
                session: RecordingSession::default(),
                device,
            })),
        }
    }

    pub async fn session(&self) -> RecordingSession {
        self.inner.lock().await.session.clone()
    }

    /// The identifier can be assigned before recording starts so events are
    /// keyed to the session from the first turn.
    pub async fn set_session_id(&self, id: impl Into<String>) {
        self.inner.lock().await.session.id = Some(id.into());
    }

    /// Current session id, generating one if the session has none yet.
    pub async fn ensure_session_id(&self) -> String {
        let mut inner = self.inner.lock().await;
        match &inner.session.id {
            Some(id) => id.clone(),
            None => {
                let id = Uuid::new_v4().to_string();
                inner.session.id = Some(id.clone());
                id
            }
        }
    }

    /// Prompt for permission; denial and prompt failure both come back as
    /// false.
    pub async fn request_recording_permission(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let granted = match inner.device.request_permission().await {
            Ok(granted) => granted,
            Err(err) => {
                warn!("recording permission request failed: {err:#}");
                false
            }
        };
        inner.session.has_recording_permission = granted;
        inner.session.has_microphone_permission = granted;
        granted
    }

    /// Returns Ok(false) when permission is denied; errors only on a device
    /// failure or a double start.
    pub async fn start_recording(&self) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.session.is_recording {
            bail!("recording already active");
        }

        if !inner.session.has_recording_permission {
            let granted = match inner.device.request_permission().await {
                Ok(granted) => granted,
                Err(err) => {
                    warn!("recording permission request failed: {err:#}");
                    false
                }
            };
            inner.session.has_recording_permission = granted;
            inner.session.has_microphone_permission = granted;
            if !granted {
                info!("recording not started: permission denied");
                return Ok(false);
            }
        }

        if inner.session.id.is_none() {
            inner.session.id = Some(Uuid::new_v4().to_string());
        }

        inner.device.begin_capture().await?;
        inner.session.is_recording = true;
        inner.session.recording_url = None;
        inner.session.uploaded = false;

        if let Some(id) = &inner.session.id {
            info!("recording started for session {id}");
        }
        Ok(true)
    }

    /// Best-effort teardown; a capture that will not end cleanly is logged
    /// and forgotten.
    pub async fn stop_recording(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.session.is_recording {
            return;
        }
        inner.session.is_recording = false;
        if let Err(err) = inner.device.end_capture().await {
            warn!("failed to end media capture cleanly: {err:#}");
        } else {
            info!("recording stopped");
        }
    }

    /// Record where the finished media ended up and mark it uploaded.
    pub async fn insert_recording_url(&self, url: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.session.recording_url = Some(url.into());
        inner.session.uploaded = true;
    }
}
