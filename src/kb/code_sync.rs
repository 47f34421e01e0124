use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::transport::TransportAdapter;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

struct SyncState {
    /// Last code the agent actually received. Unchanged on a failed send so
    /// the next differing edit retries.
    last_sent_code: Option<String>,
    has_submitted: bool,
    pending: Option<JoinHandle<()>>,
}

/// Keeps the agent's view of the candidate's current code fresh without
/// sending an update on every keystroke: edits arm a single debounce timer,
/// and each new edit replaces the pending one.
#[derive(Clone)]
pub struct CodeSync {
    adapter: TransportAdapter,
    state: Arc<Mutex<SyncState>>,
    debounce: Duration,
}

impl CodeSync {
    pub fn new(adapter: TransportAdapter, debounce: Duration) -> Self {
        Self {
            adapter,
            state: Arc::new(Mutex::new(SyncState {
                last_sent_code: None,
                has_submitted: false,
                pending: None,
            })),
            debounce,
        }
    }

    /// Arm (or re-arm) the debounced update for `code`. Skipped entirely when
    /// the transport is not connected, the candidate has submitted, or the
    /// code matches what the agent already has.
    pub async fn schedule(&self, code: &str) {
        let mut state = self.state.lock().await;

        if state.has_submitted {
            return;
        }
        if !self.adapter.is_connected() {
            return;
        }
        if state.last_sent_code.as_deref() == Some(code) {
            return;
        }

        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        let adapter = self.adapter.clone();
        let sync_state = Arc::clone(&self.state);
        let code = code.to_string();
        let debounce = self.debounce;

        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let update = format!("The candidate's current code:\n\n{code}");
            if adapter.send_contextual_update(&update).await {
                log_info!("code update sent ({} chars)", code.len());
                sync_state.lock().await.last_sent_code = Some(code);
            } else {
                log_warn!("code update failed; will retry on the next differing edit");
            }
        }));
    }

    /// Permanently stop code updates for this session and cancel any pending
    /// timer.
    pub async fn mark_submitted(&self) {
        let mut state = self.state.lock().await;
        state.has_submitted = true;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        log_info!("code submitted; further code updates suppressed");
    }

    pub async fn has_submitted(&self) -> bool {
        self.state.lock().await.has_submitted
    }

    /// Teardown: a stale update must not fire after the owner is gone.
    pub async fn shutdown(&self) {
        if let Some(pending) = self.state.lock().await.pending.take() {
            pending.abort();
        }
    }

    #[cfg(test)]
    async fn last_sent_code(&self) -> Option<String> {
        self.state.lock().await.last_sent_code.clone()
    }
}
