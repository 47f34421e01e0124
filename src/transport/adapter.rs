use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info, warn};
use serde_json::Value;
use tokio::sync::watch;

use super::{ConversationHandle, ConversationStatus};

/// Thin boundary over the vendor conversation session. Nothing here returns
/// an error: failures are logged and reported as `false`, so a dropped
/// message can never take the interview down with it.
#[derive(Clone)]
pub struct TransportAdapter {
    handle: Arc<dyn ConversationHandle>,
}

impl TransportAdapter {
    pub fn new(handle: Arc<dyn ConversationHandle>) -> Self {
        Self { handle }
    }

    pub fn status(&self) -> ConversationStatus {
        self.handle.status()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.status() == ConversationStatus::Connected
    }

    pub fn status_stream(&self) -> watch::Receiver<ConversationStatus> {
        self.handle.status_stream()
    }

    /// Signals readiness. The conversation itself was established by the
    /// embedder before the handle was passed in.
    pub fn start(&self) {
        info!("transport adapter ready (status: {:?})", self.handle.status());
    }

    /// Best-effort end of the underlying session.
    pub async fn stop(&self) {
        match self.handle.end_session().await {
            Ok(()) => info!("conversation session ended"),
            Err(err) => warn!("failed to end conversation session: {err:#}"),
        }
    }

    /// Returns false without a network attempt when the conversation is not
    /// connected, and false (logged) on a transport failure.
    pub async fn send_user_message(&self, text: &str) -> bool {
        if !self.is_connected() {
            warn!("user message not sent: transport not connected");
            return false;
        }
        match self.handle.send_user_message(text).await {
            Ok(()) => {
                info!("sent user message ({} chars)", text.len());
                true
            }
            Err(err) => {
                error!("failed to send user message: {err:#}");
                false
            }
        }
    }

    pub async fn send_contextual_update(&self, text: &str) -> bool {
        if !self.is_connected() {
            warn!("contextual update not sent: transport not connected");
            return false;
        }
        if !self.handle.supports_contextual_updates() {
            warn!("conversation handle lacks contextual updates; skipping");
            return false;
        }
        match self.handle.send_contextual_update(text).await {
            Ok(()) => {
                info!("sent contextual update ({} chars)", text.len());
                true
            }
            Err(err) => {
                error!("failed to send contextual update: {err:#}");
                false
            }
        }
    }

    /// Forwarded only when the handle advertises the capability.
    pub async fn set_client_tools(&self, tools: HashMap<String, Value>) -> bool {
        if !self.handle.supports_client_tools() {
            info!("conversation handle lacks client tools; skipping");
            return false;
        }
        let count = tools.len();
        match self.handle.set_client_tools(tools).await {
            Ok(()) => {
                info!("registered {count} client tools");
                true
            }
            Err(err) => {
                error!("failed to register client tools: {err:#}");
                false
            }
        }
    }
}
