pub mod adapter;
#[cfg(test)]
pub(crate) mod testing;

pub use adapter::TransportAdapter;

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Contract for the vendor realtime conversation session. The embedder
/// establishes the connection and hands the live object in behind this trait;
/// nothing in this crate dials out on its own.
///
/// Contextual updates and client tools are optional capabilities. The default
/// implementations report them unsupported; the adapter probes before
/// forwarding.
#[async_trait]
pub trait ConversationHandle: Send + Sync + 'static {
    fn status(&self) -> ConversationStatus;

    /// Watch channel mirroring `status`, used to react to reconnects without
    /// polling.
    fn status_stream(&self) -> watch::Receiver<ConversationStatus>;

    /// Speak a message into the conversation on the candidate's behalf.
    async fn send_user_message(&self, text: &str) -> Result<()>;

    fn supports_contextual_updates(&self) -> bool {
        false
    }

    /// Background information for the agent; no spoken reply is expected.
    async fn send_contextual_update(&self, _text: &str) -> Result<()> {
        bail!("conversation handle does not support contextual updates")
    }

    fn supports_client_tools(&self) -> bool {
        false
    }

    async fn set_client_tools(&self, _tools: HashMap<String, Value>) -> Result<()> {
        bail!("conversation handle does not support client tools")
    }

    /// Best-effort teardown of the underlying session.
    async fn end_session(&self) -> Result<()>;
}
