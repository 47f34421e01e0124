use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::transport::{ConversationStatus, TransportAdapter};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Buffers messages composed before the conversation is live. Two independent
/// queues: contextual updates and user messages. Each item is attempted once,
/// in enqueue order, after the transport connects; failed items are dropped,
/// not requeued.
pub struct Outbox {
    contextual_updates: Mutex<VecDeque<String>>,
    user_messages: Mutex<VecDeque<String>>,
    // Overlapping flush cycles would race over the same queues; the winner
    // keeps draining until both read empty.
    flushing: AtomicBool,
}

impl Outbox {
    pub fn new() -> Self {
        Self {
            contextual_updates: Mutex::new(VecDeque::new()),
            user_messages: Mutex::new(VecDeque::new()),
            flushing: AtomicBool::new(false),
        }
    }

    pub async fn enqueue_contextual_update(&self, text: impl Into<String>) {
        self.contextual_updates.lock().await.push_back(text.into());
    }

    pub async fn enqueue_user_message(&self, text: impl Into<String>) {
        self.user_messages.lock().await.push_back(text.into());
    }

    /// (contextual updates, user messages) still waiting for a connection.
    pub async fn pending_counts(&self) -> (usize, usize) {
        (
            self.contextual_updates.lock().await.len(),
            self.user_messages.lock().await.len(),
        )
    }

    /// Drain both queues through the adapter. No-op unless connected; no-op
    /// if another flush cycle is already running. Sends within a queue are
    /// sequential; a failed send is logged and the item dropped. The queues
    /// are empty when this returns.
    pub async fn flush(&self, adapter: &TransportAdapter) {
        if !adapter.is_connected() {
            return;
        }
        if self
            .flushing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        loop {
            let updates: Vec<String> = self.contextual_updates.lock().await.drain(..).collect();
            let messages: Vec<String> = self.user_messages.lock().await.drain(..).collect();
            if updates.is_empty() && messages.is_empty() {
                break;
            }

            log_info!(
                "flushing outbox: {} contextual updates, {} user messages",
                updates.len(),
                messages.len()
            );

            for update in updates {
                if !adapter.send_contextual_update(&update).await {
                    log_warn!("dropped pending contextual update after failed send");
                }
            }
            for message in messages {
                if !adapter.send_user_message(&message).await {
                    log_warn!("dropped pending user message after failed send");
                }
            }
        }

        self.flushing.store(false, Ordering::SeqCst);
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Watches the conversation status and flushes the outbox on every transition
/// into Connected.
pub fn spawn_flush_watcher(
    outbox: Arc<Outbox>,
    adapter: TransportAdapter,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    let mut status_rx = adapter.status_stream();
    tokio::spawn(async move {
        // The conversation may have connected before we subscribed.
        if adapter.is_connected() {
            outbox.flush(&adapter).await;
        }

        loop {
            tokio::select! {
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        log_info!("conversation status channel closed; flush watcher exiting");
                        break;
                    }
                    let status = *status_rx.borrow_and_update();
                    if status == ConversationStatus::Connected {
                        outbox.flush(&adapter).await;
                    }
                }
                _ = cancel_token.cancelled() => {
                    log_info!("flush watcher shutting down");
                    break;
                }
            }
        }
    })
}
