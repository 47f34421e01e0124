//! Shared test double for the vendor conversation session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use super::{ConversationHandle, ConversationStatus};

pub(crate) struct FakeConversation {
    status_tx: watch::Sender<ConversationStatus>,
    user_messages: Mutex<Vec<String>>,
    contextual_updates: Mutex<Vec<String>>,
    client_tools: Mutex<Vec<HashMap<String, Value>>>,
    contextual_supported: bool,
    tools_supported: bool,
    fail_user_messages: AtomicUsize,
    fail_contextual_updates: AtomicUsize,
    fail_end_session: AtomicBool,
    ended: AtomicBool,
}

impl FakeConversation {
    fn new(status: ConversationStatus, with_capabilities: bool) -> Arc<Self> {
        let (status_tx, _) = watch::channel(status);
        Arc::new(Self {
            status_tx,
            user_messages: Mutex::new(Vec::new()),
            contextual_updates: Mutex::new(Vec::new()),
            client_tools: Mutex::new(Vec::new()),
            contextual_supported: with_capabilities,
            tools_supported: with_capabilities,
            fail_user_messages: AtomicUsize::new(0),
            fail_contextual_updates: AtomicUsize::new(0),
            fail_end_session: AtomicBool::new(false),
            ended: AtomicBool::new(false),
        })
    }

    pub fn connected() -> Arc<Self> {
        Self::new(ConversationStatus::Connected, true)
    }

    pub fn connected_without_capabilities() -> Arc<Self> {
        Self::new(ConversationStatus::Connected, false)
    }

    pub fn disconnected() -> Arc<Self> {
        Self::new(ConversationStatus::Disconnected, true)
    }

    pub fn set_status(&self, status: ConversationStatus) {
        self.status_tx.send_replace(status);
    }

    pub fn sent_user_messages(&self) -> Vec<String> {
        self.user_messages.lock().unwrap().clone()
    }

    pub fn sent_contextual_updates(&self) -> Vec<String> {
        self.contextual_updates.lock().unwrap().clone()
    }

    pub fn registered_client_tools(&self) -> Vec<HashMap<String, Value>> {
        self.client_tools.lock().unwrap().clone()
    }

    /// Make the next `count` user message sends fail.
    pub fn fail_next_user_messages(&self, count: usize) {
        self.fail_user_messages.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` contextual update sends fail.
    pub fn fail_next_contextual_updates(&self, count: usize) {
        self.fail_contextual_updates.store(count, Ordering::SeqCst);
    }

    pub fn fail_end_session(&self) {
        self.fail_end_session.store(true, Ordering::SeqCst);
    }

    pub fn ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ConversationHandle for FakeConversation {
    fn status(&self) -> ConversationStatus {
        *self.status_tx.borrow()
    }

    fn status_stream(&self) -> watch::Receiver<ConversationStatus> {
        self.status_tx.subscribe()
    }

    async fn send_user_message(&self, text: &str) -> Result<()> {
        if Self::take_failure(&self.fail_user_messages) {
            bail!("injected user message failure");
        }
        self.user_messages.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn supports_contextual_updates(&self) -> bool {
        self.contextual_supported
    }

    async fn send_contextual_update(&self, text: &str) -> Result<()> {
        if Self::take_failure(&self.fail_contextual_updates) {
            bail!("injected contextual update failure");
        }
        self.contextual_updates.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn supports_client_tools(&self) -> bool {
        self.tools_supported
    }

    async fn set_client_tools(&self, tools: HashMap<String, Value>) -> Result<()> {
        self.client_tools.lock().unwrap().push(tools);
        Ok(())
    }

    async fn end_session(&self) -> Result<()> {
        if self.fail_end_session.load(Ordering::SeqCst) {
            bail!("injected end session failure");
        }
        self.ended.store(true, Ordering::SeqCst);
        Ok(())
    }
}
