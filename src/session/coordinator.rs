use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use log::{error, info};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::eventlog::EventLog;
use crate::kb::CodeSync;
use crate::models::{CodeSnapshot, CompanyContext, InterviewStage, Speaker, TranscriptTurn};
use crate::outbox::{spawn_flush_watcher, Outbox};
use crate::recording::{MediaDevice, RecordingController};
use crate::settings::InterviewSettings;
use crate::store::{begin_coding_stage, AppStore, InterviewAction, InterviewStore};
use crate::transport::{ConversationHandle, TransportAdapter};

/// Root controller for one interview session. Ties the conversation
/// transport, the pending-message outbox, the code-sync debouncer, the
/// recording lifecycle, and the append-only event logs together behind one
/// handle the UI surfaces share.
#[derive(Clone)]
pub struct InterviewCoordinator {
    adapter: TransportAdapter,
    outbox: Arc<Outbox>,
    code_sync: CodeSync,
    recording: RecordingController,
    event_log: EventLog,
    interview_store: Arc<InterviewStore>,
    app_store: Arc<AppStore>,
    settings: InterviewSettings,
    watcher: Arc<Mutex<Option<(CancellationToken, JoinHandle<()>)>>>,
}

impl InterviewCoordinator {
    pub fn new(
        handle: Arc<dyn ConversationHandle>,
        device: Box<dyn MediaDevice>,
        event_log: EventLog,
        settings: InterviewSettings,
    ) -> Self {
        let adapter = TransportAdapter::new(handle);
        let code_sync = CodeSync::new(
            adapter.clone(),
            Duration::from_millis(settings.kb_debounce_ms),
        );

        Self {
            adapter,
            outbox: Arc::new(Outbox::new()),
            code_sync,
            recording: RecordingController::new(device),
            event_log,
            interview_store: Arc::new(InterviewStore::new()),
            app_store: Arc::new(AppStore::new()),
            settings,
            watcher: Arc::new(Mutex::new(None)),
        }
    }

    pub fn interview_store(&self) -> &InterviewStore {
        &self.interview_store
    }

    pub fn app_store(&self) -> &AppStore {
        &self.app_store
    }

    pub fn recording(&self) -> &RecordingController {
        &self.recording
    }

    pub fn adapter(&self) -> &TransportAdapter {
        &self.adapter
    }

    /// Signal transport readiness, register client tools, and start the
    /// watcher that drains queued messages once the conversation connects.
    pub async fn start(&self) -> Result<()> {
        let mut watcher = self.watcher.lock().await;
        if watcher.is_some() {
            bail!("coordinator already started");
        }

        self.adapter.start();

        if !self.settings.client_tools.is_empty() {
            self.adapter
                .set_client_tools(self.settings.client_tools.clone())
                .await;
        }

        let cancel_token = CancellationToken::new();
        let handle = spawn_flush_watcher(
            Arc::clone(&self.outbox),
            self.adapter.clone(),
            cancel_token.clone(),
        );
        *watcher = Some((cancel_token, handle));
        Ok(())
    }

    /// Send now when connected; otherwise queue for the flush watcher.
    /// Returns whether the message was delivered immediately.
    pub async fn send_user_message(&self, text: &str) -> bool {
        if self.adapter.is_connected() {
            self.adapter.send_user_message(text).await
        } else {
            self.outbox.enqueue_user_message(text).await;
            info!("user message queued until the conversation connects");
            false
        }
    }

    /// Same send-or-queue policy for contextual updates.
    pub async fn push_contextual_update(&self, text: &str) -> bool {
        if self.adapter.is_connected() {
            self.adapter.send_contextual_update(text).await
        } else {
            self.outbox.enqueue_contextual_update(text).await;
            info!("contextual update queued until the conversation connects");
            false
        }
    }

    /// Persist one spoken turn. Persistence failures never interrupt the
    /// interview; they are logged and the turn is lost.
    pub async fn record_transcript_turn(&self, speaker: Speaker, text: &str) {
        let session_id = self.recording.ensure_session_id().await;
        let turn = TranscriptTurn {
            speaker,
            text: text.to_string(),
        };
        if let Err(err) = self.event_log.append_transcript(&session_id, &turn).await {
            error!("failed to persist transcript turn: {err:#}");
        }
    }

    /// Persist a code snapshot and hand the code to the debouncer so the
    /// agent's view catches up after the candidate stops typing.
    pub async fn record_code_snapshot(&self, code: &str) {
        let session_id = self.recording.ensure_session_id().await;
        let snapshot = CodeSnapshot {
            code: code.to_string(),
            submitted: false,
        };
        if let Err(err) = self
            .event_log
            .append_code_snapshot(&session_id, &snapshot)
            .await
        {
            error!("failed to persist code snapshot: {err:#}");
        }

        self.code_sync.schedule(code).await;
    }

    /// Final snapshot; no further code updates reach the agent afterwards.
    pub async fn submit_code(&self, code: &str) {
        let session_id = self.recording.ensure_session_id().await;
        let snapshot = CodeSnapshot {
            code: code.to_string(),
            submitted: true,
        };
        if let Err(err) = self
            .event_log
            .append_code_snapshot(&session_id, &snapshot)
            .await
        {
            error!("failed to persist submitted code: {err:#}");
        }

        self.code_sync.mark_submitted().await;
    }

    /// Move the interview into the coding stage and reveal the IDE.
    pub fn begin_coding_stage<F>(&self, context: &CompanyContext, reveal_coding_ui: F)
    where
        F: FnOnce(),
    {
        begin_coding_stage(
            &self.app_store,
            &self.interview_store,
            context,
            reveal_coding_ui,
        );
    }

    /// Best-effort teardown: every failure on this path is logged and
    /// swallowed so ending an interview always completes.
    pub async fn end(&self) {
        if let Some((cancel_token, handle)) = self.watcher.lock().await.take() {
            cancel_token.cancel();
            if let Err(err) = handle.await {
                error!("flush watcher task failed to join: {err}");
            }
        }

        self.code_sync.shutdown().await;
        self.recording.stop_recording().await;
        self.adapter.stop().await;

        self.interview_store
            .dispatch(InterviewAction::SetStage(InterviewStage::Completed));
        info!("interview session ended");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::recording::testing::FakeDevice;
    use crate::settings::DEFAULT_KB_DEBOUNCE_MS;
    use crate::transport::testing::FakeConversation;
    use crate::transport::ConversationStatus;

    fn coordinator(
        fake: &Arc<FakeConversation>,
        dir: &std::path::Path,
        settings: InterviewSettings,
    ) -> InterviewCoordinator {
        InterviewCoordinator::new(
            fake.clone(),
            Box::new(FakeDevice::granting()),
            EventLog::new(dir.to_path_buf()).unwrap(),
            settings,
        )
    }

    #[tokio::test]
    async fn queued_update_is_sent_exactly_once_after_connecting() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::disconnected();
        let coordinator = coordinator(&fake, temp.path(), InterviewSettings::default());

        coordinator.start().await.unwrap();
        assert!(!coordinator.push_contextual_update("U1").await);
        assert!(fake.sent_contextual_updates().is_empty());

        fake.set_status(ConversationStatus::Connected);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        while fake.sent_contextual_updates().is_empty() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "queued update never flushed"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(fake.sent_contextual_updates(), vec!["U1".to_string()]);
        coordinator.end().await;
        assert_eq!(fake.sent_contextual_updates(), vec!["U1".to_string()]);
    }

    #[tokio::test]
    async fn immediate_send_when_connected_skips_the_queue() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::connected();
        let coordinator = coordinator(&fake, temp.path(), InterviewSettings::default());

        coordinator.start().await.unwrap();
        assert!(coordinator.send_user_message("hello").await);
        assert_eq!(fake.sent_user_messages(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn double_start_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::connected();
        let coordinator = coordinator(&fake, temp.path(), InterviewSettings::default());

        coordinator.start().await.unwrap();
        assert!(coordinator.start().await.is_err());
    }

    #[tokio::test]
    async fn client_tools_are_registered_at_start() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::connected();
        let mut settings = InterviewSettings::default();
        settings
            .client_tools
            .insert("open_hint".to_string(), serde_json::json!({"args": {}}));
        let coordinator = coordinator(&fake, temp.path(), settings);

        coordinator.start().await.unwrap();
        let registered = fake.registered_client_tools();
        assert_eq!(registered.len(), 1);
        assert!(registered[0].contains_key("open_hint"));
    }

    #[tokio::test]
    async fn transcript_turns_are_persisted_under_the_session_id() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::connected();
        let coordinator = coordinator(&fake, temp.path(), InterviewSettings::default());

        coordinator.recording().set_session_id("sess-7").await;
        coordinator
            .record_transcript_turn(Speaker::Agent, "Walk me through your background")
            .await;
        coordinator
            .record_transcript_turn(Speaker::Candidate, "Sure.")
            .await;

        let contents = fs::read_to_string(temp.path().join("sess-7.transcript.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn code_snapshot_is_persisted_and_debounced_to_the_agent() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::connected();
        let coordinator = coordinator(&fake, temp.path(), InterviewSettings::default());

        coordinator.recording().set_session_id("sess-9").await;
        coordinator.record_code_snapshot("fn main() {}").await;

        tokio::time::sleep(Duration::from_millis(DEFAULT_KB_DEBOUNCE_MS + 100)).await;

        let sent = fake.sent_contextual_updates();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("fn main() {}"));

        let contents = fs::read_to_string(temp.path().join("sess-9.code.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_suppresses_further_code_updates() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::connected();
        let coordinator = coordinator(&fake, temp.path(), InterviewSettings::default());

        coordinator.recording().set_session_id("sess-11").await;
        coordinator.submit_code("final answer").await;
        coordinator.record_code_snapshot("post-submit edit").await;

        tokio::time::sleep(Duration::from_millis(DEFAULT_KB_DEBOUNCE_MS + 100)).await;
        assert!(fake.sent_contextual_updates().is_empty());

        // Both snapshots are still persisted for later analysis.
        let contents = fs::read_to_string(temp.path().join("sess-11.code.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn end_completes_the_stage_and_closes_the_conversation() {
        let temp = tempfile::tempdir().unwrap();
        let fake = FakeConversation::connected();
        let coordinator = coordinator(&fake, temp.path(), InterviewSettings::default());

        coordinator.start().await.unwrap();
        coordinator.end().await;

        assert!(fake.ended());
        assert_eq!(
            coordinator.interview_store().state().stage,
            InterviewStage::Completed
        );
    }
}
