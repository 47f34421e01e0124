//! Session coordination core for AI-mediated technical interviews: buffers
//! and ships messages to the conversational agent, keeps its view of the
//! candidate's code fresh, drives stage transitions, owns the recording
//! lifecycle, and persists transcripts and code snapshots as append-only
//! JSONL logs.

pub mod eventlog;
pub mod kb;
pub mod models;
pub mod observer;
pub mod outbox;
pub mod recording;
pub mod session;
pub mod settings;
pub mod store;
pub mod transport;
pub mod utils;

pub use eventlog::EventLog;
pub use kb::CodeSync;
pub use models::{
    BackgroundProgress, CodeSnapshot, CompanyContext, InterviewStage, InterviewState,
    RecordingSession, Speaker, TranscriptTurn,
};
pub use observer::{BadgeSnapshot, DebugBadge};
pub use outbox::Outbox;
pub use recording::{MediaDevice, RecordingController};
pub use session::InterviewCoordinator;
pub use settings::{InterviewSettings, SettingsStore};
pub use store::{
    begin_coding_stage, resolve_company_name, AppAction, AppState, AppStore, InterviewAction,
    InterviewStore,
};
pub use transport::{ConversationHandle, ConversationStatus, TransportAdapter};
pub use utils::logging::init_logging;
