use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSession {
    /// Settable before recording starts so transcript/code events can be
    /// keyed to the session from the first turn.
    pub id: Option<String>,
    pub has_recording_permission: bool,
    pub has_microphone_permission: bool,
    pub is_recording: bool,
    pub recording_url: Option<String>,
    pub uploaded: bool,
}
