use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InterviewStage {
    Background,
    Coding,
    Completed,
}

impl Default for InterviewStage {
    fn default() -> Self {
        InterviewStage::Background
    }
}

impl InterviewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStage::Background => "Background",
            InterviewStage::Coding => "Coding",
            InterviewStage::Completed => "Completed",
        }
    }
}

/// Confidence (0-100) accumulated by the conversation-analysis side while the
/// candidate answers the background question. Only observed here.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundProgress {
    pub confidence: u8,
    pub transitioned: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewState {
    pub stage: InterviewStage,
    pub background: BackgroundProgress,
}
