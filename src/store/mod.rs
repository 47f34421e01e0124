pub mod app;
pub mod transition;

pub use app::{AppAction, AppState, AppStore};
pub use transition::{begin_coding_stage, resolve_company_name};

use tokio::sync::watch;

use crate::models::{InterviewStage, InterviewState};

#[derive(Debug, Clone)]
pub enum InterviewAction {
    SetStage(InterviewStage),
    SetBackgroundProgress { confidence: u8, transitioned: bool },
}

/// Process-wide interview state, owned by the application root rather than
/// ambient. Subscribers are only woken when a dispatch actually changes the
/// state.
pub struct InterviewStore {
    state: watch::Sender<InterviewState>,
}

impl InterviewStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(InterviewState::default());
        Self { state }
    }

    pub fn state(&self) -> InterviewState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<InterviewState> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: InterviewAction) {
        self.state.send_if_modified(|state| {
            let next = reduce(*state, &action);
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

impl Default for InterviewStore {
    fn default() -> Self {
        Self::new()
    }
}

fn reduce(mut state: InterviewState, action: &InterviewAction) -> InterviewState {
    match action {
        InterviewAction::SetStage(stage) => {
            state.stage = *stage;
        }
        InterviewAction::SetBackgroundProgress {
            confidence,
            transitioned,
        } => {
            state.background.confidence = (*confidence).min(100);
            state.background.transitioned = *transitioned;
        }
    }
    state
}
