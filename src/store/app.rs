use tokio::sync::watch;

use crate::models::CompanyContext;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub company: Option<CompanyContext>,
    pub coding_forced: bool,
}

#[derive(Debug, Clone)]
pub enum AppAction {
    SetCompanyContext(CompanyContext),
    ForceCoding,
}

/// Application-level dispatch surface. Holds the company context shown in the
/// coding UI and the flag that forces the IDE open.
pub struct AppStore {
    state: watch::Sender<AppState>,
}

impl AppStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self { state }
    }

    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: AppAction) {
        self.state.send_if_modified(|state| match action {
            AppAction::SetCompanyContext(ref context) => {
                if state.company.as_ref() == Some(context) {
                    false
                } else {
                    state.company = Some(context.clone());
                    true
                }
            }
            AppAction::ForceCoding => {
                if state.coding_forced {
                    false
                } else {
                    state.coding_forced = true;
                    true
                }
            }
        });
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}
