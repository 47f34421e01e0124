use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::InterviewStage;
use crate::store::InterviewStore;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_info;

const DEBUG_ENV_FLAG: &str = "INTERVOX_DEBUG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeSnapshot {
    pub stage: InterviewStage,
    pub confidence: u8,
    pub transitioned: bool,
}

/// Read-only mirror of the interview store for the on-screen debug badge.
/// Never dispatches; only exists when INTERVOX_DEBUG is set.
pub struct DebugBadge {
    snapshot: Arc<Mutex<BadgeSnapshot>>,
    cancel_token: CancellationToken,
    _handle: JoinHandle<()>,
}

impl DebugBadge {
    pub fn spawn(store: &InterviewStore) -> Option<DebugBadge> {
        if !debug_badge_enabled() {
            return None;
        }
        Some(Self::spawn_unconditionally(store))
    }

    fn spawn_unconditionally(store: &InterviewStore) -> DebugBadge {
        let state = store.state();
        let snapshot = Arc::new(Mutex::new(BadgeSnapshot {
            stage: state.stage,
            confidence: state.background.confidence,
            transitioned: state.background.transitioned,
        }));
        let cancel_token = CancellationToken::new();

        let mut rx = store.subscribe();
        let mirror = Arc::clone(&snapshot);
        let token = cancel_token.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = *rx.borrow_and_update();
                        *mirror.lock().unwrap() = BadgeSnapshot {
                            stage: state.stage,
                            confidence: state.background.confidence,
                            transitioned: state.background.transitioned,
                        };
                    }
                    _ = token.cancelled() => {
                        log_info!("debug badge shutting down");
                        break;
                    }
                }
            }
        });

        DebugBadge {
            snapshot,
            cancel_token,
            _handle: handle,
        }
    }

    pub fn snapshot(&self) -> BadgeSnapshot {
        *self.snapshot.lock().unwrap()
    }
}

impl Drop for DebugBadge {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

fn debug_badge_enabled() -> bool {
    std::env::var(DEBUG_ENV_FLAG)
        .map(|value| is_truthy(&value))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
