//! Permission gate: cached grants, one outstanding prompt at a time.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::permission::{Capability, PermissionBroker, PermissionState};

/// What the gate remembers between prompts.
#[derive(Debug, Default)]
struct Cached {
    state: PermissionState,
    granted: HashSet<Capability>,
    /// Completed prompt round-trips.
    rounds: u64,
    /// A prompt is outstanding.
    in_flight: bool,
    /// Capabilities asked for in the most recent round.
    last_asked: Vec<Capability>,
}

/// Tracks whether the process may write published output.
pub struct PermissionGate {
    broker: Arc<dyn PermissionBroker>,
    cached: RwLock<Cached>,
    prompt: Mutex<()>,
}

impl PermissionGate {
    pub fn new(broker: Arc<dyn PermissionBroker>) -> Self {
        Self {
            broker,
            cached: RwLock::new(Cached::default()),
            prompt: Mutex::new(()),
        }
    }

    /// Most recent permission state.
    pub async fn state(&self) -> PermissionState {
        self.cached.read().await.state
    }

    /// Make sure `capabilities` are held, prompting at most once.
    ///
    /// Returns immediately when every capability was already granted (or the
    /// host has no permission concept). A caller arriving while a prompt is
    /// outstanding waits for it and reuses its answer.
    pub async fn ensure(&self, capabilities: &[Capability]) -> PermissionState {
        // Round of the prompt outstanding on arrival, if any.
        let joined_round = {
            let cached = self.cached.read().await;
            if let Some(state) = Self::already_held(&cached, capabilities) {
                return state;
            }
            cached.in_flight.then_some(cached.rounds)
        };

        let _prompt = self.prompt.lock().await;

        {
            let mut cached = self.cached.write().await;
            if let Some(state) = Self::already_held(&cached, capabilities) {
                return state;
            }
            let covered = capabilities.iter().all(|c| cached.last_asked.contains(c));
            if joined_round.is_some_and(|round| cached.rounds > round) && covered {
                tracing::debug!("Reusing answer of concurrent permission prompt: {}", cached.state);
                return cached.state;
            }
            cached.in_flight = true;
        }

        tracing::debug!("Requesting capabilities: {:?}", capabilities);
        let state = self.broker.request(capabilities).await;
        tracing::info!("Permission {}", state);

        let mut cached = self.cached.write().await;
        cached.state = state;
        cached.rounds += 1;
        cached.in_flight = false;
        cached.last_asked = capabilities.to_vec();
        if state == PermissionState::Granted {
            cached.granted.extend(capabilities.iter().copied());
        }

        state
    }

    fn already_held(cached: &Cached, capabilities: &[Capability]) -> Option<PermissionState> {
        match cached.state {
            PermissionState::Unavailable => Some(PermissionState::Unavailable),
            _ if capabilities.iter().all(|c| cached.granted.contains(c)) && cached.rounds > 0 => {
                Some(PermissionState::Granted)
            }
            _ => None,
        }
    }
}
