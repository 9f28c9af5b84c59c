use crate::types::SessionState;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone)]
pub struct StateManager {
    state: Arc<RwLock<SessionState>>,
}

impl StateManager {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::Connecting)),
        }
    }

    pub fn get(&self) -> SessionState {
        *self.state.read()
    }

    pub fn set(&self, new_state: SessionState) {
        let mut state = self.state.write();
        if *state != new_state {
            tracing::info!("State changed: {:?} -> {:?}", *state, new_state);
            *state = new_state;
        }
    }

    pub fn allows_actions(&self) -> bool {
        self.get().allows_actions()
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_only_while_spawned() {
        let state = StateManager::new();
        assert!(!state.allows_actions());
        state.set(SessionState::Spawned);
        assert!(state.clone().allows_actions());
        state.set(SessionState::Disconnected);
        assert!(!state.allows_actions());
    }
}
