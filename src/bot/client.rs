use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bot::connection::Connection;
use crate::logging::print_mc_chat;
use crate::state::StateManager;
use crate::types::{BotEvent, Movements, SessionState};

pub const GREETING: &str = "Hello, I am a Mineros bot!";

/// Owns the session lifecycle: waits for spawn, applies the movement rules
/// and keeps logging session events afterwards.
pub struct BotClient {
    conn: Arc<dyn Connection>,
    state: StateManager,
    movements: Movements,
    /// Log connection errors at debug level only
    hide_errors: bool,
}

impl BotClient {
    pub fn new(
        conn: Arc<dyn Connection>,
        state: StateManager,
        movements: Movements,
        hide_errors: bool,
    ) -> Self {
        Self {
            conn,
            state,
            movements,
            hide_errors,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Handle events until the bot has spawned
    pub async fn wait_for_spawn(&self) -> Result<()> {
        info!("Waiting for {} to spawn", self.conn.username());
        while let Some(event) = self.conn.next_event().await {
            let spawned = event == BotEvent::Spawn;
            if !self.handle_event(event) {
                return Err(anyhow!("Session ended before the bot spawned"));
            }
            if spawned {
                return Ok(());
            }
        }
        self.state.set(SessionState::Disconnected);
        Err(anyhow!("Connection closed before the bot spawned"))
    }

    /// Apply one event. Returns false once the session is over.
    pub fn handle_event(&self, event: BotEvent) -> bool {
        match event {
            BotEvent::Spawn => {
                self.conn.navigator().set_movements(&self.movements);
                self.state.set(SessionState::Spawned);
                info!("Bot has spawned as {}", self.conn.username());
                self.conn.chat(GREETING);
                true
            }
            BotEvent::Chat { username, message } => {
                if username != self.conn.username() {
                    print_mc_chat(&username, &message);
                }
                true
            }
            BotEvent::Kicked(reason) => {
                warn!("Bot was kicked: {}", reason);
                self.state.set(SessionState::Disconnected);
                false
            }
            BotEvent::Error(e) => {
                if self.hide_errors {
                    debug!("Connection error: {}", e);
                } else {
                    error!("Connection error: {}", e);
                }
                true
            }
            BotEvent::End => {
                info!("Connection ended");
                self.state.set(SessionState::Disconnected);
                false
            }
        }
    }

    /// Keep handling events in the background until the session ends
    pub fn spawn_event_loop(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = self.conn.next_event().await {
                if !self.handle_event(event) {
                    break;
                }
            }
            self.state.set(SessionState::Disconnected);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::GameData;
    use crate::sim::SimConnection;

    fn client(sim: &Arc<SimConnection>, movements: Movements) -> BotClient {
        BotClient::new(sim.clone(), StateManager::new(), movements, false)
    }

    #[tokio::test]
    async fn test_spawn_applies_movements_and_greets() {
        let sim = Arc::new(SimConnection::new("Bot", Arc::new(GameData::builtin().unwrap())));
        let movements = Movements {
            allow_1by1_towers: true,
            scaffolding_blocks: vec!["dirt".into()],
            ..Movements::default()
        };
        let client = client(&sim, movements.clone());
        assert_eq!(client.state(), SessionState::Connecting);

        client.wait_for_spawn().await.unwrap();
        assert_eq!(client.state(), SessionState::Spawned);
        assert_eq!(sim.movements(), movements);
        assert_eq!(sim.chat_log(), vec![GREETING.to_string()]);
    }

    #[tokio::test]
    async fn test_kick_ends_session() {
        let sim = Arc::new(SimConnection::new("Bot", Arc::new(GameData::builtin().unwrap())));
        let client = Arc::new(client(&sim, Movements::default()));
        client.wait_for_spawn().await.unwrap();

        sim.push_event(BotEvent::Chat {
            username: "Steve".into(),
            message: "§ahi there".into(),
        });
        sim.push_event(BotEvent::Error("connection reset".into()));
        sim.push_event(BotEvent::Kicked("flying is not enabled".into()));
        client.clone().spawn_event_loop().await.unwrap();
        assert_eq!(client.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_end_marks_disconnected() {
        let sim = Arc::new(SimConnection::new("Bot", Arc::new(GameData::builtin().unwrap())));
        let client = client(&sim, Movements::default());
        assert!(client.handle_event(BotEvent::Error("bad packet".into())));
        assert!(!client.handle_event(BotEvent::End));
        assert_eq!(client.state(), SessionState::Disconnected);
    }
}
