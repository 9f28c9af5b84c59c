use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bot::connection::Connection;
use crate::game_data::GameData;

/// Delays and limits used by the actions
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSettings {
    /// Pause after a dig so the drop can spawn
    pub drop_settle: Duration,
    /// How long `follow_player` keeps following before returning
    pub follow_duration: Duration,
    /// Furnace state poll interval while smelting
    pub furnace_poll_interval: Duration,
    /// Upper bound on the smelting wait
    pub furnace_timeout: Duration,
    /// Dropped items closer than this are walked to after mining
    pub pickup_radius: f64,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            drop_settle: Duration::from_millis(300),
            follow_duration: Duration::from_millis(5000),
            furnace_poll_interval: Duration::from_millis(1000),
            furnace_timeout: Duration::from_secs(120),
            pickup_radius: 10.0,
        }
    }
}

/// Everything an action needs: the connection, the game-data table for its
/// version, timings, and the shutdown token
#[derive(Clone)]
pub struct BotContext {
    conn: Arc<dyn Connection>,
    game_data: Arc<GameData>,
    settings: ActionSettings,
    cancel: CancellationToken,
}

impl BotContext {
    pub fn new(conn: Arc<dyn Connection>, game_data: Arc<GameData>, settings: ActionSettings) -> Self {
        Self {
            conn,
            game_data,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to abort long waits (e.g. on Ctrl-C)
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn conn(&self) -> &dyn Connection {
        self.conn.as_ref()
    }

    pub fn game_data(&self) -> &GameData {
        &self.game_data
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Status channel: in-game chat plus the local log
    pub fn say(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("[Bot] {}", message);
        self.conn.chat(message);
    }
}
