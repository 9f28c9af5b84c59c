use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::bot::ActionSettings;
use crate::types::Movements;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Empty means "ask on startup"
    #[serde(default = "default_username")]
    pub username: String,

    /// Protocol version; unset lets the server decide
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub auth: AuthMode,

    /// Log connection errors at debug level only
    #[serde(default)]
    pub hide_errors: bool,

    #[serde(default)]
    pub interface: Interface,

    /// Game-data JSON to use instead of the built-in table
    #[serde(default)]
    pub game_data_path: Option<PathBuf>,

    #[serde(default)]
    pub movement: Movements,

    #[serde(default)]
    pub timings: Timings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Offline,
    Microsoft,
}

/// What the binary does once the bot has spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interface {
    /// Interactive console menu
    #[default]
    Menu,
    /// JSON requests on stdin, responses on stdout
    Service,
    /// Run the wooden pickaxe task once and exit
    CraftWoodenPickaxe,
    /// Stay connected and log events until Ctrl-C
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub drop_settle_ms: u64,
    pub follow_ms: u64,
    pub furnace_poll_ms: u64,
    pub furnace_timeout_secs: u64,
    pub pickup_radius: f64,
}

impl Default for Timings {
    fn default() -> Self {
        let settings = ActionSettings::default();
        Self {
            drop_settle_ms: settings.drop_settle.as_millis() as u64,
            follow_ms: settings.follow_duration.as_millis() as u64,
            furnace_poll_ms: settings.furnace_poll_interval.as_millis() as u64,
            furnace_timeout_secs: settings.furnace_timeout.as_secs(),
            pickup_radius: settings.pickup_radius,
        }
    }
}

impl Timings {
    pub fn to_settings(&self) -> ActionSettings {
        ActionSettings {
            drop_settle: Duration::from_millis(self.drop_settle_ms),
            follow_duration: Duration::from_millis(self.follow_ms),
            furnace_poll_interval: Duration::from_millis(self.furnace_poll_ms.max(1)),
            furnace_timeout: Duration::from_secs(self.furnace_timeout_secs),
            pickup_radius: self.pickup_radius,
        }
    }
}

// Default values
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    25565
}

fn default_username() -> String {
    "ExampleBot".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            version: None,
            auth: AuthMode::default(),
            hide_errors: false,
            interface: Interface::default(),
            game_data_path: None,
            movement: Movements::default(),
            timings: Timings::default(),
        }
    }
}

impl Config {
    /// `host:port` as used for connecting
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn needs_username(&self) -> bool {
        self.username.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            host = "mc.example.net"
            interface = "craft_wooden_pickaxe"

            [timings]
            furnace_timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.address(), "mc.example.net:25565");
        assert_eq!(config.interface, Interface::CraftWoodenPickaxe);
        assert_eq!(config.auth, AuthMode::Offline);
        assert_eq!(config.username, "ExampleBot");
        assert_eq!(config.timings.furnace_timeout_secs, 30);
        assert_eq!(config.timings.follow_ms, 5000);
        assert!(config.movement.can_dig);
    }

    #[test]
    fn test_timings_convert_to_settings() {
        assert_eq!(Timings::default().to_settings(), ActionSettings::default());
    }
}
