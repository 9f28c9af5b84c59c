//! Mineros
//!
//! High-level actions for a Minecraft bot (movement, block finding, mining,
//! crafting, placement, furnaces, combat) over an injected connection, plus a
//! wooden-pickaxe task built from them and two front ends: an interactive
//! menu and a JSON-lines service.

pub mod actions;
pub mod bot;
pub mod config;
pub mod console;
pub mod error;
pub mod game_data;
pub mod inventory;
pub mod logging;
pub mod service;
pub mod sim;
pub mod state;
pub mod types;
pub mod utils;
pub mod workflows;

pub use bot::{BotClient, BotContext, Connection};
pub use error::{ActionError, ActionResult, ConnectionError};
pub use game_data::GameData;
pub use types::{BlockPos, BotEvent, SessionState, Vec3};
