pub mod client;
pub mod connection;
pub mod context;

pub use client::BotClient;
pub use connection::{Connection, FurnaceWindow, Navigator};
pub use context::{ActionSettings, BotContext};
