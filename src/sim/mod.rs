//! Sandbox connection
//!
//! A self-contained world implementing `Connection`: blocks, inventory,
//! entities, recipes and furnaces backed by the game-data table. It records
//! every call so tests can assert on what an action did.

pub mod connection;
pub mod furnace;
pub mod world;

pub use connection::{SimConnection, SimNavigator};
pub use furnace::{FurnaceState, SimFurnaceWindow};
pub use world::{SimCall, SimWorld};
