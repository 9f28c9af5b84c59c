//! The connection handle consumed by every action
//!
//! A live server session (world cache, entity list, inventory, pathfinder)
//! implements these traits. Nothing in this crate speaks the protocol itself;
//! `crate::sim::SimConnection` is the in-memory implementation used by the
//! binary and the tests.

use async_trait::async_trait;

use crate::error::ConnectionError;
use crate::types::{
    Block, BlockPos, BotEvent, CraftingStation, Entity, Goal, ItemStack, Movements, Player,
    Recipe, Vec3,
};

/// Pathfinding sub-interface of the connection
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Movement rules used for every following path search
    fn set_movements(&self, movements: &Movements);

    /// Replace the current goal; `dynamic` goals keep being re-evaluated
    /// (e.g. following a moving entity). `None` clears it.
    fn set_goal(&self, goal: Option<Goal>, dynamic: bool);

    /// Walk to `goal`, resolving once it is reached
    async fn goto(&self, goal: Goal) -> Result<(), ConnectionError>;
}

/// An open furnace container (input, fuel and output slots)
#[async_trait]
pub trait FurnaceWindow: Send + Sync {
    /// Remaining burn time of the current fuel unit, 0.0..=1.0
    fn fuel(&self) -> f32;

    /// Cook progress of the current input item, 0.0..=1.0
    fn progress(&self) -> f32;

    fn input_item(&self) -> Option<ItemStack>;
    fn fuel_item(&self) -> Option<ItemStack>;
    fn output_item(&self) -> Option<ItemStack>;

    /// Move `count` items of `kind` from the inventory into the fuel slot
    async fn put_fuel(&self, kind: u32, count: u32) -> Result<(), ConnectionError>;

    /// Move `count` items of `kind` from the inventory into the input slot
    async fn put_input(&self, kind: u32, count: u32) -> Result<(), ConnectionError>;

    /// Move the output stack into the inventory
    async fn take_output(&self) -> Result<ItemStack, ConnectionError>;

    /// Close the container on the server
    fn close(&self);
}

/// A live session with a server
#[async_trait]
pub trait Connection: Send + Sync {
    fn username(&self) -> String;

    /// Protocol version string reported by the server (e.g. "1.20.4")
    fn version(&self) -> String;

    fn position(&self) -> Vec3;

    /// Send a chat message
    fn chat(&self, message: &str);

    /// Current inventory contents, main slots only
    fn inventory(&self) -> Vec<ItemStack>;

    fn held_item(&self) -> Option<ItemStack>;

    /// Block at `pos`, `None` when the chunk is not loaded
    fn block_at(&self, pos: BlockPos) -> Option<Block>;

    /// Up to `count` positions of blocks of `kind`, nearest first
    fn find_blocks(&self, kind: u32, max_distance: f64, count: usize) -> Vec<BlockPos>;

    fn entities(&self) -> Vec<Entity>;

    fn players(&self) -> Vec<Player>;

    fn player(&self, username: &str) -> Option<Player> {
        self.players().into_iter().find(|p| p.username == username)
    }

    /// Put `item` in the main hand
    async fn equip(&self, item: &ItemStack) -> Result<(), ConnectionError>;

    /// Equip the best tool in the inventory for mining `block`
    async fn equip_for_block(&self, block: &Block) -> Result<(), ConnectionError>;

    /// Whether `block` is diggable and within reach right now
    fn can_dig_block(&self, block: &Block) -> bool;

    async fn dig(&self, block: &Block) -> Result<(), ConnectionError>;

    /// Place the held block against `reference` on the side `face` points to
    async fn place_block(&self, reference: &Block, face: BlockPos) -> Result<(), ConnectionError>;

    async fn look_at(&self, point: Vec3) -> Result<(), ConnectionError>;

    async fn attack(&self, entity: &Entity) -> Result<(), ConnectionError>;

    /// Recipes for `item` craftable right now with the inventory contents
    fn recipes_for(&self, item: u32, station: CraftingStation<'_>) -> Vec<Recipe>;

    /// Every recipe for `item` usable at `station`, regardless of ingredients
    fn recipes_all(&self, item: u32, station: CraftingStation<'_>) -> Vec<Recipe>;

    /// Apply `recipe` `count` times
    async fn craft(
        &self,
        recipe: &Recipe,
        count: u32,
        table: Option<&Block>,
    ) -> Result<(), ConnectionError>;

    async fn open_furnace(&self, block: &Block) -> Result<Box<dyn FurnaceWindow>, ConnectionError>;

    fn navigator(&self) -> &dyn Navigator;

    /// Next session event; `None` once the connection is gone
    async fn next_event(&self) -> Option<BotEvent>;
}
