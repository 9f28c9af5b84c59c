use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::bot::connection::{Connection, FurnaceWindow, Navigator};
use crate::error::ConnectionError;
use crate::game_data::GameData;
use crate::sim::furnace::{SimFurnaceWindow, DEFAULT_COOK_TIME};
use crate::sim::world::{SimCall, SimWorld};
use crate::types::{
    Block, BlockPos, BotEvent, CraftingStation, Entity, Goal, ItemStack, Movements, Player,
    Recipe, Vec3,
};

/// Navigator over the sandbox world: every reachable goal is reached at once
pub struct SimNavigator {
    world: Arc<Mutex<SimWorld>>,
}

#[async_trait]
impl Navigator for SimNavigator {
    fn set_movements(&self, movements: &Movements) {
        self.world.lock().movements = movements.clone();
    }

    fn set_goal(&self, goal: Option<Goal>, _dynamic: bool) {
        let mut world = self.world.lock();
        world.record(SimCall::SetGoal(goal.clone()));
        if let Some(target) = goal.as_ref().and_then(|g| world.destination(g)) {
            if !world.navigation_fails {
                world.move_to(target);
            }
        }
        world.goal = goal;
    }

    async fn goto(&self, goal: Goal) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        world.record(SimCall::Goto(goal.clone()));
        if world.navigation_fails {
            return Err(ConnectionError::PathNotFound(format!("{:?}", goal)));
        }
        let target = world
            .destination(&goal)
            .ok_or_else(|| ConnectionError::PathNotFound(format!("{:?}", goal)))?;
        world.move_to(target);
        world.goal = None;
        Ok(())
    }
}

/// In-memory `Connection` used offline and by the tests
pub struct SimConnection {
    world: Arc<Mutex<SimWorld>>,
    navigator: SimNavigator,
    version: String,
    cook_time: Duration,
    event_tx: mpsc::UnboundedSender<BotEvent>,
    event_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<BotEvent>>,
}

impl SimConnection {
    /// A fresh flat world with the bot standing at the origin; a spawn event
    /// is queued right away
    pub fn new(username: &str, game_data: Arc<GameData>) -> Self {
        let version = game_data.version().to_string();
        let world = Arc::new(Mutex::new(SimWorld::new(username, game_data)));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let _ = event_tx.send(BotEvent::Spawn);
        Self {
            navigator: SimNavigator {
                world: world.clone(),
            },
            world,
            version,
            cook_time: DEFAULT_COOK_TIME,
            event_tx,
            event_rx: tokio::sync::Mutex::new(event_rx),
        }
    }

    /// A small scene for the offline binary: a three-log oak tree, a furnace,
    /// some iron ore, a zombie and a second player
    pub fn demo(username: &str, game_data: Arc<GameData>) -> Self {
        let sim = Self::new(username, game_data);
        for y in 64..67 {
            sim.with_block("oak_log", BlockPos::new(6, y, 2));
        }
        sim.with_block("oak_leaves", BlockPos::new(6, 67, 2));
        sim.with_block("furnace", BlockPos::new(-4, 64, 3));
        sim.with_block("iron_ore", BlockPos::new(-6, 62, -6));
        sim.with_item("coal", 4);
        sim.with_item("raw_iron", 3);
        sim.with_entity("zombie", Vec3::new(10.5, 64.0, -8.5));
        sim.with_player("Steve", Some(Vec3::new(-2.5, 64.0, -2.5)));
        sim
    }

    pub fn with_cook_time(mut self, cook_time: Duration) -> Self {
        self.cook_time = cook_time;
        self
    }

    pub fn with_block(&self, name: &str, pos: BlockPos) -> &Self {
        self.world.lock().set_block(name, pos);
        self
    }

    pub fn with_item(&self, name: &str, count: u32) -> &Self {
        let mut world = self.world.lock();
        if let Some(kind) = world.game_data.item_by_name(name).map(|i| i.id) {
            world.add_item(kind, count);
        }
        self
    }

    pub fn with_entity(&self, name: &str, position: Vec3) -> u32 {
        self.world.lock().spawn_entity(name, position, None)
    }

    pub fn with_player(&self, username: &str, position: Option<Vec3>) -> Option<u32> {
        self.world.lock().add_player(username, position)
    }

    pub fn with_dropped_item(&self, name: &str, count: u32, position: Vec3) -> Option<u32> {
        let mut world = self.world.lock();
        let kind = world.game_data.item_by_name(name)?.id;
        Some(world.drop_item(kind, count, position))
    }

    /// Preload a furnace's fuel slot and light it
    pub fn with_lit_furnace(&self, pos: BlockPos, fuel: &str, count: u32) -> &Self {
        let mut world = self.world.lock();
        world.set_block("furnace", pos);
        let Some(kind) = world.game_data.item_by_name(fuel).map(|i| i.id) else {
            return self;
        };
        let burn = self.cook_time * 8;
        let state = world.furnaces.entry(pos).or_default();
        state.fuel = Some((kind, count));
        state.burn_total = burn;
        state.burn_until = Some(tokio::time::Instant::now() + burn);
        self
    }

    pub fn teleport(&self, position: Vec3) {
        self.world.lock().move_to(position);
    }

    pub fn set_navigation_fails(&self, fails: bool) {
        self.world.lock().navigation_fails = fails;
    }

    pub fn set_reject_furnace_deposits(&self, reject: bool) {
        self.world.lock().reject_furnace_deposits = reject;
    }

    pub fn push_event(&self, event: BotEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn calls(&self) -> Vec<SimCall> {
        self.world.lock().calls.clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&SimCall) -> bool) -> usize {
        self.world.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn chat_log(&self) -> Vec<String> {
        self.world.lock().chat_log.clone()
    }

    pub fn item_count(&self, name: &str) -> u32 {
        let world = self.world.lock();
        world
            .game_data
            .item_by_name(name)
            .map(|i| world.count(i.id))
            .unwrap_or(0)
    }

    pub fn movements(&self) -> Movements {
        self.world.lock().movements.clone()
    }

    pub fn current_goal(&self) -> Option<Goal> {
        self.world.lock().goal.clone()
    }
}

#[async_trait]
impl Connection for SimConnection {
    fn username(&self) -> String {
        self.world.lock().username.clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn position(&self) -> Vec3 {
        self.world.lock().position
    }

    fn chat(&self, message: &str) {
        let mut world = self.world.lock();
        debug!("[Chat] <{}> {}", world.username, message);
        world.chat_log.push(message.to_string());
    }

    fn inventory(&self) -> Vec<ItemStack> {
        self.world.lock().inventory()
    }

    fn held_item(&self) -> Option<ItemStack> {
        self.world.lock().held_item()
    }

    fn block_at(&self, pos: BlockPos) -> Option<Block> {
        let mut world = self.world.lock();
        world.record(SimCall::BlockAt(pos));
        world.block_at(pos)
    }

    fn find_blocks(&self, kind: u32, max_distance: f64, count: usize) -> Vec<BlockPos> {
        let mut world = self.world.lock();
        world.record(SimCall::FindBlocks { kind });
        world.find_blocks(kind, max_distance, count)
    }

    fn entities(&self) -> Vec<Entity> {
        self.world.lock().entities()
    }

    fn players(&self) -> Vec<Player> {
        self.world
            .lock()
            .players()
            .into_iter()
            .map(|(username, entity)| Player { username, entity })
            .collect()
    }

    async fn equip(&self, item: &ItemStack) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        world.record(SimCall::Equip { kind: item.kind });
        let slot = world
            .inventory()
            .into_iter()
            .find(|s| s.kind == item.kind)
            .map(|s| s.slot)
            .ok_or_else(|| ConnectionError::Rejected(format!("{} not in inventory", item.name)))?;
        world.equip_slot(slot);
        Ok(())
    }

    async fn equip_for_block(&self, block: &Block) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        if let Some(slot) = world.best_tool_slot(block) {
            world.equip_slot(slot);
        }
        Ok(())
    }

    fn can_dig_block(&self, block: &Block) -> bool {
        let world = self.world.lock();
        !block.is_air() && block.name != "bedrock" && world.in_reach(block.position)
    }

    async fn dig(&self, block: &Block) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        world.record(SimCall::Dig(block.position));
        let current = world
            .block_at(block.position)
            .ok_or_else(|| ConnectionError::Rejected("chunk not loaded".into()))?;
        if current.is_air() || current.kind != block.kind {
            return Err(ConnectionError::Rejected("block changed before digging".into()));
        }
        if !world.in_reach(block.position) {
            return Err(ConnectionError::Rejected("block out of reach".into()));
        }

        let held = world.held_item().map(|i| i.kind);
        let drops = world
            .game_data
            .block(current.kind)
            .map(|info| info.drops.clone())
            .unwrap_or_default();
        world.set_block("air", block.position);
        if current.can_harvest(held) {
            for kind in drops {
                world.drop_item(kind, 1, block.position.center().offset(0.0, -0.5, 0.0));
            }
        }
        Ok(())
    }

    async fn place_block(&self, reference: &Block, face: BlockPos) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        let target = reference
            .position
            .plus(face)
            .ok_or_else(|| ConnectionError::Rejected("target outside the world".into()))?;
        let held = world
            .held_item()
            .ok_or_else(|| ConnectionError::Rejected("nothing in hand".into()))?;
        world.record(SimCall::Place {
            target,
            kind: held.kind,
        });
        if world.game_data.block_by_name(&held.name).is_none() {
            return Err(ConnectionError::Rejected(format!("{} is not a block", held.name)));
        }
        if !world.block_at(target).map(|b| b.is_air()).unwrap_or(false) {
            return Err(ConnectionError::Rejected("target is occupied".into()));
        }
        if !world.in_reach(target) {
            return Err(ConnectionError::Rejected("target out of reach".into()));
        }
        world.remove_item(held.kind, 1);
        world.set_block(&held.name, target);
        Ok(())
    }

    async fn look_at(&self, _point: Vec3) -> Result<(), ConnectionError> {
        self.world.lock().record(SimCall::LookAt);
        Ok(())
    }

    async fn attack(&self, entity: &Entity) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        world.record(SimCall::Attack(entity.id));
        match world.entity(entity.id) {
            Some(_) => Ok(()),
            None => Err(ConnectionError::Rejected("entity is gone".into())),
        }
    }

    fn recipes_for(&self, item: u32, station: CraftingStation<'_>) -> Vec<Recipe> {
        let world = self.world.lock();
        world
            .recipes(item, station)
            .into_iter()
            .filter(|r| world.has_ingredients(r, 1))
            .collect()
    }

    fn recipes_all(&self, item: u32, station: CraftingStation<'_>) -> Vec<Recipe> {
        self.world.lock().recipes(item, station)
    }

    async fn craft(
        &self,
        recipe: &Recipe,
        count: u32,
        table: Option<&Block>,
    ) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        world.record(SimCall::Craft {
            result: recipe.result,
            count,
        });
        match table {
            Some(table) => {
                let is_table = world
                    .block_at(table.position)
                    .map(|b| b.name == "crafting_table")
                    .unwrap_or(false);
                if !is_table || !world.in_reach(table.position) {
                    return Err(ConnectionError::Rejected("no crafting table in reach".into()));
                }
            }
            None if recipe.requires_table => {
                return Err(ConnectionError::Rejected("recipe requires a crafting table".into()));
            }
            None => {}
        }
        if !world.has_ingredients(recipe, count) {
            return Err(ConnectionError::Rejected("missing ingredients".into()));
        }
        for (kind, per_craft) in &recipe.ingredients {
            world.remove_item(*kind, per_craft * count);
        }
        world.add_item(recipe.result, recipe.result_count * count);
        Ok(())
    }

    async fn open_furnace(&self, block: &Block) -> Result<Box<dyn FurnaceWindow>, ConnectionError> {
        let mut world = self.world.lock();
        world.record(SimCall::OpenFurnace(block.position));
        let is_furnace = world
            .block_at(block.position)
            .map(|b| b.name == "furnace")
            .unwrap_or(false);
        if !is_furnace {
            return Err(ConnectionError::Rejected("not a furnace".into()));
        }
        if !world.in_reach(block.position) {
            return Err(ConnectionError::Rejected("furnace out of reach".into()));
        }
        world.furnaces.entry(block.position).or_default();
        Ok(Box::new(SimFurnaceWindow::new(
            self.world.clone(),
            block.position,
            self.cook_time,
        )))
    }

    fn navigator(&self) -> &dyn Navigator {
        &self.navigator
    }

    async fn next_event(&self) -> Option<BotEvent> {
        let event = self.event_rx.lock().await.recv().await;
        if let Some(BotEvent::Spawn) = &event {
            info!("[Sim] {} spawned at {}", self.username(), self.position());
        }
        event
    }
}
