//! In-memory world state behind `SimConnection`
//!
//! The terrain is a flat grass plane at y=63 with everything placed or mined
//! by hand stored as overrides. Only overrides are indexed by `find_blocks`.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::game_data::GameData;
use crate::sim::furnace::FurnaceState;
use crate::types::{Block, BlockPos, CraftingStation, Entity, Goal, ItemStack, Movements, Recipe, Vec3};

pub const INVENTORY_SLOTS: usize = 36;
const GROUND_Y: i32 = 63;
const MIN_Y: i32 = -64;
const MAX_Y: i32 = 320;
/// Interaction reach for digging, placing and opening containers
pub const REACH: f64 = 5.0;
/// Items closer than this are picked up automatically
const PICKUP_DISTANCE: f64 = 1.5;
pub const BOT_ENTITY_ID: u32 = 0;

/// A call made on the sandbox connection, recorded in order
#[derive(Debug, Clone, PartialEq)]
pub enum SimCall {
    BlockAt(BlockPos),
    FindBlocks { kind: u32 },
    Goto(Goal),
    SetGoal(Option<Goal>),
    Equip { kind: u32 },
    Dig(BlockPos),
    Place { target: BlockPos, kind: u32 },
    LookAt,
    Attack(u32),
    Craft { result: u32, count: u32 },
    OpenFurnace(BlockPos),
    PutFuel { kind: u32, count: u32 },
    PutInput { kind: u32, count: u32 },
    TakeOutput,
    CloseFurnace(BlockPos),
}

pub struct SimWorld {
    pub(crate) game_data: Arc<GameData>,
    pub(crate) username: String,
    pub(crate) position: Vec3,
    overrides: HashMap<BlockPos, Block>,
    inventory: Vec<Option<ItemStack>>,
    held_slot: Option<usize>,
    entities: HashMap<u32, Entity>,
    /// item entity id -> (item kind, count)
    dropped: HashMap<u32, (u32, u32)>,
    /// (username, entity id while in view)
    players: Vec<(String, Option<u32>)>,
    next_entity_id: u32,
    pub(crate) furnaces: HashMap<BlockPos, FurnaceState>,
    pub(crate) goal: Option<Goal>,
    pub(crate) movements: Movements,
    pub(crate) navigation_fails: bool,
    pub(crate) reject_furnace_deposits: bool,
    pub(crate) calls: Vec<SimCall>,
    pub(crate) chat_log: Vec<String>,
}

impl SimWorld {
    pub fn new(username: &str, game_data: Arc<GameData>) -> Self {
        Self {
            game_data,
            username: username.to_string(),
            position: Vec3::new(0.5, GROUND_Y as f64 + 1.0, 0.5),
            overrides: HashMap::new(),
            inventory: vec![None; INVENTORY_SLOTS],
            held_slot: None,
            entities: HashMap::new(),
            dropped: HashMap::new(),
            players: vec![(username.to_string(), Some(BOT_ENTITY_ID))],
            next_entity_id: BOT_ENTITY_ID + 1,
            furnaces: HashMap::new(),
            goal: None,
            movements: Movements::default(),
            navigation_fails: false,
            reject_furnace_deposits: false,
            calls: Vec::new(),
            chat_log: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, call: SimCall) {
        debug!("[Sim] {:?}", call);
        self.calls.push(call);
    }

    // ----- blocks -----

    fn terrain(&self, pos: BlockPos) -> &'static str {
        match pos.y {
            y if y < GROUND_Y => "dirt",
            y if y == GROUND_Y => "grass_block",
            _ => "air",
        }
    }

    pub fn block_at(&self, pos: BlockPos) -> Option<Block> {
        if pos.y < MIN_Y || pos.y >= MAX_Y {
            return None;
        }
        if let Some(block) = self.overrides.get(&pos) {
            return Some(block.clone());
        }
        self.game_data.make_block(self.terrain(pos), pos)
    }

    /// Put a block of kind `name` at `pos`; unknown names are ignored
    pub fn set_block(&mut self, name: &str, pos: BlockPos) -> bool {
        match self.game_data.make_block(name, pos) {
            Some(block) => {
                if block.name == "furnace" {
                    self.furnaces.entry(pos).or_default();
                } else {
                    self.furnaces.remove(&pos);
                }
                self.overrides.insert(pos, block);
                true
            }
            None => false,
        }
    }

    pub fn find_blocks(&self, kind: u32, max_distance: f64, count: usize) -> Vec<BlockPos> {
        let mut hits: Vec<(f64, BlockPos)> = self
            .overrides
            .values()
            .filter(|b| b.kind == kind)
            .map(|b| (b.position.center().distance_to(&self.position), b.position))
            .filter(|(distance, _)| *distance <= max_distance)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().take(count).map(|(_, pos)| pos).collect()
    }

    pub fn in_reach(&self, pos: BlockPos) -> bool {
        pos.center().distance_to(&self.position) <= REACH
    }

    // ----- inventory -----

    fn stack(&self, kind: u32, count: u32, slot: usize) -> Option<ItemStack> {
        self.game_data.item(kind).map(|info| ItemStack {
            kind,
            name: info.name.clone(),
            display_name: info.display_name.clone(),
            count,
            slot,
        })
    }

    pub fn inventory(&self) -> Vec<ItemStack> {
        self.inventory.iter().flatten().cloned().collect()
    }

    pub fn held_item(&self) -> Option<ItemStack> {
        self.held_slot.and_then(|slot| self.inventory[slot].clone())
    }

    pub fn count(&self, kind: u32) -> u32 {
        self.inventory
            .iter()
            .flatten()
            .filter(|s| s.kind == kind)
            .map(|s| s.count)
            .sum()
    }

    /// Add items, stacking onto existing slots first; returns how many fit
    pub fn add_item(&mut self, kind: u32, mut count: u32) -> u32 {
        let Some(info) = self.game_data.item(kind).cloned() else {
            return 0;
        };
        let requested = count;
        for stack in self.inventory.iter_mut().flatten() {
            if count == 0 {
                break;
            }
            if stack.kind == kind && stack.count < info.stack_size {
                let moved = count.min(info.stack_size - stack.count);
                stack.count += moved;
                count -= moved;
            }
        }
        while count > 0 {
            let Some(slot) = self.inventory.iter().position(|s| s.is_none()) else {
                break;
            };
            let moved = count.min(info.stack_size);
            self.inventory[slot] = self.stack(kind, moved, slot);
            count -= moved;
        }
        requested - count
    }

    /// Remove exactly `count` items of `kind`, or nothing at all
    pub fn remove_item(&mut self, kind: u32, mut count: u32) -> bool {
        if self.count(kind) < count {
            return false;
        }
        for slot in self.inventory.iter_mut() {
            if count == 0 {
                break;
            }
            if let Some(stack) = slot {
                if stack.kind == kind {
                    let taken = count.min(stack.count);
                    stack.count -= taken;
                    count -= taken;
                    if stack.count == 0 {
                        *slot = None;
                    }
                }
            }
        }
        if let Some(held) = self.held_slot {
            if self.inventory[held].is_none() {
                self.held_slot = None;
            }
        }
        true
    }

    pub fn equip_slot(&mut self, slot: usize) {
        self.held_slot = Some(slot);
    }

    /// Slot holding the best harvest tool for `block`, last listed wins
    pub fn best_tool_slot(&self, block: &Block) -> Option<usize> {
        let tools = block.harvest_tools.as_ref()?;
        tools
            .iter()
            .rev()
            .find_map(|tool| {
                self.inventory
                    .iter()
                    .flatten()
                    .find(|s| s.kind == *tool)
                    .map(|s| s.slot)
            })
    }

    // ----- entities -----

    pub fn spawn_entity(&mut self, name: &str, position: Vec3, username: Option<&str>) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        let height = match name {
            "item" => 0.25,
            "player" | "zombie" | "skeleton" => 1.8,
            _ => 1.0,
        };
        self.entities.insert(
            id,
            Entity {
                id,
                name: name.to_string(),
                username: username.map(str::to_string),
                position,
                height,
            },
        );
        id
    }

    pub fn add_player(&mut self, username: &str, position: Option<Vec3>) -> Option<u32> {
        let entity = position.map(|pos| self.spawn_entity("player", pos, Some(username)));
        self.players.push((username.to_string(), entity));
        entity
    }

    pub fn drop_item(&mut self, kind: u32, count: u32, position: Vec3) -> u32 {
        let id = self.spawn_entity("item", position, None);
        self.dropped.insert(id, (kind, count));
        id
    }

    pub fn entity(&self, id: u32) -> Option<Entity> {
        if id == BOT_ENTITY_ID {
            return Some(self.bot_entity());
        }
        self.entities.get(&id).cloned()
    }

    pub fn entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.entities.values().cloned().collect();
        entities.sort_by_key(|e| e.id);
        entities
    }

    pub fn bot_entity(&self) -> Entity {
        Entity {
            id: BOT_ENTITY_ID,
            name: "player".to_string(),
            username: Some(self.username.clone()),
            position: self.position,
            height: 1.8,
        }
    }

    pub fn players(&self) -> Vec<(String, Option<Entity>)> {
        self.players
            .iter()
            .map(|(name, id)| (name.clone(), id.and_then(|id| self.entity(id))))
            .collect()
    }

    // ----- movement -----

    /// Where standing satisfies `goal`, if it can be reached
    pub fn destination(&self, goal: &Goal) -> Option<Vec3> {
        match goal {
            Goal::Near { target, .. } => Some(*target),
            Goal::NearXZ { x, z, .. } => Some(Vec3::new(*x, self.position.y, *z)),
            Goal::LookAtBlock(pos) | Goal::PlaceBlock { target: pos, .. } => {
                Some(pos.to_vec3().offset(1.5, 0.0, 0.5))
            }
            Goal::Follow { entity, range } => self
                .entity(*entity)
                .map(|e| e.position.offset(range.max(1.0), 0.0, 0.0)),
        }
    }

    pub fn move_to(&mut self, position: Vec3) {
        self.position = position;
        self.pick_up_items();
    }

    fn pick_up_items(&mut self) {
        let near: Vec<u32> = self
            .entities
            .values()
            .filter(|e| e.name == "item" && e.position.distance_to(&self.position) <= PICKUP_DISTANCE)
            .map(|e| e.id)
            .collect();
        for id in near {
            self.entities.remove(&id);
            if let Some((kind, count)) = self.dropped.remove(&id) {
                self.add_item(kind, count);
            }
        }
    }

    // ----- crafting -----

    pub fn has_ingredients(&self, recipe: &Recipe, times: u32) -> bool {
        recipe
            .ingredients
            .iter()
            .all(|(kind, count)| self.count(*kind) >= count * times)
    }

    pub fn recipes(&self, item: u32, station: CraftingStation<'_>) -> Vec<Recipe> {
        self.game_data
            .recipes_for(item)
            .filter(|r| !r.requires_table || station.has_table())
            .cloned()
            .collect()
    }
}
