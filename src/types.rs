use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer block coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// `None` when any coordinate leaves the `i32` range
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    pub fn plus(&self, other: BlockPos) -> Option<Self> {
        self.offset(other.x, other.y, other.z)
    }

    /// Center of the block cell
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.x as f64 + 0.5,
            self.y as f64 + 0.5,
            self.z as f64 + 0.5,
        )
    }

    /// Corner coordinates as a float vector (what the chat reports use)
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Floating point position (entities, navigation targets)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn distance_to(&self, other: &Vec3) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn floored(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// An item stack as seen in an inventory or container slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind: u32,
    pub name: String,
    pub display_name: String,
    pub count: u32,
    pub slot: usize,
}

/// A block read from the world cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub position: BlockPos,
    pub kind: u32,
    pub name: String,
    pub display_name: String,
    /// Item kinds able to harvest this block; `None` means anything (or nothing) works
    pub harvest_tools: Option<Vec<u32>>,
}

impl Block {
    pub fn is_air(&self) -> bool {
        matches!(self.name.as_str(), "air" | "cave_air" | "void_air")
    }

    /// Whether mining with `held` (an item kind, or bare hand) yields a drop
    pub fn can_harvest(&self, held: Option<u32>) -> bool {
        match (&self.harvest_tools, held) {
            (None, _) => true,
            (Some(tools), Some(kind)) => tools.contains(&kind),
            (Some(_), None) => false,
        }
    }
}

/// Something tracked in the entity list (mobs, players, dropped items)
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    /// Entity kind name, e.g. "item", "zombie", "player"
    pub name: String,
    pub username: Option<String>,
    pub position: Vec3,
    pub height: f64,
}

/// A player in the tab list; `entity` is only set while they are in view
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub username: String,
    pub entity: Option<Entity>,
}

/// A crafting recipe with its ingredients collapsed by item kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub result: u32,
    pub result_count: u32,
    /// (item kind, count per craft)
    pub ingredients: Vec<(u32, u32)>,
    pub requires_table: bool,
}

/// Where a recipe lookup assumes the crafting happens
#[derive(Debug, Clone, Copy)]
pub enum CraftingStation<'a> {
    /// The 2x2 inventory grid
    Inventory,
    /// Any crafting table, wherever it is
    AnyTable,
    /// A specific crafting table block
    Table(&'a Block),
}

impl<'a> CraftingStation<'a> {
    pub fn from_table(table: Option<&'a Block>) -> Self {
        match table {
            Some(block) => CraftingStation::Table(block),
            None => CraftingStation::Inventory,
        }
    }

    pub fn has_table(&self) -> bool {
        !matches!(self, CraftingStation::Inventory)
    }
}

/// Navigation goals understood by the navigator
#[derive(Debug, Clone, PartialEq)]
pub enum Goal {
    /// Get within `range` of a point
    Near { target: Vec3, range: f64 },
    /// Get within `range` horizontally, any height
    NearXZ { x: f64, z: f64, range: f64 },
    /// Stand somewhere the block face is visible and reachable
    LookAtBlock(BlockPos),
    /// Stand somewhere a block can be placed at `target`
    PlaceBlock { target: BlockPos, range: f64 },
    /// Keep within `range` of an entity (dynamic)
    Follow { entity: u32, range: f64 },
}

/// Movement rules applied to the navigator on spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movements {
    pub allow_1by1_towers: bool,
    pub can_dig: bool,
    pub scaffolding_blocks: Vec<String>,
    pub think_timeout_ms: u64,
}

impl Default for Movements {
    fn default() -> Self {
        Self {
            allow_1by1_towers: false,
            can_dig: true,
            scaffolding_blocks: Vec::new(),
            think_timeout_ms: 10_000,
        }
    }
}

/// Lifecycle of the server session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Spawned,
    Disconnected,
}

impl SessionState {
    /// Actions are only accepted between spawn and disconnect
    pub fn allows_actions(&self) -> bool {
        matches!(self, SessionState::Spawned)
    }
}

/// Session-level events reported by the connection
#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    /// Bot spawned in the world and can act
    Spawn,
    /// Chat message (sender, text)
    Chat { username: String, message: String },
    /// Bot kicked (reason)
    Kicked(String),
    /// Connection-level error
    Error(String),
    /// Connection ended
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floored_handles_negative_coordinates() {
        let pos = Vec3::new(-0.5, 64.9, 3.2);
        assert_eq!(pos.floored(), BlockPos::new(-1, 64, 3));
    }

    #[test]
    fn test_can_harvest() {
        let mut stone = Block {
            position: BlockPos::new(0, 0, 0),
            kind: 1,
            name: "stone".to_string(),
            display_name: "Stone".to_string(),
            harvest_tools: Some(vec![800, 801]),
        };
        assert!(!stone.can_harvest(None));
        assert!(!stone.can_harvest(Some(5)));
        assert!(stone.can_harvest(Some(801)));

        stone.harvest_tools = None;
        assert!(stone.can_harvest(None));
    }

    #[test]
    fn test_offset_out_of_range() {
        let pos = BlockPos::new(1, 64, -1);
        assert_eq!(pos.offset(-1, 1, 0), Some(BlockPos::new(0, 65, -1)));
        assert_eq!(BlockPos::new(i32::MAX, 0, 0).plus(BlockPos::new(1, 0, 0)), None);
        assert_eq!(BlockPos::new(0, 0, i32::MIN).offset(0, 0, -1), None);
    }

    #[test]
    fn test_block_pos_display() {
        assert_eq!(BlockPos::new(1, -2, 3).to_string(), "(1, -2, 3)");
    }
}
