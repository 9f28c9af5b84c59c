//! Game-data table
//!
//! Maps human-readable block and item names to numeric kinds, and carries the
//! crafting, smelting and fuel tables for one protocol version. The layout
//! follows minecraft-data (names in camelCase), with tool and ingredient
//! references written as names and resolved to kinds at load time.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::types::{Block, BlockPos, Recipe};
use crate::utils::string::humanize_name;

const BUILTIN_GAME_DATA: &str = include_str!("../data/game_data.json");

/// Upper bound on items smelted by one fuel unit (a lava bucket does 100)
const MAX_FUEL_SMELTS: f32 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub harvest_tools: Option<Vec<u32>>,
    /// Item kinds dropped when mined with a suitable tool
    pub drops: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub stack_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGameData {
    version: String,
    blocks: Vec<RawBlock>,
    items: Vec<RawItem>,
    #[serde(default)]
    recipes: Vec<RawRecipe>,
    #[serde(default)]
    smelting: Vec<RawSmelt>,
    #[serde(default)]
    fuels: Vec<RawFuel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    id: u32,
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    harvest_tools: Option<Vec<String>>,
    #[serde(default)]
    drops: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: u32,
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default = "default_stack_size")]
    stack_size: u32,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    result: String,
    count: u32,
    ingredients: Vec<(String, u32)>,
    #[serde(default)]
    table: bool,
}

#[derive(Debug, Deserialize)]
struct RawSmelt {
    input: String,
    output: String,
}

#[derive(Debug, Deserialize)]
struct RawFuel {
    item: String,
    /// How many items one unit of this fuel smelts
    smelts: f32,
}

fn default_stack_size() -> u32 {
    64
}

fn display_name_or_default(display_name: String, name: &str) -> String {
    if display_name.is_empty() {
        humanize_name(name)
    } else {
        display_name
    }
}

/// Read-only lookup of blocks, items and recipes for one version
#[derive(Debug, Clone)]
pub struct GameData {
    version: String,
    blocks: Vec<BlockInfo>,
    items: Vec<ItemInfo>,
    blocks_by_name: HashMap<String, usize>,
    blocks_by_id: HashMap<u32, usize>,
    items_by_name: HashMap<String, usize>,
    items_by_id: HashMap<u32, usize>,
    recipes: Vec<Recipe>,
    smelting: HashMap<u32, u32>,
    fuels: HashMap<u32, f32>,
}

impl GameData {
    /// The table compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_GAME_DATA).context("Failed to parse built-in game data")
    }

    /// Load from `path` when given, otherwise the built-in table, and check it
    /// covers the server `version` (`None` = auto-detected, taken as-is)
    pub fn load(path: Option<&Path>, version: Option<&str>) -> Result<Self> {
        let data = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read game data {:?}", path))?;
                let data = Self::from_json(&contents)
                    .with_context(|| format!("Failed to parse game data {:?}", path))?;
                info!("Loaded game data for {} from {:?}", data.version, path);
                data
            }
            None => Self::builtin()?,
        };

        if let Some(version) = version {
            if !data.supports(version) {
                warn!(
                    "Game data is for {}, server reports {} - names may not resolve",
                    data.version, version
                );
            }
        }

        Ok(data)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawGameData = serde_json::from_str(json)?;

        let items: Vec<ItemInfo> = raw
            .items
            .into_iter()
            .map(|i| ItemInfo {
                id: i.id,
                display_name: display_name_or_default(i.display_name, &i.name),
                name: i.name,
                stack_size: i.stack_size,
            })
            .collect();
        let items_by_name: HashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.name.clone(), idx))
            .collect();
        let item_id = |name: &str| -> Result<u32> {
            items_by_name
                .get(name)
                .map(|&idx| items[idx].id)
                .ok_or_else(|| anyhow!("unknown item \"{}\" referenced in game data", name))
        };

        let mut blocks = Vec::with_capacity(raw.blocks.len());
        for b in raw.blocks {
            let harvest_tools = match b.harvest_tools {
                Some(tools) => Some(
                    tools
                        .iter()
                        .map(|t| item_id(t.as_str()))
                        .collect::<Result<Vec<_>>>()?,
                ),
                None => None,
            };
            let drops = b
                .drops
                .iter()
                .map(|d| item_id(d.as_str()))
                .collect::<Result<Vec<_>>>()?;
            blocks.push(BlockInfo {
                id: b.id,
                display_name: display_name_or_default(b.display_name, &b.name),
                name: b.name,
                harvest_tools,
                drops,
            });
        }

        let mut recipes = Vec::with_capacity(raw.recipes.len());
        for r in raw.recipes {
            let ingredients = r
                .ingredients
                .iter()
                .map(|(name, count)| Ok((item_id(name.as_str())?, *count)))
                .collect::<Result<Vec<_>>>()?;
            recipes.push(Recipe {
                result: item_id(r.result.as_str())?,
                result_count: r.count,
                ingredients,
                requires_table: r.table,
            });
        }

        let smelting = raw
            .smelting
            .iter()
            .map(|s| Ok((item_id(s.input.as_str())?, item_id(s.output.as_str())?)))
            .collect::<Result<HashMap<_, _>>>()?;
        let fuels = raw
            .fuels
            .iter()
            .map(|f| {
                if !(f.smelts > 0.0 && f.smelts <= MAX_FUEL_SMELTS) {
                    return Err(anyhow!(
                        "fuel \"{}\" smelts {} items, expected more than 0 and at most {}",
                        f.item,
                        f.smelts,
                        MAX_FUEL_SMELTS
                    ));
                }
                Ok((item_id(f.item.as_str())?, f.smelts))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let blocks_by_name = blocks
            .iter()
            .enumerate()
            .map(|(idx, b)| (b.name.clone(), idx))
            .collect();
        let blocks_by_id = blocks.iter().enumerate().map(|(idx, b)| (b.id, idx)).collect();
        let items_by_id = items.iter().enumerate().map(|(idx, i)| (i.id, idx)).collect();

        Ok(Self {
            version: raw.version,
            blocks,
            items,
            blocks_by_name,
            blocks_by_id,
            items_by_name,
            items_by_id,
            recipes,
            smelting,
            fuels,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Same major.minor release line as the table
    pub fn supports(&self, version: &str) -> bool {
        fn release(v: &str) -> String {
            v.split('.').take(2).collect::<Vec<_>>().join(".")
        }
        release(&self.version) == release(version)
    }

    pub fn block_by_name(&self, name: &str) -> Option<&BlockInfo> {
        self.blocks_by_name.get(name).map(|&idx| &self.blocks[idx])
    }

    pub fn block(&self, id: u32) -> Option<&BlockInfo> {
        self.blocks_by_id.get(&id).map(|&idx| &self.blocks[idx])
    }

    pub fn item_by_name(&self, name: &str) -> Option<&ItemInfo> {
        self.items_by_name.get(name).map(|&idx| &self.items[idx])
    }

    pub fn item(&self, id: u32) -> Option<&ItemInfo> {
        self.items_by_id.get(&id).map(|&idx| &self.items[idx])
    }

    /// Every recipe producing `item`, in table order
    pub fn recipes_for(&self, item: u32) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().filter(move |r| r.result == item)
    }

    /// Item produced by smelting `input`
    pub fn smelting_result(&self, input: u32) -> Option<u32> {
        self.smelting.get(&input).copied()
    }

    /// How many items one unit of `item` smelts, if it burns at all
    pub fn fuel_value(&self, item: u32) -> Option<f32> {
        self.fuels.get(&item).copied()
    }

    /// Build a world block reference of kind `name` at `position`
    pub fn make_block(&self, name: &str, position: BlockPos) -> Option<Block> {
        self.block_by_name(name).map(|info| Block {
            position,
            kind: info.id,
            name: info.name.clone(),
            display_name: info.display_name.clone(),
            harvest_tools: info.harvest_tools.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        let data = GameData::builtin().unwrap();
        assert_eq!(data.version(), "1.20.4");

        let log = data.block_by_name("oak_log").unwrap();
        let log_item = data.item_by_name("oak_log").unwrap();
        assert_ne!(log.id, log_item.id);
        assert_eq!(log.drops, vec![log_item.id]);
        assert_eq!(data.block(log.id).unwrap().name, "oak_log");

        let stone = data.block_by_name("stone").unwrap();
        let wooden_pickaxe = data.item_by_name("wooden_pickaxe").unwrap().id;
        assert!(stone.harvest_tools.as_ref().unwrap().contains(&wooden_pickaxe));
        assert!(data.block_by_name("lit_furnace").is_none());
    }

    #[test]
    fn test_recipes_and_smelting() {
        let data = GameData::builtin().unwrap();
        let pickaxe = data.item_by_name("wooden_pickaxe").unwrap().id;
        let recipes: Vec<_> = data.recipes_for(pickaxe).collect();
        assert_eq!(recipes.len(), 6);
        assert!(recipes.iter().all(|r| r.requires_table));

        let raw_iron = data.item_by_name("raw_iron").unwrap().id;
        let ingot = data.item_by_name("iron_ingot").unwrap().id;
        assert_eq!(data.smelting_result(raw_iron), Some(ingot));

        let coal = data.item_by_name("coal").unwrap().id;
        assert_eq!(data.fuel_value(coal), Some(8.0));
        assert_eq!(data.fuel_value(ingot), None);
    }

    #[test]
    fn test_supports_release_line() {
        let data = GameData::builtin().unwrap();
        assert!(data.supports("1.20.1"));
        assert!(data.supports("1.20"));
        assert!(!data.supports("1.8.9"));
    }

    #[test]
    fn test_unknown_reference_is_rejected() {
        let json = r#"{
            "version": "1.20.4",
            "blocks": [{"id": 0, "name": "air", "displayName": "Air", "drops": ["nothing"]}],
            "items": []
        }"#;
        let err = GameData::from_json(json).unwrap_err();
        assert!(err.to_string().contains("nothing"));
    }

    #[test]
    fn test_bad_fuel_value_is_rejected() {
        let with_fuel = |smelts: &str| {
            format!(
                r#"{{
                    "version": "1.20.4",
                    "blocks": [],
                    "items": [{{"id": 1, "name": "coal"}}],
                    "fuels": [{{"item": "coal", "smelts": {}}}]
                }}"#,
                smelts
            )
        };
        let err = GameData::from_json(&with_fuel("-1.0")).unwrap_err();
        assert!(err.to_string().contains("coal"));
        assert!(GameData::from_json(&with_fuel("0")).is_err());
        assert!(GameData::from_json(&with_fuel("1e30")).is_err());

        let data = GameData::from_json(&with_fuel("8")).unwrap();
        assert_eq!(data.fuel_value(1), Some(8.0));
    }

    #[test]
    fn test_missing_display_name_is_derived() {
        let json = r#"{
            "version": "1.20.4",
            "blocks": [{"id": 7, "name": "mossy_cobblestone", "drops": ["mossy_cobblestone"]}],
            "items": [{"id": 9, "name": "mossy_cobblestone"}]
        }"#;
        let data = GameData::from_json(json).unwrap();
        assert_eq!(data.block(7).unwrap().display_name, "Mossy Cobblestone");
        assert_eq!(data.item(9).unwrap().stack_size, 64);
    }
}
