use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::FurnaceSnapshot;
use crate::error::ActionError;
use crate::game_data::GameData;
use crate::types::{BlockPos, ItemStack, Recipe};

fn default_follow_distance() -> f64 {
    crate::actions::movement::DEFAULT_FOLLOW_DISTANCE
}

fn default_find_distance() -> f64 {
    crate::actions::blocks::DEFAULT_FIND_DISTANCE
}

fn default_find_count() -> usize {
    crate::actions::blocks::DEFAULT_FIND_COUNT
}

fn default_collect_distance() -> f64 {
    crate::actions::blocks::DEFAULT_COLLECT_DISTANCE
}

fn default_collect_count() -> usize {
    crate::actions::blocks::DEFAULT_COLLECT_COUNT
}

fn default_attack_distance() -> f64 {
    crate::actions::combat::DEFAULT_ATTACK_DISTANCE
}

fn one() -> u32 {
    1
}

/// One line of service input
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    SetPosition {
        x: f64,
        #[serde(default)]
        y: Option<f64>,
        z: f64,
    },
    FollowPlayer {
        username: String,
        #[serde(default = "default_follow_distance")]
        distance: f64,
    },
    FindBlocks {
        block: String,
        #[serde(default = "default_find_distance")]
        max_distance: f64,
        #[serde(default = "default_find_count")]
        count: usize,
    },
    CollectBlocks {
        block: String,
        #[serde(default = "default_collect_distance")]
        max_distance: f64,
        #[serde(default = "default_collect_count")]
        count: usize,
    },
    MineBlock {
        x: i32,
        y: i32,
        z: i32,
    },
    Inventory,
    CountItem {
        item: String,
    },
    Recipes {
        item: String,
    },
    CraftItem {
        item: String,
        #[serde(default = "one")]
        count: u32,
    },
    CraftAt {
        item_id: u32,
        table: BlockPos,
        #[serde(default = "one")]
        count: u32,
    },
    PlaceBlock {
        x: i32,
        y: i32,
        z: i32,
        face: BlockPos,
        item_id: u32,
    },
    PlaceBlockNearPlayer {
        player: String,
        block: String,
    },
    FurnaceInfo {
        x: i32,
        y: i32,
        z: i32,
    },
    UseFurnace {
        x: i32,
        y: i32,
        z: i32,
        input: String,
        fuel: String,
    },
    Attack {
        entity: String,
        #[serde(default = "default_attack_distance")]
        max_distance: f64,
    },
    CraftWoodenPickaxe,
}

/// Item stack as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMsg {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
}

impl From<&ItemStack> for ItemMsg {
    fn from(item: &ItemStack) -> Self {
        Self {
            id: item.kind,
            name: item.name.clone(),
            display_name: item.display_name.clone(),
            count: item.count,
            slot: Some(item.slot),
        }
    }
}

impl ItemMsg {
    fn from_kind(data: &GameData, kind: u32, count: u32) -> Self {
        let (name, display_name) = data
            .item(kind)
            .map(|i| (i.name.clone(), i.display_name.clone()))
            .unwrap_or_else(|| (kind.to_string(), kind.to_string()));
        Self {
            id: kind,
            name,
            display_name,
            count,
            slot: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMsg {
    pub output_item: ItemMsg,
    pub input_items: Vec<ItemMsg>,
    pub requires_table: bool,
}

impl RecipeMsg {
    pub fn from_recipe(recipe: &Recipe, data: &GameData) -> Self {
        Self {
            output_item: ItemMsg::from_kind(data, recipe.result, recipe.result_count),
            input_items: recipe
                .ingredients
                .iter()
                .map(|(kind, count)| ItemMsg::from_kind(data, *kind, *count))
                .collect(),
            requires_table: recipe.requires_table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnaceMsg {
    pub input_item: Option<ItemMsg>,
    pub fuel_item: Option<ItemMsg>,
    pub output_item: Option<ItemMsg>,
    pub fuel: f32,
    pub progress: f32,
}

impl From<&FurnaceSnapshot> for FurnaceMsg {
    fn from(snapshot: &FurnaceSnapshot) -> Self {
        Self {
            input_item: snapshot.input.as_ref().map(ItemMsg::from),
            fuel_item: snapshot.fuel_item.as_ref().map(ItemMsg::from),
            output_item: snapshot.output.as_ref().map(ItemMsg::from),
            fuel: snapshot.fuel,
            progress: snapshot.progress,
        }
    }
}

/// One line of service output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<BlockPos>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemMsg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipes: Option<Vec<RecipeMsg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnace: Option<FurnaceMsg>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<ActionError> for Response {
    fn from(err: ActionError) -> Self {
        Response::failed(err.to_string())
    }
}

/// Parse one request line (handles double-JSON encoding)
pub fn parse_request(line: &str) -> Result<Request, serde_json::Error> {
    let value: Value = serde_json::from_str(line)?;

    // a JSON string holding the request itself
    if let Some(inner) = value.as_str() {
        serde_json::from_str(inner)
    } else {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_defaults() {
        let request = parse_request(r#"{"type":"find_blocks","block":"oak_log"}"#).unwrap();
        assert_eq!(
            request,
            Request::FindBlocks {
                block: "oak_log".into(),
                max_distance: 64.0,
                count: 10,
            }
        );

        let request = parse_request(r#"{"type":"set_position","x":1,"z":-2}"#).unwrap();
        assert_eq!(request, Request::SetPosition { x: 1.0, y: None, z: -2.0 });
    }

    #[test]
    fn test_parse_double_encoded_request() {
        let line = r#""{\"type\":\"inventory\"}""#;
        assert_eq!(parse_request(line).unwrap(), Request::Inventory);
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        assert!(parse_request(r#"{"type":"fly","speed":3}"#).is_err());
        assert!(parse_request("not json").is_err());
    }

    #[test]
    fn test_response_skips_empty_fields() {
        let json = serde_json::to_string(&Response::ok().with_message("done")).unwrap();
        assert_eq!(json, r#"{"success":true,"message":"done"}"#);

        let json = serde_json::to_string(&Response::from(ActionError::MissingItem("coal".into()))).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"I don't have any coal"}"#);
    }

    #[test]
    fn test_recipe_msg_names_ingredients() {
        let data = GameData::builtin().unwrap();
        let recipe = data
            .recipes_for(data.item_by_name("stick").unwrap().id)
            .next()
            .unwrap()
            .clone();
        let msg = RecipeMsg::from_recipe(&recipe, &data);
        assert_eq!(msg.output_item.name, "stick");
        assert_eq!(msg.output_item.count, 4);
        assert_eq!(msg.input_items[0].name, "oak_planks");
        assert_eq!(msg.input_items[0].count, 2);
        assert!(!msg.requires_table);
    }
}
