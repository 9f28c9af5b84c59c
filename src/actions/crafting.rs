use tracing::{info, warn};

use crate::actions::inventory::{find_crafting_table, DEFAULT_TABLE_DISTANCE};
use crate::actions::report;
use crate::bot::BotContext;
use crate::error::{ActionError, ActionResult};
use crate::types::{BlockPos, CraftingStation, Goal, Recipe};

/// Craft `name` `count` times. Walks to the nearest crafting table first
/// when no inventory recipe is available.
pub async fn craft_item_by_name(ctx: &BotContext, name: &str, count: u32) -> ActionResult<()> {
    let conn = ctx.conn();
    let item = ctx
        .game_data()
        .item_by_name(name)
        .ok_or_else(|| report(ctx, ActionError::unknown_item(name)))?;

    let mut table = None;
    if conn.recipes_for(item.id, CraftingStation::Inventory).is_empty() {
        if conn.recipes_for(item.id, CraftingStation::AnyTable).is_empty() {
            return Err(report(
                ctx,
                ActionError::CannotPerform(format!("I don't know how to craft {}", name)),
            ));
        }
        match find_crafting_table(ctx, DEFAULT_TABLE_DISTANCE) {
            Some(found) => table = Some(found),
            None => {
                return Err(report(
                    ctx,
                    ActionError::NotFound(format!("I need a crafting table to craft {}", name)),
                ))
            }
        }
    }

    if let Some(table) = &table {
        ctx.say(format!("Moving to crafting table to craft {}x {}", count, name));
        conn.navigator()
            .goto(Goal::LookAtBlock(table.position))
            .await
            .map_err(|e| report(ctx, ActionError::navigation("crafting table", e)))?;
    } else {
        ctx.say(format!("Crafting {}x {}", count, name));
    }

    let recipes = conn.recipes_for(item.id, CraftingStation::from_table(table.as_ref()));
    let recipe = recipes.first().ok_or_else(|| {
        report(
            ctx,
            ActionError::CannotPerform(format!("I can't craft {} right now", name)),
        )
    })?;

    conn.craft(recipe, count, table.as_ref())
        .await
        .map_err(|e| report(ctx, ActionError::rejected(format!("craft {}", name), e)))?;
    ctx.say(format!("Successfully crafted {}x {}", count, name));
    Ok(())
}

/// Craft item kind `item_kind` at the table standing at `table_pos`, trying
/// each known recipe until one succeeds.
pub async fn craft_item_at(
    ctx: &BotContext,
    item_kind: u32,
    table_pos: BlockPos,
    count: u32,
) -> ActionResult<()> {
    let conn = ctx.conn();
    let table = conn
        .block_at(table_pos)
        .filter(|b| b.name == "crafting_table")
        .ok_or_else(|| ActionError::NotFound(format!("No crafting table at {}", table_pos)))?;

    let recipes = conn.recipes_all(item_kind, CraftingStation::Table(&table));
    if recipes.is_empty() {
        info!("No recipes found for item {}", item_kind);
        return Err(ActionError::NotFound(format!(
            "No recipes found for item {}",
            item_kind
        )));
    }

    conn.navigator()
        .goto(Goal::LookAtBlock(table_pos))
        .await
        .map_err(|e| ActionError::navigation("crafting table", e))?;

    let mut last_error = None;
    for recipe in &recipes {
        match conn.craft(recipe, count, Some(&table)).await {
            Ok(()) => {
                info!("Crafted item {} x{}", item_kind, count);
                return Ok(());
            }
            Err(e) => {
                warn!("Error crafting item {}: {}", item_kind, e);
                last_error = Some(e);
            }
        }
    }
    Err(match last_error {
        Some(e) => ActionError::rejected(format!("craft item {}", item_kind), e),
        None => ActionError::CannotPerform(format!("No recipe for item {} worked", item_kind)),
    })
}

/// All recipes producing `name`, with or without a table, regardless of
/// what the inventory holds
pub fn recipes_for_item(ctx: &BotContext, name: &str) -> ActionResult<Vec<Recipe>> {
    let item = ctx
        .game_data()
        .item_by_name(name)
        .ok_or_else(|| ActionError::unknown_item(name))?;
    Ok(ctx.conn().recipes_all(item.id, CraftingStation::AnyTable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, sim};
    use crate::sim::SimCall;

    #[tokio::test]
    async fn test_craft_planks_in_inventory() {
        let sim = sim();
        sim.with_item("oak_log", 2);
        let ctx = context(&sim);

        craft_item_by_name(&ctx, "oak_planks", 2).await.unwrap();
        assert_eq!(sim.item_count("oak_planks"), 8);
        assert_eq!(sim.item_count("oak_log"), 0);
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Goto(_))), 0);
    }

    #[tokio::test]
    async fn test_table_recipe_without_table_never_crafts() {
        let sim = sim();
        sim.with_item("oak_planks", 3).with_item("stick", 2);
        let ctx = context(&sim);

        let err = craft_item_by_name(&ctx, "wooden_pickaxe", 1).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Craft { .. })), 0);
        assert_eq!(
            sim.chat_log().last().map(String::as_str),
            Some("I need a crafting table to craft wooden_pickaxe")
        );
    }

    #[tokio::test]
    async fn test_craft_at_nearby_table() {
        let sim = sim();
        sim.with_item("oak_planks", 3).with_item("stick", 2);
        sim.with_block("crafting_table", BlockPos::new(12, 64, 0));
        let ctx = context(&sim);

        craft_item_by_name(&ctx, "wooden_pickaxe", 1).await.unwrap();
        assert_eq!(sim.item_count("wooden_pickaxe"), 1);
        assert_eq!(sim.item_count("oak_planks"), 0);
        assert!(sim
            .calls()
            .contains(&SimCall::Goto(Goal::LookAtBlock(BlockPos::new(12, 64, 0)))));
    }

    #[tokio::test]
    async fn test_craft_missing_ingredients() {
        let sim = sim();
        let ctx = context(&sim);
        let err = craft_item_by_name(&ctx, "stick", 1).await.unwrap_err();
        assert!(matches!(err, ActionError::CannotPerform(_)));
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Craft { .. })), 0);
    }

    #[tokio::test]
    async fn test_craft_unknown_item() {
        let sim = sim();
        let ctx = context(&sim);
        let err = craft_item_by_name(&ctx, "warp_drive", 1).await.unwrap_err();
        assert!(matches!(err, ActionError::UnknownName { .. }));
    }

    #[tokio::test]
    async fn test_craft_item_at_tries_recipes_in_turn() {
        let sim = sim();
        sim.with_item("birch_planks", 2).with_item("stick", 1);
        sim.with_block("crafting_table", BlockPos::new(3, 64, 3));
        let ctx = context(&sim);
        let sword = ctx.game_data().item_by_name("wooden_sword").unwrap().id;

        craft_item_at(&ctx, sword, BlockPos::new(3, 64, 3), 1).await.unwrap();
        assert_eq!(sim.item_count("wooden_sword"), 1);
        // every plank variant before birch was attempted and rejected
        assert!(sim.count_calls(|c| matches!(c, SimCall::Craft { .. })) > 1);
    }

    #[tokio::test]
    async fn test_craft_item_at_requires_table_block() {
        let sim = sim();
        let ctx = context(&sim);
        let err = craft_item_at(&ctx, 125, BlockPos::new(3, 64, 3), 1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_recipes_for_item() {
        let sim = sim();
        let ctx = context(&sim);
        let recipes = recipes_for_item(&ctx, "stick").unwrap();
        assert_eq!(recipes.len(), 6);
        assert!(recipes_for_item(&ctx, "nope").is_err());
    }
}
