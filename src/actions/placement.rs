use tracing::info;

use crate::actions::movement::{follow_player, DEFAULT_FOLLOW_DISTANCE};
use crate::actions::report;
use crate::bot::BotContext;
use crate::error::{ActionError, ActionResult};
use crate::inventory::Inventory;
use crate::types::{Block, BlockPos, Goal};

/// Cells around a player tried in order when looking for a free spot
const PLACE_OFFSETS: [(i32, i32, i32); 4] = [(1, 0, 0), (-1, 0, 0), (0, 0, 1), (0, 0, -1)];

const UP: BlockPos = BlockPos { x: 0, y: 1, z: 0 };

const PLACE_RANGE: f64 = 4.0;

/// Walk up to a player and put a block named `block_name` on the ground
/// next to them.
pub async fn place_block_near_player(
    ctx: &BotContext,
    player_name: &str,
    block_name: &str,
) -> ActionResult<()> {
    let conn = ctx.conn();
    if conn.player(player_name).and_then(|p| p.entity).is_none() {
        return Err(report(
            ctx,
            ActionError::NotFound(format!("I can't see {}", player_name)),
        ));
    }

    let data = ctx.game_data();
    let block = data
        .block_by_name(block_name)
        .ok_or_else(|| report(ctx, ActionError::unknown_block(block_name)))?;
    let item_kind = data.item_by_name(block_name).map(|i| i.id).unwrap_or(block.id);

    let item = Inventory::snapshot(conn)
        .find_kind(item_kind)
        .cloned()
        .ok_or_else(|| report(ctx, ActionError::MissingItem(block_name.to_string())))?;

    follow_player(ctx, player_name, DEFAULT_FOLLOW_DISTANCE).await?;

    // the player may have moved while we walked
    let player_pos = conn
        .player(player_name)
        .and_then(|p| p.entity)
        .map(|e| e.position.floored())
        .ok_or_else(|| report(ctx, ActionError::NotFound(format!("I lost sight of {}", player_name))))?;

    let reference = find_ground(ctx, player_pos).ok_or_else(|| {
        report(
            ctx,
            ActionError::CannotPerform("I couldn't find a suitable place to put the block".into()),
        )
    })?;

    conn.equip(&item)
        .await
        .map_err(|e| report(ctx, ActionError::rejected(format!("equip {}", block_name), e)))?;
    conn.place_block(&reference, UP)
        .await
        .map_err(|e| report(ctx, ActionError::rejected(format!("place {}", block_name), e)))?;

    ctx.say(format!("Placed {} near {}", block_name, player_name));
    Ok(())
}

/// First solid block under a free cell next to `center`
fn find_ground(ctx: &BotContext, center: BlockPos) -> Option<Block> {
    let conn = ctx.conn();
    PLACE_OFFSETS.iter().find_map(|&(dx, dy, dz)| {
        let target = center.offset(dx, dy, dz)?;
        let free = conn.block_at(target).map(|b| b.is_air()).unwrap_or(false);
        if !free {
            return None;
        }
        conn.block_at(target.offset(0, -1, 0)?).filter(|b| !b.is_air())
    })
}

/// Place the item `item_kind` against the block at `pos` on the side `face`
pub async fn place_block(
    ctx: &BotContext,
    pos: BlockPos,
    face: BlockPos,
    item_kind: u32,
) -> ActionResult<()> {
    let conn = ctx.conn();
    let target = pos.plus(face).ok_or_else(|| {
        ActionError::CannotPerform(format!("Cannot place next to {}, it is outside the world", pos))
    })?;
    let reference = conn
        .block_at(pos)
        .filter(|b| !b.is_air())
        .ok_or_else(|| ActionError::NotFound(format!("No block to place against at {}", pos)))?;
    let item = Inventory::snapshot(conn).find_kind(item_kind).cloned().ok_or_else(|| {
        let name = ctx
            .game_data()
            .item(item_kind)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| format!("item {}", item_kind));
        ActionError::MissingItem(name)
    })?;

    conn.navigator()
        .goto(Goal::PlaceBlock {
            target,
            range: PLACE_RANGE,
        })
        .await
        .map_err(|e| ActionError::navigation(format!("placement spot {}", target), e))?;

    conn.equip(&item)
        .await
        .map_err(|e| ActionError::rejected(format!("equip {}", item.name), e))?;
    conn.place_block(&reference, face)
        .await
        .map_err(|e| ActionError::rejected(format!("place {}", item.name), e))?;
    info!("Placed {} at {}", item.name, target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, sim};
    use crate::bot::Connection;
    use crate::sim::SimCall;
    use crate::types::Vec3;

    #[tokio::test]
    async fn test_place_next_to_player() {
        let sim = sim();
        sim.with_player("Steve", Some(Vec3::new(-2.5, 64.0, -2.5)));
        sim.with_item("crafting_table", 1);
        let ctx = context(&sim);

        place_block_near_player(&ctx, "Steve", "crafting_table").await.unwrap();
        let placed = sim.block_at(BlockPos::new(-2, 64, -3)).unwrap();
        assert_eq!(placed.name, "crafting_table");
        assert_eq!(sim.item_count("crafting_table"), 0);
        assert_eq!(
            sim.chat_log().last().map(String::as_str),
            Some("Placed crafting_table near Steve")
        );
    }

    #[tokio::test]
    async fn test_place_skips_occupied_cells() {
        let sim = sim();
        sim.with_player("Steve", Some(Vec3::new(0.5, 64.0, 0.5)));
        sim.with_block("dirt", BlockPos::new(1, 64, 0));
        sim.with_item("dirt", 1);
        let ctx = context(&sim);

        place_block_near_player(&ctx, "Steve", "dirt").await.unwrap();
        assert!(sim.calls().contains(&SimCall::Place {
            target: BlockPos::new(-1, 64, 0),
            kind: ctx.game_data().item_by_name("dirt").unwrap().id,
        }));
    }

    #[tokio::test]
    async fn test_place_without_item() {
        let sim = sim();
        sim.with_player("Steve", Some(Vec3::new(0.5, 64.0, 0.5)));
        let ctx = context(&sim);

        let err = place_block_near_player(&ctx, "Steve", "furnace").await.unwrap_err();
        assert!(matches!(err, ActionError::MissingItem(_)));
        assert_eq!(sim.chat_log(), vec!["I don't have any furnace".to_string()]);
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Place { .. })), 0);
    }

    #[tokio::test]
    async fn test_place_for_invisible_player() {
        let sim = sim();
        sim.with_player("Ghost", None);
        sim.with_item("dirt", 1);
        let ctx = context(&sim);

        let err = place_block_near_player(&ctx, "Ghost", "dirt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_place_against_face() {
        let sim = sim();
        sim.with_item("cobblestone", 3);
        let ctx = context(&sim);
        let cobble = ctx.game_data().item_by_name("cobblestone").unwrap().id;

        place_block(&ctx, BlockPos::new(1, 63, 1), UP, cobble).await.unwrap();
        assert_eq!(sim.block_at(BlockPos::new(1, 64, 1)).unwrap().name, "cobblestone");
        assert_eq!(sim.item_count("cobblestone"), 2);

        let err = place_block(&ctx, BlockPos::new(1, 63, 1), UP, 126).await.unwrap_err();
        assert_eq!(err.to_string(), "I don't have any diamond");

        let err = place_block(&ctx, BlockPos::new(1, 70, 1), UP, cobble).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Place { .. })), 1);
    }

    #[tokio::test]
    async fn test_place_at_world_edge_fails_cleanly() {
        let sim = sim();
        sim.with_item("cobblestone", 1);
        let ctx = context(&sim);
        let cobble = ctx.game_data().item_by_name("cobblestone").unwrap().id;

        let err = place_block(&ctx, BlockPos::new(i32::MAX, 63, 0), BlockPos::new(1, 0, 0), cobble)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::CannotPerform(_)));
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Goto(_))), 0);
        assert_eq!(sim.item_count("cobblestone"), 1);
    }
}
