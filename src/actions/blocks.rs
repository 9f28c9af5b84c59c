use tracing::{info, warn};

use crate::actions::report;
use crate::bot::BotContext;
use crate::error::{ActionError, ActionResult};
use crate::types::{BlockPos, Goal};

pub const DEFAULT_FIND_DISTANCE: f64 = 64.0;
pub const DEFAULT_FIND_COUNT: usize = 10;
pub const DEFAULT_COLLECT_DISTANCE: f64 = 32.0;
pub const DEFAULT_COLLECT_COUNT: usize = 5;

/// Positions of up to `count` blocks named `name` within `max_distance`,
/// nearest first. An unknown name yields an empty list without querying the
/// world.
pub fn find_blocks(ctx: &BotContext, name: &str, max_distance: f64, count: usize) -> Vec<BlockPos> {
    let Some(info) = ctx.game_data().block_by_name(name) else {
        info!("{}", ActionError::unknown_block(name));
        return Vec::new();
    };
    ctx.conn().find_blocks(info.id, max_distance, count)
}

/// Like `find_blocks`, but announces every hit in chat with its distance
pub fn find_and_report_blocks(
    ctx: &BotContext,
    name: &str,
    max_distance: f64,
    count: usize,
) -> ActionResult<Vec<BlockPos>> {
    let blocks = find_blocks(ctx, name, max_distance, count);
    if blocks.is_empty() {
        return Err(report(
            ctx,
            ActionError::NotFound(format!(
                "No {} blocks found within {} blocks",
                name, max_distance
            )),
        ));
    }

    ctx.say(format!("Found {} {} blocks:", blocks.len(), name));
    let me = ctx.conn().position();
    for pos in &blocks {
        let distance = me.distance_to(&pos.to_vec3()).round();
        ctx.say(format!("- {} at {}, {} blocks away", name, pos, distance));
    }
    Ok(blocks)
}

/// Walk up to a block, dig it with the best tool at hand and pick up what
/// drops nearby.
pub async fn mine_block(ctx: &BotContext, pos: BlockPos) -> ActionResult<()> {
    let conn = ctx.conn();
    let block = conn
        .block_at(pos)
        .filter(|b| !b.is_air())
        .ok_or_else(|| {
            info!("No block at {}", pos);
            ActionError::NotFound(format!("No block at {}", pos))
        })?;

    ctx.say(format!("Mining {} at {}", block.display_name, pos));

    if let Err(e) = conn.equip_for_block(&block).await {
        warn!("Could not equip a tool for {}: {}", block.display_name, e);
    }
    // bare hands always dig; only a held item that cannot harvest is refused
    let held = conn.held_item().map(|i| i.kind);
    if held.is_some() && !block.can_harvest(held) {
        warn!("I don't have the right tool to harvest {}", block.display_name);
        return Err(ActionError::CannotPerform(format!(
            "I don't have the right tool to harvest {}",
            block.display_name
        )));
    }

    conn.navigator()
        .goto(Goal::LookAtBlock(pos))
        .await
        .map_err(|e| {
            warn!("Failed to reach {}: {}", block.display_name, e);
            ActionError::navigation(format!("{} at {}", block.display_name, pos), e)
        })?;

    // navigation may have swapped the held item
    if let Err(e) = conn.equip_for_block(&block).await {
        warn!("Could not equip a tool for {}: {}", block.display_name, e);
    }

    if !conn.can_dig_block(&block) {
        warn!("Cannot dig {}", block.display_name);
        return Err(ActionError::CannotPerform(format!(
            "Cannot dig {}",
            block.display_name
        )));
    }

    conn.dig(&block).await.map_err(|e| {
        warn!("Error digging {}: {}", block.display_name, e);
        ActionError::rejected(format!("dig {}", block.display_name), e)
    })?;
    ctx.say(format!("Successfully mined {}", block.display_name));

    tokio::time::sleep(ctx.settings().drop_settle).await;
    collect_drops(ctx).await;
    Ok(())
}

/// Walk to each dropped item within the pickup radius. Failures are logged
/// and skipped.
async fn collect_drops(ctx: &BotContext) {
    let conn = ctx.conn();
    let me = conn.position();
    let radius = ctx.settings().pickup_radius;
    let drops: Vec<_> = conn
        .entities()
        .into_iter()
        .filter(|e| e.name == "item" && e.position.distance_to(&me) < radius)
        .collect();

    if drops.is_empty() {
        return;
    }
    ctx.say(format!("Collecting {} dropped items", drops.len()));
    for item in drops {
        let goal = Goal::Near {
            target: item.position,
            range: 1.0,
        };
        if let Err(e) = conn.navigator().goto(goal).await {
            warn!("Failed to collect item {}: {}", item.id, e);
        }
    }
}

/// Mine up to `count` blocks named `name` within `max_distance`. Returns how
/// many were mined; failures on single blocks are skipped, but mining none
/// at all is an error.
pub async fn collect_blocks(
    ctx: &BotContext,
    name: &str,
    max_distance: f64,
    count: usize,
) -> ActionResult<usize> {
    let blocks = find_and_report_blocks(ctx, name, max_distance, count)?;
    ctx.say(format!("Collecting {} {} blocks", blocks.len(), name));

    let mut mined = 0;
    for pos in blocks {
        match mine_block(ctx, pos).await {
            Ok(()) => mined += 1,
            Err(e) => warn!("Skipping {} at {}: {}", name, pos, e),
        }
    }
    if mined == 0 {
        return Err(report(
            ctx,
            ActionError::CannotPerform(format!("I couldn't collect any {}", name)),
        ));
    }
    ctx.say(format!("Finished collecting {} {} blocks", mined, name));
    Ok(mined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, sim};
    use crate::bot::Connection;
    use crate::sim::SimCall;

    #[tokio::test]
    async fn test_find_unknown_block_skips_world_query() {
        let sim = sim();
        let ctx = context(&sim);
        assert!(find_blocks(&ctx, "unobtainium", 64.0, 10).is_empty());
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::FindBlocks { .. })), 0);
    }

    #[tokio::test]
    async fn test_find_and_report_lists_distances() {
        let sim = sim();
        sim.with_block("oak_log", BlockPos::new(3, 64, 0));
        sim.with_block("oak_log", BlockPos::new(10, 64, 0));
        let ctx = context(&sim);

        let found = find_and_report_blocks(&ctx, "oak_log", 64.0, 10).unwrap();
        assert_eq!(found, vec![BlockPos::new(3, 64, 0), BlockPos::new(10, 64, 0)]);
        let chat = sim.chat_log();
        assert_eq!(chat[0], "Found 2 oak_log blocks:");
        assert_eq!(chat[1], "- oak_log at (3, 64, 0), 3 blocks away");
    }

    #[tokio::test]
    async fn test_find_and_report_none_found() {
        let sim = sim();
        let ctx = context(&sim);
        let err = find_and_report_blocks(&ctx, "iron_ore", 16.0, 10).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sim.chat_log(), vec!["No iron_ore blocks found within 16 blocks".to_string()]);
    }

    #[tokio::test]
    async fn test_mining_air_does_nothing() {
        let sim = sim();
        let ctx = context(&sim);
        let err = mine_block(&ctx, BlockPos::new(0, 70, 0)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Goto(_))), 0);
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Dig(_))), 0);
    }

    #[tokio::test]
    async fn test_mine_picks_up_drop() {
        let sim = sim();
        sim.with_block("oak_log", BlockPos::new(6, 64, 2));
        let ctx = context(&sim);

        mine_block(&ctx, BlockPos::new(6, 64, 2)).await.unwrap();
        assert_eq!(sim.item_count("oak_log"), 1);
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Dig(_))), 1);
        assert!(sim.chat_log().contains(&"Successfully mined Oak Log".to_string()));
    }

    #[tokio::test]
    async fn test_mine_with_wrong_tool_refuses() {
        let sim = sim();
        sim.with_block("iron_ore", BlockPos::new(2, 64, 0));
        sim.with_item("wooden_pickaxe", 1);
        let pickaxe = sim.inventory().into_iter().next().unwrap();
        sim.equip(&pickaxe).await.unwrap();
        let ctx = context(&sim);

        let err = mine_block(&ctx, BlockPos::new(2, 64, 0)).await.unwrap_err();
        assert!(matches!(err, ActionError::CannotPerform(_)));
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Goto(_))), 0);
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Dig(_))), 0);
    }

    #[tokio::test]
    async fn test_mine_bare_handed_digs_tool_gated_block() {
        let sim = sim();
        sim.with_block("stone", BlockPos::new(2, 64, 0));
        let ctx = context(&sim);

        mine_block(&ctx, BlockPos::new(2, 64, 0)).await.unwrap();
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Goto(_))), 1);
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Dig(_))), 1);
        assert!(sim.block_at(BlockPos::new(2, 64, 0)).unwrap().is_air());
        // no drop without the right tool
        assert_eq!(sim.item_count("cobblestone"), 0);
    }

    #[tokio::test]
    async fn test_collect_skips_failures() {
        let sim = sim();
        sim.with_block("sand", BlockPos::new(2, 64, 0));
        sim.with_block("sand", BlockPos::new(3, 64, 0));
        let ctx = context(&sim);

        assert_eq!(collect_blocks(&ctx, "sand", 32.0, 5).await.unwrap(), 2);
        assert_eq!(sim.item_count("sand"), 2);

        sim.with_block("sand", BlockPos::new(4, 64, 0));
        sim.set_navigation_fails(true);
        let err = collect_blocks(&ctx, "sand", 32.0, 5).await.unwrap_err();
        assert!(matches!(err, ActionError::CannotPerform(_)));
        assert_eq!(sim.item_count("sand"), 2);
    }
}
