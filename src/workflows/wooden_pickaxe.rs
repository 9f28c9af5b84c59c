//! Wooden pickaxe from nothing
//!
//! Gather logs, turn them into planks and sticks, get hold of a crafting
//! table and craft the pickaxe. Any failing step stops the run; whatever
//! was mined or crafted so far stays in the inventory.

use tracing::{info, warn};

use crate::actions::{
    craft_item_by_name, find_blocks, mine_block, place_block_near_player, report,
    report_inventory, set_position,
};
use crate::bot::BotContext;
use crate::error::{ActionError, ActionResult};
use crate::inventory::Inventory;

/// Log kinds searched for, in this order
pub const LOG_TYPES: [&str; 6] = [
    "birch_log",
    "oak_log",
    "spruce_log",
    "jungle_log",
    "acacia_log",
    "dark_oak_log",
];

const PICKAXE: &str = "wooden_pickaxe";
const LOG_SEARCH_DISTANCE: f64 = 64.0;
const LOG_SEARCH_COUNT: usize = 5;
const TABLE_SEARCH_DISTANCE: f64 = 32.0;
/// Logs to gather when a crafting table is already standing nearby
const LOGS_WITH_TABLE: u32 = 2;
/// Logs to gather when the table has to be crafted too
const LOGS_WITHOUT_TABLE: u32 = 3;
/// Upper bound on logs turned into planks in one run
const MAX_PLANK_CRAFTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickaxeOutcome {
    /// A wooden pickaxe was already in the inventory
    AlreadyHad,
    Crafted,
}

fn is_log(name: &str) -> bool {
    name.ends_with("_log")
}

fn count_logs(ctx: &BotContext) -> u32 {
    Inventory::snapshot(ctx.conn()).count_matching(is_log)
}

pub async fn craft_wooden_pickaxe(ctx: &BotContext) -> ActionResult<PickaxeOutcome> {
    info!("Starting wooden pickaxe run");
    ctx.say("I'm going to craft a wooden pickaxe!");
    report_inventory(ctx);

    if Inventory::snapshot(ctx.conn()).has_named(PICKAXE) {
        ctx.say("I already have a wooden pickaxe!");
        return Ok(PickaxeOutcome::AlreadyHad);
    }

    let table_nearby = !find_blocks(ctx, "crafting_table", TABLE_SEARCH_DISTANCE, 1).is_empty();
    let logs_needed = if table_nearby {
        LOGS_WITH_TABLE
    } else {
        LOGS_WITHOUT_TABLE
    };
    gather_logs(ctx, logs_needed).await?;

    let inventory = Inventory::snapshot(ctx.conn());
    let log = inventory
        .find_matching(is_log)
        .ok_or_else(|| report(ctx, ActionError::MissingItem("logs".into())))?;
    let wood = log.name.strip_suffix("_log").unwrap_or(&log.name);
    let log_count = inventory
        .count_matching(|name| name == log.name)
        .min(MAX_PLANK_CRAFTS);

    ctx.say("Crafting wooden planks...");
    craft_item_by_name(ctx, &format!("{}_planks", wood), log_count).await?;

    ctx.say("Crafting sticks...");
    craft_item_by_name(ctx, "stick", 1).await?;

    ensure_crafting_table(ctx).await?;

    ctx.say("Crafting a wooden pickaxe...");
    craft_item_by_name(ctx, PICKAXE, 1).await?;

    if Inventory::snapshot(ctx.conn()).has_named(PICKAXE) {
        ctx.say("Successfully crafted a wooden pickaxe!");
        Ok(PickaxeOutcome::Crafted)
    } else {
        Err(report(
            ctx,
            ActionError::CannotPerform("Something went wrong while crafting the pickaxe".into()),
        ))
    }
}

/// Mine logs of the first kind found nearby until `needed` are held. Stops
/// early, without error, when that kind runs out.
async fn gather_logs(ctx: &BotContext, needed: u32) -> ActionResult<()> {
    if count_logs(ctx) >= needed {
        return Ok(());
    }

    ctx.say("Looking for trees...");
    for log_type in LOG_TYPES {
        let logs = find_blocks(ctx, log_type, LOG_SEARCH_DISTANCE, LOG_SEARCH_COUNT);
        if logs.is_empty() {
            continue;
        }

        ctx.say(format!("Found {} {} nearby!", logs.len(), log_type));
        ctx.say("Mining logs...");
        for pos in logs {
            if let Err(e) = mine_block(ctx, pos).await {
                warn!("Skipping {} at {}: {}", log_type, pos, e);
            }
            if count_logs(ctx) >= needed {
                break;
            }
        }
        return Ok(());
    }

    Err(report(
        ctx,
        ActionError::NotFound("I couldn't find any logs nearby!".into()),
    ))
}

/// Walk to a nearby crafting table, or craft one and set it down next to
/// another player (or the bot itself when nobody else is around)
async fn ensure_crafting_table(ctx: &BotContext) -> ActionResult<()> {
    ctx.say("Looking for a crafting table...");
    if let Some(pos) = find_blocks(ctx, "crafting_table", TABLE_SEARCH_DISTANCE, 1).first() {
        ctx.say("Found a crafting table!");
        return set_position(ctx, pos.x as f64, Some(pos.y as f64), pos.z as f64).await;
    }

    ctx.say("No crafting table found nearby. I'll make one!");
    craft_item_by_name(ctx, "crafting_table", 1).await?;

    let conn = ctx.conn();
    let me = conn.username();
    let target = conn
        .players()
        .into_iter()
        .find(|p| p.username != me && p.entity.is_some())
        .map(|p| p.username)
        .unwrap_or(me);
    place_block_near_player(ctx, &target, "crafting_table").await
}
