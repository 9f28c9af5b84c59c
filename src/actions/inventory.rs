use tracing::info;

use crate::actions::blocks::find_blocks;
use crate::bot::BotContext;
use crate::error::ActionError;
use crate::inventory::Inventory;
use crate::types::{Block, ItemStack};

pub const DEFAULT_TABLE_DISTANCE: f64 = 64.0;

pub fn get_inventory(ctx: &BotContext) -> Vec<ItemStack> {
    ctx.conn().inventory()
}

/// List the inventory in chat, one line per stack
pub fn report_inventory(ctx: &BotContext) -> Vec<ItemStack> {
    let items = get_inventory(ctx);
    if items.is_empty() {
        ctx.say("My inventory is empty");
        return items;
    }

    ctx.say("My inventory contains:");
    for item in &items {
        ctx.say(format!("- {}x {}", item.count, item.display_name));
    }
    items
}

/// Total held count of the item named `name`; 0 for unknown names
pub fn count_item(ctx: &BotContext, name: &str) -> u32 {
    match ctx.game_data().item_by_name(name) {
        Some(item) => Inventory::snapshot(ctx.conn()).count_kind(item.id),
        None => {
            info!("{}", ActionError::unknown_item(name));
            0
        }
    }
}

/// Nearest crafting table within `max_distance`
pub fn find_crafting_table(ctx: &BotContext, max_distance: f64) -> Option<Block> {
    find_blocks(ctx, "crafting_table", max_distance, 1)
        .into_iter()
        .next()
        .and_then(|pos| ctx.conn().block_at(pos))
}
