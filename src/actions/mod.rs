//! Action wrappers
//!
//! One async function per user-level task. Each validates names against the
//! game-data table, optionally navigates, performs one connection call and
//! reports the outcome on the status channel before returning.

pub mod blocks;
pub mod combat;
pub mod crafting;
pub mod furnace;
pub mod inventory;
pub mod movement;
pub mod placement;

pub use blocks::{collect_blocks, find_and_report_blocks, find_blocks, mine_block};
pub use combat::attack_entity;
pub use crafting::{craft_item_at, craft_item_by_name, recipes_for_item};
pub use furnace::{furnace_info, use_furnace, FurnaceSession, FurnaceSnapshot, FurnaceStage};
pub use inventory::{count_item, find_crafting_table, get_inventory, report_inventory};
pub use movement::{follow_player, set_position};
pub use placement::{place_block, place_block_near_player};

use crate::bot::BotContext;
use crate::error::ActionError;

/// Send the error text to chat (and the log) and hand it back
pub(crate) fn report(ctx: &BotContext, err: ActionError) -> ActionError {
    ctx.say(err.to_string());
    err
}
