use anyhow::Result;
use dialoguer::{Input, Select};
use std::fmt;
use tracing::{info, warn};

use crate::actions;
use crate::bot::BotContext;
use crate::error::ActionResult;
use crate::state::StateManager;
use crate::types::BlockPos;
use crate::workflows::craft_wooden_pickaxe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    GoTo,
    Follow,
    FindBlocks,
    MineBlock,
    Inventory,
    Craft,
    PlaceNearPlayer,
    FurnaceInfo,
    Smelt,
    Attack,
    WoodenPickaxe,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 12] = [
        MenuItem::GoTo,
        MenuItem::Follow,
        MenuItem::FindBlocks,
        MenuItem::MineBlock,
        MenuItem::Inventory,
        MenuItem::Craft,
        MenuItem::PlaceNearPlayer,
        MenuItem::FurnaceInfo,
        MenuItem::Smelt,
        MenuItem::Attack,
        MenuItem::WoodenPickaxe,
        MenuItem::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::GoTo => "Movement - Go to coordinates",
            MenuItem::Follow => "Movement - Follow player",
            MenuItem::FindBlocks => "Block Finding - Find blocks",
            MenuItem::MineBlock => "Block Interaction - Mine a block",
            MenuItem::Inventory => "Inventory - Report inventory",
            MenuItem::Craft => "Crafting - Craft an item",
            MenuItem::PlaceNearPlayer => "Block Placement - Place block near player",
            MenuItem::FurnaceInfo => "Furnace - Check furnace info",
            MenuItem::Smelt => "Furnace - Smelt an item",
            MenuItem::Attack => "Combat - Attack entity",
            MenuItem::WoodenPickaxe => "Task - Craft a wooden pickaxe",
            MenuItem::Exit => "Exit",
        }
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interactive test harness: pick an action, answer its prompts, repeat
pub async fn run_menu(ctx: &BotContext, state: &StateManager) -> Result<()> {
    loop {
        if ctx.cancel_token().is_cancelled() {
            return Ok(());
        }
        if !state.allows_actions() {
            warn!("Bot is not connected to a server ({:?})", state.get());
            return Ok(());
        }

        let choice = Select::new()
            .with_prompt("Choose a function to test")
            .items(&MenuItem::ALL)
            .default(0)
            .interact()?;
        let item = MenuItem::ALL[choice];
        if item == MenuItem::Exit {
            info!("Leaving menu");
            return Ok(());
        }

        if let Err(e) = run_item(ctx, item).await? {
            warn!("{} failed: {}", item, e);
        }
    }
}

/// Prompt errors end the menu; action errors are reported and the menu goes on
async fn run_item(ctx: &BotContext, item: MenuItem) -> Result<ActionResult<()>> {
    let outcome = match item {
        MenuItem::GoTo => {
            let x: f64 = Input::new().with_prompt("Enter X coordinate").interact_text()?;
            let y: f64 = Input::new()
                .with_prompt("Enter Y coordinate (or -1 for XZ only)")
                .default(-1.0)
                .interact_text()?;
            let z: f64 = Input::new().with_prompt("Enter Z coordinate").interact_text()?;
            let y = if y == -1.0 { None } else { Some(y) };
            actions::set_position(ctx, x, y, z).await
        }
        MenuItem::Follow => {
            let username: String = Input::new()
                .with_prompt("Enter player name to follow")
                .interact_text()?;
            let distance: f64 = Input::new()
                .with_prompt("Enter follow distance")
                .default(actions::movement::DEFAULT_FOLLOW_DISTANCE)
                .interact_text()?;
            actions::follow_player(ctx, &username, distance).await
        }
        MenuItem::FindBlocks => {
            let block: String = Input::new()
                .with_prompt("Enter block name to find")
                .interact_text()?;
            let max_distance: f64 = Input::new()
                .with_prompt("Enter max search distance")
                .default(actions::blocks::DEFAULT_FIND_DISTANCE)
                .interact_text()?;
            let count: usize = Input::new()
                .with_prompt("Enter max number of blocks to find")
                .default(5)
                .interact_text()?;
            actions::find_and_report_blocks(ctx, &block, max_distance, count).map(|_| ())
        }
        MenuItem::MineBlock => {
            let pos = prompt_position("block to mine")?;
            actions::mine_block(ctx, pos).await
        }
        MenuItem::Inventory => {
            actions::report_inventory(ctx);
            Ok(())
        }
        MenuItem::Craft => {
            let name: String = Input::new()
                .with_prompt("Enter item name to craft")
                .interact_text()?;
            let count: u32 = Input::new()
                .with_prompt("Enter number of items to craft")
                .default(1)
                .interact_text()?;
            actions::craft_item_by_name(ctx, &name, count).await
        }
        MenuItem::PlaceNearPlayer => {
            let player: String = Input::new()
                .with_prompt("Enter player name to place block near")
                .interact_text()?;
            let block: String = Input::new()
                .with_prompt("Enter block name to place")
                .interact_text()?;
            actions::place_block_near_player(ctx, &player, &block).await
        }
        MenuItem::FurnaceInfo => {
            let pos = prompt_position("furnace")?;
            actions::furnace_info(ctx, pos).await.map(|session| {
                let snapshot = session.snapshot();
                session.close();
                info!("{:#?}", snapshot);
            })
        }
        MenuItem::Smelt => {
            let pos = prompt_position("furnace")?;
            let input: String = Input::new()
                .with_prompt("Enter item to smelt")
                .interact_text()?;
            let fuel: String = Input::new()
                .with_prompt("Enter fuel item")
                .default("coal".to_string())
                .interact_text()?;
            actions::use_furnace(ctx, pos, &input, &fuel).await.map(|_| ())
        }
        MenuItem::Attack => {
            let entity: String = Input::new()
                .with_prompt("Enter entity type to attack")
                .interact_text()?;
            let max_distance: f64 = Input::new()
                .with_prompt("Enter max distance")
                .default(actions::combat::DEFAULT_ATTACK_DISTANCE)
                .interact_text()?;
            actions::attack_entity(ctx, &entity, max_distance).await
        }
        MenuItem::WoodenPickaxe => craft_wooden_pickaxe(ctx).await.map(|outcome| {
            info!("Wooden pickaxe task finished: {:?}", outcome);
        }),
        MenuItem::Exit => Ok(()),
    };
    Ok(outcome)
}

fn prompt_position(what: &str) -> Result<BlockPos> {
    let x: i32 = Input::new()
        .with_prompt(format!("Enter X coordinate of {}", what))
        .interact_text()?;
    let y: i32 = Input::new()
        .with_prompt(format!("Enter Y coordinate of {}", what))
        .interact_text()?;
    let z: i32 = Input::new()
        .with_prompt(format!("Enter Z coordinate of {}", what))
        .interact_text()?;
    Ok(BlockPos::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lists_every_item_once() {
        let labels: Vec<&str> = MenuItem::ALL.iter().map(|i| i.label()).collect();
        let mut unique = labels.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), labels.len());
        assert_eq!(MenuItem::ALL.last(), Some(&MenuItem::Exit));
        assert_eq!(MenuItem::FurnaceInfo.to_string(), "Furnace - Check furnace info");
    }
}
