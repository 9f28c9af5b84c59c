//! Furnace workflow
//!
//! `furnace_info` opens a furnace and hands back a [`FurnaceSession`], which
//! closes the container when dropped. `use_furnace` drives one smelt through
//! the stages below and bounds the wait on the configured timeout and the
//! context's cancellation token.

use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use tracing::{debug, info, warn};

use crate::actions::report;
use crate::bot::{BotContext, FurnaceWindow};
use crate::error::{ActionError, ActionResult};
use crate::inventory::Inventory;
use crate::types::{BlockPos, Goal, ItemStack};

/// Block names accepted as furnaces
pub const FURNACE_BLOCKS: [&str; 2] = ["furnace", "lit_furnace"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FurnaceStage {
    Opened,
    FuelPending,
    InputPending,
    Smelting,
    OutputReady,
    Closed,
}

impl fmt::Display for FurnaceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FurnaceStage::Opened => "opened",
            FurnaceStage::FuelPending => "fuel pending",
            FurnaceStage::InputPending => "input pending",
            FurnaceStage::Smelting => "smelting",
            FurnaceStage::OutputReady => "output ready",
            FurnaceStage::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

/// Slot contents and meters of an open furnace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FurnaceSnapshot {
    pub input: Option<ItemStack>,
    pub fuel_item: Option<ItemStack>,
    pub output: Option<ItemStack>,
    pub fuel: f32,
    pub progress: f32,
}

/// An open furnace. The window is closed exactly once: on `close` or on drop,
/// whichever comes first.
pub struct FurnaceSession {
    window: Box<dyn FurnaceWindow>,
    position: BlockPos,
    stage: FurnaceStage,
}

impl FurnaceSession {
    fn new(window: Box<dyn FurnaceWindow>, position: BlockPos) -> Self {
        debug!("[Furnace] {} {}", position, FurnaceStage::Opened);
        Self {
            window,
            position,
            stage: FurnaceStage::Opened,
        }
    }

    pub fn position(&self) -> BlockPos {
        self.position
    }

    pub fn stage(&self) -> FurnaceStage {
        self.stage
    }

    fn advance(&mut self, next: FurnaceStage) {
        debug!("[Furnace] {} {} -> {}", self.position, self.stage, next);
        self.stage = next;
    }

    pub fn snapshot(&self) -> FurnaceSnapshot {
        FurnaceSnapshot {
            input: self.window.input_item(),
            fuel_item: self.window.fuel_item(),
            output: self.window.output_item(),
            fuel: self.window.fuel(),
            progress: self.window.progress(),
        }
    }

    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.stage != FurnaceStage::Closed {
            self.window.close();
            self.advance(FurnaceStage::Closed);
        }
    }
}

impl Deref for FurnaceSession {
    type Target = dyn FurnaceWindow;

    fn deref(&self) -> &Self::Target {
        self.window.as_ref()
    }
}

impl Drop for FurnaceSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Walk to the furnace at `pos` and open it
pub async fn furnace_info(ctx: &BotContext, pos: BlockPos) -> ActionResult<FurnaceSession> {
    let conn = ctx.conn();
    let block = conn.block_at(pos).ok_or_else(|| {
        info!("Furnace block not found");
        ActionError::NotFound("Furnace block not found".into())
    })?;

    let data = ctx.game_data();
    let is_furnace = FURNACE_BLOCKS
        .iter()
        .filter_map(|name| data.block_by_name(name))
        .any(|info| info.id == block.kind);
    if !is_furnace {
        info!("Block is not a furnace, it is: {}", block.display_name);
        return Err(ActionError::NotFound(format!(
            "Block is not a furnace, it is: {}",
            block.display_name
        )));
    }

    conn.navigator()
        .goto(Goal::LookAtBlock(pos))
        .await
        .map_err(|e| {
            warn!("Failed to reach furnace: {}", e);
            ActionError::navigation(format!("furnace at {}", pos), e)
        })?;

    let window = conn.open_furnace(&block).await.map_err(|e| {
        warn!("Error opening furnace: {}", e);
        ActionError::rejected("open furnace", e)
    })?;
    Ok(FurnaceSession::new(window, pos))
}

/// Smelt one `input_name` using `fuel_name`, adding fuel only when the
/// furnace is not burning. Returns the collected output, if any.
pub async fn use_furnace(
    ctx: &BotContext,
    pos: BlockPos,
    input_name: &str,
    fuel_name: &str,
) -> ActionResult<Option<ItemStack>> {
    let mut session = match furnace_info(ctx, pos).await {
        Ok(session) => session,
        Err(e) => {
            ctx.say("Failed to access furnace");
            return Err(e);
        }
    };

    let data = ctx.game_data();
    let input = data
        .item_by_name(input_name)
        .ok_or_else(|| report(ctx, ActionError::unknown_item(input_name)))?;
    let fuel = data
        .item_by_name(fuel_name)
        .ok_or_else(|| report(ctx, ActionError::unknown_item(fuel_name)))?;

    let inventory = Inventory::snapshot(ctx.conn());
    if inventory.find_kind(input.id).is_none() {
        return Err(report(
            ctx,
            ActionError::MissingItem(format!("{} to smelt", input_name)),
        ));
    }
    if inventory.find_kind(fuel.id).is_none() {
        return Err(report(
            ctx,
            ActionError::MissingItem(format!("{} to use as fuel", fuel_name)),
        ));
    }

    if session.fuel() == 0.0 {
        session.advance(FurnaceStage::FuelPending);
        ctx.say(format!("Adding {} as fuel", fuel_name));
        session
            .put_fuel(fuel.id, 1)
            .await
            .map_err(|e| report(ctx, ActionError::rejected("add fuel", e)))?;
    }

    session.advance(FurnaceStage::InputPending);
    ctx.say(format!("Adding {} to smelt", input_name));
    session
        .put_input(input.id, 1)
        .await
        .map_err(|e| report(ctx, ActionError::rejected("add input", e)))?;

    session.advance(FurnaceStage::Smelting);
    ctx.say("Waiting for smelting to complete...");
    wait_for_smelting(ctx, &session).await.map_err(|e| report(ctx, e))?;

    session.advance(FurnaceStage::OutputReady);
    let output = if session.output_item().is_some() {
        ctx.say("Collecting the output");
        let item = session
            .take_output()
            .await
            .map_err(|e| report(ctx, ActionError::rejected("collect output", e)))?;
        ctx.say(format!("Got {}x {}", item.count, item.display_name));
        Some(item)
    } else {
        ctx.say("No output to collect");
        None
    };

    session.close();
    Ok(output)
}

/// Poll until the input slot empties or the cook meter fills up
async fn wait_for_smelting(ctx: &BotContext, session: &FurnaceSession) -> ActionResult<()> {
    let settings = ctx.settings();
    let poll = async {
        while session.input_item().is_some() && session.progress() < 1.0 {
            info!(
                "Fuel: {:.0}%, Progress: {:.0}%",
                session.fuel() * 100.0,
                session.progress() * 100.0
            );
            tokio::time::sleep(settings.furnace_poll_interval).await;
        }
    };

    tokio::select! {
        finished = tokio::time::timeout(settings.furnace_timeout, poll) => {
            finished.map_err(|_| ActionError::Timeout {
                what: "smelting".into(),
                after: settings.furnace_timeout,
            })
        }
        _ = ctx.cancel_token().cancelled() => Err(ActionError::Cancelled("smelting".into())),
    }
}
