//! Furnace simulation
//!
//! Cooking is driven by wall-clock time: every read first catches the furnace
//! up to `now`, consuming fuel and moving finished items to the output slot.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::bot::connection::FurnaceWindow;
use crate::error::ConnectionError;
use crate::game_data::GameData;
use crate::sim::world::{SimCall, SimWorld};
use crate::types::{BlockPos, ItemStack};

/// Vanilla cook time for one item
pub const DEFAULT_COOK_TIME: Duration = Duration::from_secs(10);

const INPUT_SLOT: usize = 0;
const FUEL_SLOT: usize = 1;
const OUTPUT_SLOT: usize = 2;

/// Slot contents as (item kind, count)
#[derive(Debug, Clone, Default)]
pub struct FurnaceState {
    pub(crate) input: Option<(u32, u32)>,
    pub(crate) fuel: Option<(u32, u32)>,
    pub(crate) output: Option<(u32, u32)>,
    pub(crate) burn_until: Option<Instant>,
    pub(crate) burn_total: Duration,
    pub(crate) cook_started: Option<Instant>,
}

impl FurnaceState {
    fn is_burning(&self, now: Instant) -> bool {
        self.burn_until.map(|until| until > now).unwrap_or(false)
    }

    /// Light the next fuel unit, if there is one
    fn ignite(&mut self, now: Instant, data: &GameData, cook_time: Duration) -> bool {
        let Some((kind, count)) = self.fuel else {
            return false;
        };
        let Some(smelts) = data.fuel_value(kind) else {
            return false;
        };
        self.fuel = if count > 1 { Some((kind, count - 1)) } else { None };
        self.burn_total = cook_time.mul_f32(smelts);
        self.burn_until = Some(now + self.burn_total);
        true
    }

    pub(crate) fn tick(&mut self, now: Instant, data: &GameData, cook_time: Duration) {
        loop {
            let Some((input, count)) = self.input else {
                self.cook_started = None;
                return;
            };
            let Some(result) = data.smelting_result(input) else {
                self.cook_started = None;
                return;
            };
            if let Some((out_kind, _)) = self.output {
                if out_kind != result {
                    return;
                }
            }
            if !self.is_burning(now) && !self.ignite(now, data, cook_time) {
                self.cook_started = None;
                return;
            }
            let started = *self.cook_started.get_or_insert(now);
            let done_at = started + cook_time;
            if now < done_at {
                return;
            }

            self.input = if count > 1 { Some((input, count - 1)) } else { None };
            self.output = Some(match self.output {
                Some((kind, n)) => (kind, n + 1),
                None => (result, 1),
            });
            self.cook_started = Some(done_at);
        }
    }

    pub(crate) fn fuel_fraction(&self, now: Instant) -> f32 {
        match self.burn_until {
            Some(until) if until > now && !self.burn_total.is_zero() => {
                ((until - now).as_secs_f32() / self.burn_total.as_secs_f32()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    pub(crate) fn progress(&self, now: Instant, cook_time: Duration) -> f32 {
        match self.cook_started {
            Some(started) if now > started => {
                ((now - started).as_secs_f32() / cook_time.as_secs_f32()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// Open furnace handle handed out by `SimConnection::open_furnace`
pub struct SimFurnaceWindow {
    world: Arc<Mutex<SimWorld>>,
    position: BlockPos,
    cook_time: Duration,
}

impl SimFurnaceWindow {
    pub(crate) fn new(world: Arc<Mutex<SimWorld>>, position: BlockPos, cook_time: Duration) -> Self {
        Self {
            world,
            position,
            cook_time,
        }
    }

    /// Catch the furnace up and run `f` on it
    fn with_state<T>(&self, f: impl FnOnce(&mut FurnaceState, &SimWorld, Instant) -> T) -> T {
        let mut world = self.world.lock();
        let now = Instant::now();
        let data = world.game_data.clone();
        let mut state = world.furnaces.remove(&self.position).unwrap_or_default();
        state.tick(now, &data, self.cook_time);
        let result = f(&mut state, &*world, now);
        world.furnaces.insert(self.position, state);
        result
    }

    fn slot_item(world: &SimWorld, slot: Option<(u32, u32)>, index: usize) -> Option<ItemStack> {
        let (kind, count) = slot?;
        world.game_data.item(kind).map(|info| ItemStack {
            kind,
            name: info.name.clone(),
            display_name: info.display_name.clone(),
            count,
            slot: index,
        })
    }

    fn deposit(&self, slot: usize, kind: u32, count: u32) -> Result<(), ConnectionError> {
        let mut world = self.world.lock();
        world.record(if slot == FUEL_SLOT {
            SimCall::PutFuel { kind, count }
        } else {
            SimCall::PutInput { kind, count }
        });
        if world.reject_furnace_deposits {
            return Err(ConnectionError::Rejected("server rejected the window click".into()));
        }
        if slot == FUEL_SLOT && world.game_data.fuel_value(kind).is_none() {
            return Err(ConnectionError::Rejected("item is not a fuel".into()));
        }

        let data = world.game_data.clone();
        let mut state = world.furnaces.remove(&self.position).unwrap_or_default();
        let now = Instant::now();
        state.tick(now, &data, self.cook_time);
        let target = if slot == FUEL_SLOT { &mut state.fuel } else { &mut state.input };
        let current = *target;
        let outcome = match current {
            Some((existing, _)) if existing != kind => {
                Err(ConnectionError::Rejected("slot holds a different item".into()))
            }
            _ if !world.remove_item(kind, count) => {
                Err(ConnectionError::Rejected("not enough items in inventory".into()))
            }
            Some((existing, n)) => {
                *target = Some((existing, n + count));
                Ok(())
            }
            None => {
                *target = Some((kind, count));
                Ok(())
            }
        };
        state.tick(now, &data, self.cook_time);
        world.furnaces.insert(self.position, state);
        outcome
    }
}

#[async_trait]
impl FurnaceWindow for SimFurnaceWindow {
    fn fuel(&self) -> f32 {
        self.with_state(|state, _, now| state.fuel_fraction(now))
    }

    fn progress(&self) -> f32 {
        let cook_time = self.cook_time;
        self.with_state(|state, _, now| state.progress(now, cook_time))
    }

    fn input_item(&self) -> Option<ItemStack> {
        self.with_state(|state, world, _| Self::slot_item(world, state.input, INPUT_SLOT))
    }

    fn fuel_item(&self) -> Option<ItemStack> {
        self.with_state(|state, world, _| Self::slot_item(world, state.fuel, FUEL_SLOT))
    }

    fn output_item(&self) -> Option<ItemStack> {
        self.with_state(|state, world, _| Self::slot_item(world, state.output, OUTPUT_SLOT))
    }

    async fn put_fuel(&self, kind: u32, count: u32) -> Result<(), ConnectionError> {
        self.deposit(FUEL_SLOT, kind, count)
    }

    async fn put_input(&self, kind: u32, count: u32) -> Result<(), ConnectionError> {
        self.deposit(INPUT_SLOT, kind, count)
    }

    async fn take_output(&self) -> Result<ItemStack, ConnectionError> {
        let mut world = self.world.lock();
        world.record(SimCall::TakeOutput);
        let data = world.game_data.clone();
        let mut state = world.furnaces.remove(&self.position).unwrap_or_default();
        state.tick(Instant::now(), &data, self.cook_time);
        let output = state.output.take();
        world.furnaces.insert(self.position, state);

        let (kind, count) =
            output.ok_or_else(|| ConnectionError::Rejected("output slot is empty".into()))?;
        world.add_item(kind, count);
        Self::slot_item(&*world, Some((kind, count)), OUTPUT_SLOT)
            .ok_or_else(|| ConnectionError::Rejected("unknown output item".into()))
    }

    fn close(&self) {
        let mut world = self.world.lock();
        world.record(SimCall::CloseFurnace(self.position));
    }
}
