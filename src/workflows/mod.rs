//! Multi-step tasks built from the actions

pub mod wooden_pickaxe;

pub use wooden_pickaxe::{craft_wooden_pickaxe, PickaxeOutcome};
