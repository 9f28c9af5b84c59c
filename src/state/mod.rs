pub mod manager;

pub use manager::StateManager;
