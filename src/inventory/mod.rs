pub mod manager;

pub use manager::Inventory;
