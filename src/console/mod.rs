//! Interactive console front end

pub mod menu;

pub use menu::{run_menu, MenuItem};
