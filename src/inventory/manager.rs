//! Inventory snapshot
//!
//! A point-in-time copy of the bot's inventory. Snapshots are taken fresh
//! for every query and never kept across actions.

use crate::bot::connection::Connection;
use crate::types::ItemStack;

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<ItemStack>,
}

impl Inventory {
    pub fn new(items: Vec<ItemStack>) -> Self {
        Self { items }
    }

    /// Read the current contents from the connection
    pub fn snapshot(conn: &dyn Connection) -> Self {
        Self::new(conn.inventory())
    }

    pub fn items(&self) -> &[ItemStack] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First stack of item kind `kind`
    pub fn find_kind(&self, kind: u32) -> Option<&ItemStack> {
        self.items.iter().find(|i| i.kind == kind)
    }

    /// First stack whose name matches `pred`
    pub fn find_matching(&self, pred: impl Fn(&str) -> bool) -> Option<&ItemStack> {
        self.items.iter().find(|i| pred(&i.name))
    }

    pub fn has_named(&self, name: &str) -> bool {
        self.items.iter().any(|i| i.name == name)
    }

    /// Total count over all stacks of kind `kind`
    pub fn count_kind(&self, kind: u32) -> u32 {
        self.items
            .iter()
            .filter(|i| i.kind == kind)
            .map(|i| i.count)
            .sum()
    }

    /// Total count over all stacks whose name matches `pred`
    pub fn count_matching(&self, pred: impl Fn(&str) -> bool) -> u32 {
        self.items
            .iter()
            .filter(|i| pred(&i.name))
            .map(|i| i.count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(kind: u32, name: &str, count: u32, slot: usize) -> ItemStack {
        ItemStack {
            kind,
            name: name.to_string(),
            display_name: name.to_string(),
            count,
            slot,
        }
    }

    #[test]
    fn test_counts_across_stacks() {
        let inventory = Inventory::new(vec![
            stack(112, "oak_log", 64, 0),
            stack(114, "birch_log", 3, 1),
            stack(112, "oak_log", 2, 5),
        ]);
        assert_eq!(inventory.count_kind(112), 66);
        assert_eq!(inventory.count_matching(|n| n.ends_with("_log")), 69);
        assert_eq!(inventory.find_kind(114).map(|i| i.slot), Some(1));
        assert!(inventory.has_named("birch_log"));
        assert!(!inventory.has_named("stick"));
    }
}
