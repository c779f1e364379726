//! Caller-owned recipe and tag selections.
//!
//! Populated incrementally by user action or by the auto-planner, then
//! consumed read-only by the decision enumerator and the tree builder.
//! Serializable so embedding callers can persist user choices.

use craftplan_core::key::{ItemId, KeyHash, RecipeId, TagId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The committed choices for ambiguous production points: which recipe
/// produces each item variant, and which item stands in for each tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selections {
    /// Chosen producing recipe per item key hash.
    #[serde(default)]
    pub recipe_by_key: HashMap<KeyHash, RecipeId>,
    /// Chosen candidate item per tag id.
    #[serde(default)]
    pub item_by_tag: HashMap<TagId, ItemId>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipe_for(&self, key_hash: &KeyHash) -> Option<&RecipeId> {
        self.recipe_by_key.get(key_hash)
    }

    pub fn item_for_tag(&self, tag_id: &TagId) -> Option<&ItemId> {
        self.item_by_tag.get(tag_id)
    }

    /// Commit a recipe choice, returning the previous one if any.
    pub fn select_recipe(&mut self, key_hash: KeyHash, recipe_id: RecipeId) -> Option<RecipeId> {
        self.recipe_by_key.insert(key_hash, recipe_id)
    }

    /// Commit a tag choice, returning the previous one if any.
    pub fn select_tag_item(&mut self, tag_id: TagId, item_id: ItemId) -> Option<ItemId> {
        self.item_by_tag.insert(tag_id, item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.recipe_by_key.is_empty() && self.item_by_tag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_and_replace() {
        let mut sel = Selections::new();
        assert!(sel.is_empty());
        let hash = KeyHash("mod:ingot".into());
        assert_eq!(
            sel.select_recipe(hash.clone(), RecipeId("r1".into())),
            None
        );
        assert_eq!(
            sel.select_recipe(hash.clone(), RecipeId("r2".into())),
            Some(RecipeId("r1".into()))
        );
        assert_eq!(sel.recipe_for(&hash), Some(&RecipeId("r2".into())));
    }

    #[test]
    fn tag_selection() {
        let mut sel = Selections::new();
        let tag = TagId("forge:ingots".into());
        sel.select_tag_item(tag.clone(), ItemId("mod:ingot".into()));
        assert_eq!(sel.item_for_tag(&tag), Some(&ItemId("mod:ingot".into())));
        assert!(sel.item_for_tag(&TagId("forge:other".into())).is_none());
    }

    #[test]
    fn serde_round_trip() {
        let mut sel = Selections::new();
        sel.select_recipe(KeyHash("a".into()), RecipeId("r".into()));
        sel.select_tag_item(TagId("t".into()), ItemId("i".into()));
        let json = serde_json::to_string(&sel).unwrap();
        let back: Selections = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sel);
    }
}
