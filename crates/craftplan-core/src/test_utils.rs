//! Pack-building helpers shared by unit and integration tests.
//!
//! Slot names follow the heuristic convention (`in*` slots are inputs,
//! `out*` slots are outputs), so most tests need no declared slot
//! metadata on their recipe types.

use crate::key::{ItemId, RecipeId, Stack};
use crate::pack::{
    ItemDef, PackData, PackManifest, Recipe, RecipeParams, RecipeTypeDef, SlotContents, TagDef,
};
use std::collections::BTreeMap;

/// An empty pack for a test game.
pub fn pack() -> PackData {
    PackData {
        manifest: PackManifest {
            game_id: "testgame".to_string(),
            default_namespace: None,
        },
        items: Vec::new(),
        recipes: Vec::new(),
        recipe_types: Vec::new(),
        tags: Vec::new(),
    }
}

/// Register a recipe type with no machine, renderer, or slot metadata.
pub fn plain_type(pack: &mut PackData, key: &str) {
    pack.recipe_types.push(RecipeTypeDef::new(key));
}

/// Register a machine-backed recipe type.
pub fn machine_type(pack: &mut PackData, key: &str, machine_item: &str) {
    let mut ty = RecipeTypeDef::new(key);
    ty.machine = Some(ItemId(machine_item.to_string()));
    pack.recipe_types.push(ty);
}

/// Register an item with a display name.
pub fn named_item(pack: &mut PackData, id: &str, name: &str) {
    pack.items.push(ItemDef {
        id: ItemId(id.to_string()),
        name: Some(name.to_string()),
    });
}

/// Register a tag and its member items.
pub fn tag(pack: &mut PackData, id: &str, items: &[&str]) {
    pack.tags.push(TagDef {
        id: id.to_string(),
        items: items.iter().map(|i| ItemId(i.to_string())).collect(),
    });
}

/// Build a recipe from `(slot_id, stack)` pairs.
pub fn recipe(
    id: &str,
    recipe_type: &str,
    inputs: &[(&str, Stack)],
    outputs: &[(&str, Stack)],
) -> Recipe {
    recipe_with_params(id, recipe_type, inputs, outputs, RecipeParams::default())
}

/// Build a recipe with explicit params.
pub fn recipe_with_params(
    id: &str,
    recipe_type: &str,
    inputs: &[(&str, Stack)],
    outputs: &[(&str, Stack)],
    params: RecipeParams,
) -> Recipe {
    let mut slot_contents = BTreeMap::new();
    for (slot, stack) in inputs.iter().chain(outputs.iter()) {
        slot_contents.insert(slot.to_string(), SlotContents::One(stack.clone()));
    }
    Recipe {
        id: RecipeId(id.to_string()),
        recipe_type: recipe_type.into(),
        slot_contents,
        params,
    }
}
