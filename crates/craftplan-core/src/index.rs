//! Precomputed lookup index over a pack.
//!
//! Built once from a [`PackData`] and then frozen; every planning call
//! treats it as read-only. Callers that change the pack swap in a freshly
//! built index rather than mutating this one in place.

use crate::extract::extract_recipe_stacks;
use crate::key::{ItemId, KeyHash, RecipeId, RecipeTypeKey, StackKind, TagId};
use crate::pack::{normalize_tag_id, PackData, Recipe, RecipeTypeDef};
use std::collections::{BTreeSet, HashMap};

/// Default namespace assumed for tags written without one, when the pack
/// manifest does not override it.
pub const DEFAULT_TAG_NAMESPACE: &str = "minecraft";

/// Immutable lookup maps over a pack's recipes, recipe types, producers,
/// and tag memberships.
#[derive(Debug, Clone)]
pub struct JeiIndex {
    recipes_by_id: HashMap<RecipeId, Recipe>,
    recipe_types_by_key: HashMap<RecipeTypeKey, RecipeTypeDef>,
    producing_by_key_hash: HashMap<KeyHash, Vec<RecipeId>>,
    item_ids_by_tag_id: HashMap<TagId, BTreeSet<ItemId>>,
    item_names_by_id: HashMap<ItemId, String>,
    default_namespace: String,
}

impl JeiIndex {
    /// Build the index from a parsed pack.
    pub fn build(pack: &PackData) -> Self {
        let default_namespace = pack
            .manifest
            .default_namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_TAG_NAMESPACE.to_string());

        let recipe_types_by_key: HashMap<_, _> = pack
            .recipe_types
            .iter()
            .map(|t| (t.key.clone(), t.clone()))
            .collect();

        let mut recipes_by_id = HashMap::new();
        let mut producing_by_key_hash: HashMap<KeyHash, Vec<RecipeId>> = HashMap::new();
        for recipe in &pack.recipes {
            let recipe_type = recipe_types_by_key.get(&recipe.recipe_type);
            let stacks = extract_recipe_stacks(recipe, recipe_type);
            for stack in &stacks.outputs {
                if stack.kind != StackKind::Item {
                    continue;
                }
                if let Some(key) = stack.item_key() {
                    producing_by_key_hash
                        .entry(key.key_hash())
                        .or_default()
                        .push(recipe.id.clone());
                }
            }
            recipes_by_id.insert(recipe.id.clone(), recipe.clone());
        }
        for ids in producing_by_key_hash.values_mut() {
            ids.sort();
            ids.dedup();
        }

        let mut item_ids_by_tag_id: HashMap<TagId, BTreeSet<ItemId>> = HashMap::new();
        for tag in &pack.tags {
            let id = TagId(normalize_tag_id(&tag.id, &default_namespace));
            item_ids_by_tag_id
                .entry(id)
                .or_default()
                .extend(tag.items.iter().cloned());
        }

        let item_names_by_id = pack
            .items
            .iter()
            .filter_map(|i| i.name.clone().map(|n| (i.id.clone(), n)))
            .collect();

        Self {
            recipes_by_id,
            recipe_types_by_key,
            producing_by_key_hash,
            item_ids_by_tag_id,
            item_names_by_id,
            default_namespace,
        }
    }

    pub fn recipe(&self, id: &RecipeId) -> Option<&Recipe> {
        self.recipes_by_id.get(id)
    }

    pub fn recipe_type(&self, key: &RecipeTypeKey) -> Option<&RecipeTypeDef> {
        self.recipe_types_by_key.get(key)
    }

    /// Recipe type of a recipe, when the pack declares it.
    pub fn recipe_type_of(&self, recipe: &Recipe) -> Option<&RecipeTypeDef> {
        self.recipe_type(&recipe.recipe_type)
    }

    /// Recipes producing the item behind `key_hash`, sorted by id.
    pub fn recipes_producing(&self, key_hash: &KeyHash) -> &[RecipeId] {
        self.producing_by_key_hash
            .get(key_hash)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidate item ids for a tag, in ascending id order. Empty when the
    /// tag is unknown.
    pub fn tag_candidates(&self, tag_id: &str) -> Vec<ItemId> {
        let id = TagId(normalize_tag_id(tag_id, &self.default_namespace));
        self.item_ids_by_tag_id
            .get(&id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `item_id` is a member of the tag.
    pub fn tag_contains(&self, tag_id: &str, item_id: &ItemId) -> bool {
        let id = TagId(normalize_tag_id(tag_id, &self.default_namespace));
        self.item_ids_by_tag_id
            .get(&id)
            .is_some_and(|set| set.contains(item_id))
    }

    /// Canonical form of a tag id under this pack's default namespace.
    pub fn normalize_tag(&self, tag_id: &str) -> TagId {
        TagId(normalize_tag_id(tag_id, &self.default_namespace))
    }

    pub fn item_name(&self, id: &ItemId) -> Option<&str> {
        self.item_names_by_id.get(id).map(String::as_str)
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes_by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{ItemKey, Stack};
    use crate::rational::Rational;
    use crate::test_utils::*;

    fn sample_pack() -> PackData {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        named_item(&mut pack, "mod:ingot", "Ingot");
        pack.recipes.push(recipe(
            "r2",
            "crafting",
            &[("in0", Stack::item("mod:ore", Rational::one()))],
            &[("out0", Stack::item("mod:ingot", Rational::one()))],
        ));
        pack.recipes.push(recipe(
            "r1",
            "crafting",
            &[("in0", Stack::item("mod:scrap", Rational::one()))],
            &[("out0", Stack::item("mod:ingot", Rational::one()))],
        ));
        tag(&mut pack, "forge:ingots", &["mod:ingot", "mod:alt_ingot"]);
        pack
    }

    #[test]
    fn producing_map_is_sorted_by_id() {
        let index = JeiIndex::build(&sample_pack());
        let hash = ItemKey::new("mod:ingot").key_hash();
        let producing = index.recipes_producing(&hash);
        assert_eq!(
            producing,
            &[RecipeId("r1".into()), RecipeId("r2".into())]
        );
    }

    #[test]
    fn unknown_item_has_no_producers() {
        let index = JeiIndex::build(&sample_pack());
        assert!(index
            .recipes_producing(&ItemKey::new("mod:unknown").key_hash())
            .is_empty());
    }

    #[test]
    fn meta_variants_index_separately() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        let mut damaged = Stack::item("mod:tool", Rational::one());
        damaged.meta = Some(1);
        pack.recipes.push(recipe(
            "repair",
            "crafting",
            &[("in0", Stack::item("mod:scrap", Rational::one()))],
            &[("out0", damaged)],
        ));
        let index = JeiIndex::build(&pack);
        assert!(index
            .recipes_producing(&ItemKey::new("mod:tool").key_hash())
            .is_empty());
        assert_eq!(
            index
                .recipes_producing(&ItemKey::with_meta("mod:tool", 1).key_hash())
                .len(),
            1
        );
    }

    #[test]
    fn tag_candidates_sorted_and_normalized() {
        let index = JeiIndex::build(&sample_pack());
        let candidates = index.tag_candidates("#forge:ingots");
        assert_eq!(
            candidates,
            vec![ItemId("mod:alt_ingot".into()), ItemId("mod:ingot".into())]
        );
        assert!(index.tag_contains("forge:ingots", &ItemId("mod:ingot".into())));
        assert!(!index.tag_contains("forge:ingots", &ItemId("mod:ore".into())));
        assert!(index.tag_candidates("forge:unknown").is_empty());
    }

    #[test]
    fn default_namespace_applies_to_bare_tags() {
        let mut pack = sample_pack();
        pack.manifest.default_namespace = Some("mod".to_string());
        tag(&mut pack, "gears", &["mod:gear"]);
        let index = JeiIndex::build(&pack);
        assert_eq!(index.tag_candidates("mod:gears").len(), 1);
        assert_eq!(index.tag_candidates("gears").len(), 1);
        assert_eq!(index.normalize_tag("#gears"), TagId("mod:gears".into()));
    }

    #[test]
    fn item_names_resolve() {
        let index = JeiIndex::build(&sample_pack());
        assert_eq!(index.item_name(&ItemId("mod:ingot".into())), Some("Ingot"));
        assert_eq!(index.item_name(&ItemId("mod:ore".into())), None);
    }
}
