//! Decision enumeration: find the points where a human choice is needed.
//!
//! A depth-first walk over the dependency graph from a root item. The walk
//! is guarded by an open-path set, not a full visited memo: a path that
//! revisits an item simply stops there, while the same item reached along
//! independent branches is walked again (and deduplicated only at the
//! reporting stage). Output order is the UI display order.

use crate::selections::Selections;
use craftplan_core::extract::{extract_recipe_stacks, sort_recipe_options_for_item};
use craftplan_core::index::JeiIndex;
use craftplan_core::key::{ItemId, ItemKey, KeyHash, RecipeId, StackKind, TagId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default recursion bound for every planning walk. Termination is
/// guaranteed by this bound independent of cycle detection.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// An unresolved point where more than one recipe or tag candidate could
/// satisfy a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannerDecision {
    /// Several recipes produce this item and none is selected.
    ItemRecipe {
        item_key: ItemKey,
        /// In planner ranking order (see `sort_recipe_options_for_item`).
        recipe_options: Vec<RecipeId>,
    },
    /// Several items satisfy this tag and none is selected.
    TagItem {
        tag_id: TagId,
        /// In ascending item id order.
        candidate_item_ids: Vec<ItemId>,
    },
}

/// Enumerate the decisions needed to fully resolve production of `root`,
/// in deterministic visit order.
///
/// Items with a committed selection (or a unique option) are descended
/// silently; items with no producing recipe are leaves; forced-raw items
/// are leaves without any recipe lookup.
pub fn compute_planner_decisions(
    index: &JeiIndex,
    root: &ItemKey,
    selections: &Selections,
    forced_raw: &HashSet<KeyHash>,
    max_depth: usize,
) -> Vec<PlannerDecision> {
    let mut walk = DecisionWalk {
        index,
        selections,
        forced_raw,
        max_depth,
        open: Vec::new(),
        reported_items: HashSet::new(),
        reported_tags: HashSet::new(),
        decisions: Vec::new(),
    };
    walk.visit_item(root, 0);
    walk.decisions
}

struct DecisionWalk<'a> {
    index: &'a JeiIndex,
    selections: &'a Selections,
    forced_raw: &'a HashSet<KeyHash>,
    max_depth: usize,
    /// Key hashes on the current path. A revisit stops the walk silently.
    open: Vec<KeyHash>,
    reported_items: HashSet<KeyHash>,
    reported_tags: HashSet<TagId>,
    decisions: Vec<PlannerDecision>,
}

impl DecisionWalk<'_> {
    fn visit_item(&mut self, key: &ItemKey, depth: usize) {
        if depth > self.max_depth {
            return;
        }
        let hash = key.key_hash();
        if self.forced_raw.contains(&hash) || self.open.contains(&hash) {
            return;
        }
        let options = sort_recipe_options_for_item(
            self.index,
            key,
            self.index.recipes_producing(&hash).to_vec(),
        );
        let chosen = match options.len() {
            0 => return,
            1 => options[0].clone(),
            _ => match self.selections.recipe_for(&hash) {
                Some(id) => id.clone(),
                None => {
                    if self.reported_items.insert(hash) {
                        self.decisions.push(PlannerDecision::ItemRecipe {
                            item_key: key.clone(),
                            recipe_options: options,
                        });
                    }
                    return;
                }
            },
        };
        let Some(recipe) = self.index.recipe(&chosen) else {
            // Stale selection pointing at a removed recipe: stay a leaf.
            return;
        };
        let stacks = extract_recipe_stacks(recipe, self.index.recipe_type_of(recipe));

        self.open.push(hash);
        for stack in &stacks.inputs {
            match stack.kind {
                StackKind::Item => {
                    if let Some(child) = stack.item_key() {
                        self.visit_item(&child, depth + 1);
                    }
                }
                StackKind::Tag => self.visit_tag(&stack.id, depth),
                StackKind::Fluid => {}
            }
        }
        self.open.pop();
    }

    fn visit_tag(&mut self, raw_tag_id: &str, depth: usize) {
        let tag_id = self.index.normalize_tag(raw_tag_id);
        let candidates = self.index.tag_candidates(raw_tag_id);
        let item = match self.selections.item_for_tag(&tag_id) {
            Some(item) => item.clone(),
            None => match candidates.len() {
                0 => return,
                1 => candidates[0].clone(),
                _ => {
                    if self.reported_tags.insert(tag_id.clone()) {
                        self.decisions.push(PlannerDecision::TagItem {
                            tag_id,
                            candidate_item_ids: candidates,
                        });
                    }
                    return;
                }
            },
        };
        self.visit_item(&ItemKey::new(item.as_str()), depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftplan_core::key::Stack;
    use craftplan_core::rational::Rational;
    use craftplan_core::test_utils::*;

    fn one() -> Rational {
        Rational::one()
    }

    fn decisions_for(
        pack: &craftplan_core::pack::PackData,
        root: &str,
        selections: &Selections,
    ) -> Vec<PlannerDecision> {
        let index = JeiIndex::build(pack);
        compute_planner_decisions(
            &index,
            &ItemKey::new(root),
            selections,
            &HashSet::new(),
            DEFAULT_MAX_DEPTH,
        )
    }

    #[test]
    fn non_branching_chain_has_no_decisions() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        pack.recipes.push(recipe(
            "r_root",
            "crafting",
            &[("in0", Stack::item("x", one()))],
            &[("out0", Stack::item("root", one()))],
        ));
        pack.recipes.push(recipe(
            "r_x",
            "crafting",
            &[("in0", Stack::item("y", one()))],
            &[("out0", Stack::item("x", one()))],
        ));
        assert_eq!(decisions_for(&pack, "root", &Selections::new()), vec![]);
    }

    #[test]
    fn two_producers_yield_one_decision_with_sorted_options() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        for id in ["r2", "r1"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("x", one()))],
                &[("out0", Stack::item("root", one()))],
            ));
        }
        let decisions = decisions_for(&pack, "root", &Selections::new());
        assert_eq!(
            decisions,
            vec![PlannerDecision::ItemRecipe {
                item_key: ItemKey::new("root"),
                recipe_options: vec![RecipeId("r1".into()), RecipeId("r2".into())],
            }]
        );
    }

    #[test]
    fn committed_selection_descends_to_deeper_ambiguity() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        for id in ["root_a", "root_b"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("mid", one()))],
                &[("out0", Stack::item("root", one()))],
            ));
        }
        for id in ["mid_a", "mid_b"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("raw", one()))],
                &[("out0", Stack::item("mid", one()))],
            ));
        }
        let mut selections = Selections::new();
        selections.select_recipe(
            ItemKey::new("root").key_hash(),
            RecipeId("root_a".into()),
        );
        let decisions = decisions_for(&pack, "root", &selections);
        // The root is resolved; the ambiguity at "mid" surfaces.
        assert_eq!(decisions.len(), 1);
        assert!(matches!(
            &decisions[0],
            PlannerDecision::ItemRecipe { item_key, .. } if item_key.id.as_str() == "mid"
        ));
    }

    #[test]
    fn undescended_ambiguity_hides_deeper_decisions() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        for id in ["root_a", "root_b"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("mid", one()))],
                &[("out0", Stack::item("root", one()))],
            ));
        }
        for id in ["mid_a", "mid_b"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("raw", one()))],
                &[("out0", Stack::item("mid", one()))],
            ));
        }
        let decisions = decisions_for(&pack, "root", &Selections::new());
        // Only the root decision is visible until it is resolved.
        assert_eq!(decisions.len(), 1);
    }

    #[test]
    fn multi_candidate_tag_yields_tag_decision() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        pack.recipes.push(recipe(
            "r_root",
            "crafting",
            &[("in0", Stack::tag("forge:ingots", one()))],
            &[("out0", Stack::item("root", one()))],
        ));
        tag(&mut pack, "forge:ingots", &["mod:b", "mod:a"]);
        let decisions = decisions_for(&pack, "root", &Selections::new());
        assert_eq!(
            decisions,
            vec![PlannerDecision::TagItem {
                tag_id: TagId("forge:ingots".into()),
                candidate_item_ids: vec![ItemId("mod:a".into()), ItemId("mod:b".into())],
            }]
        );
    }

    #[test]
    fn single_candidate_tag_descends_silently() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        pack.recipes.push(recipe(
            "r_root",
            "crafting",
            &[("in0", Stack::tag("forge:ingots", one()))],
            &[("out0", Stack::item("root", one()))],
        ));
        tag(&mut pack, "forge:ingots", &["mod:a"]);
        for id in ["a1", "a2"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("raw", one()))],
                &[("out0", Stack::item("mod:a", one()))],
            ));
        }
        let decisions = decisions_for(&pack, "root", &Selections::new());
        assert_eq!(decisions.len(), 1);
        assert!(matches!(
            &decisions[0],
            PlannerDecision::ItemRecipe { item_key, .. } if item_key.id.as_str() == "mod:a"
        ));
    }

    #[test]
    fn path_cycle_stops_without_decision() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        pack.recipes.push(recipe(
            "r_a",
            "crafting",
            &[("in0", Stack::item("b", one()))],
            &[("out0", Stack::item("a", one()))],
        ));
        pack.recipes.push(recipe(
            "r_b",
            "crafting",
            &[("in0", Stack::item("a", one()))],
            &[("out0", Stack::item("b", one()))],
        ));
        // Terminates, and the cycle itself creates no decision.
        assert_eq!(decisions_for(&pack, "a", &Selections::new()), vec![]);
    }

    #[test]
    fn forced_raw_items_are_leaves() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        pack.recipes.push(recipe(
            "r_root",
            "crafting",
            &[("in0", Stack::item("mid", one()))],
            &[("out0", Stack::item("root", one()))],
        ));
        for id in ["mid_a", "mid_b"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("raw", one()))],
                &[("out0", Stack::item("mid", one()))],
            ));
        }
        let index = JeiIndex::build(&pack);
        let forced: HashSet<KeyHash> = [ItemKey::new("mid").key_hash()].into_iter().collect();
        let decisions = compute_planner_decisions(
            &index,
            &ItemKey::new("root"),
            &Selections::new(),
            &forced,
            DEFAULT_MAX_DEPTH,
        );
        assert_eq!(decisions, vec![]);
    }

    #[test]
    fn same_ambiguity_reported_once_across_branches() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        pack.recipes.push(recipe(
            "r_root",
            "crafting",
            &[
                ("in0", Stack::item("left", one())),
                ("in1", Stack::item("right", one())),
            ],
            &[("out0", Stack::item("root", one()))],
        ));
        for (id, out) in [("l", "left"), ("r", "right")] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("shared", one()))],
                &[("out0", Stack::item(out, one()))],
            ));
        }
        for id in ["s1", "s2"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("raw", one()))],
                &[("out0", Stack::item("shared", one()))],
            ));
        }
        let decisions = decisions_for(&pack, "root", &Selections::new());
        assert_eq!(decisions.len(), 1);
    }

    #[test]
    fn depth_bound_terminates_long_chains() {
        let mut pack = pack();
        plain_type(&mut pack, "crafting");
        for i in 0..40 {
            pack.recipes.push(recipe(
                &format!("r{i}"),
                "crafting",
                &[("in0", Stack::item(&format!("item{}", i + 1), one()))],
                &[("out0", Stack::item(&format!("item{i}"), one()))],
            ));
        }
        // Ambiguity past the depth bound is never reached.
        for id in ["deep_a", "deep_b"] {
            pack.recipes.push(recipe(
                id,
                "crafting",
                &[("in0", Stack::item("raw", one()))],
                &[("out0", Stack::item("item40", one()))],
            ));
        }
        let decisions = decisions_for(&pack, "item0", &Selections::new());
        assert_eq!(decisions, vec![]);
    }
}
