//! Fully automatic ambiguity resolution with backtracking.
//!
//! The planner walks the dependency graph from a root item and commits a
//! recipe (or tag candidate) at every ambiguous point, trying options in
//! ranking order. A choice is kept only if its induced subtree fully
//! resolves; a choice that closes a non-growth production cycle is rolled
//! back and the next-ranked option tried.
//!
//! Backtracking runs over an append-only undo log of selection writes
//! rather than deep-cloning the selection maps per branch. Only
//! intra-branch trials are transactional: a deep failure rolls back the
//! failing branch's writes, but sibling branches that already resolved
//! keep their commitments in the returned maps.

use crate::cycle::{growth_factor, is_growth, PathFrame};
use crate::selections::Selections;
use craftplan_core::extract::{extract_recipe_stacks, sort_recipe_options_for_item};
use craftplan_core::index::JeiIndex;
use craftplan_core::key::{ItemId, ItemKey, KeyHash, RecipeId, StackKind, TagId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The selections the auto-planner ended up with: the caller's
/// pre-committed entries plus every new choice that survived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoPlanOutcome {
    pub recipe_by_key: HashMap<KeyHash, RecipeId>,
    pub item_by_tag: HashMap<TagId, ItemId>,
}

/// Resolve every ambiguous point reachable from `root`.
///
/// Pre-committed selections are honored as-is: each is tried exactly once
/// and must resolve outright, with no alternative search. Items with no
/// producing recipe, forced-raw items, and anything past `max_depth`
/// count as resolved leaves (fail open). The result is returned even when
/// the root could not be fully resolved.
pub fn auto_plan_selections(
    index: &JeiIndex,
    root: &ItemKey,
    selections: &Selections,
    forced_raw: &HashSet<KeyHash>,
    max_depth: usize,
) -> AutoPlanOutcome {
    let mut planner = AutoPlanner {
        index,
        forced_raw,
        max_depth,
        working: selections.clone(),
        log: UndoLog::default(),
        path: Vec::new(),
    };
    // Failure here means the root's alternatives were exhausted; the
    // partial result is still returned.
    let _ = planner.resolve_item(root, 0);
    AutoPlanOutcome {
        recipe_by_key: planner.working.recipe_by_key,
        item_by_tag: planner.working.item_by_tag,
    }
}

/// One recorded selection write, with the value it replaced.
#[derive(Debug)]
enum UndoOp {
    SetRecipe {
        key_hash: KeyHash,
        prev: Option<RecipeId>,
    },
    SetTag {
        tag_id: TagId,
        prev: Option<ItemId>,
    },
}

/// Append-only log of selection writes with checkpoint/rollback.
#[derive(Debug, Default)]
struct UndoLog {
    ops: Vec<UndoOp>,
}

impl UndoLog {
    fn checkpoint(&self) -> usize {
        self.ops.len()
    }

    fn set_recipe(&mut self, selections: &mut Selections, key_hash: KeyHash, id: RecipeId) {
        let prev = selections.select_recipe(key_hash.clone(), id);
        self.ops.push(UndoOp::SetRecipe { key_hash, prev });
    }

    fn set_tag(&mut self, selections: &mut Selections, tag_id: TagId, item_id: ItemId) {
        let prev = selections.select_tag_item(tag_id.clone(), item_id);
        self.ops.push(UndoOp::SetTag { tag_id, prev });
    }

    /// Undo every write made since `mark`, most recent first.
    fn rollback_to(&mut self, mark: usize, selections: &mut Selections) {
        while self.ops.len() > mark {
            match self.ops.pop() {
                Some(UndoOp::SetRecipe { key_hash, prev }) => match prev {
                    Some(id) => {
                        selections.recipe_by_key.insert(key_hash, id);
                    }
                    None => {
                        selections.recipe_by_key.remove(&key_hash);
                    }
                },
                Some(UndoOp::SetTag { tag_id, prev }) => match prev {
                    Some(id) => {
                        selections.item_by_tag.insert(tag_id, id);
                    }
                    None => {
                        selections.item_by_tag.remove(&tag_id);
                    }
                },
                None => break,
            }
        }
    }
}

struct AutoPlanner<'a> {
    index: &'a JeiIndex,
    forced_raw: &'a HashSet<KeyHash>,
    max_depth: usize,
    working: Selections,
    log: UndoLog,
    path: Vec<PathFrame>,
}

impl AutoPlanner<'_> {
    /// Resolve production of one item. Returns false only when every
    /// alternative leads to an illegal cycle; missing data resolves as a
    /// leaf.
    fn resolve_item(&mut self, key: &ItemKey, depth: usize) -> bool {
        if depth > self.max_depth {
            return true;
        }
        let hash = key.key_hash();
        if self.forced_raw.contains(&hash) {
            return true;
        }
        if let Some(pos) = self.path.iter().position(|f| f.key_hash == hash) {
            // Path revisit: accept the loop only if it is self-sustaining.
            let factor = growth_factor(self.index, &self.path[pos..], key);
            return is_growth(&factor);
        }

        if let Some(chosen) = self.working.recipe_for(&hash).cloned() {
            // Committed selection: tried exactly once, no re-exploration.
            return self.descend(key, &hash, &chosen, depth);
        }

        let options = sort_recipe_options_for_item(
            self.index,
            key,
            self.index.recipes_producing(&hash).to_vec(),
        );
        if options.is_empty() {
            return true;
        }
        for option in options {
            let mark = self.log.checkpoint();
            self.log
                .set_recipe(&mut self.working, hash.clone(), option.clone());
            if self.descend(key, &hash, &option, depth) {
                return true;
            }
            self.log.rollback_to(mark, &mut self.working);
        }
        false
    }

    /// Expand one recipe's inputs. The path frame carries the recipe so
    /// revisits further down can classify the loop they close.
    fn descend(&mut self, key: &ItemKey, hash: &KeyHash, recipe_id: &RecipeId, depth: usize) -> bool {
        let Some(recipe) = self.index.recipe(recipe_id) else {
            // Selection pointing at an unknown recipe: stays a leaf.
            return true;
        };
        let stacks = extract_recipe_stacks(recipe, self.index.recipe_type_of(recipe));
        self.path.push(PathFrame {
            key_hash: hash.clone(),
            key: key.clone(),
            recipe_id: recipe_id.clone(),
        });
        let mut resolved = true;
        for stack in &stacks.inputs {
            let ok = match stack.kind {
                StackKind::Item => match stack.item_key() {
                    Some(child) => self.resolve_item(&child, depth + 1),
                    None => true,
                },
                StackKind::Tag => self.resolve_tag(&stack.id, depth),
                StackKind::Fluid => true,
            };
            if !ok {
                resolved = false;
                break;
            }
        }
        self.path.pop();
        resolved
    }

    /// Resolve a tag input: a committed candidate is tried once;
    /// otherwise candidates are tried in ascending id order, so an
    /// unconstrained tag defaults to its lexicographically first
    /// workable candidate.
    fn resolve_tag(&mut self, raw_tag_id: &str, depth: usize) -> bool {
        let tag_id = self.index.normalize_tag(raw_tag_id);
        if let Some(item) = self.working.item_for_tag(&tag_id).cloned() {
            return self.resolve_item(&ItemKey::new(item.as_str()), depth + 1);
        }
        let candidates = self.index.tag_candidates(raw_tag_id);
        if candidates.is_empty() {
            return true;
        }
        for candidate in candidates {
            let mark = self.log.checkpoint();
            self.log
                .set_tag(&mut self.working, tag_id.clone(), candidate.clone());
            if self.resolve_item(&ItemKey::new(candidate.as_str()), depth + 1) {
                return true;
            }
            self.log.rollback_to(mark, &mut self.working);
        }
        false
    }
}
