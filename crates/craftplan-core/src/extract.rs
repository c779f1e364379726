//! Recipe stack extraction and deterministic recipe ranking.
//!
//! Classification uses the recipe type's declared per-slot IO roles when
//! present and falls back to a slot-name heuristic otherwise. Ranking
//! produces the strict total order the planner and UI both rely on: for
//! identical inputs the option list is always the same.

use crate::index::JeiIndex;
use crate::key::{ItemKey, RecipeId, Stack, StackKind};
use crate::pack::{Recipe, RecipeTypeDef, SlotIo};
use crate::rational::Rational;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A recipe's slots classified into consumed inputs, produced outputs,
/// and catalysts held by the machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeStacks {
    pub inputs: Vec<Stack>,
    pub outputs: Vec<Stack>,
    pub catalysts: Vec<Stack>,
}

/// Slot-name fallback used when a recipe type declares no slot metadata:
/// `out*` or `*output*` means output, everything else is an input.
fn slot_io_heuristic(slot_id: &str) -> SlotIo {
    let lower = slot_id.to_ascii_lowercase();
    if lower.starts_with("out") || lower.contains("output") {
        SlotIo::Output
    } else {
        SlotIo::Input
    }
}

/// Classify every stack of `recipe` into inputs/outputs/catalysts.
///
/// Catalyst stacks must be item-kind; a tag or fluid stack in a declared
/// catalyst slot is treated as an input instead.
pub fn extract_recipe_stacks(recipe: &Recipe, recipe_type: Option<&RecipeTypeDef>) -> RecipeStacks {
    let declared: HashMap<&str, SlotIo> = recipe_type
        .and_then(|t| t.slots.as_ref())
        .map(|slots| {
            slots
                .iter()
                .map(|s| (s.slot_id.as_str(), s.io))
                .collect()
        })
        .unwrap_or_default();

    let mut stacks = RecipeStacks::default();
    for (slot_id, contents) in &recipe.slot_contents {
        let io = declared
            .get(slot_id.as_str())
            .copied()
            .unwrap_or_else(|| slot_io_heuristic(slot_id));
        for stack in contents.iter() {
            match io {
                SlotIo::Input => stacks.inputs.push(stack.clone()),
                SlotIo::Output => stacks.outputs.push(stack.clone()),
                SlotIo::Catalyst if stack.kind == StackKind::Item => {
                    stacks.catalysts.push(stack.clone())
                }
                SlotIo::Catalyst => stacks.inputs.push(stack.clone()),
            }
        }
    }
    stacks
}

/// Total amount of `key` this recipe produces per craft. Zero when the
/// recipe does not output the key.
pub fn per_craft_output_amount_for(
    recipe: &Recipe,
    recipe_type: Option<&RecipeTypeDef>,
    key: &ItemKey,
) -> Rational {
    sum_matching(&extract_recipe_stacks(recipe, recipe_type).outputs, key)
}

/// Total amount of `key` this recipe consumes per craft, counting only
/// exact item-stack matches.
pub fn per_craft_input_amount_for(
    recipe: &Recipe,
    recipe_type: Option<&RecipeTypeDef>,
    key: &ItemKey,
) -> Rational {
    sum_matching(&extract_recipe_stacks(recipe, recipe_type).inputs, key)
}

fn sum_matching(stacks: &[Stack], key: &ItemKey) -> Rational {
    stacks
        .iter()
        .filter(|s| s.matches_key(key))
        .fold(Rational::zero(), |acc, s| &acc + &s.amount)
}

/// Planner ranking of a recipe type: an explicit `planner_priority` wins;
/// informational renderers rank far below everything; machine-backed
/// types rank above plain ones.
pub fn recipe_type_planner_priority(recipe_type: Option<&RecipeTypeDef>) -> i64 {
    let Some(ty) = recipe_type else {
        return 0;
    };
    if let Some(priority) = ty.planner_priority {
        return priority;
    }
    if let Some(renderer) = &ty.renderer {
        let lower = renderer.to_ascii_lowercase();
        if lower.contains("info") || lower.contains("doc") {
            return -1000;
        }
    }
    if ty.machine.is_some() { 10 } else { 0 }
}

#[derive(Debug, PartialEq)]
struct RankKey {
    priority: i64,
    has_time: bool,
    time: f64,
    input_count: usize,
}

impl RankKey {
    /// Priority desc, declared-time-first, time asc, input count asc.
    /// Ties fall through to the id comparison in the caller.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.has_time.cmp(&self.has_time))
            .then_with(|| self.time.partial_cmp(&other.time).unwrap_or(Ordering::Equal))
            .then_with(|| self.input_count.cmp(&other.input_count))
    }
}

fn rank_key(index: &JeiIndex, key: &ItemKey, recipe_id: &RecipeId) -> RankKey {
    let Some(recipe) = index.recipe(recipe_id) else {
        // Unknown recipe id: rank last within its id position.
        return RankKey {
            priority: i64::MIN,
            has_time: false,
            time: f64::INFINITY,
            input_count: usize::MAX,
        };
    };
    let recipe_type = index.recipe_type(&recipe.recipe_type);
    let stacks = extract_recipe_stacks(recipe, recipe_type);
    let time = recipe.declared_time(recipe_type);
    let outputs_key = stacks.outputs.iter().any(|s| s.matches_key(key));
    RankKey {
        priority: recipe_type_planner_priority(recipe_type),
        has_time: time.is_some(),
        time: time.unwrap_or(f64::INFINITY),
        // A recipe that does not actually output the key is penalized to
        // the worst input count.
        input_count: if outputs_key {
            stacks.inputs.len()
        } else {
            usize::MAX
        },
    }
}

/// Sort recipe options for an item into the planner's strict total order:
/// `(priority desc, has declared time desc, time asc, input count asc,
/// id asc)`. Stable, reproducible, and idempotent on its own output.
pub fn sort_recipe_options_for_item(
    index: &JeiIndex,
    key: &ItemKey,
    mut recipe_ids: Vec<RecipeId>,
) -> Vec<RecipeId> {
    recipe_ids.sort_by(|a, b| {
        rank_key(index, key, a)
            .cmp(&rank_key(index, key, b))
            .then_with(|| a.cmp(b))
    });
    recipe_ids
}
