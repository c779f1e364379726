//! Cycle classification shared by the auto-planner and the tree builder.
//!
//! When a walk revisits an item already on its open path, the closed loop
//! is classified by its net growth factor: the product, over each edge
//! `from -> to` of the loop, of how much `from` the chosen recipe yields
//! per craft divided by how much `to` it draws per craft. A factor
//! strictly above `1 + 1e-6` means the loop yields more of the looped
//! item than it consumes and is self-sustaining.

use craftplan_core::extract::extract_recipe_stacks;
use craftplan_core::index::JeiIndex;
use craftplan_core::key::{ItemKey, KeyHash, RecipeId, StackKind};
use craftplan_core::rational::Rational;

/// One frame of an open walk path: the item being expanded and the recipe
/// chosen to produce it.
#[derive(Debug, Clone)]
pub(crate) struct PathFrame {
    pub key_hash: KeyHash,
    pub key: ItemKey,
    pub recipe_id: RecipeId,
}

/// The growth-cycle acceptance threshold, `1 + 1e-6`, kept exact so
/// classification never routes through floats.
pub(crate) fn growth_threshold() -> Rational {
    &Rational::one() + &Rational::from_ratio(1, 1_000_000).unwrap_or_else(|_| Rational::zero())
}

/// Per-craft amount of `key` the recipe draws, counting exact item-stack
/// matches plus tag stacks whose candidate set contains the key's item
/// (only for plain keys, since tags resolve to bare item ids).
pub(crate) fn input_draw_per_craft(
    index: &JeiIndex,
    recipe_id: &RecipeId,
    key: &ItemKey,
) -> Rational {
    let Some(recipe) = index.recipe(recipe_id) else {
        return Rational::zero();
    };
    let stacks = extract_recipe_stacks(recipe, index.recipe_type_of(recipe));
    let mut total = Rational::zero();
    for stack in &stacks.inputs {
        let matches = match stack.kind {
            StackKind::Item => stack.matches_key(key),
            StackKind::Tag => {
                key.meta.is_none() && key.nbt.is_none() && index.tag_contains(&stack.id, &key.id)
            }
            StackKind::Fluid => false,
        };
        if matches {
            total = &total + &stack.amount;
        }
    }
    total
}

/// Per-craft amount of `key` the recipe yields.
pub(crate) fn output_per_craft(index: &JeiIndex, recipe_id: &RecipeId, key: &ItemKey) -> Rational {
    let Some(recipe) = index.recipe(recipe_id) else {
        return Rational::zero();
    };
    let stacks = extract_recipe_stacks(recipe, index.recipe_type_of(recipe));
    stacks
        .outputs
        .iter()
        .filter(|s| s.matches_key(key))
        .fold(Rational::zero(), |acc, s| &acc + &s.amount)
}

/// Net growth factor of the loop formed by `segment` (the open-path
/// frames from the first occurrence of the revisited item onward) closed
/// back at `closing_key`. Returns `None` when any edge has a zero yield
/// or zero draw, making the loop unclassifiable.
pub(crate) fn growth_factor(
    index: &JeiIndex,
    segment: &[PathFrame],
    closing_key: &ItemKey,
) -> Option<Rational> {
    let mut factor = Rational::one();
    for (i, from) in segment.iter().enumerate() {
        let to_key = segment
            .get(i + 1)
            .map(|frame| &frame.key)
            .unwrap_or(closing_key);
        let yielded = output_per_craft(index, &from.recipe_id, &from.key);
        let drawn = input_draw_per_craft(index, &from.recipe_id, to_key);
        if yielded.is_zero() || drawn.is_zero() {
            return None;
        }
        factor = (&factor * &yielded).checked_div(&drawn).ok()?;
    }
    Some(factor)
}

/// Whether a classified factor qualifies as a growth cycle.
pub(crate) fn is_growth(factor: &Option<Rational>) -> bool {
    factor
        .as_ref()
        .is_some_and(|f| *f > growth_threshold())
}
