//! Exact-quantity requirement tree expansion.
//!
//! Given committed selections, expands a root item into the full tree of
//! per-item requirements for a target output rate, aggregating raw-item,
//! fluid, and catalyst totals along the way. All quantities are exact
//! rationals.
//!
//! Rates are normalized to a fixed per-minute internal basis on entry:
//! per-second targets multiply by 60, per-hour targets divide by 60, and
//! count units pass through. Downstream displays rely on this convention.

use crate::cycle::{growth_factor, input_draw_per_craft, is_growth, PathFrame};
use crate::selections::Selections;
use craftplan_core::extract::{
    extract_recipe_stacks, per_craft_output_amount_for, sort_recipe_options_for_item,
};
use craftplan_core::index::JeiIndex;
use craftplan_core::key::{FluidId, ItemId, ItemKey, KeyHash, RecipeId, StackKind};
use craftplan_core::rational::Rational;
use craftplan_core::units::AmountUnit;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A node of the requirement tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementNode {
    Item(ItemNode),
    /// Fluids are always leaves; they are never expanded.
    Fluid(FluidNode),
}

impl RequirementNode {
    pub fn node_id(&self) -> u64 {
        match self {
            RequirementNode::Item(n) => n.node_id,
            RequirementNode::Fluid(n) => n.node_id,
        }
    }

    pub fn amount(&self) -> &Rational {
        match self {
            RequirementNode::Item(n) => &n.amount,
            RequirementNode::Fluid(n) => &n.amount,
        }
    }
}

/// An item requirement, possibly expanded through a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemNode {
    pub node_id: u64,
    pub item_key: ItemKey,
    pub amount: Rational,
    /// The recipe this node was expanded through, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id_used: Option<RecipeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_item_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_item_name: Option<String>,
    #[serde(default)]
    pub children: Vec<RequirementNode>,
    /// Catalyst stacks held by the machine, per machine (not per craft).
    #[serde(default)]
    pub catalysts: Vec<CatalystRequirement>,
    /// True when this node closes a path cycle. Cycle nodes never have
    /// children.
    pub cycle: bool,
    /// True when the cycle was accepted as a growth cycle and seeded with
    /// the predecessor's per-craft draw instead of the full demand.
    #[serde(default)]
    pub cycle_seed: bool,
    /// The keys forming the loop, first occurrence through this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_keys: Option<Vec<ItemKey>>,
    /// Net growth factor of the loop, when classifiable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_factor: Option<Rational>,
    /// The full downstream demand at this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_amount_needed: Option<Rational>,
    /// The amount actually seeded into the raw-item ledger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_seed_amount: Option<Rational>,
}

/// A fluid requirement leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidNode {
    pub node_id: u64,
    pub id: FluidId,
    pub amount: Rational,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A catalyst held by a machine. Aggregated by max, not sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalystRequirement {
    pub item_id: ItemId,
    pub amount: Rational,
}

/// Aggregated total for one raw item the tree bottoms out at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafItemTotal {
    pub item_key: ItemKey,
    pub amount: Rational,
}

/// Aggregated total for one fluid leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafFluidTotal {
    pub amount: Rational,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// The expanded tree plus its leaf and catalyst ledgers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementTree {
    pub root: RequirementNode,
    pub leaf_item_totals: HashMap<KeyHash, LeafItemTotal>,
    pub leaf_fluid_totals: HashMap<FluidId, LeafFluidTotal>,
    pub catalysts: HashMap<ItemId, Rational>,
}

/// Expand `root_key` into an exact requirement tree for `target_amount`
/// of `target_unit`.
///
/// Never fails: missing recipes, empty tags, rejected cycles, and the
/// depth limit all degrade to leaves that feed the raw-item ledger.
pub fn build_requirement_tree(
    index: &JeiIndex,
    root_key: &ItemKey,
    target_amount: &Rational,
    target_unit: AmountUnit,
    selections: &Selections,
    forced_raw: &HashSet<KeyHash>,
    max_depth: usize,
) -> RequirementTree {
    // Fixed per-minute internal basis. The divisor is a nonzero constant,
    // so the fallback branch is unreachable.
    let amount = match target_unit {
        AmountUnit::PerSecond => target_amount * &Rational::from_integer(60),
        AmountUnit::PerHour => target_amount
            .checked_div(&Rational::from_integer(60))
            .unwrap_or_else(|_| Rational::zero()),
        AmountUnit::PerMinute | AmountUnit::Items | AmountUnit::Machines => target_amount.clone(),
    };
    let mut builder = TreeBuilder {
        index,
        selections,
        forced_raw,
        max_depth,
        next_node_id: 0,
        path: Vec::new(),
        leaf_item_totals: HashMap::new(),
        leaf_fluid_totals: HashMap::new(),
        catalysts: HashMap::new(),
    };
    let root = builder.build_for_item(root_key, amount, 0);
    RequirementTree {
        root: RequirementNode::Item(root),
        leaf_item_totals: builder.leaf_item_totals,
        leaf_fluid_totals: builder.leaf_fluid_totals,
        catalysts: builder.catalysts,
    }
}

struct TreeBuilder<'a> {
    index: &'a JeiIndex,
    selections: &'a Selections,
    forced_raw: &'a HashSet<KeyHash>,
    max_depth: usize,
    next_node_id: u64,
    path: Vec<PathFrame>,
    leaf_item_totals: HashMap<KeyHash, LeafItemTotal>,
    leaf_fluid_totals: HashMap<FluidId, LeafFluidTotal>,
    catalysts: HashMap<ItemId, Rational>,
}

impl TreeBuilder<'_> {
    /// Sequential ids in construction order.
    fn alloc_node_id(&mut self) -> u64 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    fn leaf(&mut self, node_id: u64, key: &ItemKey, amount: Rational) -> ItemNode {
        self.add_item_total(key, &amount);
        ItemNode {
            node_id,
            item_key: key.clone(),
            amount,
            recipe_id_used: None,
            machine_item_id: None,
            machine_item_name: None,
            children: Vec::new(),
            catalysts: Vec::new(),
            cycle: false,
            cycle_seed: false,
            cycle_keys: None,
            cycle_factor: None,
            cycle_amount_needed: None,
            cycle_seed_amount: None,
        }
    }

    fn add_item_total(&mut self, key: &ItemKey, amount: &Rational) {
        if amount.is_zero() {
            return;
        }
        let entry = self
            .leaf_item_totals
            .entry(key.key_hash())
            .or_insert_with(|| LeafItemTotal {
                item_key: key.clone(),
                amount: Rational::zero(),
            });
        entry.amount = &entry.amount + amount;
    }

    fn add_fluid_total(&mut self, id: &FluidId, amount: &Rational, unit: Option<&String>) {
        if amount.is_zero() {
            return;
        }
        let entry = self
            .leaf_fluid_totals
            .entry(id.clone())
            .or_insert_with(|| LeafFluidTotal {
                amount: Rational::zero(),
                unit: unit.cloned(),
            });
        entry.amount = &entry.amount + amount;
    }

    fn build_for_item(&mut self, key: &ItemKey, amount_needed: Rational, depth: usize) -> ItemNode {
        let node_id = self.alloc_node_id();
        let hash = key.key_hash();

        if self.forced_raw.contains(&hash) || depth > self.max_depth {
            return self.leaf(node_id, key, amount_needed);
        }

        if let Some(pos) = self.path.iter().position(|f| f.key_hash == hash) {
            return self.cycle_node(node_id, key, amount_needed, pos);
        }

        // An explicit selection wins; a unique producer auto-resolves;
        // anything else stays a leaf.
        let options = sort_recipe_options_for_item(
            self.index,
            key,
            self.index.recipes_producing(&hash).to_vec(),
        );
        let chosen = match self.selections.recipe_for(&hash) {
            Some(id) => Some(id.clone()),
            None if options.len() == 1 => Some(options[0].clone()),
            None => None,
        };
        let Some(recipe_id) = chosen else {
            return self.leaf(node_id, key, amount_needed);
        };
        let Some(recipe) = self.index.recipe(&recipe_id) else {
            return self.leaf(node_id, key, amount_needed);
        };
        let recipe_type = self.index.recipe_type_of(recipe);
        let stacks = extract_recipe_stacks(recipe, recipe_type);

        // Crafts needed to cover the demand. A recipe that does not
        // actually output the key yields a degenerate zero subtree
        // instead of a division by zero.
        let per_craft = per_craft_output_amount_for(recipe, recipe_type, key);
        let multiplier = amount_needed
            .checked_div(&per_craft)
            .unwrap_or_else(|_| Rational::zero());

        let machine_item_id = recipe_type.and_then(|t| t.machine.clone());
        let machine_item_name = machine_item_id
            .as_ref()
            .and_then(|id| self.index.item_name(id))
            .map(String::from);

        let mut catalysts = Vec::new();
        for stack in &stacks.catalysts {
            let item_id = ItemId(stack.id.clone());
            if !amount_needed.is_zero() {
                let entry = self
                    .catalysts
                    .entry(item_id.clone())
                    .or_insert_with(Rational::zero);
                *entry = entry.clone().max(stack.amount.clone());
            }
            catalysts.push(CatalystRequirement {
                item_id,
                amount: stack.amount.clone(),
            });
        }

        self.path.push(PathFrame {
            key_hash: hash,
            key: key.clone(),
            recipe_id: recipe_id.clone(),
        });
        let mut children = Vec::new();
        for stack in &stacks.inputs {
            let need = &stack.amount * &multiplier;
            match stack.kind {
                StackKind::Item => {
                    if let Some(child_key) = stack.item_key() {
                        let child = self.build_for_item(&child_key, need, depth + 1);
                        children.push(RequirementNode::Item(child));
                    }
                }
                StackKind::Tag => {
                    let child = self.build_for_tag(&stack.id, need, depth);
                    children.push(RequirementNode::Item(child));
                }
                StackKind::Fluid => {
                    let fluid_id = FluidId(stack.id.clone());
                    self.add_fluid_total(&fluid_id, &need, stack.unit.as_ref());
                    children.push(RequirementNode::Fluid(FluidNode {
                        node_id: self.alloc_node_id(),
                        id: fluid_id,
                        amount: need,
                        unit: stack.unit.clone(),
                    }));
                }
            }
        }
        self.path.pop();

        ItemNode {
            node_id,
            item_key: key.clone(),
            amount: amount_needed,
            recipe_id_used: Some(recipe_id),
            machine_item_id,
            machine_item_name,
            children,
            catalysts,
            cycle: false,
            cycle_seed: false,
            cycle_keys: None,
            cycle_factor: None,
            cycle_amount_needed: None,
            cycle_seed_amount: None,
        }
    }

    /// A tag input resolves through the committed selection or a unique
    /// candidate; an unresolvable tag becomes a leaf under `#tag` so the
    /// requirement still shows up in the tree and the ledger.
    fn build_for_tag(&mut self, raw_tag_id: &str, amount_needed: Rational, depth: usize) -> ItemNode {
        let tag_id = self.index.normalize_tag(raw_tag_id);
        let candidates = self.index.tag_candidates(raw_tag_id);
        let item = match self.selections.item_for_tag(&tag_id) {
            Some(item) => Some(item.clone()),
            None if candidates.len() == 1 => Some(candidates[0].clone()),
            None => None,
        };
        match item {
            Some(item) => self.build_for_item(&ItemKey::new(item.as_str()), amount_needed, depth + 1),
            None => {
                let node_id = self.alloc_node_id();
                let pseudo = ItemKey::new(format!("#{tag_id}"));
                self.leaf(node_id, &pseudo, amount_needed)
            }
        }
    }

    /// A path revisit: classify the loop and seed the ledger instead of
    /// recursing. Growth cycles seed the predecessor's per-craft draw so
    /// the tree never encodes the loop's infinite geometric series;
    /// anything else seeds the full demand as a terminating fallback.
    fn cycle_node(
        &mut self,
        node_id: u64,
        key: &ItemKey,
        amount_needed: Rational,
        pos: usize,
    ) -> ItemNode {
        let segment = &self.path[pos..];
        let factor = growth_factor(self.index, segment, key);
        let growth = is_growth(&factor);
        let seed = if amount_needed.is_zero() {
            Rational::zero()
        } else if growth {
            let draw = self
                .path
                .last()
                .map(|pred| input_draw_per_craft(self.index, &pred.recipe_id, key))
                .unwrap_or_else(Rational::zero);
            if draw.is_zero() { amount_needed.clone() } else { draw }
        } else {
            amount_needed.clone()
        };
        let mut cycle_keys: Vec<ItemKey> = segment.iter().map(|f| f.key.clone()).collect();
        cycle_keys.push(key.clone());

        self.add_item_total(key, &seed);
        ItemNode {
            node_id,
            item_key: key.clone(),
            amount: amount_needed.clone(),
            recipe_id_used: None,
            machine_item_id: None,
            machine_item_name: None,
            children: Vec::new(),
            catalysts: Vec::new(),
            cycle: true,
            cycle_seed: growth,
            cycle_keys: Some(cycle_keys),
            cycle_factor: factor,
            cycle_amount_needed: Some(amount_needed),
            cycle_seed_amount: Some(seed),
        }
    }
}

/// Count the cycle-flagged nodes in a tree. Callers use this to check
/// whether a plan is loop-free.
pub fn count_cycle_nodes(node: &RequirementNode) -> usize {
    match node {
        RequirementNode::Item(item) => {
            let own = usize::from(item.cycle);
            own + item.children.iter().map(count_cycle_nodes).sum::<usize>()
        }
        RequirementNode::Fluid(_) => 0,
    }
}
