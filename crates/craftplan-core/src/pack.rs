//! Pack data model: the already-parsed catalog of items, recipes, and
//! recipe types handed to the planner by an upstream loader.
//!
//! These are serde structs with `#[serde(default)]` on everything the
//! wiki-derived source data routinely omits. Validation and file I/O live
//! upstream; the planner treats the pack as read-only for the duration of
//! a call.

use crate::key::{ItemId, RecipeId, RecipeTypeKey, Stack};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// IO role of a recipe slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotIo {
    Input,
    Output,
    Catalyst,
}

/// Declared IO role for one slot of a recipe type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDef {
    pub slot_id: String,
    pub io: SlotIo,
}

/// Open-ended recipe parameter bag. The recognized duration fields are
/// `time`, `duration`, `process_time`, and `processing_time` (seconds);
/// the first present, finite, positive one wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

impl RecipeParams {
    /// The declared craft time in seconds, or `None` when absent,
    /// non-finite, or <= 0.
    pub fn declared_time(&self) -> Option<f64> {
        [self.time, self.duration, self.process_time, self.processing_time]
            .into_iter()
            .flatten()
            .find(|t| t.is_finite() && *t > 0.0)
    }
}

/// A machine/process archetype: slot IO roles plus rendering and planner
/// hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeTypeDef {
    pub key: RecipeTypeKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    /// The item that represents the machine running this recipe type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<SlotDef>>,
    /// Default params applied when a recipe declares none of its own.
    #[serde(default)]
    pub defaults: RecipeParams,
    /// Explicit planner ranking override. Wins over all heuristics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planner_priority: Option<i64>,
}

impl RecipeTypeDef {
    pub fn new(key: impl Into<RecipeTypeKey>) -> Self {
        Self {
            key: key.into(),
            renderer: None,
            machine: None,
            slots: None,
            defaults: RecipeParams::default(),
            planner_priority: None,
        }
    }
}

/// Contents of one recipe slot: a single stack or several alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotContents {
    One(Stack),
    Many(Vec<Stack>),
}

impl SlotContents {
    pub fn iter(&self) -> impl Iterator<Item = &Stack> {
        match self {
            SlotContents::One(stack) => std::slice::from_ref(stack).iter(),
            SlotContents::Many(stacks) => stacks.iter(),
        }
    }
}

/// One recipe: its type, per-slot contents, and optional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(rename = "type")]
    pub recipe_type: RecipeTypeKey,
    /// Keyed by slot id. BTreeMap keeps slot iteration deterministic.
    #[serde(default)]
    pub slot_contents: BTreeMap<String, SlotContents>,
    #[serde(default)]
    pub params: RecipeParams,
}

impl Recipe {
    /// The declared craft time in seconds: the recipe's own params first,
    /// falling back to the type defaults.
    pub fn declared_time(&self, recipe_type: Option<&RecipeTypeDef>) -> Option<f64> {
        self.params
            .declared_time()
            .or_else(|| recipe_type.and_then(|t| t.defaults.declared_time()))
    }
}

/// An item definition. Only the fields the planner consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A tag definition: the set of item ids the tag resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDef {
    pub id: String,
    #[serde(default)]
    pub items: Vec<ItemId>,
}

/// Pack manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackManifest {
    pub game_id: String,
    /// Namespace assumed for tag ids written without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,
}

/// A complete parsed pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackData {
    pub manifest: PackManifest,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub recipe_types: Vec<RecipeTypeDef>,
    #[serde(default)]
    pub tags: Vec<TagDef>,
}

/// Canonicalize a tag id: strip a leading `#`, then prepend
/// `default_namespace` when the id carries no namespace of its own.
pub fn normalize_tag_id(tag_id: &str, default_namespace: &str) -> String {
    let tag_id = tag_id.strip_prefix('#').unwrap_or(tag_id);
    if tag_id.contains(':') {
        tag_id.to_string()
    } else {
        format!("{default_namespace}:{tag_id}")
    }
}
