//! Item identity and recipe slot stacks.
//!
//! An [`ItemKey`] is the exact identity of an item variant: id plus
//! optional metadata value plus optional NBT payload. Planner maps are
//! keyed by the canonical [`KeyHash`] string rather than the key itself,
//! because NBT payloads (arbitrary JSON) are not hashable.

use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta] $name:ident),* $(,)?) => {
        $(
            #[$doc]
            #[derive(
                Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub String);

            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl From<&str> for $name {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }

            impl From<String> for $name {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

string_id! {
    /// Identifies an item in the pack, e.g. `"minecraft:iron_ingot"`.
    ItemId,
    /// Identifies a tag, e.g. `"forge:ores/iron"`.
    TagId,
    /// Identifies a fluid, e.g. `"minecraft:water"`.
    FluidId,
    /// Identifies a recipe.
    RecipeId,
    /// Identifies a recipe type (machine/process archetype).
    RecipeTypeKey,
}

/// Canonical string hash of an [`ItemKey`]. Equal keys hash equal; used
/// as the map key everywhere in the planner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyHash(pub String);

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exact identity of an item variant. Two keys are equal iff id, meta,
/// and nbt all match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemKey {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<serde_json::Value>,
}

impl ItemKey {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            meta: None,
            nbt: None,
        }
    }

    pub fn with_meta(id: impl Into<ItemId>, meta: i32) -> Self {
        Self {
            id: id.into(),
            meta: Some(meta),
            nbt: None,
        }
    }

    /// Canonical hash string: `id`, then `@meta` when present, then `#` and
    /// the NBT JSON when present. `serde_json` keeps object keys sorted
    /// (BTreeMap-backed), so equal NBT values serialize identically.
    pub fn key_hash(&self) -> KeyHash {
        let mut s = self.id.0.clone();
        if let Some(meta) = self.meta {
            s.push('@');
            s.push_str(&meta.to_string());
        }
        if let Some(nbt) = &self.nbt {
            s.push('#');
            s.push_str(&nbt.to_string());
        }
        KeyHash(s)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_hash())
    }
}

/// What kind of thing a recipe slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackKind {
    Item,
    Tag,
    Fluid,
}

/// An amount of an item, tag, or fluid consumed or produced by a recipe slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub kind: StackKind,
    pub id: String,
    pub amount: Rational,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Stack {
    pub fn item(id: &str, amount: Rational) -> Self {
        Self {
            kind: StackKind::Item,
            id: id.to_string(),
            amount,
            meta: None,
            nbt: None,
            unit: None,
        }
    }

    pub fn tag(id: &str, amount: Rational) -> Self {
        Self {
            kind: StackKind::Tag,
            id: id.to_string(),
            amount,
            meta: None,
            nbt: None,
            unit: None,
        }
    }

    pub fn fluid(id: &str, amount: Rational) -> Self {
        Self {
            kind: StackKind::Fluid,
            id: id.to_string(),
            amount,
            meta: None,
            nbt: None,
            unit: None,
        }
    }

    /// The item key this stack refers to, when it is an item stack.
    pub fn item_key(&self) -> Option<ItemKey> {
        if self.kind != StackKind::Item {
            return None;
        }
        Some(ItemKey {
            id: ItemId(self.id.clone()),
            meta: self.meta,
            nbt: self.nbt.clone(),
        })
    }

    /// Exact identity match against an item key (id, meta, and nbt).
    pub fn matches_key(&self, key: &ItemKey) -> bool {
        self.kind == StackKind::Item
            && self.id == key.id.0
            && self.meta == key.meta
            && self.nbt == key.nbt
    }
}
