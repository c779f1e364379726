//! Craftplan Core -- exact arithmetic and the pack data model for the
//! crafting requirement planner.
//!
//! This crate holds everything the planner crate builds on:
//!
//! - [`rational::Rational`] -- exact big-integer fraction arithmetic. All
//!   planning math is rational; floats exist only at the display boundary.
//! - [`units`] -- rate/unit conversion among items, per-second, per-minute,
//!   per-hour, and machine counts.
//! - [`key`] -- [`key::ItemKey`] identity (id + meta + nbt) and its
//!   canonical [`key::KeyHash`], plus recipe slot [`key::Stack`]s.
//! - [`pack`] -- the already-parsed catalog: recipes, recipe types, slot
//!   IO roles, the open-ended params bag, and tag definitions.
//! - [`index::JeiIndex`] -- frozen lookup maps (recipes by id, producers
//!   by key hash, tag candidates) built once from a pack.
//! - [`extract`] -- slot classification into inputs/outputs/catalysts,
//!   per-craft amounts, and the deterministic recipe option ordering.
//!
//! The pack and index are read-only for the duration of any planning
//! call; callers swap in a rebuilt index instead of mutating in place.

pub mod extract;
pub mod index;
pub mod key;
pub mod pack;
pub mod rational;
pub mod units;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
