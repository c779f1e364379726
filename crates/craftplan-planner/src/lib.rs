//! Craftplan Planner -- decision enumeration, automatic recipe selection,
//! and requirement tree expansion over a frozen [`craftplan_core`] index.
//!
//! The planning surface is three calls, all pure with respect to the
//! index:
//!
//! - [`decisions::compute_planner_decisions`] -- walk the dependency graph
//!   from a root item and report every open choice (ambiguous recipe,
//!   ambiguous tag) the user still has to make.
//! - [`autoplan::auto_plan_selections`] -- resolve those choices
//!   automatically by backtracking over the ranked options, rejecting
//!   selections that close non-growth cycles.
//! - [`tree::build_requirement_tree`] -- expand the committed selections
//!   into an exact per-item requirement tree with raw-item, fluid, and
//!   catalyst totals.
//!
//! All three degrade instead of failing: unresolvable items become raw
//! leaves, and a fully exhausted auto-plan returns the untouched input
//! selections.

pub mod autoplan;
pub mod decisions;
pub mod selections;
pub mod tree;

mod cycle;

pub use autoplan::{auto_plan_selections, AutoPlanOutcome};
pub use decisions::{compute_planner_decisions, PlannerDecision, DEFAULT_MAX_DEPTH};
pub use selections::Selections;
pub use tree::{build_requirement_tree, RequirementNode, RequirementTree};
