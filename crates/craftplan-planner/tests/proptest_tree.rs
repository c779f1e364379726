//! Property tests for requirement tree expansion over random linear
//! recipe chains.

use std::collections::HashSet;

use craftplan_core::index::JeiIndex;
use craftplan_core::key::{ItemKey, Stack};
use craftplan_core::rational::Rational;
use craftplan_core::test_utils::*;
use craftplan_core::units::AmountUnit;
use craftplan_planner::tree::{count_cycle_nodes, RequirementNode};
use craftplan_planner::{build_requirement_tree, Selections, DEFAULT_MAX_DEPTH};
use proptest::prelude::*;

fn n(v: i64) -> Rational {
    Rational::from_integer(v)
}

/// Build a chain item0 <- item1 <- ... <- itemN where each link consumes
/// `inputs[i]` of the next item and yields `outputs[i]` of the previous.
fn chain_index(ratios: &[(u8, u8)]) -> JeiIndex {
    let mut pack = pack();
    plain_type(&mut pack, "crafting");
    for (i, (input, output)) in ratios.iter().enumerate() {
        pack.recipes.push(recipe(
            &format!("r{i}"),
            "crafting",
            &[("in0", Stack::item(&format!("item{}", i + 1), n(i64::from(*input))))],
            &[("out0", Stack::item(&format!("item{i}"), n(i64::from(*output))))],
        ));
    }
    JeiIndex::build(&pack)
}

fn arb_ratios() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((1u8..=9, 1u8..=9), 1..=8)
}

proptest! {
    /// The single leaf total equals the target scaled by every
    /// input/output ratio along the chain, exactly.
    #[test]
    fn chain_leaf_total_is_product_of_ratios(ratios in arb_ratios(), target in 1i64..=1000) {
        let index = chain_index(&ratios);
        let tree = build_requirement_tree(
            &index,
            &ItemKey::new("item0"),
            &n(target),
            AmountUnit::Items,
            &Selections::new(),
            &HashSet::new(),
            DEFAULT_MAX_DEPTH,
        );
        let mut expected = n(target);
        for (input, output) in &ratios {
            expected = (&expected * &n(i64::from(*input)))
                .checked_div(&n(i64::from(*output)))
                .unwrap();
        }
        let leaf = ItemKey::new(format!("item{}", ratios.len())).key_hash();
        prop_assert_eq!(tree.leaf_item_totals.len(), 1);
        prop_assert_eq!(&tree.leaf_item_totals[&leaf].amount, &expected);
        prop_assert_eq!(count_cycle_nodes(&tree.root), 0);
    }

    /// Halving the target exactly halves every leaf total: expansion is
    /// linear in the target amount.
    #[test]
    fn expansion_is_linear_in_target(ratios in arb_ratios(), target in 1i64..=1000) {
        let index = chain_index(&ratios);
        let root = ItemKey::new("item0");
        let build = |amount: Rational| {
            build_requirement_tree(
                &index,
                &root,
                &amount,
                AmountUnit::Items,
                &Selections::new(),
                &HashSet::new(),
                DEFAULT_MAX_DEPTH,
            )
        };
        let double = build(n(2 * target));
        let single = build(n(target));
        for (hash, total) in &single.leaf_item_totals {
            let doubled = &double.leaf_item_totals[hash].amount;
            prop_assert_eq!(doubled, &(&total.amount * &n(2)));
        }
    }

    /// Node amounts are never negative and every interior node carries
    /// the recipe it was expanded through.
    #[test]
    fn nodes_are_wellformed(ratios in arb_ratios(), target in 0i64..=1000) {
        let index = chain_index(&ratios);
        let tree = build_requirement_tree(
            &index,
            &ItemKey::new("item0"),
            &n(target),
            AmountUnit::Items,
            &Selections::new(),
            &HashSet::new(),
            DEFAULT_MAX_DEPTH,
        );
        fn check(node: &RequirementNode) -> Result<(), TestCaseError> {
            prop_assert!(node.amount() >= &Rational::zero());
            if let RequirementNode::Item(item) = node {
                if !item.children.is_empty() {
                    prop_assert!(item.recipe_id_used.is_some());
                }
                for child in &item.children {
                    check(child)?;
                }
            }
            Ok(())
        }
        check(&tree.root)?;
    }
}
