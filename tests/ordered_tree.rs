use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use size_bst::{OrderedTree, Rank};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys drawn from a range smaller than `TEST_SIZE` so that inserts collide.
fn key_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

fn tree_from(entries: &[(i64, i64)]) -> (OrderedTree<i64, i64>, BTreeMap<i64, i64>) {
    let mut tree = OrderedTree::new();
    let mut model = BTreeMap::new();
    for &(k, v) in entries {
        tree.insert(k, v);
        model.insert(k, v);
    }
    (tree, model)
}

/// Smallest height any binary tree with `len` nodes can have.
fn minimum_height(len: usize) -> usize {
    (usize::BITS - len.leading_zeros()) as usize
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    RemoveMin,
    RemoveMax,
    Floor(i64),
    Ceiling(i64),
    Rank(i64),
    Balance,
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| TreeOp::Insert(k, v)),
        3 => key_strategy().prop_map(TreeOp::Remove),
        2 => key_strategy().prop_map(TreeOp::Get),
        1 => key_strategy().prop_map(TreeOp::ContainsKey),
        1 => Just(TreeOp::RemoveMin),
        1 => Just(TreeOp::RemoveMax),
        1 => key_strategy().prop_map(TreeOp::Floor),
        1 => key_strategy().prop_map(TreeOp::Ceiling),
        1 => key_strategy().prop_map(TreeOp::Rank),
        1 => Just(TreeOp::Balance),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both OrderedTree and
    /// BTreeMap and asserts identical results at every step.
    #[test]
    fn tree_ops_match_btreemap(ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE)) {
        let mut tree: OrderedTree<i64, i64> = OrderedTree::new();
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                TreeOp::Insert(k, v) => {
                    prop_assert_eq!(tree.insert(*k, *v), model.insert(*k, *v), "insert({}, {})", k, v);
                }
                TreeOp::Remove(k) => {
                    prop_assert_eq!(tree.remove(k), model.remove(k), "remove({})", k);
                }
                TreeOp::Get(k) => {
                    prop_assert_eq!(tree.get(k), model.get(k), "get({})", k);
                }
                TreeOp::ContainsKey(k) => {
                    prop_assert_eq!(tree.contains_key(k), model.contains_key(k), "contains_key({})", k);
                }
                TreeOp::RemoveMin => {
                    prop_assert_eq!(tree.remove_min(), model.pop_first(), "remove_min");
                }
                TreeOp::RemoveMax => {
                    prop_assert_eq!(tree.remove_max(), model.pop_last(), "remove_max");
                }
                TreeOp::Floor(k) => {
                    let expected = model.range(..=*k).next_back().map(|(key, _)| key);
                    prop_assert_eq!(tree.floor(k), expected, "floor({})", k);
                }
                TreeOp::Ceiling(k) => {
                    let expected = model.range(*k..).next().map(|(key, _)| key);
                    prop_assert_eq!(tree.ceiling(k), expected, "ceiling({})", k);
                }
                TreeOp::Rank(k) => {
                    prop_assert_eq!(tree.rank(k), model.range(..*k).count(), "rank({})", k);
                }
                TreeOp::Balance => {
                    tree.balance();
                    prop_assert_eq!(tree.height(), minimum_height(tree.len()), "height after balance");
                }
            }
            prop_assert_eq!(tree.len(), model.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(tree.is_empty(), model.is_empty(), "is_empty mismatch after {:?}", op);
        }

        prop_assert!(tree.check_invariants().is_ok(), "{:?}", tree.check_invariants());
        prop_assert!(tree.iter().eq(model.iter()));
    }

    /// Keys come out strictly ascending and match exactly the inserted set.
    #[test]
    fn keys_match_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let (tree, model) = tree_from(&entries);

        let keys: Vec<i64> = tree.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(keys, model.keys().copied().collect::<Vec<_>>());
        prop_assert!(tree.values().eq(model.values()));
        prop_assert_eq!(tree.keys().len(), model.len());
    }

    /// Every surviving key maps to the value it was last given.
    #[test]
    fn remove_keeps_other_entries(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        removals in proptest::collection::vec(key_strategy(), TEST_SIZE / 4),
    ) {
        let (mut tree, mut model) = tree_from(&entries);

        for k in &removals {
            let before = tree.len();
            let was_present = model.remove(k).is_some();
            prop_assert_eq!(tree.remove(k).is_some(), was_present);
            prop_assert!(!tree.contains_key(k));
            prop_assert_eq!(tree.len(), before - usize::from(was_present));
        }

        prop_assert!(tree.check_invariants().is_ok());
        for (k, v) in &model {
            prop_assert_eq!(tree.get(k), Some(v));
        }
    }

    /// Range iteration agrees with BTreeMap for inclusive and half-open bounds.
    #[test]
    fn ranges_match_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        lo in key_strategy(),
        width in 0i64..500,
    ) {
        let (tree, model) = tree_from(&entries);
        let hi = lo + width;

        prop_assert!(tree.range(lo..=hi).eq(model.range(lo..=hi)));
        prop_assert!(tree.range(lo..hi).eq(model.range(lo..hi)));
        prop_assert!(tree.range(..hi).eq(model.range(..hi)));
        prop_assert!(tree.range(lo..).eq(model.range(lo..)));
        prop_assert!(tree.keys_in(&lo, &hi).eq(model.range(lo..=hi).map(|(k, _)| k)));
        prop_assert_eq!(tree.count_in(&lo, &hi), model.range(lo..=hi).count());
        prop_assert_eq!(tree.keys_in(&hi, &lo).count(), usize::from(width == 0 && model.contains_key(&lo)));
    }
}

// ─── Order-statistic operations ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn select_matches_sorted_vec(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let (tree, model) = tree_from(&entries);
        let sorted: Vec<(&i64, &i64)> = model.iter().collect();

        for (rank, &(k, v)) in sorted.iter().enumerate() {
            prop_assert_eq!(tree.select(rank), Some(k));
            prop_assert_eq!(tree.select_entry(rank), Some((k, v)));
            prop_assert_eq!(&tree[Rank(rank)], v);
        }
        prop_assert_eq!(tree.select(sorted.len()), None);
    }

    #[test]
    fn rank_of_select_roundtrip(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let (tree, _) = tree_from(&entries);
        for k in 0..tree.len() {
            let key = *tree.select(k).unwrap();
            prop_assert_eq!(tree.rank(&key), k);
        }
    }

    #[test]
    fn balance_preserves_contents(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let (mut tree, model) = tree_from(&entries);
        let before: Vec<(i64, i64)> = tree.iter().map(|(k, v)| (*k, *v)).collect();

        tree.balance();

        prop_assert!(tree.check_invariants().is_ok());
        prop_assert_eq!(tree.len(), model.len());
        prop_assert!(tree.height() <= minimum_height(tree.len()));
        prop_assert_eq!(tree.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), before);

        // A second rebuild of the same key set reproduces the same shape.
        let shape: Vec<i64> = tree.level_order().copied().collect();
        tree.balance();
        prop_assert_eq!(tree.level_order().copied().collect::<Vec<_>>(), shape);
    }

    #[test]
    fn level_order_visits_every_key_once(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let (tree, model) = tree_from(&entries);
        let mut visited: Vec<i64> = tree.level_order().copied().collect();
        prop_assert_eq!(visited.first(), tree.level_order().next());
        visited.sort_unstable();
        prop_assert_eq!(visited, model.keys().copied().collect::<Vec<_>>());
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

fn sample_tree() -> OrderedTree<i32, &'static str> {
    let mut tree = OrderedTree::new();
    tree.insert(10, "TEN");
    tree.insert(3, "THREE");
    tree.insert(1, "ONE");
    tree.insert(5, "FIVE");
    tree.insert(2, "TWO");
    tree.insert(7, "SEVEN");
    tree
}

#[test]
fn sample_tree_order_queries() {
    let tree = sample_tree();

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.min_key(), Some(&1));
    assert_eq!(tree.max_key(), Some(&10));
    assert_eq!(tree.rank(&7), 4);
    assert_eq!(tree.select(0), Some(&1));
    assert_eq!(tree.floor(&6), Some(&5));
    assert_eq!(tree.ceiling(&6), Some(&7));
    assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 5, 7, 10]);
    assert_eq!(tree.count_in(&3, &9), 3);
    assert_eq!(tree.get(&5), Some(&"FIVE"));
    assert_eq!(tree.get(&4), None);
}

#[test]
fn sample_tree_delete() {
    let mut tree = sample_tree();

    assert_eq!(tree.remove(&3), Some("THREE"));
    assert!(!tree.contains_key(&3));
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![1, 2, 5, 7, 10]);
    assert_eq!(tree.level_order().copied().collect::<Vec<_>>(), vec![10, 5, 1, 7, 2]);
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn sample_tree_balance() {
    let mut tree = sample_tree();
    assert_eq!(tree.level_order().copied().collect::<Vec<_>>(), vec![10, 3, 1, 5, 2, 7]);

    tree.balance();

    assert_eq!(tree.level_order().copied().collect::<Vec<_>>(), vec![5, 2, 10, 1, 3, 7]);
    assert_eq!(tree.subtree_level_order(&2).unwrap().copied().collect::<Vec<_>>(), vec![2, 1, 3]);
    assert_eq!(tree.height(), 3);
    assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 5, 7, 10]);
}

#[test]
fn remove_min_and_max_are_symmetric() {
    let mut tree = sample_tree();

    assert_eq!(tree.remove_min(), Some((1, "ONE")));
    assert_eq!(tree.remove_max(), Some((10, "TEN")));
    assert_eq!(tree.min_key(), Some(&2));
    assert_eq!(tree.max_key(), Some(&7));
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn empty_tree_answers_without_panicking() {
    let mut tree: OrderedTree<i32, i32> = OrderedTree::new();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.keys().count(), 0);
    assert_eq!(tree.keys_in(&0, &10).count(), 0);
    assert_eq!(tree.level_order().count(), 0);
    assert!(tree.subtree_level_order(&1).is_none());
    assert!(!tree.contains_key(&1));
    assert_eq!(tree.min_key(), None);
    assert_eq!(tree.max_key(), None);
    assert_eq!(tree.floor(&1), None);
    assert_eq!(tree.ceiling(&1), None);
    assert_eq!(tree.select(0), None);
    assert_eq!(tree.rank(&1), 0);
    assert_eq!(tree.remove_min(), None);
    assert_eq!(tree.remove_max(), None);
    assert_eq!(tree.remove(&1), None);
    assert_eq!(tree.height(), 0);
    tree.balance();
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn sorted_inserts_form_a_spine_until_balanced() {
    let mut tree: OrderedTree<u32, u32> = (0..1_000).map(|k| (k, k * 2)).collect();
    assert_eq!(tree.height(), 1_000);

    tree.balance();

    assert_eq!(tree.height(), 10);
    assert_eq!(tree.select(500), Some(&500));
    assert_eq!(tree[&999], 1_998);
}

#[test]
fn borrowed_lookups_on_string_keys() {
    let tree: OrderedTree<String, usize> =
        ["pear", "apple", "fig", "kiwi"].iter().enumerate().map(|(i, s)| ((*s).to_owned(), i)).collect();

    assert_eq!(tree.get("fig"), Some(&2));
    assert_eq!(tree.rank("kiwi"), 2);
    assert_eq!(tree.floor("grape").map(String::as_str), Some("fig"));
    assert_eq!(tree.ceiling("grape").map(String::as_str), Some("kiwi"));
    assert_eq!(tree.keys_in("b", "l").map(String::as_str).collect::<Vec<_>>(), vec!["fig", "kiwi"]);
}

#[test]
fn clear_then_reuse() {
    let mut tree = sample_tree();
    tree.clear();
    assert!(tree.is_empty());

    tree.insert(4, "FOUR");
    assert_eq!(tree.first_key_value(), Some((&4, &"FOUR")));
    assert_eq!(tree.last_key_value(), Some((&4, &"FOUR")));
}

#[test]
fn equality_ignores_shape() {
    let unbalanced = sample_tree();
    let mut balanced = sample_tree();
    balanced.balance();

    assert_eq!(unbalanced, balanced);
    assert_eq!(format!("{unbalanced:?}"), r#"{1: "ONE", 2: "TWO", 3: "THREE", 5: "FIVE", 7: "SEVEN", 10: "TEN"}"#);
}

#[test]
#[should_panic(expected = "range start is greater than range end in OrderedTree")]
fn inverted_range_panics() {
    let tree = sample_tree();
    let _ = tree.range(7..3);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_missing_key_panics() {
    let tree = sample_tree();
    let _ = tree[&4];
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip_rebalances() {
    let tree: OrderedTree<u32, String> = (0..15).map(|k| (k, k.to_string())).collect();
    let json = serde_json::to_string(&tree).unwrap();
    assert!(json.starts_with(r#"{"0":"0","1":"1""#));

    let restored: OrderedTree<u32, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, tree);
    assert_eq!(restored.height(), 4);
}

#[cfg(feature = "serde")]
#[test]
fn serde_reads_large_sorted_map_balanced() {
    let source: BTreeMap<u32, u32> = (0..20_000).map(|k| (k, k * 2)).collect();
    let json = serde_json::to_string(&source).unwrap();

    let restored: OrderedTree<u32, u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), 20_000);
    assert_eq!(restored.height(), 15);
    assert_eq!(restored.get(&19_999), Some(&39_998));
    assert_eq!(restored.check_invariants(), Ok(()));
}

#[cfg(feature = "serde")]
#[test]
fn serde_duplicate_keys_keep_last_value() {
    let restored: OrderedTree<u32, &str> = serde_json::from_str(r#"{"2":"a","1":"b","2":"c"}"#).unwrap();

    assert_eq!(restored.len(), 2);
    assert_eq!(restored.get(&2), Some(&"c"));
    assert_eq!(restored.keys().copied().collect::<Vec<_>>(), [1, 2]);
    assert_eq!(restored.check_invariants(), Ok(()));
}

#[test]
fn iterator_debug_formats() {
    let tree: OrderedTree<i32, char> = [(2, 'b'), (1, 'a')].into();

    assert_eq!(format!("{:?}", tree.keys()), "[1, 2]");
    assert_eq!(format!("{:?}", tree.values()), "['a', 'b']");
    assert_eq!(format!("{:?}", tree.iter()), "[(1, 'a'), (2, 'b')]");
}
