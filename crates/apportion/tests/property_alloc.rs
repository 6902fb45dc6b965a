// Property-based tests for grouped largest-remainder allocation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use apportion::config::{AllocOptions, TotalPolicy};
use apportion::model::{GroupKey, Record, Value};
use apportion::parts::compute_parts;
use apportion::allocate;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Weights for one group, normalized to sum to 1 so the deficit stays within
/// the group size.
fn arb_normalized_weights() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1u32..1000, 1..12).prop_map(|raw| {
        let sum: u32 = raw.iter().sum();
        raw.into_iter().map(|r| r as f64 / sum as f64).collect()
    })
}

/// Weights that may not sum to anything in particular.
fn arb_loose_weights() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            3 => 0.0..1.0f64,
            1 => Just(0.25),
            1 => Just(0.5),
        ],
        1..12,
    )
}

/// (group label, total, weights) for up to five groups.
fn arb_groups() -> impl Strategy<Value = Vec<(String, i64, Vec<f64>)>> {
    prop::collection::vec(
        ("[a-e]", 0i64..500, arb_loose_weights()),
        1..5,
    )
    .prop_map(|mut groups| {
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        groups.dedup_by(|a, b| a.0 == b.0);
        groups
    })
}

/// Flatten groups into records, interleaving them by position so groups are
/// not contiguous in the input.
fn records_of(groups: &[(String, i64, Vec<f64>)]) -> Vec<Record> {
    let longest = groups.iter().map(|g| g.2.len()).max().unwrap_or(0);
    let mut records = Vec::new();
    for pos in 0..longest {
        for (label, total, weights) in groups {
            if let Some(&w) = weights.get(pos) {
                records.push(Record::new(*total, w).in_group(GroupKey(vec![Value::from(label.as_str())])));
            }
        }
    }
    records
}

fn group_sum(records: &[Record], assigned: &[i64], key: &GroupKey) -> i64 {
    records
        .iter()
        .zip(assigned)
        .filter(|(r, _)| &r.group_key == key)
        .map(|(_, a)| *a)
        .sum()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn sum_preserved_when_deficit_in_range(
        groups in arb_groups(),
    ) {
        let records = records_of(&groups);
        let alloc = allocate(&records, &AllocOptions::default()).unwrap();
        for g in &alloc.report.groups {
            if g.deficit >= 0 && g.deficit <= g.record_count as i64 {
                prop_assert_eq!(group_sum(&records, &alloc.assigned, &g.key), g.total);
            }
        }
    }

    #[test]
    fn normalized_weights_always_hit_the_total(
        weights in arb_normalized_weights(),
        total in 0i64..10_000,
    ) {
        let records: Vec<Record> = weights.iter().map(|&w| Record::new(total, w)).collect();
        let alloc = allocate(&records, &AllocOptions::default()).unwrap();
        let g = &alloc.report.groups[0];
        prop_assume!(g.deficit >= 0 && g.deficit <= g.record_count as i64);
        prop_assert_eq!(alloc.assigned.iter().sum::<i64>(), total);
        prop_assert!(alloc.is_exact());
    }

    #[test]
    fn adjustment_bounded_by_one(groups in arb_groups()) {
        let records = records_of(&groups);
        let alloc = allocate(&records, &AllocOptions::default()).unwrap();
        for (r, &a) in records.iter().zip(&alloc.assigned) {
            let floor = compute_parts(r.weight, r.total).floor;
            prop_assert!(a == floor || a == floor + 1, "assigned {} floor {}", a, floor);
        }
    }

    #[test]
    fn deterministic(groups in arb_groups()) {
        let records = records_of(&groups);
        let first = allocate(&records, &AllocOptions::default()).unwrap();
        let second = allocate(&records, &AllocOptions::default()).unwrap();
        prop_assert_eq!(first.assigned, second.assigned);
        prop_assert_eq!(first.report.groups, second.report.groups);
    }

    #[test]
    fn smaller_tie_key_preferred(
        n in 2usize..10,
        t_seed in 0usize..100,
        keys in prop::collection::hash_set(0i64..1000, 10),
    ) {
        // n equal weights of 1/n over total t < n: equal remainders, floors 0, deficit t
        let t = 1 + t_seed % (n - 1);
        let keys: Vec<i64> = keys.into_iter().take(n).collect();
        let weight = 1.0 / n as f64;
        let records: Vec<Record> = keys
            .iter()
            .map(|&k| Record::new(t as i64, weight).with_tie_break(k))
            .collect();
        let alloc = allocate(&records, &AllocOptions::default()).unwrap();
        prop_assert_eq!(alloc.report.groups[0].deficit, t as i64);

        let mut sorted = keys.clone();
        sorted.sort();
        let winners = &sorted[..t];
        for (k, &a) in keys.iter().zip(&alloc.assigned) {
            prop_assert_eq!(a == 1, winners.contains(k));
        }
    }

    #[test]
    fn no_adjustment_without_deficit(groups in arb_groups()) {
        let records = records_of(&groups);
        let alloc = allocate(&records, &AllocOptions::default()).unwrap();
        for g in alloc.report.groups.iter().filter(|g| g.deficit <= 0) {
            prop_assert_eq!(g.topped_up, 0);
            for (r, &a) in records.iter().zip(&alloc.assigned) {
                if r.group_key == g.key {
                    prop_assert_eq!(a, compute_parts(r.weight, r.total).floor);
                }
            }
        }
    }

    #[test]
    fn ungrouped_equals_single_group(
        weights in arb_loose_weights(),
        total in 0i64..1000,
    ) {
        let global: Vec<Record> = weights.iter().map(|&w| Record::new(total, w)).collect();
        let single: Vec<Record> = global
            .iter()
            .cloned()
            .map(|r| r.in_group(GroupKey(vec![Value::from("all")])))
            .collect();
        let a = allocate(&global, &AllocOptions::default()).unwrap();
        let b = allocate(&single, &AllocOptions::default()).unwrap();
        prop_assert_eq!(a.assigned, b.assigned);
    }

    #[test]
    fn first_observed_total_matches_reject_when_consistent(groups in arb_groups()) {
        let records = records_of(&groups);
        let lenient = AllocOptions {
            inconsistent_total: TotalPolicy::FirstObserved,
            ..AllocOptions::default()
        };
        let a = allocate(&records, &AllocOptions::default()).unwrap();
        let b = allocate(&records, &lenient).unwrap();
        prop_assert_eq!(a.assigned, b.assigned);
    }
}
