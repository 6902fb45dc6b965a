//! Tie-break key resolution.
//!
//! Supplied keys are used as-is. Records without one get their zero-based
//! input index as an `Int` key, which is unique and reproducible for a given
//! input. Ranking always falls back to the input index after the key, so
//! duplicate supplied keys still produce a deterministic order.

use std::collections::BTreeMap;

use crate::group::GroupIndex;
use crate::model::{Record, TieCollision, Value};

/// Step 2: one tie-break key per record.
pub fn resolve_keys(records: &[Record]) -> Vec<Value> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| match &r.tie_break {
            Some(key) => key.clone(),
            None => Value::Int(i as i64),
        })
        .collect()
}

/// Resolved keys that occur more than once within a group.
///
/// Synthesized keys never collide with each other, but a supplied `Int(k)`
/// collides with the synthesized key of record `k` when both share a group.
/// Collisions are returned in group order, then key order.
pub fn find_collisions(keys: &[Value], index: &GroupIndex) -> Vec<TieCollision> {
    let mut out = Vec::new();

    for (gid, members) in index.members.iter().enumerate() {
        let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
        for &i in members {
            *counts.entry(&keys[i]).or_insert(0) += 1;
        }
        for (key, count) in counts {
            if count > 1 {
                out.push(TieCollision {
                    key: index.keys[gid].clone(),
                    tie_break: key.clone(),
                    record_count: count,
                });
            }
        }
    }

    out
}
