use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::model::{Parts, Value};

/// Ranking key within a group: remainder descending, then tie-break key
/// ascending, then input index ascending. Strict for distinct indices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey<'a> {
    remainder: Reverse<OrderedFloat<f64>>,
    tie_break: &'a Value,
    index: usize,
}

/// Order a group's members by rank. Position `p` in the result has rank `p + 1`.
pub fn rank_group(members: &[usize], parts: &[Parts], keys: &[Value]) -> Vec<usize> {
    let mut ranked: Vec<RankKey<'_>> = members
        .iter()
        .map(|&i| RankKey {
            remainder: Reverse(OrderedFloat(parts[i].remainder)),
            tie_break: &keys[i],
            index: i,
        })
        .collect();
    ranked.sort_unstable();
    ranked.into_iter().map(|k| k.index).collect()
}

/// Add one unit to the first `deficit` ranked records. Returns how many were
/// topped up; a deficit of zero or less tops up nobody. `None` if a record
/// is already at `i64::MAX`.
pub fn top_up(ranked: &[usize], deficit: i64, assigned: &mut [i64]) -> Option<usize> {
    if deficit <= 0 {
        return Some(0);
    }
    let n = usize::try_from(deficit).map_or(ranked.len(), |d| d.min(ranked.len()));
    for &i in &ranked[..n] {
        assigned[i] = assigned[i].checked_add(1)?;
    }
    Some(n)
}
