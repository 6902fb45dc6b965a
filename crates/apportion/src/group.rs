use rustc_hash::FxHashMap;

use crate::config::TotalPolicy;
use crate::error::AllocError;
use crate::model::{GroupKey, Parts, Record};

/// Records partitioned by group key, groups numbered in first-observed order.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    pub keys: Vec<GroupKey>,
    /// Member record indices per group, in input order.
    pub members: Vec<Vec<usize>>,
    /// Group id of each record.
    pub of_record: Vec<usize>,
}

impl GroupIndex {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Per-group aggregation: resolved total, sum of floors, and the deficit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupTotals {
    pub total: i64,
    pub sum_floor: i64,
    pub deficit: i64,
}

pub fn index_groups(records: &[Record]) -> GroupIndex {
    let mut ids: FxHashMap<&GroupKey, usize> = FxHashMap::default();
    let mut index = GroupIndex {
        of_record: Vec::with_capacity(records.len()),
        ..GroupIndex::default()
    };

    for (i, record) in records.iter().enumerate() {
        let id = *ids.entry(&record.group_key).or_insert_with(|| {
            index.keys.push(record.group_key.clone());
            index.members.push(Vec::new());
            index.keys.len() - 1
        });
        index.members[id].push(i);
        index.of_record.push(id);
    }

    index
}

/// Compute each group's total, floor sum and deficit.
///
/// The group total is the first observed record's total. Under
/// `TotalPolicy::Reject` any member disagreeing with it fails the call.
/// A floor sum or deficit outside `i64` fails with `AllocError::Overflow`.
pub fn group_totals(
    records: &[Record],
    parts: &[Parts],
    index: &GroupIndex,
    policy: TotalPolicy,
) -> Result<Vec<GroupTotals>, AllocError> {
    let mut out = Vec::with_capacity(index.len());

    for (gid, members) in index.members.iter().enumerate() {
        let first = records[members[0]].total;
        let mut sum_floor: i64 = 0;

        for &i in members {
            if policy == TotalPolicy::Reject && records[i].total != first {
                return Err(AllocError::InconsistentTotal {
                    group: index.keys[gid].clone(),
                    first,
                    found: records[i].total,
                    row: i,
                });
            }
            sum_floor = sum_floor
                .checked_add(parts[i].floor)
                .ok_or_else(|| AllocError::Overflow {
                    group: index.keys[gid].clone(),
                })?;
        }
        let deficit = first.checked_sub(sum_floor).ok_or_else(|| AllocError::Overflow {
            group: index.keys[gid].clone(),
        })?;

        out.push(GroupTotals {
            total: first,
            sum_floor,
            deficit,
        });
    }

    Ok(out)
}
