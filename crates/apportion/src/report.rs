use crate::error::AllocError;
use crate::group::{GroupIndex, GroupTotals};
use crate::model::{AllocationReport, GroupSummary, ReportSummary, Shortfall, TieCollision};

/// Per-group summary rows, in group order.
pub fn group_summaries(
    index: &GroupIndex,
    totals: &[GroupTotals],
    topped_up: &[usize],
    assigned: &[i64],
) -> Result<Vec<GroupSummary>, AllocError> {
    index
        .members
        .iter()
        .enumerate()
        .map(|(gid, members)| {
            let assigned_sum = members
                .iter()
                .try_fold(0i64, |acc, &i| acc.checked_add(assigned[i]))
                .ok_or_else(|| AllocError::Overflow {
                    group: index.keys[gid].clone(),
                })?;
            Ok(GroupSummary {
                key: index.keys[gid].clone(),
                total: totals[gid].total,
                record_count: members.len(),
                sum_floor: totals[gid].sum_floor,
                deficit: totals[gid].deficit,
                topped_up: topped_up[gid],
                assigned_sum,
            })
        })
        .collect()
}

/// Groups whose deficit exceeds their record count.
pub fn shortfalls(groups: &[GroupSummary]) -> Vec<Shortfall> {
    groups
        .iter()
        .filter(|g| g.shortfall() > 0)
        .map(|g| Shortfall {
            key: g.key.clone(),
            requested: g.total,
            assigned: g.assigned_sum,
            missing: g.shortfall(),
        })
        .collect()
}

/// Compute summary statistics from group summaries.
pub fn compute_summary(groups: &[GroupSummary]) -> ReportSummary {
    let mut summary = ReportSummary {
        total_groups: groups.len(),
        ..ReportSummary::default()
    };

    for g in groups {
        summary.total_records += g.record_count;
        summary.adjusted_records += g.topped_up;
        if g.assigned_sum == g.total {
            summary.exact_groups += 1;
        }
        if g.shortfall() > 0 {
            summary.short_groups += 1;
        }
        if g.deficit < 0 {
            summary.over_floored_groups += 1;
        }
    }

    summary
}

pub fn build_report(groups: Vec<GroupSummary>, tie_collisions: Vec<TieCollision>) -> AllocationReport {
    AllocationReport {
        name: None,
        summary: compute_summary(&groups),
        shortfalls: shortfalls(&groups),
        groups,
        tie_collisions,
    }
}

impl AllocationReport {
    pub fn to_json(&self) -> Result<String, AllocError> {
        serde_json::to_string_pretty(self).map_err(|e| AllocError::Serialize(e.to_string()))
    }
}
