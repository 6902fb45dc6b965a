use crate::config::{AllocOptions, ShortfallPolicy, TieKeyPolicy};
use crate::error::AllocError;
use crate::group::{group_totals, index_groups};
use crate::model::{Allocation, Record};
use crate::parts::{compute_all, floor_fits};
use crate::rank::{rank_group, top_up};
use crate::report::{build_report, group_summaries};
use crate::tie_break::{find_collisions, resolve_keys};

/// Allocate each group's total across its records by largest remainder.
///
/// Records with an empty group key form the global group, so ungrouped and
/// grouped input share one code path. Returns one assigned total per record
/// in input order. All validation happens before ranking: the call either
/// returns a full allocation or fails without partial output.
pub fn allocate(records: &[Record], options: &AllocOptions) -> Result<Allocation, AllocError> {
    validate_records(records)?;

    let parts = compute_all(records);
    let keys = resolve_keys(records);
    let index = index_groups(records);
    if index.is_empty() {
        return Ok(Allocation {
            assigned: Vec::new(),
            report: build_report(Vec::new(), Vec::new()),
        });
    }
    let totals = group_totals(records, &parts, &index, options.inconsistent_total)?;

    log::debug!(
        "allocating {} record(s) across {} group(s)",
        records.len(),
        index.len()
    );

    let collisions = find_collisions(&keys, &index);
    for c in &collisions {
        if options.duplicate_tie_key == TieKeyPolicy::Reject {
            return Err(AllocError::TieBreakCollision {
                group: c.key.clone(),
                key: c.tie_break.clone(),
            });
        }
        log::warn!(
            "group {}: tie-break key '{}' shared by {} records, falling back to input order",
            c.key,
            c.tie_break,
            c.record_count
        );
    }

    if options.shortfall == ShortfallPolicy::Reject {
        for (gid, t) in totals.iter().enumerate() {
            let size = index.members[gid].len() as i64;
            if t.deficit > size {
                return Err(AllocError::UnderAllocation {
                    group: index.keys[gid].clone(),
                    requested: t.total,
                    assigned: t.sum_floor + size,
                });
            }
        }
    }

    let mut assigned: Vec<i64> = parts.iter().map(|p| p.floor).collect();
    let mut topped_up = Vec::with_capacity(index.len());
    for (gid, members) in index.members.iter().enumerate() {
        let deficit = totals[gid].deficit;
        if deficit <= 0 {
            if deficit < 0 {
                log::debug!(
                    "group {}: floors sum to {}, above total {}; no top-up",
                    index.keys[gid],
                    totals[gid].sum_floor,
                    totals[gid].total
                );
            }
            topped_up.push(0);
            continue;
        }
        let ranked = rank_group(members, &parts, &keys);
        let n = top_up(&ranked, deficit, &mut assigned).ok_or_else(|| AllocError::Overflow {
            group: index.keys[gid].clone(),
        })?;
        topped_up.push(n);
    }

    let groups = group_summaries(&index, &totals, &topped_up, &assigned)?;
    for g in &groups {
        log::debug!(
            "group {}: total={} records={} sum_floor={} deficit={} topped_up={}",
            g.key,
            g.total,
            g.record_count,
            g.sum_floor,
            g.deficit,
            g.topped_up
        );
        if g.shortfall() > 0 {
            log::warn!(
                "group {}: requested {} unit(s) but only {} assignable across {} record(s); short by {}",
                g.key,
                g.total,
                g.assigned_sum,
                g.record_count,
                g.shortfall()
            );
        }
    }

    Ok(Allocation {
        assigned,
        report: build_report(groups, collisions),
    })
}

/// Ungrouped allocation of `total` over `weights`, ties broken by input order.
pub fn allocate_global(weights: &[f64], total: i64) -> Result<Allocation, AllocError> {
    let records: Vec<Record> = weights.iter().map(|&w| Record::new(total, w)).collect();
    allocate(&records, &AllocOptions::default())
}

fn validate_records(records: &[Record]) -> Result<(), AllocError> {
    for (row, r) in records.iter().enumerate() {
        if !r.weight.is_finite() {
            return Err(AllocError::InvalidWeight { row, weight: r.weight });
        }
        if r.total < 0 {
            return Err(AllocError::InvalidTotal {
                row,
                total: r.total.to_string(),
            });
        }
        if !floor_fits(r.weight, r.total) {
            return Err(AllocError::IdealOutOfRange {
                row,
                weight: r.weight,
                total: r.total,
            });
        }
    }
    Ok(())
}
