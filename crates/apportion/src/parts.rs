use crate::model::{Parts, Record};

// -2^63 and 2^63, both exact in f64.
const FLOOR_MIN: f64 = -9_223_372_036_854_775_808.0;
const FLOOR_MAX: f64 = 9_223_372_036_854_775_808.0;

/// True when `floor(weight * total)` is representable as an `i64`.
pub fn floor_fits(weight: f64, total: i64) -> bool {
    let floor = (weight * total as f64).floor();
    (FLOOR_MIN..FLOOR_MAX).contains(&floor)
}

/// Split `weight * total` into floor and remainder.
///
/// Callers check [`floor_fits`] first; an out-of-range floor saturates.
pub fn compute_parts(weight: f64, total: i64) -> Parts {
    let ideal = weight * total as f64;
    let floor = ideal.floor();
    Parts {
        ideal,
        floor: floor as i64,
        remainder: ideal - floor,
    }
}

/// Step 1 over every record. Group-independent.
pub fn compute_all(records: &[Record]) -> Vec<Parts> {
    records
        .iter()
        .map(|r| compute_parts(r.weight, r.total))
        .collect()
}
