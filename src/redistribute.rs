//! Weight redistribution.
//!
//! Changing one key of a group moves the other keys so the group keeps
//! summing to 100 while the untouched keys keep their relative proportions.

use std::collections::BTreeMap;

use crate::error::WeightError;
use crate::types::{WeightKey, WeightSet, WEIGHT_TOTAL};

/// Set `changed` to `new_value` and rebalance the rest of the group.
///
/// `new_value` must already be clamped to 0..=100; anything larger is a
/// contract violation and is rejected rather than clamped.
///
/// Remainders from integer division always go to the last untouched key in
/// canonical key order, so the result is deterministic and sums to exactly
/// 100.
pub fn redistribute<K: WeightKey>(
    current: &WeightSet<K>,
    changed: K,
    new_value: u32,
) -> Result<WeightSet<K>, WeightError> {
    if new_value > WEIGHT_TOTAL {
        return Err(WeightError::OutOfRange {
            key: changed.as_str(),
            value: new_value,
        });
    }
    if current.get(changed) as u32 == new_value {
        return Ok(current.clone());
    }

    let others: Vec<K> = K::ALL.iter().copied().filter(|&k| k != changed).collect();
    let remaining = WEIGHT_TOTAL - new_value;
    let other_sum: u32 = others.iter().map(|&k| current.get(k) as u32).sum();

    let mut values = BTreeMap::new();
    values.insert(changed, new_value as u8);

    let Some((&last, head)) = others.split_last() else {
        // Single-key group: the only valid value is the total itself.
        return WeightSet::new([(changed, new_value)]);
    };

    let mut assigned = 0u32;
    for &key in head {
        let share = if other_sum == 0 {
            remaining / others.len() as u32
        } else {
            current.get(key) as u32 * remaining / other_sum
        };
        values.insert(key, share as u8);
        assigned += share;
    }
    // `assigned` never exceeds `remaining`: every share is a floor of a
    // fraction of it, so the absorbing key stays non-negative.
    values.insert(last, (remaining - assigned) as u8);

    Ok(WeightSet::from_values_unchecked(values))
}
