//! Reference sampling helpers.
//!
//! Two operations back all of the builder's cross-reference wiring:
//! drawing distinct candidates from a pool (truncating, never failing)
//! and partitioning a shuffled key set into administration groups.

use std::collections::BTreeMap;

use rand::prelude::*;

/// Draws up to `count` distinct `(id, value)` pairs from `pool` without
/// replacement.
///
/// If the pool is smaller than `count`, every entry is returned: a short
/// pool truncates the draw, it never errors. The pool itself is not
/// mutated; the shuffle happens on a private copy of its keys.
pub fn sample_distinct<R, V>(rng: &mut R, pool: &BTreeMap<String, V>, count: usize) -> Vec<(String, V)>
where
    R: Rng + ?Sized,
    V: Clone,
{
    let mut keys: Vec<&String> = pool.keys().collect();
    keys.shuffle(rng);
    keys.truncate(count.min(pool.len()));
    keys.into_iter()
        .map(|key| (key.clone(), pool[key].clone()))
        .collect()
}

/// Partitions the pool's keys into consecutive groups of `size` after a
/// fresh shuffle; the last group may be shorter. Every key appears in
/// exactly one group. Each call reshuffles, so group membership is not
/// stable across calls.
pub fn random_group<R, V>(rng: &mut R, pool: &BTreeMap<String, V>, size: usize) -> Vec<Vec<String>>
where
    R: Rng + ?Sized,
{
    // chunks(0) panics; an empty pool simply yields no groups
    let size = size.max(1);
    let mut keys: Vec<String> = pool.keys().cloned().collect();
    keys.shuffle(rng);
    keys.chunks(size).map(|chunk| chunk.to_vec()).collect()
}
