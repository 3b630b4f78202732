//! Full-row duplicate detection.

use crate::core::Row;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// For every row, the 1-based index of the first identical row before it.
///
/// Rows are identical when their [`Row::signature`]s match: same fields, same
/// order, structurally equal values. The first occurrence maps to `None`.
///
/// ```rust
/// use dqm_guard::core::Row;
/// use dqm_guard::engine::duplicate_references;
///
/// let a = Row::new().with("id", 1).with("name", "x");
/// let b = Row::new().with("id", 1).with("name", "y");
/// let refs = duplicate_references(&[a.clone(), b, a]);
/// assert_eq!(refs, vec![None, None, Some(1)]);
/// ```
pub fn duplicate_references(rows: &[Row]) -> Vec<Option<usize>> {
    let mut first_seen: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    rows.iter()
        .enumerate()
        .map(|(index, row)| match first_seen.entry(row.signature()) {
            Entry::Occupied(first) => Some(*first.get()),
            Entry::Vacant(slot) => {
                slot.insert(index + 1);
                None
            }
        })
        .collect()
}

/// 1-based indices of rows that repeat an earlier row.
pub fn duplicate_indices(rows: &[Row]) -> Vec<usize> {
    duplicate_references(rows)
        .into_iter()
        .enumerate()
        .filter_map(|(index, reference)| reference.map(|_| index + 1))
        .collect()
}
