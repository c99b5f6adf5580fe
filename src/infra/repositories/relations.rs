//! Helpers for batched relation loading.
//!
//! Loaders fetch all related rows for a slice of entities with one query
//! and then stitch them back in memory with these functions.

use std::collections::HashMap;
use std::hash::Hash;

/// Attach children to the parent whose key they reference (one-to-many).
///
/// Every parent ends up with `Some(vec)`, empty when it has no children.
pub(crate) fn attach_many<P, C, K>(
    parents: &mut [P],
    children: Vec<C>,
    parent_key: impl Fn(&P) -> K,
    child_key: impl Fn(&C) -> K,
    set: impl Fn(&mut P, Vec<C>),
) where
    K: Eq + Hash,
{
    let mut grouped: HashMap<K, Vec<C>> = HashMap::new();
    for child in children {
        grouped.entry(child_key(&child)).or_default().push(child);
    }
    for parent in parents.iter_mut() {
        let children = grouped.remove(&parent_key(parent)).unwrap_or_default();
        set(parent, children);
    }
}

/// Attach the row each parent points at through a (possibly null) foreign key.
pub(crate) fn attach_one<P, C, K>(
    parents: &mut [P],
    candidates: Vec<C>,
    foreign_key: impl Fn(&P) -> Option<K>,
    candidate_key: impl Fn(&C) -> K,
    set: impl Fn(&mut P, Option<C>),
) where
    C: Clone,
    K: Eq + Hash,
{
    let by_key: HashMap<K, C> = candidates
        .into_iter()
        .map(|candidate| (candidate_key(&candidate), candidate))
        .collect();
    for parent in parents.iter_mut() {
        let found = foreign_key(parent).and_then(|key| by_key.get(&key).cloned());
        set(parent, found);
    }
}

/// Attach rows reached through a join table (many-to-many).
///
/// `links` are `(parent key, target key)` pairs; targets missing from
/// `targets` (for instance soft-deleted ones) are skipped.
pub(crate) fn attach_linked<P, T, PK, TK>(
    parents: &mut [P],
    links: Vec<(PK, TK)>,
    targets: Vec<T>,
    parent_key: impl Fn(&P) -> PK,
    target_key: impl Fn(&T) -> TK,
    set: impl Fn(&mut P, Vec<T>),
) where
    T: Clone,
    PK: Eq + Hash,
    TK: Eq + Hash,
{
    let by_key: HashMap<TK, T> = targets
        .into_iter()
        .map(|target| (target_key(&target), target))
        .collect();
    let mut grouped: HashMap<PK, Vec<T>> = HashMap::new();
    for (parent, target) in links {
        if let Some(found) = by_key.get(&target) {
            grouped.entry(parent).or_default().push(found.clone());
        }
    }
    for parent in parents.iter_mut() {
        let linked = grouped.remove(&parent_key(parent)).unwrap_or_default();
        set(parent, linked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Parent {
        id: i32,
        children: Option<Vec<&'static str>>,
    }

    #[test]
    fn parents_without_children_get_empty_vec() {
        let mut parents = vec![Parent { id: 1, ..Default::default() }, Parent { id: 2, ..Default::default() }];
        attach_many(
            &mut parents,
            vec![(1, "a"), (1, "b")],
            |p| p.id,
            |c| c.0,
            |p, cs| p.children = Some(cs.into_iter().map(|c| c.1).collect()),
        );

        assert_eq!(parents[0].children, Some(vec!["a", "b"]));
        assert_eq!(parents[1].children, Some(vec![]));
    }

    #[test]
    fn linked_targets_missing_from_lookup_are_skipped() {
        let mut parents = vec![Parent { id: 7, ..Default::default() }];
        attach_linked(
            &mut parents,
            vec![(7, 'x'), (7, 'y')],
            vec![('x', "kept")],
            |p| p.id,
            |t| t.0,
            |p, ts| p.children = Some(ts.into_iter().map(|t| t.1).collect()),
        );

        assert_eq!(parents[0].children, Some(vec!["kept"]));
    }
}
