// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping of a flat item sequence into ordered sections.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::SectionError;

/// A boxed section key function. `None` excludes the item from every section.
pub type KeyFn<T, K> = Box<dyn Fn(&T) -> Option<K> + Send>;

/// A boxed comparator over section keys.
pub type KeyCompare<K> = Box<dyn Fn(&K, &K) -> Ordering + Send>;

/// A boxed comparator over two items of the same section.
pub type ItemCompare<T, K> = Box<dyn Fn(&K, &T, &T) -> Ordering + Send>;

/// How sections are ordered relative to each other.
pub enum SectionOrdering<K> {
    /// Sections appear in the order their keys are first seen.
    ///
    /// Static sections are seen before any item, in the order they were added.
    FirstSeen,
    /// Sections are stably sorted by `compare`; ties keep first-seen order.
    Sorted {
        /// The key comparator.
        compare: KeyCompare<K>,
        /// Reject builds where two distinct keys compare equal.
        strict: bool,
    },
}

impl<K> SectionOrdering<K> {
    /// Sorts sections with `compare`, keeping first-seen order for ties.
    pub fn sorted(compare: impl Fn(&K, &K) -> Ordering + Send + 'static) -> Self {
        Self::Sorted {
            compare: Box::new(compare),
            strict: false,
        }
    }

    /// Sorts sections with `compare` and rejects ties between distinct keys.
    pub fn strict(compare: impl Fn(&K, &K) -> Ordering + Send + 'static) -> Self {
        Self::Sorted {
            compare: Box::new(compare),
            strict: true,
        }
    }

    /// Sorts sections by the natural order of their keys.
    pub fn by_key() -> Self
    where
        K: Ord + 'static,
    {
        Self::sorted(|a: &K, b: &K| a.cmp(b))
    }
}

impl<K> Default for SectionOrdering<K> {
    fn default() -> Self {
        Self::FirstSeen
    }
}

impl<K> fmt::Debug for SectionOrdering<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstSeen => f.write_str("FirstSeen"),
            Self::Sorted { strict, .. } => f
                .debug_struct("Sorted")
                .field("strict", strict)
                .finish_non_exhaustive(),
        }
    }
}

/// One section produced by [`group`], before slots are laid out.
#[derive(Debug)]
pub(crate) struct Group<K> {
    pub(crate) key: K,
    /// Indices into the grouped item slice, in display order.
    pub(crate) items: Vec<usize>,
    pub(crate) is_static: bool,
    /// First-seen ordinal, stable across the section sort.
    pub(crate) seen: usize,
}

#[derive(Debug)]
pub(crate) struct Grouping<K> {
    pub(crate) groups: Vec<Group<K>>,
    /// Indices of items whose key function returned `None`.
    pub(crate) dropped: Vec<usize>,
}

/// Partitions `items` into sections keyed by `key_of`.
///
/// Static keys seed the section list before any item is examined. Items keep
/// their relative input order within a section unless `item_order` is given,
/// in which case each section is stably sorted with it.
pub(crate) fn group<T, K>(
    items: &[T],
    key_of: &dyn Fn(&T) -> Option<K>,
    statics: &[K],
    ordering: &SectionOrdering<K>,
    item_order: Option<&(dyn Fn(&K, &T, &T) -> Ordering + Send)>,
) -> Result<Grouping<K>, SectionError>
where
    K: Clone + Eq + Hash,
{
    let mut lookup: HashMap<K, usize> = HashMap::with_capacity(statics.len());
    let mut groups: Vec<Group<K>> = Vec::with_capacity(statics.len());
    let mut dropped = Vec::new();

    for key in statics {
        if lookup.contains_key(key) {
            continue;
        }
        let seen = groups.len();
        lookup.insert(key.clone(), seen);
        groups.push(Group {
            key: key.clone(),
            items: Vec::new(),
            is_static: true,
            seen,
        });
    }

    for (i, item) in items.iter().enumerate() {
        let Some(key) = key_of(item) else {
            dropped.push(i);
            continue;
        };
        let g = if let Some(&g) = lookup.get(&key) {
            g
        } else {
            let g = groups.len();
            lookup.insert(key.clone(), g);
            groups.push(Group {
                key,
                items: Vec::new(),
                is_static: false,
                seen: g,
            });
            g
        };
        groups[g].items.push(i);
    }

    if let Some(compare) = item_order {
        for Group {
            key, items: members, ..
        } in &mut groups
        {
            members.sort_by(|&a, &b| compare(key, &items[a], &items[b]));
        }
    }

    if let SectionOrdering::Sorted { compare, strict } = ordering {
        groups.sort_by(|a, b| compare(&a.key, &b.key));
        if *strict
            && let Some(tie) = groups
                .windows(2)
                .find(|w| compare(&w[0].key, &w[1].key) == Ordering::Equal)
        {
            return Err(SectionError::DuplicateSectionOrdering {
                first: tie[0].seen,
                second: tie[1].seen,
            });
        }
    }

    Ok(Grouping { groups, dropped })
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cmp::Ordering;

    use super::{Grouping, SectionOrdering, group};
    use crate::SectionError;

    fn first(item: &(char, u32)) -> Option<char> {
        Some(item.0)
    }

    fn keys(g: &Grouping<char>) -> Vec<char> {
        g.groups.iter().map(|g| g.key).collect()
    }

    #[test]
    fn first_seen_order_is_not_alphabetical() {
        let items = [('B', 1), ('A', 2), ('B', 3)];
        let g = group(&items, &first, &[], &SectionOrdering::FirstSeen, None).unwrap();
        assert_eq!(keys(&g), vec!['B', 'A']);
        assert_eq!(g.groups[0].items, vec![0, 2]);
        assert_eq!(g.groups[1].items, vec![1]);
    }

    #[test]
    fn absent_keys_are_dropped() {
        let items = [1_i32, -2, 3, -4];
        let g = group(
            &items,
            &|v: &i32| (*v > 0).then_some(*v % 2),
            &[],
            &SectionOrdering::FirstSeen,
            None,
        )
        .unwrap();
        assert_eq!(g.dropped, vec![1, 3]);
        assert_eq!(g.groups.len(), 1);
        assert_eq!(g.groups[0].items, vec![0, 2]);
    }

    #[test]
    fn sorted_ordering_is_stable_for_ties() {
        // Compare by case-insensitive letter: 'b' and 'B' tie.
        let items = [('b', 0), ('a', 1), ('B', 2)];
        let ordering = SectionOrdering::sorted(|a: &char, b: &char| {
            a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
        });
        let g = group(&items, &first, &[], &ordering, None).unwrap();
        assert_eq!(keys(&g), vec!['a', 'b', 'B']);
    }

    #[test]
    fn strict_ordering_rejects_ties() {
        let items = [('b', 0), ('a', 1), ('B', 2)];
        let ordering = SectionOrdering::strict(|a: &char, b: &char| {
            a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
        });
        let err = group(&items, &first, &[], &ordering, None).unwrap_err();
        assert_eq!(
            err,
            SectionError::DuplicateSectionOrdering {
                first: 0,
                second: 2
            }
        );
    }

    #[test]
    fn statics_are_seeded_first_and_deduplicated() {
        let items = [('x', 0), ('s', 1)];
        let g = group(&items, &first, &['s', 't', 's'], &SectionOrdering::FirstSeen, None)
            .unwrap();
        assert_eq!(keys(&g), vec!['s', 't', 'x']);
        assert!(g.groups[0].is_static);
        assert!(g.groups[1].items.is_empty());
        assert!(!g.groups[2].is_static);
    }

    #[test]
    fn item_order_sorts_within_sections_only() {
        let items = [('a', 3), ('b', 9), ('a', 1), ('b', 2), ('a', 2)];
        let by_value: &(dyn Fn(&char, &(char, u32), &(char, u32)) -> Ordering + Send) =
            &|_, x, y| x.1.cmp(&y.1);
        let g = group(&items, &first, &[], &SectionOrdering::FirstSeen, Some(by_value)).unwrap();
        assert_eq!(keys(&g), vec!['a', 'b']);
        assert_eq!(g.groups[0].items, vec![2, 4, 0]);
        assert_eq!(g.groups[1].items, vec![3, 1]);
    }

    #[test]
    fn by_key_uses_natural_order() {
        let items = [('c', 0), ('a', 1), ('b', 2)];
        let g = group(&items, &first, &[], &SectionOrdering::by_key(), None).unwrap();
        assert_eq!(keys(&g), vec!['a', 'b', 'c']);
    }
}
