// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sectioning engine: owns items and policies, rebuilds the flat index.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::Hash;
use core::mem;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::grouping::{Grouping, ItemCompare, KeyFn, SectionOrdering, group};
use crate::layout::SectionLayout;
use crate::observer::{RebuildReport, SectionObserver};
use crate::position::PositionIndex;
use crate::types::{Entry, SectionFlags, SectionInfo, Slot, SlotKind, ViewTypeTag, Visit};
use crate::SectionError;

type CountFn<K> = Box<dyn Fn(&K) -> usize + Send>;
type PlaceholderFn<K> = Box<dyn Fn(&K) -> bool + Send>;
type IndexedViewFn<K> = Box<dyn Fn(&K, usize) -> ViewTypeTag + Send>;
type ItemViewFn<T, K> = Box<dyn Fn(&K, &T) -> ViewTypeTag + Send>;
type KeyViewFn<K> = Box<dyn Fn(&K) -> ViewTypeTag + Send>;

/// A header or footer placed outside every section.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct GlobalSlot {
    id: u32,
    view_type: ViewTypeTag,
}

/// Global slots sorted by ascending id.
type GlobalSlots = SmallVec<[GlobalSlot; 2]>;

fn insert_global(slots: &mut GlobalSlots, id: u32, view_type: ViewTypeTag) {
    match slots.binary_search_by_key(&id, |g| g.id) {
        Ok(i) => slots[i].view_type = view_type,
        Err(i) => slots.insert(i, GlobalSlot { id, view_type }),
    }
}

fn global_view_type(slots: &GlobalSlots, id: u32) -> ViewTypeTag {
    slots
        .iter()
        .find(|g| g.id == id)
        .map_or(ViewTypeTag::default(), |g| g.view_type)
}

fn remove_global(slots: &mut GlobalSlots, id: u32) {
    if let Ok(i) = slots.binary_search_by_key(&id, |g| g.id) {
        slots.remove(i);
    }
}

/// Moves every item matching `pred` out of `items`, remembering where it was.
fn take_where<T>(items: &mut Vec<T>, mut pred: impl FnMut(&T) -> bool) -> Vec<(usize, T)> {
    let mut taken = Vec::new();
    let all = mem::take(items);
    for (i, item) in all.into_iter().enumerate() {
        if pred(&item) {
            taken.push((i, item));
        } else {
            items.push(item);
        }
    }
    taken
}

/// Undoes [`take_where`]. `taken` must be in ascending index order.
fn put_back<T>(items: &mut Vec<T>, taken: Vec<(usize, T)>) {
    for (i, item) in taken {
        items.insert(i, item);
    }
}

#[derive(Debug)]
struct Section<K> {
    key: K,
    /// Indices into the owned item vector, in display order.
    items: Vec<usize>,
    flags: SectionFlags,
}

#[derive(Debug)]
struct Built<K> {
    sections: Vec<Section<K>>,
    key_index: HashMap<K, usize>,
    index: PositionIndex,
    report: RebuildReport,
}

impl<K> Built<K> {
    fn empty() -> Self {
        Self {
            sections: Vec::new(),
            key_index: HashMap::new(),
            index: PositionIndex::default(),
            report: RebuildReport::default(),
        }
    }
}

/// Groups a flat item sequence into keyed sections and maps flat positions to slots.
///
/// Every mutating method regroups and reindexes from scratch before it returns,
/// so queries always see a complete build. A mutation whose rebuild fails is
/// rolled back: items, policies and the previous build are left as they were.
///
/// Items are owned by the list. Items whose key function returns `None` are kept
/// but excluded from every section; changing the key function can bring them back.
pub struct SectionedList<T, K> {
    items: Vec<T>,
    key_fn: KeyFn<T, K>,
    section_ordering: SectionOrdering<K>,
    item_ordering: Option<ItemCompare<T, K>>,
    header_count: CountFn<K>,
    footer_count: CountFn<K>,
    placeholder: PlaceholderFn<K>,
    header_view: IndexedViewFn<K>,
    footer_view: IndexedViewFn<K>,
    item_view: ItemViewFn<T, K>,
    placeholder_view: KeyViewFn<K>,
    statics: Vec<K>,
    collapsed: HashSet<K>,
    collapse_new: bool,
    global_headers: GlobalSlots,
    global_footers: GlobalSlots,
    global_placeholder: Option<ViewTypeTag>,
    observer: Option<Box<dyn SectionObserver<T> + Send>>,
    built: Option<Built<K>>,
}

impl<T, K> SectionedList<T, K>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty list whose sections are keyed by `key_fn`.
    ///
    /// Defaults: first-seen section order, input item order, one header and no
    /// footers per section, no placeholders, no global slots.
    pub fn new(key_fn: impl Fn(&T) -> Option<K> + Send + 'static) -> Self {
        Self {
            items: Vec::new(),
            key_fn: Box::new(key_fn),
            section_ordering: SectionOrdering::FirstSeen,
            item_ordering: None,
            header_count: Box::new(|_| 1),
            footer_count: Box::new(|_| 0),
            placeholder: Box::new(|_| false),
            header_view: Box::new(|_, _| ViewTypeTag::HEADER),
            footer_view: Box::new(|_, _| ViewTypeTag::FOOTER),
            item_view: Box::new(|_, _| ViewTypeTag::ITEM),
            placeholder_view: Box::new(|_| ViewTypeTag::PLACEHOLDER),
            statics: Vec::new(),
            collapsed: HashSet::new(),
            collapse_new: false,
            global_headers: SmallVec::new(),
            global_footers: SmallVec::new(),
            global_placeholder: None,
            observer: None,
            built: Some(Built::empty()),
        }
    }

    // --- rebuild ---

    fn rebuild(&mut self) -> Result<RebuildReport, SectionError> {
        let Grouping { groups, dropped } = group(
            &self.items,
            &*self.key_fn,
            &self.statics,
            &self.section_ordering,
            self.item_ordering.as_deref(),
        )?;

        // Infallible from here on.
        let previous = self.built.take();
        if self.collapse_new {
            for g in &groups {
                let known = previous
                    .as_ref()
                    .is_some_and(|b| b.key_index.contains_key(&g.key));
                if !known {
                    self.collapsed.insert(g.key.clone());
                }
            }
        }

        let mut sections = Vec::with_capacity(groups.len());
        let mut layouts = Vec::with_capacity(groups.len());
        let mut key_index = HashMap::with_capacity(groups.len());
        for (ordinal, g) in groups.into_iter().enumerate() {
            let mut flags = SectionFlags::empty();
            flags.set(SectionFlags::STATIC, g.is_static);
            flags.set(SectionFlags::EMPTY, g.items.is_empty());
            flags.set(SectionFlags::COLLAPSED, self.collapsed.contains(&g.key));
            let expanded = !flags.contains(SectionFlags::COLLAPSED);
            layouts.push(SectionLayout {
                headers: (self.header_count)(&g.key),
                items: if expanded { g.items.len() } else { 0 },
                placeholder: expanded && g.items.is_empty() && (self.placeholder)(&g.key),
                footers: (self.footer_count)(&g.key),
            });
            key_index.insert(g.key.clone(), ordinal);
            sections.push(Section {
                key: g.key,
                items: g.items,
                flags,
            });
        }
        self.collapsed.retain(|k| key_index.contains_key(k));

        let index = PositionIndex::build(
            self.global_headers.len(),
            layouts,
            self.global_placeholder.is_some(),
            self.global_footers.len(),
        );
        let report = RebuildReport {
            items: self.items.len(),
            dropped: dropped.len(),
            sections: sections.len(),
            slots: index.len(),
            work: self.items.len() + index.len(),
        };
        if let Some(observer) = self.observer.as_deref_mut() {
            for &i in &dropped {
                observer.item_dropped(i, &self.items[i]);
            }
            observer.rebuilt(&report);
        }
        self.built = Some(Built {
            sections,
            key_index,
            index,
            report,
        });
        Ok(report)
    }

    /// Rebuilds, or applies `undo` and keeps the previous build if that fails.
    fn rebuild_or_undo(
        &mut self,
        undo: impl FnOnce(&mut Self),
    ) -> Result<RebuildReport, SectionError> {
        let result = self.rebuild();
        if result.is_err() {
            undo(self);
        }
        result
    }

    fn replace_policy<P>(
        &mut self,
        field: fn(&mut Self) -> &mut P,
        value: P,
    ) -> Result<RebuildReport, SectionError> {
        let old = mem::replace(field(self), value);
        self.rebuild_or_undo(move |s| *field(s) = old)
    }

    fn update_collapsed(
        &mut self,
        update: impl FnOnce(&mut HashSet<K>, &[K]),
    ) -> Result<RebuildReport, SectionError> {
        let before = self.collapsed.clone();
        let keys: Vec<K> = self.section_keys().cloned().collect();
        update(&mut self.collapsed, &keys);
        self.rebuild_or_undo(move |s| s.collapsed = before)
    }

    fn update_globals(
        &mut self,
        update: impl FnOnce(&mut GlobalSlots, &mut GlobalSlots, &mut Option<ViewTypeTag>),
    ) -> Result<RebuildReport, SectionError> {
        let before = (
            self.global_headers.clone(),
            self.global_footers.clone(),
            self.global_placeholder,
        );
        update(
            &mut self.global_headers,
            &mut self.global_footers,
            &mut self.global_placeholder,
        );
        self.rebuild_or_undo(move |s| {
            (s.global_headers, s.global_footers, s.global_placeholder) = before;
        })
    }

    // --- items ---

    /// Replaces all items.
    pub fn set_items(
        &mut self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<RebuildReport, SectionError> {
        let old = mem::replace(&mut self.items, items.into_iter().collect());
        self.rebuild_or_undo(move |s| s.items = old)
    }

    /// Appends items after the existing ones.
    pub fn add_items(
        &mut self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<RebuildReport, SectionError> {
        let len = self.items.len();
        self.items.extend(items);
        self.rebuild_or_undo(move |s| s.items.truncate(len))
    }

    /// Appends one item.
    pub fn add_item(&mut self, item: T) -> Result<RebuildReport, SectionError> {
        self.add_items(core::iter::once(item))
    }

    /// Removes every item matching `pred`.
    pub fn remove_items_if(
        &mut self,
        pred: impl FnMut(&T) -> bool,
    ) -> Result<RebuildReport, SectionError> {
        let taken = take_where(&mut self.items, pred);
        self.rebuild_or_undo(move |s| put_back(&mut s.items, taken))
    }

    /// Removes the first item equal to `item`, if any.
    pub fn remove_item(&mut self, item: &T) -> Result<RebuildReport, SectionError>
    where
        T: PartialEq,
    {
        let mut found = false;
        self.remove_items_if(|x| {
            let hit = !found && x == item;
            found |= hit;
            hit
        })
    }

    /// Replaces the first item equal to `item` in place, or appends it.
    pub fn update_item(&mut self, item: T) -> Result<RebuildReport, SectionError>
    where
        T: PartialEq,
    {
        match self.items.iter().position(|x| *x == item) {
            Some(i) => {
                let old = mem::replace(&mut self.items[i], item);
                self.rebuild_or_undo(move |s| s.items[i] = old)
            }
            None => {
                self.items.push(item);
                self.rebuild_or_undo(|s| {
                    s.items.pop();
                })
            }
        }
    }

    /// Removes all items. Static sections remain.
    pub fn clear_items(&mut self) -> Result<RebuildReport, SectionError> {
        let old = mem::take(&mut self.items);
        self.rebuild_or_undo(move |s| s.items = old)
    }

    /// Replaces the items of section `key`.
    ///
    /// Incoming items whose key is not `key` are discarded. The replacements take
    /// the place of the first existing item of the section, or are appended if
    /// the section had no items.
    pub fn set_items_in_section(
        &mut self,
        key: &K,
        items: impl IntoIterator<Item = T>,
    ) -> Result<RebuildReport, SectionError> {
        let key_fn = &self.key_fn;
        let incoming: Vec<T> = items
            .into_iter()
            .filter(|item| key_fn(item).as_ref() == Some(key))
            .collect();
        let taken = take_where(&mut self.items, |item| key_fn(item).as_ref() == Some(key));

        let at = taken.first().map_or(self.items.len(), |&(i, _)| i);
        let count = incoming.len();
        let tail = self.items.split_off(at);
        self.items.extend(incoming);
        self.items.extend(tail);

        self.rebuild_or_undo(move |s| {
            let tail = s.items.split_off(at + count);
            s.items.truncate(at);
            s.items.extend(tail);
            put_back(&mut s.items, taken);
        })
    }

    /// Removes section `key` with all its items, even if it is static.
    pub fn remove_section(&mut self, key: &K) -> Result<RebuildReport, SectionError> {
        let key_fn = &self.key_fn;
        let taken = take_where(&mut self.items, |item| key_fn(item).as_ref() == Some(key));
        let static_at = self.statics.iter().position(|k| k == key);
        let static_key = static_at.map(|i| self.statics.remove(i));
        self.rebuild_or_undo(move |s| {
            put_back(&mut s.items, taken);
            if let (Some(i), Some(k)) = (static_at, static_key) {
                s.statics.insert(i, k);
            }
        })
    }

    /// Rebuilds with the current items and policies.
    ///
    /// Call this after changing state the list cannot see, such as data a
    /// policy closure reads from.
    pub fn refresh(&mut self) -> Result<RebuildReport, SectionError> {
        self.rebuild()
    }

    // --- policies ---

    /// Replaces the section key function.
    pub fn set_key_fn(
        &mut self,
        key_fn: impl Fn(&T) -> Option<K> + Send + 'static,
    ) -> Result<RebuildReport, SectionError> {
        let key_fn: KeyFn<T, K> = Box::new(key_fn);
        self.replace_policy(|s| &mut s.key_fn, key_fn)
    }

    /// Replaces the section ordering.
    pub fn set_section_ordering(
        &mut self,
        ordering: SectionOrdering<K>,
    ) -> Result<RebuildReport, SectionError> {
        self.replace_policy(|s| &mut s.section_ordering, ordering)
    }

    /// Stably sorts the items of each section with `compare`.
    pub fn set_item_ordering(
        &mut self,
        compare: impl Fn(&K, &T, &T) -> Ordering + Send + 'static,
    ) -> Result<RebuildReport, SectionError> {
        let compare: ItemCompare<T, K> = Box::new(compare);
        self.replace_policy(|s| &mut s.item_ordering, Some(compare))
    }

    /// Restores input order within sections.
    pub fn clear_item_ordering(&mut self) -> Result<RebuildReport, SectionError> {
        self.replace_policy(|s| &mut s.item_ordering, None)
    }

    /// Sets how many header slots each section gets.
    pub fn set_header_count(
        &mut self,
        count: impl Fn(&K) -> usize + Send + 'static,
    ) -> Result<RebuildReport, SectionError> {
        let count: CountFn<K> = Box::new(count);
        self.replace_policy(|s| &mut s.header_count, count)
    }

    /// Sets how many footer slots each section gets.
    pub fn set_footer_count(
        &mut self,
        count: impl Fn(&K) -> usize + Send + 'static,
    ) -> Result<RebuildReport, SectionError> {
        let count: CountFn<K> = Box::new(count);
        self.replace_policy(|s| &mut s.footer_count, count)
    }

    /// Sets which empty sections show a placeholder slot.
    pub fn set_placeholder(
        &mut self,
        show: impl Fn(&K) -> bool + Send + 'static,
    ) -> Result<RebuildReport, SectionError> {
        let show: PlaceholderFn<K> = Box::new(show);
        self.replace_policy(|s| &mut s.placeholder, show)
    }

    /// Sets the view type hook for section headers.
    pub fn set_header_view_type(
        &mut self,
        hook: impl Fn(&K, usize) -> ViewTypeTag + Send + 'static,
    ) {
        self.header_view = Box::new(hook);
    }

    /// Sets the view type hook for section footers.
    pub fn set_footer_view_type(
        &mut self,
        hook: impl Fn(&K, usize) -> ViewTypeTag + Send + 'static,
    ) {
        self.footer_view = Box::new(hook);
    }

    /// Sets the view type hook for items.
    pub fn set_item_view_type(&mut self, hook: impl Fn(&K, &T) -> ViewTypeTag + Send + 'static) {
        self.item_view = Box::new(hook);
    }

    /// Sets the view type hook for section placeholders.
    pub fn set_placeholder_view_type(&mut self, hook: impl Fn(&K) -> ViewTypeTag + Send + 'static) {
        self.placeholder_view = Box::new(hook);
    }

    /// Installs an observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl SectionObserver<T> + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Removes the observer.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // --- static sections ---

    /// Adds a section that is kept even while it has no items.
    ///
    /// Static sections are seen before any item, in the order they were added.
    pub fn add_static_section(&mut self, key: K) -> Result<RebuildReport, SectionError> {
        self.add_static_sections(core::iter::once(key))
    }

    /// Adds several static sections, skipping keys that are already static.
    pub fn add_static_sections(
        &mut self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<RebuildReport, SectionError> {
        let len = self.statics.len();
        for key in keys {
            if !self.statics.contains(&key) {
                self.statics.push(key);
            }
        }
        self.rebuild_or_undo(move |s| s.statics.truncate(len))
    }

    /// Makes section `key` non-static. Its items, if any, are kept.
    pub fn remove_static_section(&mut self, key: &K) -> Result<RebuildReport, SectionError> {
        let Some(i) = self.statics.iter().position(|k| k == key) else {
            return self.rebuild();
        };
        let removed = self.statics.remove(i);
        self.rebuild_or_undo(move |s| s.statics.insert(i, removed))
    }

    /// Makes every section non-static. Their items, if any, are kept.
    pub fn remove_static_sections(&mut self) -> Result<RebuildReport, SectionError> {
        let old = mem::take(&mut self.statics);
        self.rebuild_or_undo(move |s| s.statics = old)
    }

    /// Removes every item and every static section.
    pub fn clear_sections(&mut self) -> Result<RebuildReport, SectionError> {
        let items = mem::take(&mut self.items);
        let statics = mem::take(&mut self.statics);
        self.rebuild_or_undo(move |s| {
            s.items = items;
            s.statics = statics;
        })
    }

    // --- collapsing ---

    /// Hides the items of section `key`. Unknown keys are ignored.
    pub fn collapse_section(&mut self, key: &K) -> Result<RebuildReport, SectionError> {
        self.update_collapsed(|collapsed, keys| {
            if keys.contains(key) {
                collapsed.insert(key.clone());
            }
        })
    }

    /// Shows the items of section `key` again.
    pub fn expand_section(&mut self, key: &K) -> Result<RebuildReport, SectionError> {
        self.update_collapsed(|collapsed, _| {
            collapsed.remove(key);
        })
    }

    /// Flips the collapsed state of section `key`. Unknown keys are ignored.
    pub fn toggle_section(&mut self, key: &K) -> Result<RebuildReport, SectionError> {
        self.update_collapsed(|collapsed, keys| {
            if keys.contains(key) && !collapsed.remove(key) {
                collapsed.insert(key.clone());
            }
        })
    }

    /// Collapses every current section.
    pub fn collapse_all(&mut self) -> Result<RebuildReport, SectionError> {
        self.update_collapsed(|collapsed, keys| collapsed.extend(keys.iter().cloned()))
    }

    /// Expands every section.
    pub fn expand_all(&mut self) -> Result<RebuildReport, SectionError> {
        self.update_collapsed(|collapsed, _| collapsed.clear())
    }

    /// Expands every section if all are collapsed, and collapses every section
    /// if all are expanded.
    ///
    /// When both states are present, every section is expanded if
    /// `expand_default` is true and collapsed otherwise.
    pub fn toggle_all(&mut self, expand_default: bool) -> Result<RebuildReport, SectionError> {
        self.update_collapsed(|collapsed, keys| {
            let Some((first, rest)) = keys.split_first() else {
                return;
            };
            let first_collapsed = collapsed.contains(first);
            let expand = if rest.iter().all(|k| collapsed.contains(k) == first_collapsed) {
                first_collapsed
            } else {
                expand_default
            };
            if expand {
                collapsed.clear();
            } else {
                collapsed.extend(keys.iter().cloned());
            }
        })
    }

    /// Whether sections that first appear in later rebuilds start collapsed.
    pub fn set_collapse_new_sections(
        &mut self,
        collapse: bool,
    ) -> Result<RebuildReport, SectionError> {
        self.replace_policy(|s| &mut s.collapse_new, collapse)
    }

    // --- global slots ---

    /// Inserts a global header with `id`, or changes its view type if it exists.
    ///
    /// Global headers precede every section, ordered by ascending id.
    pub fn insert_global_header(
        &mut self,
        id: u32,
        view_type: ViewTypeTag,
    ) -> Result<RebuildReport, SectionError> {
        self.update_globals(|headers, _, _| insert_global(headers, id, view_type))
    }

    /// Removes the global header with `id`, if present.
    pub fn remove_global_header(&mut self, id: u32) -> Result<RebuildReport, SectionError> {
        self.update_globals(|headers, _, _| remove_global(headers, id))
    }

    /// Inserts a global footer with `id`, or changes its view type if it exists.
    ///
    /// Global footers follow every section, ordered by ascending id.
    pub fn insert_global_footer(
        &mut self,
        id: u32,
        view_type: ViewTypeTag,
    ) -> Result<RebuildReport, SectionError> {
        self.update_globals(|_, footers, _| insert_global(footers, id, view_type))
    }

    /// Removes the global footer with `id`, if present.
    pub fn remove_global_footer(&mut self, id: u32) -> Result<RebuildReport, SectionError> {
        self.update_globals(|_, footers, _| remove_global(footers, id))
    }

    /// Shows a global placeholder with this view type whenever no section
    /// occupies a slot, or removes it with `None`.
    pub fn set_global_placeholder(
        &mut self,
        view_type: Option<ViewTypeTag>,
    ) -> Result<RebuildReport, SectionError> {
        self.update_globals(|_, _, placeholder| *placeholder = view_type)
    }

    /// Whether a global header with `id` exists.
    #[must_use]
    pub fn has_global_header(&self, id: u32) -> bool {
        self.global_headers.iter().any(|g| g.id == id)
    }

    /// Whether a global footer with `id` exists.
    #[must_use]
    pub fn has_global_footer(&self, id: u32) -> bool {
        self.global_footers.iter().any(|g| g.id == id)
    }

    /// Number of global headers.
    #[must_use]
    pub fn global_header_count(&self) -> usize {
        self.global_headers.len()
    }

    /// Number of global footers.
    #[must_use]
    pub fn global_footer_count(&self) -> usize {
        self.global_footers.len()
    }

    // --- position queries ---

    fn current(&self) -> Result<&Built<K>, SectionError> {
        self.built.as_ref().ok_or(SectionError::NotBuilt)
    }

    /// Total number of flat positions.
    #[must_use]
    pub fn total_slot_count(&self) -> usize {
        self.built.as_ref().map_or(0, |b| b.index.len())
    }

    /// Resolves a flat position to its slot.
    pub fn slot_at(&self, position: usize) -> Result<Slot, SectionError> {
        let built = self.current()?;
        built.index.slot_at(position).ok_or(SectionError::OutOfRange {
            position,
            len: built.index.len(),
        })
    }

    /// Flat position of `slot`.
    pub fn position_of(&self, slot: Slot) -> Result<usize, SectionError> {
        self.current()?
            .index
            .position_of(slot)
            .ok_or(SectionError::NoSuchSlot { slot })
    }

    /// Kind of the slot at `position`.
    pub fn slot_kind(&self, position: usize) -> Result<SlotKind, SectionError> {
        self.slot_at(position).map(Slot::kind)
    }

    /// Everything needed to bind the slot at `position`.
    pub fn entry(&self, position: usize) -> Result<Entry<'_, T, K>, SectionError> {
        let built = self.current()?;
        Ok(match self.slot_at(position)? {
            Slot::GlobalHeader { index } => Entry::GlobalHeader {
                id: self.global_headers[index].id,
            },
            Slot::Header { section, index } => Entry::Header {
                key: &built.sections[section].key,
                section,
                index,
            },
            Slot::Item { section, index } => {
                let s = &built.sections[section];
                Entry::Item {
                    key: &s.key,
                    section,
                    index,
                    item: &self.items[s.items[index]],
                }
            }
            Slot::Placeholder { section } => Entry::Placeholder {
                key: &built.sections[section].key,
                section,
            },
            Slot::Footer { section, index } => Entry::Footer {
                key: &built.sections[section].key,
                section,
                index,
            },
            Slot::GlobalPlaceholder => Entry::GlobalPlaceholder,
            Slot::GlobalFooter { index } => Entry::GlobalFooter {
                id: self.global_footers[index].id,
            },
        })
    }

    /// View type of the slot at `position`.
    pub fn view_type_at(&self, position: usize) -> Result<ViewTypeTag, SectionError> {
        Ok(match self.entry(position)? {
            Entry::GlobalHeader { id } => global_view_type(&self.global_headers, id),
            Entry::Header { key, index, .. } => self.view_type_for_header(key, index),
            Entry::Item { key, item, .. } => self.view_type_for_item(key, item),
            Entry::Placeholder { key, .. } => self.view_type_for_placeholder(key),
            Entry::Footer { key, index, .. } => self.view_type_for_footer(key, index),
            Entry::GlobalPlaceholder => self.global_placeholder.unwrap_or(ViewTypeTag::PLACEHOLDER),
            Entry::GlobalFooter { id } => global_view_type(&self.global_footers, id),
        })
    }

    /// The item at `position`.
    pub fn item_at(&self, position: usize) -> Result<&T, SectionError> {
        match self.entry(position)? {
            Entry::Item { item, .. } => Ok(item),
            _ => Err(SectionError::NotAnItemSlot {
                position,
                found: self.slot_kind(position)?,
            }),
        }
    }

    /// Key of the section owning `position`.
    pub fn section_key_at(&self, position: usize) -> Result<&K, SectionError> {
        let section = self.section_at(position)?;
        Ok(&self.current()?.sections[section].key)
    }

    /// Ordinal of the section owning `position`.
    pub fn section_at(&self, position: usize) -> Result<usize, SectionError> {
        let slot = self.slot_at(position)?;
        slot.section().ok_or(SectionError::NotInSection {
            position,
            found: slot.kind(),
        })
    }

    /// Header index of the header slot at `position`.
    pub fn header_index_at(&self, position: usize) -> Result<usize, SectionError> {
        match self.slot_at(position)? {
            Slot::Header { index, .. } => Ok(index),
            other => Err(SectionError::SlotKindMismatch {
                position,
                expected: SlotKind::Header,
                found: other.kind(),
            }),
        }
    }

    /// Footer index of the footer slot at `position`.
    pub fn footer_index_at(&self, position: usize) -> Result<usize, SectionError> {
        match self.slot_at(position)? {
            Slot::Footer { index, .. } => Ok(index),
            other => Err(SectionError::SlotKindMismatch {
                position,
                expected: SlotKind::Footer,
                found: other.kind(),
            }),
        }
    }

    // --- traversal ---

    /// Visits visible items in flat order with their section ordinal and
    /// in-section index.
    ///
    /// Returns the position of the item at which `visitor` returned
    /// [`Visit::Stop`], or `None` if every item was visited.
    pub fn for_each_item(
        &self,
        mut visitor: impl FnMut(&T, usize, usize) -> Visit,
    ) -> Option<usize> {
        let built = self.built.as_ref()?;
        for (ordinal, section) in built.sections.iter().enumerate() {
            let (Some(layout), Some(range)) =
                (built.index.layout(ordinal), built.index.section_range(ordinal))
            else {
                continue;
            };
            let first = range.start + layout.headers;
            for (i, &item) in section.items[..layout.items].iter().enumerate() {
                if visitor(&self.items[item], ordinal, i) == Visit::Stop {
                    return Some(first + i);
                }
            }
        }
        None
    }

    /// Visible items in flat order, with their position and section key.
    pub fn items_with_positions(&self) -> impl Iterator<Item = (usize, &K, &T)> {
        self.built.iter().flat_map(move |built| {
            built
                .sections
                .iter()
                .enumerate()
                .flat_map(move |(ordinal, section)| {
                    let layout = built.index.layout(ordinal).unwrap_or_default();
                    let first =
                        built.index.section_range(ordinal).map_or(0, |r| r.start) + layout.headers;
                    section.items[..layout.items]
                        .iter()
                        .enumerate()
                        .map(move |(i, &item)| (first + i, &section.key, &self.items[item]))
                })
        })
    }

    /// Position of the first visible item matching `pred`.
    pub fn find_position(&self, mut pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items_with_positions()
            .find(|&(_, _, item)| pred(item))
            .map(|(position, _, _)| position)
    }

    /// Every slot in flat order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> {
        self.built.iter().flat_map(|built| {
            (0..built.index.len()).filter_map(move |p| built.index.slot_at(p))
        })
    }

    /// The ordered slots of section `ordinal`; empty if there is no such section.
    pub fn section_slots(&self, ordinal: usize) -> impl Iterator<Item = Slot> {
        self.built
            .as_ref()
            .and_then(|built| built.index.layout(ordinal))
            .into_iter()
            .flat_map(move |layout| layout.slots(ordinal))
    }

    // --- view types ---

    /// View type of header `index` of section `key`.
    #[must_use]
    pub fn view_type_for_header(&self, key: &K, index: usize) -> ViewTypeTag {
        (self.header_view)(key, index)
    }

    /// View type of footer `index` of section `key`.
    #[must_use]
    pub fn view_type_for_footer(&self, key: &K, index: usize) -> ViewTypeTag {
        (self.footer_view)(key, index)
    }

    /// View type of `item` in section `key`.
    #[must_use]
    pub fn view_type_for_item(&self, key: &K, item: &T) -> ViewTypeTag {
        (self.item_view)(key, item)
    }

    /// View type of the placeholder of section `key`.
    #[must_use]
    pub fn view_type_for_placeholder(&self, key: &K) -> ViewTypeTag {
        (self.placeholder_view)(key)
    }

    // --- sections ---

    /// Number of sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.built.as_ref().map_or(0, |b| b.index.section_count())
    }

    /// Ordinal of section `key`.
    #[must_use]
    pub fn section_index(&self, key: &K) -> Option<usize> {
        self.built.as_ref()?.key_index.get(key).copied()
    }

    /// Summary of section `ordinal`.
    #[must_use]
    pub fn section(&self, ordinal: usize) -> Option<SectionInfo<'_, K>> {
        let built = self.built.as_ref()?;
        let section = built.sections.get(ordinal)?;
        let layout = built.index.layout(ordinal)?;
        let range = built.index.section_range(ordinal)?;
        Some(SectionInfo {
            key: &section.key,
            ordinal,
            item_count: section.items.len(),
            header_count: layout.headers,
            footer_count: layout.footers,
            flags: section.flags,
            start: range.start,
            slot_count: range.len(),
        })
    }

    /// Section keys in section order.
    pub fn section_keys(&self) -> impl Iterator<Item = &K> {
        self.built
            .iter()
            .flat_map(|built| built.sections.iter().map(|s| &s.key))
    }

    /// Items grouped into section `key`, including hidden ones, in display order.
    pub fn items_in_section<'a>(&'a self, key: &K) -> impl Iterator<Item = &'a T> + use<'a, T, K> {
        let section = self
            .built
            .as_ref()
            .and_then(|b| b.key_index.get(key).map(|&o| &b.sections[o]));
        section
            .into_iter()
            .flat_map(move |s| s.items.iter().map(move |&i| &self.items[i]))
    }

    /// Number of items grouped into section `key`.
    #[must_use]
    pub fn item_count_in_section(&self, key: &K) -> usize {
        self.section_index(key)
            .and_then(|o| self.section(o))
            .map_or(0, |info| info.item_count)
    }

    /// Whether section `key` is collapsed.
    #[must_use]
    pub fn is_collapsed(&self, key: &K) -> bool {
        self.collapsed.contains(key)
    }

    /// Number of items grouped into any section.
    #[must_use]
    pub fn total_item_count(&self) -> usize {
        self.built
            .as_ref()
            .map_or(0, |b| b.report.items - b.report.dropped)
    }

    /// Whether no item belongs to any section.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_item_count() == 0
    }

    /// All owned items in input order, including dropped ones.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Report of the current build.
    #[must_use]
    pub fn last_report(&self) -> Option<RebuildReport> {
        self.built.as_ref().map(|b| b.report)
    }
}

impl<T: fmt::Debug, K: fmt::Debug> fmt::Debug for SectionedList<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionedList")
            .field("items", &self.items)
            .field("section_ordering", &self.section_ordering)
            .field("statics", &self.statics)
            .field("collapse_new", &self.collapse_new)
            .field("global_headers", &self.global_headers)
            .field("global_footers", &self.global_footers)
            .field("global_placeholder", &self.global_placeholder)
            .field("built", &self.built)
            .finish_non_exhaustive()
    }
}
