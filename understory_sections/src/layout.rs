// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-section slot layout: headers, then items or a placeholder, then footers.

use crate::types::Slot;

/// Slot counts of one section.
///
/// The slot list of a section is fully determined by these counts, so slots are
/// derived arithmetically instead of being stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SectionLayout {
    pub(crate) headers: usize,
    /// Items that occupy slots; zero while the section is collapsed.
    pub(crate) items: usize,
    pub(crate) placeholder: bool,
    pub(crate) footers: usize,
}

impl SectionLayout {
    /// Number of slots this section occupies.
    pub(crate) const fn slot_count(&self) -> usize {
        self.headers + self.body() + self.footers
    }

    const fn body(&self) -> usize {
        self.items + self.placeholder as usize
    }

    /// Resolves a section-relative offset to a slot of section `section`.
    pub(crate) fn slot_at(&self, section: usize, offset: usize) -> Option<Slot> {
        if offset < self.headers {
            return Some(Slot::Header {
                section,
                index: offset,
            });
        }
        let offset = offset - self.headers;
        if offset < self.items {
            return Some(Slot::Item {
                section,
                index: offset,
            });
        }
        if self.placeholder && offset == 0 {
            return Some(Slot::Placeholder { section });
        }
        let offset = offset - self.body();
        (offset < self.footers).then_some(Slot::Footer {
            section,
            index: offset,
        })
    }

    /// Section-relative offset of `slot`, or `None` if this layout has no such slot.
    ///
    /// The slot's section ordinal is not checked.
    pub(crate) fn offset_of(&self, slot: Slot) -> Option<usize> {
        match slot {
            Slot::Header { index, .. } => (index < self.headers).then_some(index),
            Slot::Item { index, .. } => (index < self.items).then_some(self.headers + index),
            Slot::Placeholder { .. } => self.placeholder.then_some(self.headers),
            Slot::Footer { index, .. } => {
                (index < self.footers).then_some(self.headers + self.body() + index)
            }
            Slot::GlobalHeader { .. } | Slot::GlobalPlaceholder | Slot::GlobalFooter { .. } => None,
        }
    }

    /// The ordered slots of section `section`.
    pub(crate) fn slots(self, section: usize) -> impl Iterator<Item = Slot> + Clone {
        (0..self.slot_count()).filter_map(move |offset| self.slot_at(section, offset))
    }
}
