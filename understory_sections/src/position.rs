// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat position index over global slots and section layouts.

use alloc::vec::Vec;
use core::ops::Range;

use crate::layout::SectionLayout;
use crate::types::Slot;

/// Prefix sums of section slot counts, bracketed by global slots.
///
/// The flat order is: global headers, every section in order, the global
/// placeholder (only when the sections produce no slot), then global footers.
#[derive(Clone, Debug, Default)]
pub(crate) struct PositionIndex {
    leading: usize,
    /// Absolute start position of each section.
    starts: Vec<usize>,
    layouts: Vec<SectionLayout>,
    sections_end: usize,
    global_placeholder: bool,
    trailing: usize,
}

impl PositionIndex {
    /// Builds the index for `layouts`.
    ///
    /// `placeholder` requests a global placeholder; it is only shown when the
    /// sections occupy no slot.
    pub(crate) fn build(
        leading: usize,
        layouts: Vec<SectionLayout>,
        placeholder: bool,
        trailing: usize,
    ) -> Self {
        let mut starts = Vec::with_capacity(layouts.len());
        let mut pos = leading;
        for layout in &layouts {
            starts.push(pos);
            pos += layout.slot_count();
        }
        Self {
            leading,
            starts,
            layouts,
            sections_end: pos,
            global_placeholder: placeholder && pos == leading,
            trailing,
        }
    }

    /// Total number of flat positions.
    pub(crate) const fn len(&self) -> usize {
        self.sections_end + self.global_placeholder as usize + self.trailing
    }

    pub(crate) fn section_count(&self) -> usize {
        self.layouts.len()
    }

    pub(crate) fn layout(&self, section: usize) -> Option<SectionLayout> {
        self.layouts.get(section).copied()
    }

    /// Flat range covered by section `section`.
    pub(crate) fn section_range(&self, section: usize) -> Option<Range<usize>> {
        let start = *self.starts.get(section)?;
        Some(start..start + self.layouts[section].slot_count())
    }

    /// Ordinal of the section owning `position`, if it lies inside a section.
    ///
    /// Zero-slot sections share their start with the next section, so the last
    /// section starting at or before `position` is the owner.
    pub(crate) fn section_at(&self, position: usize) -> Option<usize> {
        if position < self.leading || position >= self.sections_end {
            return None;
        }
        Some(self.starts.partition_point(|&s| s <= position) - 1)
    }

    /// Resolves `position` to its slot.
    pub(crate) fn slot_at(&self, position: usize) -> Option<Slot> {
        if position < self.leading {
            return Some(Slot::GlobalHeader { index: position });
        }
        if let Some(section) = self.section_at(position) {
            return self.layouts[section].slot_at(section, position - self.starts[section]);
        }
        let mut rest = position - self.sections_end;
        if self.global_placeholder {
            if rest == 0 {
                return Some(Slot::GlobalPlaceholder);
            }
            rest -= 1;
        }
        (rest < self.trailing).then_some(Slot::GlobalFooter { index: rest })
    }

    /// Flat position of `slot`, or `None` if the slot is not part of this index.
    pub(crate) fn position_of(&self, slot: Slot) -> Option<usize> {
        match slot {
            Slot::GlobalHeader { index } => (index < self.leading).then_some(index),
            Slot::GlobalPlaceholder => self.global_placeholder.then_some(self.sections_end),
            Slot::GlobalFooter { index } => (index < self.trailing)
                .then_some(self.sections_end + self.global_placeholder as usize + index),
            Slot::Header { section, .. }
            | Slot::Item { section, .. }
            | Slot::Placeholder { section }
            | Slot::Footer { section, .. } => {
                let layout = self.layouts.get(section)?;
                Some(self.starts[section] + layout.offset_of(slot)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::PositionIndex;
    use crate::layout::SectionLayout;
    use crate::types::Slot;

    fn layout(headers: usize, items: usize, footers: usize) -> SectionLayout {
        SectionLayout {
            headers,
            items,
            placeholder: false,
            footers,
        }
    }

    #[test]
    fn header_accounting() {
        // Sections with 2, 0 and 3 items, one header each.
        let index = PositionIndex::build(
            0,
            vec![layout(1, 2, 0), layout(1, 0, 0), layout(1, 3, 0)],
            false,
            0,
        );
        assert_eq!(index.len(), 8);
        assert_eq!(index.section_count(), 3);
        assert_eq!(
            index.slot_at(3),
            Some(Slot::Header {
                section: 1,
                index: 0
            })
        );
        assert_eq!(
            index.slot_at(7),
            Some(Slot::Item {
                section: 2,
                index: 2
            })
        );
        assert_eq!(index.slot_at(8), None);
        assert_eq!(index.section_range(2), Some(4..8));
    }

    #[test]
    fn zero_slot_sections_are_skipped() {
        let index = PositionIndex::build(
            0,
            vec![layout(0, 0, 0), layout(0, 2, 0), layout(0, 0, 0), layout(0, 1, 0)],
            false,
            0,
        );
        assert_eq!(index.len(), 3);
        assert_eq!(index.section_at(0), Some(1));
        assert_eq!(index.section_at(1), Some(1));
        assert_eq!(index.section_at(2), Some(3));
        assert_eq!(
            index.slot_at(2),
            Some(Slot::Item {
                section: 3,
                index: 0
            })
        );
    }

    #[test]
    fn global_slots_bracket_sections() {
        let index = PositionIndex::build(2, vec![layout(1, 1, 0)], true, 1);
        assert_eq!(index.len(), 5);
        let slots: Vec<_> = (0..index.len()).filter_map(|p| index.slot_at(p)).collect();
        assert_eq!(
            slots,
            vec![
                Slot::GlobalHeader { index: 0 },
                Slot::GlobalHeader { index: 1 },
                Slot::Header {
                    section: 0,
                    index: 0
                },
                Slot::Item {
                    section: 0,
                    index: 0
                },
                Slot::GlobalFooter { index: 0 },
            ]
        );
        assert_eq!(index.position_of(Slot::GlobalPlaceholder), None);
    }

    #[test]
    fn global_placeholder_only_without_section_slots() {
        let index = PositionIndex::build(1, vec![layout(0, 0, 0)], true, 1);
        assert_eq!(index.len(), 3);
        assert_eq!(index.slot_at(1), Some(Slot::GlobalPlaceholder));
        assert_eq!(index.slot_at(2), Some(Slot::GlobalFooter { index: 0 }));
        assert_eq!(index.position_of(Slot::GlobalFooter { index: 0 }), Some(2));
        assert_eq!(index.section_at(1), None);
    }

    #[test]
    fn position_of_inverts_slot_at() {
        let index = PositionIndex::build(
            1,
            vec![
                layout(2, 1, 1),
                SectionLayout {
                    headers: 1,
                    items: 0,
                    placeholder: true,
                    footers: 0,
                },
                layout(0, 0, 0),
                layout(1, 4, 2),
            ],
            true,
            2,
        );
        for p in 0..index.len() {
            let slot = index.slot_at(p).unwrap();
            assert_eq!(index.position_of(slot), Some(p), "{slot:?}");
        }
        assert_eq!(
            index.position_of(Slot::Item {
                section: 9,
                index: 0
            }),
            None
        );
        assert_eq!(index.position_of(Slot::GlobalHeader { index: 1 }), None);
    }

    #[test]
    fn empty_index() {
        let index = PositionIndex::default();
        assert_eq!(index.len(), 0);
        assert_eq!(index.slot_at(0), None);
        assert_eq!(index.section_at(0), None);
    }
}
