// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot descriptors, view type tags, and section flags.

/// The kind of a [`Slot`], without its indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A header placed before all sections.
    GlobalHeader,
    /// A header of a section.
    Header,
    /// An item of a section.
    Item,
    /// The no-content slot of an empty section.
    Placeholder,
    /// A footer of a section.
    Footer,
    /// The no-content slot shown when no section produces any slot.
    GlobalPlaceholder,
    /// A footer placed after all sections.
    GlobalFooter,
}

/// One addressable unit in the flattened display order.
///
/// Section ordinals and indices are only meaningful for the build that produced
/// them; any mutation of the owning [`SectionedList`](crate::SectionedList)
/// invalidates previously obtained slots and positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The `index`-th global header.
    GlobalHeader {
        /// Index among global headers, in ascending id order.
        index: usize,
    },
    /// The `index`-th header of section `section`.
    Header {
        /// Section ordinal.
        section: usize,
        /// Header index within the section.
        index: usize,
    },
    /// The `index`-th item of section `section`.
    Item {
        /// Section ordinal.
        section: usize,
        /// Item index within the section.
        index: usize,
    },
    /// The placeholder of an empty section.
    Placeholder {
        /// Section ordinal.
        section: usize,
    },
    /// The `index`-th footer of section `section`.
    Footer {
        /// Section ordinal.
        section: usize,
        /// Footer index within the section.
        index: usize,
    },
    /// The placeholder shown when there are no section slots at all.
    GlobalPlaceholder,
    /// The `index`-th global footer.
    GlobalFooter {
        /// Index among global footers, in ascending id order.
        index: usize,
    },
}

impl Slot {
    /// Returns the kind of this slot.
    #[must_use]
    pub const fn kind(self) -> SlotKind {
        match self {
            Self::GlobalHeader { .. } => SlotKind::GlobalHeader,
            Self::Header { .. } => SlotKind::Header,
            Self::Item { .. } => SlotKind::Item,
            Self::Placeholder { .. } => SlotKind::Placeholder,
            Self::Footer { .. } => SlotKind::Footer,
            Self::GlobalPlaceholder => SlotKind::GlobalPlaceholder,
            Self::GlobalFooter { .. } => SlotKind::GlobalFooter,
        }
    }

    /// Returns the owning section ordinal, or `None` for global slots.
    #[must_use]
    pub const fn section(self) -> Option<usize> {
        match self {
            Self::Header { section, .. }
            | Self::Item { section, .. }
            | Self::Placeholder { section }
            | Self::Footer { section, .. } => Some(section),
            Self::GlobalHeader { .. } | Self::GlobalPlaceholder | Self::GlobalFooter { .. } => {
                None
            }
        }
    }

    /// Returns the index of this slot among slots of the same kind in its scope.
    ///
    /// Placeholders are always `0`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::GlobalHeader { index }
            | Self::Header { index, .. }
            | Self::Item { index, .. }
            | Self::Footer { index, .. }
            | Self::GlobalFooter { index } => index,
            Self::Placeholder { .. } | Self::GlobalPlaceholder => 0,
        }
    }
}

/// A data-driven view classification for a slot.
///
/// Rendering surfaces switch on the tag to pick a presentation; the engine
/// attaches no meaning to the value beyond the defaults below.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewTypeTag(pub u32);

impl ViewTypeTag {
    /// Default tag for items.
    pub const ITEM: Self = Self(0);
    /// Default tag for section headers.
    pub const HEADER: Self = Self(1);
    /// Default tag for section footers.
    pub const FOOTER: Self = Self(2);
    /// Default tag for section placeholders.
    pub const PLACEHOLDER: Self = Self(3);
}

bitflags::bitflags! {
    /// Per-section state computed on rebuild.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SectionFlags: u8 {
        /// The section is kept even when it has no items.
        const STATIC    = 0b0000_0001;
        /// The section shows only its headers and footers.
        const COLLAPSED = 0b0000_0010;
        /// The section has no items.
        const EMPTY     = 0b0000_0100;
    }
}

/// Read-only summary of one section of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo<'a, K> {
    /// The section key.
    pub key: &'a K,
    /// The section ordinal.
    pub ordinal: usize,
    /// Number of items grouped into the section, including hidden ones.
    pub item_count: usize,
    /// Number of header slots.
    pub header_count: usize,
    /// Number of footer slots.
    pub footer_count: usize,
    /// Section state.
    pub flags: SectionFlags,
    /// Flat position of the section's first slot.
    pub start: usize,
    /// Number of slots the section occupies.
    pub slot_count: usize,
}

/// Everything a bind callback needs for one flat position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a, T, K> {
    /// A global header.
    GlobalHeader {
        /// The id it was inserted with.
        id: u32,
    },
    /// A section header.
    Header {
        /// Owning section key.
        key: &'a K,
        /// Section ordinal.
        section: usize,
        /// Header index within the section.
        index: usize,
    },
    /// A section item.
    Item {
        /// Owning section key.
        key: &'a K,
        /// Section ordinal.
        section: usize,
        /// Item index within the section.
        index: usize,
        /// The item.
        item: &'a T,
    },
    /// The placeholder of an empty section.
    Placeholder {
        /// Owning section key.
        key: &'a K,
        /// Section ordinal.
        section: usize,
    },
    /// A section footer.
    Footer {
        /// Owning section key.
        key: &'a K,
        /// Section ordinal.
        section: usize,
        /// Footer index within the section.
        index: usize,
    },
    /// The global placeholder.
    GlobalPlaceholder,
    /// A global footer.
    GlobalFooter {
        /// The id it was inserted with.
        id: u32,
    },
}

/// Controls whether a traversal keeps going.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Visit the next item.
    Continue,
    /// Stop the traversal.
    Stop,
}
