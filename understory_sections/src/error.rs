// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for queries and rebuilds.

use core::fmt;

use crate::types::{Slot, SlotKind};

/// Errors reported by [`SectionedList`](crate::SectionedList).
///
/// All errors are local to the call that produced them; a failed query or
/// rebuild leaves the previous build in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionError {
    /// A query was issued while no valid build exists.
    NotBuilt,
    /// A flat position is outside `0..len`.
    OutOfRange {
        /// The requested position.
        position: usize,
        /// The total slot count of the current build.
        len: usize,
    },
    /// An item accessor was called on a position that does not hold an item.
    NotAnItemSlot {
        /// The requested position.
        position: usize,
        /// The kind of slot found there.
        found: SlotKind,
    },
    /// A kind-specific accessor was called on a slot of another kind.
    SlotKindMismatch {
        /// The requested position.
        position: usize,
        /// The kind the accessor expects.
        expected: SlotKind,
        /// The kind of slot found there.
        found: SlotKind,
    },
    /// A section accessor was called on a global slot.
    NotInSection {
        /// The requested position.
        position: usize,
        /// The kind of slot found there.
        found: SlotKind,
    },
    /// A slot descriptor does not exist in the current build.
    NoSuchSlot {
        /// The offending slot.
        slot: Slot,
    },
    /// A strict section ordering found two distinct keys that compare equal.
    DuplicateSectionOrdering {
        /// First-seen ordinal of the first tied section.
        first: usize,
        /// First-seen ordinal of the second tied section.
        second: usize,
    },
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBuilt => write!(f, "sections have not been built"),
            Self::OutOfRange { position, len } => {
                write!(f, "position {position} out of range (slot count {len})")
            }
            Self::NotAnItemSlot { position, found } => {
                write!(f, "position {position} holds a {found:?} slot, not an item")
            }
            Self::SlotKindMismatch {
                position,
                expected,
                found,
            } => write!(
                f,
                "position {position} holds a {found:?} slot, expected {expected:?}"
            ),
            Self::NotInSection { position, found } => {
                write!(f, "position {position} holds a {found:?} slot outside any section")
            }
            Self::NoSuchSlot { slot } => write!(f, "slot {slot:?} is not part of the layout"),
            Self::DuplicateSectionOrdering { first, second } => write!(
                f,
                "section ordering ties distinct sections {first} and {second} under strict ordering"
            ),
        }
    }
}

impl core::error::Error for SectionError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::SectionError;
    use crate::types::SlotKind;

    #[test]
    fn display_names_the_position() {
        let e = SectionError::OutOfRange {
            position: 9,
            len: 8,
        };
        assert_eq!(e.to_string(), "position 9 out of range (slot count 8)");

        let e = SectionError::NotAnItemSlot {
            position: 0,
            found: SlotKind::Header,
        };
        assert_eq!(e.to_string(), "position 0 holds a Header slot, not an item");
    }
}
