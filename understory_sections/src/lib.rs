// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_sections --heading-base-level=0

//! Understory Sections: grouping and position mapping for sectioned lists.
//!
//! This crate provides a renderer-agnostic core for lists whose items are grouped
//! into sections, each surrounded by synthetic header and footer slots. A linear
//! list surface only knows flat positions `0..len`; this crate maps every flat
//! position to a [`Slot`] and back.
//!
//! The core concepts are:
//!
//! - [`SectionedList`]: owns the items and the policies, and rebuilds its index
//!   synchronously after every mutation.
//! - [`Slot`]: one addressable unit in display order. Section slots carry their
//!   section ordinal and their index within their kind.
//! - [`SectionOrdering`]: first-seen order (the default) or a stable sort by a key
//!   comparator, optionally rejecting ties.
//! - [`Entry`]: everything a bind callback needs for one position.
//! - [`ViewTypeTag`]: a data-driven view classification returned per slot.
//! - [`SectionObserver`]: receives dropped-item and rebuild events.
//!
//! The flat order is global headers, then each section's headers, items (or
//! placeholder) and footers, then the global placeholder when no section occupies
//! a slot, then global footers. Resolving a position is a binary search over
//! section starts.
//!
//! This crate deliberately does **not** know about views, widgets, or any
//! particular UI framework. Host frameworks are responsible for:
//!
//! - Creating views per [`ViewTypeTag`] and binding them from [`SectionedList::entry`].
//! - Reporting the slot count from [`SectionedList::total_slot_count`] to their list.
//! - Treating positions as invalid after any mutation.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_sections::{SectionedList, SlotKind, Visit};
//!
//! // Contacts grouped by initial, in first-seen order.
//! let mut list = SectionedList::new(|name: &&str| name.chars().next());
//! list.set_items(["Bea", "Al", "Bo"]).unwrap();
//!
//! // B: header, Bea, Bo. A: header, Al.
//! assert_eq!(list.total_slot_count(), 5);
//! assert_eq!(list.slot_kind(0), Ok(SlotKind::Header));
//! assert_eq!(list.section_key_at(0), Ok(&'B'));
//! assert_eq!(list.item_at(2), Ok(&"Bo"));
//! assert!(list.item_at(3).is_err());
//!
//! let mut names = Vec::new();
//! list.for_each_item(|name, _section, _index| {
//!     names.push(*name);
//!     Visit::Continue
//! });
//! assert_eq!(names, ["Bea", "Bo", "Al"]);
//! ```
//!
//! ## Policies
//!
//! Header and footer counts, placeholders, and view types are pluggable:
//!
//! ```rust
//! use understory_sections::{SectionOrdering, SectionedList, ViewTypeTag};
//!
//! let mut list = SectionedList::new(|n: &u32| Some(n / 10));
//! list.set_section_ordering(SectionOrdering::by_key()).unwrap();
//! list.set_header_count(|_| 2).unwrap();
//! list.set_header_view_type(|_, index| {
//!     if index == 0 { ViewTypeTag(10) } else { ViewTypeTag(11) }
//! });
//! list.set_items([21, 3, 25]).unwrap();
//!
//! // Section 0 (key 0): 2 headers + 1 item. Section 1 (key 2): 2 headers + 2 items.
//! assert_eq!(list.total_slot_count(), 7);
//! assert_eq!(list.view_type_at(1), Ok(ViewTypeTag(11)));
//! assert_eq!(list.item_at(2), Ok(&3));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod grouping;
mod layout;
mod list;
mod observer;
mod position;
mod types;

pub use error::SectionError;
pub use grouping::{ItemCompare, KeyCompare, KeyFn, SectionOrdering};
#[cfg(feature = "log")]
pub use observer::LogObserver;
pub use observer::{RebuildReport, SectionObserver};
pub use list::SectionedList;
pub use types::{Entry, SectionFlags, SectionInfo, Slot, SlotKind, ViewTypeTag, Visit};
