// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rebuild reports and the observer hook.

/// Summary of one completed rebuild.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Items owned by the list, including dropped ones.
    pub items: usize,
    /// Items excluded because their key function returned `None`.
    pub dropped: usize,
    /// Sections in the new build.
    pub sections: usize,
    /// Total flat slot count of the new build.
    pub slots: usize,
    /// Items examined plus slots laid out; proportional to rebuild cost.
    pub work: usize,
}

/// Receives events from a [`SectionedList`](crate::SectionedList).
///
/// Both methods default to doing nothing. Events are only emitted for rebuilds
/// that succeed; a rebuild that fails is rolled back silently and reported to
/// the caller as an error instead.
pub trait SectionObserver<T> {
    /// Called once per rebuild for every item whose key function returned `None`.
    ///
    /// `index` is the item's index in the list's owned item sequence. Dropped
    /// items stay in that sequence, so every later rebuild reports them again,
    /// including rebuilds that only change collapsed or global state. Hosts that
    /// want one event per item de-duplicate on their side.
    fn item_dropped(&mut self, index: usize, item: &T) {
        let _ = (index, item);
    }

    /// Called after a rebuild completes.
    fn rebuilt(&mut self, report: &RebuildReport) {
        let _ = report;
    }
}

/// Forwards observer events to the [`log`] facade.
///
/// Dropped items are logged at `trace` level, rebuilds at `debug` level.
#[cfg(feature = "log")]
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver;

#[cfg(feature = "log")]
impl<T> SectionObserver<T> for LogObserver {
    fn item_dropped(&mut self, index: usize, _item: &T) {
        log::trace!("item {index} has no section key; excluded from all sections");
    }

    fn rebuilt(&mut self, report: &RebuildReport) {
        log::debug!(
            "rebuilt sections: items={} dropped={} sections={} slots={} work={}",
            report.items,
            report.dropped,
            report.sections,
            report.slots,
            report.work,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{RebuildReport, SectionObserver};

    struct Silent;

    impl SectionObserver<u8> for Silent {}

    #[test]
    fn default_methods_are_no_ops() {
        let mut o = Silent;
        o.item_dropped(0, &7);
        o.rebuilt(&RebuildReport::default());
    }

    #[cfg(feature = "log")]
    #[test]
    fn log_observer_accepts_events() {
        let mut o = super::LogObserver;
        SectionObserver::<u8>::item_dropped(&mut o, 3, &1);
        SectionObserver::<u8>::rebuilt(&mut o, &RebuildReport::default());
    }
}
