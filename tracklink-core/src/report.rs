//! Pending Report Buffer
//!
//! ## Overview
//!
//! Reports received from other trackers wait here until the transmission
//! scheduler forwards them. Only the newest report per source matters, so
//! the buffer deduplicates instead of queueing history.
//!
//! ## Layout
//!
//! ```text
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  A  │  B  │  C  │  D  │  E  │     │     │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!  ╰── sent ──╯╰──── pending ────╯
//!              ↑
//!            cursor
//! ```
//!
//! - Entries before the cursor were handed to the scheduler already.
//! - Dedup only looks at pending entries: a report for a source whose
//!   previous report is still pending replaces it in place.
//! - Overflow rejects the newest report; pending entries are never evicted.
//! - The sent prefix is compacted away when the slots run out.
//!
//! ## Invariants
//!
//! - `cursor <= entries.len() <= N`
//! - `pending_count() <= capacity <= N`
//! - at most one pending entry per source id

use heapless::Vec;

use crate::constants::radio::{REPORT_PACKET_LEN, RSSI_BYTE_INDEX};
use crate::constants::REPORT_BUFFER_SLOTS;

/// One buffered 16-byte report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingReport([u8; REPORT_PACKET_LEN]);

impl PendingReport {
    /// Wrap raw report bytes
    pub const fn new(data: [u8; REPORT_PACKET_LEN]) -> Self {
        Self(data)
    }

    /// Report kind (byte 0)
    pub const fn kind(&self) -> u8 {
        self.0[0]
    }

    /// Source tracker id (byte 1), the dedup key
    pub const fn source_id(&self) -> u8 {
        self.0[1]
    }

    /// Raw bytes
    pub const fn bytes(&self) -> &[u8; REPORT_PACKET_LEN] {
        &self.0
    }

    pub(crate) fn set_rssi(&mut self, rssi: u8) {
        self.0[RSSI_BYTE_INDEX] = rssi;
    }
}

/// What happened to an offered report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportOutcome {
    /// Replaced the pending report at this position (relative to the cursor)
    Replaced(usize),
    /// Added as a new pending report
    Appended,
    /// Dropped, the pending count is at capacity
    Overflow,
}

/// Deduplicating, bounded report buffer
#[derive(Debug, Clone)]
pub struct ReportBuffer<const N: usize = REPORT_BUFFER_SLOTS> {
    entries: Vec<PendingReport, N>,
    cursor: usize,
    capacity: usize,
}

impl<const N: usize> ReportBuffer<N> {
    /// Buffer accepting up to `capacity` pending reports (clamped to N)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.min(N),
        }
    }

    /// Insert or replace `report`
    ///
    /// Linear scan over pending entries; with at most one entry per source
    /// the scan is bounded by the number of live trackers.
    pub fn offer(&mut self, report: PendingReport) -> ReportOutcome {
        let source = report.source_id();
        if let Some(offset) = self.entries[self.cursor..]
            .iter()
            .position(|entry| entry.source_id() == source)
        {
            self.entries[self.cursor + offset] = report;
            return ReportOutcome::Replaced(offset);
        }

        if self.pending_count() >= self.capacity {
            return ReportOutcome::Overflow;
        }

        if self.entries.is_full() {
            self.compact();
        }
        match self.entries.push(report) {
            Ok(()) => ReportOutcome::Appended,
            Err(_) => ReportOutcome::Overflow,
        }
    }

    /// Reports not yet handed to the scheduler, oldest first
    pub fn pending(&self) -> &[PendingReport] {
        &self.entries[self.cursor..]
    }

    /// Number of pending reports
    pub fn pending_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }

    /// Whether the next distinct source would overflow
    pub fn is_full(&self) -> bool {
        self.pending_count() >= self.capacity
    }

    /// Pending report cap
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest pending report
    pub fn next_unsent(&self) -> Option<&PendingReport> {
        self.entries.get(self.cursor)
    }

    /// Hand the oldest pending report to the scheduler
    pub fn take_next(&mut self) -> Option<PendingReport> {
        let report = *self.entries.get(self.cursor)?;
        self.cursor += 1;
        if self.cursor == self.entries.len() {
            self.compact();
        }
        Some(report)
    }

    /// Drop entries the scheduler already took
    pub fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let pending = self.entries.len() - self.cursor;
        self.entries.copy_within(self.cursor.., 0);
        self.entries.truncate(pending);
        self.cursor = 0;
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<const N: usize> Default for ReportBuffer<N> {
    fn default() -> Self {
        Self::with_capacity(N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(source: u8, fill: u8) -> PendingReport {
        let mut data = [fill; REPORT_PACKET_LEN];
        data[0] = 2;
        data[1] = source;
        PendingReport::new(data)
    }

    #[test]
    fn same_source_replaces() {
        let mut buffer = ReportBuffer::<8>::with_capacity(8);
        assert_eq!(buffer.offer(report(42, 1)), ReportOutcome::Appended);
        assert_eq!(buffer.offer(report(7, 1)), ReportOutcome::Appended);
        assert_eq!(buffer.offer(report(42, 9)), ReportOutcome::Replaced(0));

        assert_eq!(buffer.pending_count(), 2);
        assert_eq!(buffer.pending()[0], report(42, 9));
    }

    #[test]
    fn overflow_rejects_newest() {
        let mut buffer = ReportBuffer::<8>::with_capacity(3);
        for source in 0..3 {
            assert_eq!(buffer.offer(report(source, 0)), ReportOutcome::Appended);
        }
        assert_eq!(buffer.offer(report(99, 0)), ReportOutcome::Overflow);
        assert_eq!(buffer.pending_count(), 3);

        // A known source still replaces at capacity
        assert_eq!(buffer.offer(report(1, 5)), ReportOutcome::Replaced(1));
    }

    #[test]
    fn sent_entries_are_not_deduplicated() {
        let mut buffer = ReportBuffer::<8>::with_capacity(8);
        buffer.offer(report(42, 1));
        buffer.offer(report(43, 1));
        assert_eq!(buffer.take_next(), Some(report(42, 1)));

        // 42 was sent, a new report for it is pending again
        assert_eq!(buffer.offer(report(42, 2)), ReportOutcome::Appended);
        assert_eq!(buffer.pending(), &[report(43, 1), report(42, 2)]);
    }

    #[test]
    fn compaction_reuses_slots() {
        let mut buffer = ReportBuffer::<4>::with_capacity(4);
        for source in 0..4 {
            buffer.offer(report(source, 0));
        }
        buffer.take_next();
        buffer.take_next();

        // Slots are all used, two of them by sent entries
        assert_eq!(buffer.offer(report(10, 0)), ReportOutcome::Appended);
        assert_eq!(buffer.pending_count(), 3);
        assert_eq!(buffer.next_unsent(), Some(&report(2, 0)));
    }

    #[test]
    fn draining_everything_resets() {
        let mut buffer = ReportBuffer::<4>::default();
        assert_eq!(buffer.capacity(), 4);
        buffer.offer(report(1, 0));
        assert!(buffer.take_next().is_some());
        assert!(buffer.take_next().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn capacity_clamped_to_slots() {
        let buffer = ReportBuffer::<4>::with_capacity(100);
        assert_eq!(buffer.capacity(), 4);
    }
}
