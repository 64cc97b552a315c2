//! Packet dispatch
//!
//! Every event drained from the radio queue passes through
//! [`PacketDispatcher::handle`]. Sensor reports run a fixed gauntlet before
//! they reach the buffer:
//!
//! ```text
//! 16-byte frame
//!   │
//!   ├─ source not yet trusted ────────→ Gated     (noise gate)
//!   ├─ kind > 223 ────────────────────→ Reserved
//!   ├─ stamp RSSI into byte 15 (unless kind 1)
//!   ├─ source already pending ────────→ Replaced
//!   ├─ pending count at capacity ─────→ Overflow
//!   └─ ───────────────────────────────→ Appended
//! ```
//!
//! Pairing replies are handed back to the caller untouched; deciding
//! whether one is wanted is the coordinator's job. The dispatcher never
//! transmits and never blocks.

use crate::config::LinkConfig;
use crate::constants::REPORT_BUFFER_SLOTS;
use crate::filter::DiscoveryFilter;
use crate::packet::{carries_rssi, is_reserved_kind, InboundPacket};
use crate::radio::RadioEvent;
use crate::report::{PendingReport, ReportBuffer, ReportOutcome};

/// What became of one radio event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// 8-byte frame for the pairing coordinator
    PairingReply([u8; 8]),
    /// Report from a source still below the detection threshold
    Gated,
    /// Report with a reserved kind
    Reserved,
    /// Report reached the buffer
    Report(ReportOutcome),
    /// Frame of unknown length, or unreadable
    Ignored,
    /// Transmission acknowledged
    TxSuccess,
    /// Transmission failed
    TxFailed,
}

/// Running counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchStats {
    /// Acknowledged transmissions
    pub tx_success: u32,
    /// Failed transmissions
    pub tx_failed: u32,
    /// Reports dropped by the noise gate
    pub rx_gated: u32,
    /// Reports dropped for a reserved kind
    pub rx_reserved: u32,
    /// Frames of unknown length or unreadable
    pub rx_ignored: u32,
    /// Reports that replaced a pending one
    pub replaced: u32,
    /// Reports appended
    pub appended: u32,
    /// Reports dropped at capacity
    pub overflowed: u32,
}

/// Radio event consumer
#[derive(Debug, Clone)]
pub struct PacketDispatcher<const N: usize = REPORT_BUFFER_SLOTS> {
    reports: ReportBuffer<N>,
    filter: DiscoveryFilter,
    stats: DispatchStats,
}

impl<const N: usize> PacketDispatcher<N> {
    /// Dispatcher using the threshold and capacity from `config`
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            reports: ReportBuffer::with_capacity(config.report_capacity),
            filter: DiscoveryFilter::new(config.detection_threshold),
            stats: DispatchStats::default(),
        }
    }

    /// Process one event
    pub fn handle(&mut self, event: RadioEvent) -> Dispatch {
        match event {
            RadioEvent::TxSuccess => {
                link_debug!("TX success");
                self.stats.tx_success = self.stats.tx_success.wrapping_add(1);
                Dispatch::TxSuccess
            }
            RadioEvent::TxFailed => {
                link_debug!("TX failed");
                self.stats.tx_failed = self.stats.tx_failed.wrapping_add(1);
                Dispatch::TxFailed
            }
            RadioEvent::RxReadFailed => {
                link_error!("Error while reading rx packet");
                self.stats.rx_ignored = self.stats.rx_ignored.wrapping_add(1);
                Dispatch::Ignored
            }
            RadioEvent::RxReceived { data, rssi } => self.handle_packet(&data, rssi),
        }
    }

    fn handle_packet(&mut self, bytes: &[u8], rssi: u8) -> Dispatch {
        match InboundPacket::classify(bytes, rssi) {
            InboundPacket::PairingReply(reply) => Dispatch::PairingReply(reply),
            InboundPacket::SensorReport { data, rssi } => self.handle_report(data, rssi),
            InboundPacket::Ignored { len } => {
                link_debug!("Ignoring {} byte frame", len);
                self.stats.rx_ignored = self.stats.rx_ignored.wrapping_add(1);
                Dispatch::Ignored
            }
        }
    }

    fn handle_report(&mut self, data: [u8; 16], rssi: u8) -> Dispatch {
        let mut report = PendingReport::new(data);

        if !self.filter.admit(report.source_id()) {
            self.stats.rx_gated = self.stats.rx_gated.wrapping_add(1);
            return Dispatch::Gated;
        }
        if is_reserved_kind(report.kind()) {
            self.stats.rx_reserved = self.stats.rx_reserved.wrapping_add(1);
            return Dispatch::Reserved;
        }
        if carries_rssi(report.kind()) {
            report.set_rssi(rssi);
        }

        let outcome = self.reports.offer(report);
        match outcome {
            ReportOutcome::Replaced(_) => {
                self.stats.replaced = self.stats.replaced.wrapping_add(1);
            }
            ReportOutcome::Appended => {
                self.stats.appended = self.stats.appended.wrapping_add(1);
            }
            ReportOutcome::Overflow => {
                link_warn!("Report buffer full, dropping report from {}", report.source_id());
                self.stats.overflowed = self.stats.overflowed.wrapping_add(1);
            }
        }
        Dispatch::Report(outcome)
    }

    /// Buffered reports
    pub fn reports(&self) -> &ReportBuffer<N> {
        &self.reports
    }

    /// Buffered reports, for the transmission scheduler to drain
    pub fn reports_mut(&mut self) -> &mut ReportBuffer<N> {
        &mut self.reports
    }

    /// Noise gate state
    pub fn filter(&self) -> &DiscoveryFilter {
        &self.filter
    }

    /// Counters since construction
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}
