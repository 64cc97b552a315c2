//! Radio transceiver boundary
//!
//! ## Overview
//!
//! The driver itself (register setup, Enhanced ShockBurst timing, interrupt
//! handling) lives outside this crate. The link talks to it through two
//! narrow channels:
//!
//! ```text
//!  Foreground (TrackerLink)             Radio interrupt
//!        │                                    │
//!        │  Radio trait: configure,           │
//!        ├─ enqueue, flush, start ──────────→ │
//!        │                                    │
//!        │ ←──── RadioEvent spsc queue ───────┤
//!        │      (TxSuccess/TxFailed/Rx)       │
//! ```
//!
//! The interrupt side owns the queue's producer and never touches link
//! state; the link owns the consumer and is the only place events are
//! processed. No locks are needed.

use heapless::spsc::{Consumer, Producer, Queue};
use heapless::Vec;

use crate::address::RadioAddressSet;
use crate::constants::{EVENT_QUEUE_DEPTH, MAX_PAYLOAD_LEN};
use crate::errors::{LinkError, LinkResult};

/// Transceiver role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Primary transmitter: starts every exchange (trackers)
    Initiator,
    /// Primary receiver: answers with ack payloads (receivers)
    Responder,
}

/// Outbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    data: Vec<u8, MAX_PAYLOAD_LEN>,
    /// Skip the acknowledgment for this frame
    pub noack: bool,
}

impl Payload {
    /// Frame carrying `data`, acknowledgment requested
    pub fn new(data: &[u8]) -> LinkResult<Self> {
        let data = Vec::from_slice(data).map_err(|_| LinkError::PayloadTooLong {
            len: data.len(),
            max: MAX_PAYLOAD_LEN,
        })?;
        Ok(Self { data, noack: false })
    }

    /// Frame bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Frame length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Something the radio interrupt reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    /// Frame acknowledged
    TxSuccess,
    /// Retransmits exhausted without acknowledgment
    TxFailed,
    /// Frame (or ack payload) received
    RxReceived {
        /// Received bytes
        data: Vec<u8, MAX_PAYLOAD_LEN>,
        /// Received signal strength as reported by the radio (-dBm)
        rssi: u8,
    },
    /// The radio signalled a receive but the payload could not be read
    RxReadFailed,
}

impl RadioEvent {
    /// Receive event from raw bytes; oversize frames become `RxReadFailed`
    pub fn received(data: &[u8], rssi: u8) -> Self {
        match Vec::from_slice(data) {
            Ok(data) => Self::RxReceived { data, rssi },
            Err(_) => Self::RxReadFailed,
        }
    }
}

/// Queue between the radio interrupt and the link
pub type RadioEventQueue = Queue<RadioEvent, EVENT_QUEUE_DEPTH>;

/// Interrupt side of the event queue
pub type RadioEventProducer<'q> = Producer<'q, RadioEvent, EVENT_QUEUE_DEPTH>;

/// Link side of the event queue
pub type RadioEventConsumer<'q> = Consumer<'q, RadioEvent, EVENT_QUEUE_DEPTH>;

/// Post an event from the interrupt side
///
/// Returns false when the queue is full and the event was dropped. Called
/// from interrupt context, so it never blocks.
pub fn post_event(producer: &mut RadioEventProducer<'_>, event: RadioEvent) -> bool {
    match producer.enqueue(event) {
        Ok(()) => true,
        Err(_) => {
            link_warn!("Radio event queue full, event dropped");
            false
        }
    }
}

/// Commands the link issues to the transceiver
///
/// Implementations map driver failures to [`LinkError::Configuration`]
/// (setup) or [`LinkError::Radio`] (transmit path).
pub trait Radio {
    /// Stop the radio and load a new address set and role
    fn configure(&mut self, addresses: &RadioAddressSet, role: Role) -> LinkResult<()>;

    /// Queue a frame for transmission
    fn enqueue(&mut self, payload: &Payload) -> LinkResult<()>;

    /// Drop every queued outbound frame, including one in flight
    fn flush_tx(&mut self);

    /// Drop every received frame not yet read
    fn flush_rx(&mut self);

    /// Transmit queued frames (manual TX mode)
    fn start_transmit(&mut self) -> LinkResult<()>;

    /// Stop all radio activity
    fn disable(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_bounds() {
        let payload = Payload::new(&[1, 2, 3]).unwrap();
        assert_eq!(payload.data(), &[1, 2, 3]);
        assert!(!payload.noack);

        let err = Payload::new(&[0; 33]).unwrap_err();
        assert_eq!(err, LinkError::PayloadTooLong { len: 33, max: 32 });
    }

    #[test]
    fn queue_is_single_producer_single_consumer() {
        let mut queue = RadioEventQueue::new();
        let (mut producer, mut consumer) = queue.split();

        assert!(post_event(&mut producer, RadioEvent::TxSuccess));
        assert!(post_event(&mut producer, RadioEvent::received(&[1; 8], 40)));

        assert_eq!(consumer.dequeue(), Some(RadioEvent::TxSuccess));
        match consumer.dequeue() {
            Some(RadioEvent::RxReceived { data, rssi }) => {
                assert_eq!(data.len(), 8);
                assert_eq!(rssi, 40);
            }
            other => panic!("Expected receive event, got {:?}", other),
        }
        assert!(consumer.dequeue().is_none());
    }

    #[test]
    fn full_queue_drops() {
        let mut queue = RadioEventQueue::new();
        let (mut producer, _consumer) = queue.split();

        for _ in 0..EVENT_QUEUE_DEPTH - 1 {
            assert!(post_event(&mut producer, RadioEvent::TxFailed));
        }
        assert!(!post_event(&mut producer, RadioEvent::TxFailed));
    }

    #[test]
    fn oversize_receive_is_read_failure() {
        assert_eq!(RadioEvent::received(&[0; 40], 1), RadioEvent::RxReadFailed);
    }
}
