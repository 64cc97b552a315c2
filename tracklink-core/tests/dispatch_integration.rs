//! Integration tests for inbound packet handling
//!
//! Reports are posted through the event queue exactly as the radio
//! interrupt would and checked in the link's report buffer.

mod common;

use common::report;
use tracklink_core::{
    post_event, LinkConfig, RadioEvent, RadioEventProducer, RadioEventQueue, ReportOutcome,
};

fn send(producer: &mut RadioEventProducer<'_>, data: &[u8], rssi: u8) {
    assert!(post_event(producer, RadioEvent::received(data, rssi)));
}

#[test]
fn newest_report_per_source_wins() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let mut link = common::link(consumer, LinkConfig::bench());

    let mut first = report(2, 42);
    first[5] = 1;
    let mut second = report(2, 42);
    second[5] = 2;
    send(&mut producer, &first, 30);
    send(&mut producer, &report(2, 43), 30);
    send(&mut producer, &second, 30);
    assert_eq!(link.poll(0).unwrap(), 3);

    let pending = link.reports().pending();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].source_id(), 42);
    assert_eq!(pending[0].bytes()[5], 2);
    assert_eq!(link.stats().replaced, 1);
}

#[test]
fn rssi_follows_latest_packet() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let mut link = common::link(consumer, LinkConfig::bench());

    send(&mut producer, &report(2, 42), 10);
    send(&mut producer, &report(2, 42), 20);
    link.poll(0).unwrap();

    let pending = link.reports().pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].bytes()[15], 20);
}

#[test]
fn full_precision_keeps_last_byte() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let mut link = common::link(consumer, LinkConfig::bench());

    send(&mut producer, &report(1, 42), 10);
    link.poll(0).unwrap();
    assert_eq!(link.reports().pending()[0].bytes()[15], 0xEE);
}

#[test]
fn overflow_at_default_capacity() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let mut link = common::link(consumer, LinkConfig::bench());

    // Drain between posts, the event queue is much shallower than the buffer
    for source in 0..=100u8 {
        send(&mut producer, &report(2, source), 30);
        link.poll(0).unwrap();
    }

    assert_eq!(link.reports().pending_count(), 100);
    assert_eq!(link.stats().appended, 100);
    assert_eq!(link.stats().overflowed, 1);
    assert!(link.reports().pending().iter().all(|r| r.source_id() != 100));

    // Existing sources still refresh while full
    send(&mut producer, &report(2, 7), 99);
    link.poll(0).unwrap();
    assert_eq!(link.reports().pending()[7].bytes()[15], 99);
}

#[test]
fn noise_gate_drops_first_sightings() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let config = LinkConfig::default();
    let threshold = config.detection_threshold;
    let mut link = common::link(consumer, config);

    for _ in 0..threshold {
        send(&mut producer, &report(2, 7), 30);
        link.poll(0).unwrap();
    }
    assert!(link.reports().is_empty());
    assert_eq!(link.stats().rx_gated, u32::from(threshold));

    send(&mut producer, &report(2, 7), 30);
    link.poll(0).unwrap();
    assert_eq!(link.reports().pending_count(), 1);
}

#[test]
fn reserved_kinds_and_odd_lengths_dropped() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let mut link = common::link(consumer, LinkConfig::bench());

    send(&mut producer, &report(224, 1), 30);
    send(&mut producer, &report(255, 2), 30);
    send(&mut producer, &[0u8; 12], 30);
    assert!(post_event(&mut producer, RadioEvent::RxReadFailed));
    assert!(post_event(&mut producer, RadioEvent::TxSuccess));
    assert!(post_event(&mut producer, RadioEvent::TxFailed));
    assert_eq!(link.poll(0).unwrap(), 6);

    assert!(link.reports().is_empty());
    let stats = link.stats();
    assert_eq!(stats.rx_reserved, 2);
    assert_eq!(stats.rx_ignored, 2);
    assert_eq!(stats.tx_success, 1);
    assert_eq!(stats.tx_failed, 1);
}

#[test]
fn pairing_reply_while_paired_is_not_a_report() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let mut link = common::link(consumer, LinkConfig::bench());

    send(&mut producer, &common::reply(0x42, 1), 30);
    link.poll(0).unwrap();
    assert!(link.reports().is_empty());
}

#[test]
fn scheduler_drain_reopens_dedup() {
    let mut queue = RadioEventQueue::new();
    let (mut producer, consumer) = queue.split();
    let mut link = common::link(consumer, LinkConfig::bench().with_report_capacity(2));

    send(&mut producer, &report(2, 1), 30);
    send(&mut producer, &report(2, 2), 30);
    link.poll(0).unwrap();

    let taken = link.reports_mut().take_next().unwrap();
    assert_eq!(taken.source_id(), 1);

    // Source 1 was sent, its next report is new work again
    send(&mut producer, &report(2, 1), 31);
    link.poll(0).unwrap();
    assert_eq!(link.reports().pending_count(), 2);
    assert_eq!(link.stats().appended, 3);

    let mut snapshot = link.reports().clone();
    assert_eq!(
        snapshot.offer(tracklink_core::PendingReport::new(report(2, 3))),
        ReportOutcome::Overflow
    );
}
