//! Pairing Session Example
//!
//! Walks a tracker through its whole radio life against a simulated
//! receiver: discovery, pairing, sending data, buffering reports from
//! neighbouring trackers, and coming back up after a power loss.
//!
//! ## What You'll Learn
//!
//! - Wiring the radio event queue between interrupt and link
//! - Driving pairing with timestamps instead of sleeps
//! - Draining the report buffer from a transmission scheduler
//! - How the identity survives a power cycle
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_pairing_session
//! ```

use tracklink_core::{
    identity::pairing_checksum,
    time::{FixedTime, TimeSource},
    FixedIdentity, IdentityStore, LinkConfig, LinkResult, MemoryDurable, MemoryRetained,
    PairingIndicator, Payload, Radio, RadioAddressSet, RadioEvent, RadioEventProducer,
    RadioEventQueue, Role, TrackerLink,
};

/// Receiver answers only from the third broadcast on
const RECEIVER_WAKES_AFTER: u32 = 2;

/// Tracker id the receiver hands out
const ASSIGNED_ID: u8 = 5;

const RECEIVER_ADDRESS: [u8; 6] = [0x3C, 0x71, 0x9A, 0x04, 0x11, 0x60];

/// ESB transceiver with a receiver on the other end of the air
///
/// Plays the interrupt role: it owns the producer half of the event queue
/// and posts completions and ack payloads into it.
struct SimulatedEsb<'q> {
    events: RadioEventProducer<'q>,
    addresses: Option<RadioAddressSet>,
    queued: Option<Payload>,
    broadcasts: u32,
}

impl<'q> SimulatedEsb<'q> {
    fn new(events: RadioEventProducer<'q>) -> Self {
        Self {
            events,
            addresses: None,
            queued: None,
            broadcasts: 0,
        }
    }

    /// Another tracker's report, relayed as an ack payload
    fn relay(&mut self, kind: u8, source: u8, rssi: u8) {
        let mut report = [0u8; 16];
        report[0] = kind;
        report[1] = source;
        report[2..6].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
        tracklink_core::post_event(&mut self.events, RadioEvent::received(&report, rssi));
    }
}

impl Radio for SimulatedEsb<'_> {
    fn configure(&mut self, addresses: &RadioAddressSet, role: Role) -> LinkResult<()> {
        println!(
            "  [radio] {:?} on {}",
            role,
            if addresses.is_discovery() { "discovery address" } else { "private address" }
        );
        self.addresses = Some(*addresses);
        Ok(())
    }

    fn enqueue(&mut self, payload: &Payload) -> LinkResult<()> {
        self.queued = Some(payload.clone());
        Ok(())
    }

    fn flush_tx(&mut self) {
        self.queued = None;
    }

    fn flush_rx(&mut self) {}

    fn start_transmit(&mut self) -> LinkResult<()> {
        let Some(payload) = self.queued.take() else {
            return Ok(());
        };
        let on_discovery = self.addresses.map_or(false, |a| a.is_discovery());

        if on_discovery && payload.len() == 8 {
            self.broadcasts += 1;
            if self.broadcasts <= RECEIVER_WAKES_AFTER {
                println!("  [air] pairing request #{} unanswered", self.broadcasts);
                tracklink_core::post_event(&mut self.events, RadioEvent::TxFailed);
                return Ok(());
            }

            let mut answer = [0u8; 8];
            answer[0] = payload.data()[0];
            answer[1] = ASSIGNED_ID;
            answer[2..].copy_from_slice(&RECEIVER_ADDRESS);
            println!("  [air] receiver answers request #{}", self.broadcasts);
            tracklink_core::post_event(&mut self.events, RadioEvent::TxSuccess);
            tracklink_core::post_event(&mut self.events, RadioEvent::received(&answer, 38));
            return Ok(());
        }

        println!("  [air] {} byte frame acknowledged", payload.len());
        tracklink_core::post_event(&mut self.events, RadioEvent::TxSuccess);
        Ok(())
    }

    fn disable(&mut self) {}
}

/// Prints what the LED would show
struct ConsoleLed;

impl PairingIndicator for ConsoleLed {
    fn pairing_started(&mut self) {
        println!("  [led] slow blink: pairing");
    }

    fn pairing_complete(&mut self) {
        println!("  [led] off: paired");
    }

    fn connection_error(&mut self) {
        println!("  [led] fast blink: radio error");
    }
}

type Store = IdentityStore<MemoryRetained, MemoryDurable>;

fn main() -> LinkResult<()> {
    println!("=== Tracklink Pairing Session ===\n");

    let device = FixedIdentity(0x0000_A1B2_C3D4_E5F6);
    let mut clock = FixedTime::new(0);

    println!("1. First boot, nothing stored");
    let store = Store::new(MemoryRetained::new(), MemoryDurable::new());
    let mut queue = RadioEventQueue::new();
    let (producer, consumer) = queue.split();
    let mut link: TrackerLink<'_, _, _, _, _> = TrackerLink::new(
        SimulatedEsb::new(producer),
        store,
        consumer,
        ConsoleLed,
        LinkConfig::bench(),
    )?;
    link.boot(&device)?;

    let fingerprint = tracklink_core::DeviceFingerprint::from_source(&device);
    println!(
        "   fingerprint {:012x}, checksum {:#04x}\n",
        fingerprint.as_u64(),
        pairing_checksum(fingerprint.bytes())
    );

    println!("2. Discovery");
    while !link.is_ready() {
        link.poll(clock.now())?;
        clock.advance(250);
    }
    println!(
        "   paired as tracker {} after {} ms\n",
        link.identity().tracker_id(),
        clock.now()
    );

    println!("3. Sending orientation data");
    for sample in 0..3u8 {
        link.submit(&[0, ASSIGNED_ID, sample, 0x40, 0x00, 0x00, 0x00, 0x00])?;
        if link.take_send_request() {
            link.radio_mut().start_transmit()?;
        }
        link.poll(clock.now())?;
    }
    println!();

    println!("4. Reports from neighbouring trackers");
    link.radio_mut().relay(2, 11, 40);
    link.radio_mut().relay(2, 12, 55);
    link.radio_mut().relay(2, 11, 42); // replaces the first one
    link.radio_mut().relay(240, 13, 50); // reserved kind, dropped
    link.poll(clock.now())?;
    while let Some(report) = link.reports_mut().take_next() {
        println!(
            "   forward report from {} at -{} dBm",
            report.source_id(),
            report.bytes()[15]
        );
    }
    println!("   stats: {:?}\n", link.stats());

    println!("5. Power loss");
    let (_radio, mut store) = link.into_parts();
    store.retained_mut().power_cycle();

    let mut queue = RadioEventQueue::new();
    let (producer, consumer) = queue.split();
    let mut link: TrackerLink<'_, _, _, _, _> = TrackerLink::new(
        SimulatedEsb::new(producer),
        store,
        consumer,
        ConsoleLed,
        LinkConfig::bench(),
    )?;
    link.boot(&device)?;
    println!(
        "   back up as tracker {:?}, status {:?}",
        link.tracker_id(),
        link.status()
    );

    Ok(())
}
