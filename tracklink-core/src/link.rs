//! Tracker link session
//!
//! [`TrackerLink`] owns every piece of mutable link state: the radio handle,
//! the identity store, the event consumer, the dispatcher and the pairing
//! coordinator. There are no globals; the radio interrupt only ever touches
//! the producer half of the event queue.
//!
//! ## Lifecycle
//!
//! ```text
//!            boot()
//! Booting ─────────┬──(stored identity)──────────────→ Ready
//!                  └──(none)──→ Pairing ──(confirmed)─→ Ready
//!                                  ↑                     │
//!                  start_pairing() │   reset_pairing()   │
//!                               Unpaired ←───────────────┘
//!
//! any configure failure ──→ ConnectionError
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut queue = RadioEventQueue::new();
//! let (producer, consumer) = queue.split();
//! // hand `producer` to the radio interrupt
//!
//! let mut link = TrackerLink::new(radio, store, consumer, led, LinkConfig::default())?;
//! link.boot(&ficr)?;
//! loop {
//!     link.poll(uptime_ms())?;
//!     if link.is_ready() {
//!         link.submit(&quaternion_packet)?;
//!     }
//! }
//! ```

use crate::address::{derive_addresses, RadioAddressSet};
use crate::config::LinkConfig;
use crate::constants::REPORT_BUFFER_SLOTS;
use crate::dispatcher::{Dispatch, DispatchStats, PacketDispatcher};
use crate::errors::{LinkError, LinkResult};
use crate::identity::{DeviceFingerprint, IdentitySource, PairedIdentity};
use crate::pairing::{PairingCoordinator, PairingState};
use crate::radio::{Payload, Radio, RadioEventConsumer, Role};
use crate::report::ReportBuffer;
use crate::signal::PairingIndicator;
use crate::storage::{DurableStore, IdentityStore, RetainedRegion};
use crate::time::{TimeSource, Timestamp};

/// Externally visible link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    /// `boot` not called yet
    Booting,
    /// No identity, no discovery running
    Unpaired,
    /// Discovery running
    Pairing,
    /// Paired and on the derived addresses
    Ready,
    /// The transceiver could not be configured
    ConnectionError(LinkError),
}

/// Radio link of one tracker node
pub struct TrackerLink<'q, T, S, D, I, const N: usize = REPORT_BUFFER_SLOTS> {
    radio: T,
    store: IdentityStore<S, D>,
    events: RadioEventConsumer<'q>,
    dispatcher: PacketDispatcher<N>,
    coordinator: PairingCoordinator,
    indicator: I,
    config: LinkConfig,
    status: LinkStatus,
    addresses: Option<RadioAddressSet>,
    radio_initialized: bool,
    send_requested: bool,
}

impl<'q, T, S, D, I, const N: usize> TrackerLink<'q, T, S, D, I, N>
where
    T: Radio,
    S: RetainedRegion,
    D: DurableStore,
    I: PairingIndicator,
{
    /// Assemble a link; nothing touches the radio or flash until `boot`
    pub fn new(
        radio: T,
        store: IdentityStore<S, D>,
        events: RadioEventConsumer<'q>,
        indicator: I,
        config: LinkConfig,
    ) -> LinkResult<Self> {
        config.validate()?;
        Ok(Self {
            radio,
            store,
            events,
            dispatcher: PacketDispatcher::new(&config),
            coordinator: PairingCoordinator::new(config.pairing),
            indicator,
            config,
            status: LinkStatus::Booting,
            addresses: None,
            radio_initialized: false,
            send_requested: false,
        })
    }

    /// Load the stored identity and bring the radio up
    ///
    /// A paired node goes straight to its derived addresses. An unpaired
    /// node starts discovery with the fingerprint read from `source`.
    pub fn boot<U: IdentitySource + ?Sized>(&mut self, source: &U) -> LinkResult<()> {
        let identity = self.store.paired_identity()?;
        self.coordinator.restore(identity);

        if !identity.is_paired() {
            return self.start_pairing(source);
        }

        link_info!("Tracker ID: {}", identity.tracker_id());
        link_info!("Receiver address: {:x}", identity.receiver_address());

        let addresses = derive_addresses(&identity);
        self.radio.disable();
        if let Err(err) = self.radio.configure(&addresses, Role::Initiator) {
            return Err(self.connection_error(err));
        }
        self.addresses = Some(addresses);
        self.radio_initialized = true;
        self.status = LinkStatus::Ready;
        Ok(())
    }

    /// Start discovery on the public address set
    pub fn start_pairing<U: IdentitySource + ?Sized>(&mut self, source: &U) -> LinkResult<()> {
        let fingerprint = DeviceFingerprint::from_source(source);
        self.radio_initialized = false;
        if let Err(err) = self.coordinator.begin(&fingerprint, &mut self.radio) {
            return Err(self.connection_error(err));
        }
        self.addresses = Some(RadioAddressSet::DISCOVERY);
        self.radio_initialized = true;
        self.status = LinkStatus::Pairing;
        self.indicator.pairing_started();
        Ok(())
    }

    /// Drain radio events and advance pairing
    ///
    /// Returns the number of events processed. Pairing faults are returned;
    /// discovery still running is not an error.
    pub fn poll(&mut self, now: Timestamp) -> LinkResult<usize> {
        let processed = self.process_events();
        if self.status == LinkStatus::Pairing {
            match self.advance_pairing(now) {
                Ok(_) | Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(err)) => return Err(err),
            }
        }
        Ok(processed)
    }

    /// Dispatch every queued radio event
    pub fn process_events(&mut self) -> usize {
        let mut processed = 0;
        while let Some(event) = self.events.dequeue() {
            if let Dispatch::PairingReply(reply) = self.dispatcher.handle(event) {
                self.coordinator.offer_reply(&reply);
            }
            processed += 1;
        }
        processed
    }

    /// Drive pairing one step; `WouldBlock` while discovery runs
    pub fn poll_pairing(&mut self, now: Timestamp) -> nb::Result<PairedIdentity, LinkError> {
        self.process_events();
        self.advance_pairing(now)
    }

    /// Run discovery to completion, spinning on `clock`
    ///
    /// Never gives up; returns early only on a persistence or
    /// configuration fault.
    pub fn pair_blocking<C: TimeSource + ?Sized>(
        &mut self,
        clock: &C,
    ) -> LinkResult<PairedIdentity> {
        nb::block!(self.poll_pairing(clock.now()))
    }

    fn advance_pairing(&mut self, now: Timestamp) -> nb::Result<PairedIdentity, LinkError> {
        match self.status {
            LinkStatus::ConnectionError(err) => return Err(nb::Error::Other(err)),
            LinkStatus::Ready => return Ok(*self.coordinator.identity()),
            _ => {}
        }

        match self.coordinator.poll(now, &mut self.radio, &mut self.store) {
            Ok(identity) => {
                self.addresses = Some(derive_addresses(&identity));
                self.status = LinkStatus::Ready;
                self.indicator.pairing_complete();
                Ok(identity)
            }
            Err(nb::Error::Other(err @ LinkError::Configuration { .. })) => {
                Err(nb::Error::Other(self.connection_error(err)))
            }
            Err(err) => Err(err),
        }
    }

    fn connection_error(&mut self, err: LinkError) -> LinkError {
        link_error!("Failed to initialize radio");
        self.radio_initialized = false;
        self.status = LinkStatus::ConnectionError(err);
        self.indicator.connection_error();
        err
    }

    /// Queue `data` for the receiver, replacing anything not yet sent
    ///
    /// Does nothing until the link is ready. The transmission itself is
    /// started by the scheduler after [`take_send_request`](Self::take_send_request).
    pub fn submit(&mut self, data: &[u8]) -> LinkResult<()> {
        if !self.is_ready() {
            return Ok(());
        }
        let payload = Payload::new(data)?;
        self.radio.flush_tx();
        self.radio.enqueue(&payload)?;
        self.send_requested = true;
        Ok(())
    }

    /// Consume the pending send flag
    pub fn take_send_request(&mut self) -> bool {
        core::mem::take(&mut self.send_requested)
    }

    /// Erase the stored identity from both tiers and stop the radio
    pub fn reset_pairing(&mut self) -> LinkResult<()> {
        self.store.clear_identity()?;
        self.coordinator.reset();
        self.radio.disable();
        self.radio_initialized = false;
        self.send_requested = false;
        self.addresses = None;
        self.status = LinkStatus::Unpaired;
        link_info!("Pairing data reset");
        Ok(())
    }

    /// Radio up and pairing confirmed
    pub fn is_ready(&self) -> bool {
        self.radio_initialized && self.status == LinkStatus::Ready
    }

    /// Current status
    pub fn status(&self) -> LinkStatus {
        self.status
    }

    /// Pairing handshake state
    pub fn pairing_state(&self) -> PairingState {
        self.coordinator.state()
    }

    /// Confirmed identity, `UNPAIRED` until pairing completes
    pub fn identity(&self) -> &PairedIdentity {
        self.coordinator.identity()
    }

    /// Assigned tracker id once paired
    pub fn tracker_id(&self) -> Option<u8> {
        let identity = self.coordinator.identity();
        identity.is_paired().then(|| identity.tracker_id())
    }

    /// Address set the radio is configured with
    pub fn addresses(&self) -> Option<&RadioAddressSet> {
        self.addresses.as_ref()
    }

    /// Buffered reports from other trackers
    pub fn reports(&self) -> &ReportBuffer<N> {
        self.dispatcher.reports()
    }

    /// Buffered reports, for the scheduler to drain
    pub fn reports_mut(&mut self) -> &mut ReportBuffer<N> {
        self.dispatcher.reports_mut()
    }

    /// Dispatch counters
    pub fn stats(&self) -> &DispatchStats {
        self.dispatcher.stats()
    }

    /// Active configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Identity store
    pub fn store(&self) -> &IdentityStore<S, D> {
        &self.store
    }

    /// Identity store, for calibration records
    pub fn store_mut(&mut self) -> &mut IdentityStore<S, D> {
        &mut self.store
    }

    /// Radio handle
    pub fn radio(&self) -> &T {
        &self.radio
    }

    /// Radio handle, for the transmission scheduler
    pub fn radio_mut(&mut self) -> &mut T {
        &mut self.radio
    }

    /// Status indicator
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Tear down, returning the radio and the store
    pub fn into_parts(self) -> (T, IdentityStore<S, D>) {
        (self.radio, self.store)
    }
}
