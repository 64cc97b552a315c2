//! Pairing handshake
//!
//! ## Protocol
//!
//! ```text
//!  Tracker (discovery address)              Receiver
//!       │                                       │
//!       │── {checksum, 0, fingerprint} ───────→ │   every retry interval
//!       │                                       │
//!       │ ←── {checksum, tracker id, address} ──│   as ack payload
//!       │                                       │
//!   checksum matches?
//!       ├─ no  → log, keep broadcasting
//!       └─ yes → persist, disable radio,
//!                switch to derived addresses
//! ```
//!
//! ## Driving
//!
//! [`PairingCoordinator::poll`] follows the `nb` convention used by the rest
//! of the link: `WouldBlock` while discovery is still running, the paired
//! identity once it is confirmed and persisted. Firmware that wants the
//! classic blocking loop wraps it in `nb::block!`; cooperative schedulers
//! call it from their tick.
//!
//! Transmit faults during discovery are logged and retried on the next
//! broadcast. A persistence fault is returned to the caller and the
//! handshake is not reported complete; the matched reply is kept so the
//! next poll retries the write.
//!
//! The handshake is only `Confirmed` once the radio accepted the derived
//! addresses. Any error from that configure is reported as
//! [`LinkError::Configuration`], whatever the radio returned. The identity
//! is already persisted at that point and stays stored.

use crate::address::{derive_addresses, RadioAddressSet};
use crate::config::PairingConfig;
use crate::errors::{LinkError, LinkResult};
use crate::identity::{DeviceFingerprint, PairedIdentity};
use crate::radio::{Payload, Radio, Role};
use crate::storage::{DurableStore, IdentityStore, RetainedRegion};
use crate::time::{elapsed, Timestamp};

/// Where the handshake stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PairingState {
    /// No identity and no discovery running
    Unpaired,
    /// Broadcasting pairing requests on the discovery address
    Discovering,
    /// Identity persisted, radio on the derived addresses
    Confirmed,
}

/// Pairing state machine
#[derive(Debug, Clone)]
pub struct PairingCoordinator {
    state: PairingState,
    config: PairingConfig,
    request: PairedIdentity,
    identity: PairedIdentity,
    matched: Option<PairedIdentity>,
    last_broadcast: Option<Timestamp>,
    interval: u64,
    attempts: u32,
}

impl PairingCoordinator {
    /// Idle coordinator
    pub fn new(config: PairingConfig) -> Self {
        Self {
            state: PairingState::Unpaired,
            config,
            request: PairedIdentity::UNPAIRED,
            identity: PairedIdentity::UNPAIRED,
            matched: None,
            last_broadcast: None,
            interval: 0,
            attempts: 0,
        }
    }

    /// Adopt an identity loaded at boot
    pub fn restore(&mut self, identity: PairedIdentity) {
        self.reset();
        if identity.is_paired() {
            self.identity = identity;
            self.state = PairingState::Confirmed;
        }
    }

    /// Put the radio on the discovery address and start broadcasting
    pub fn begin<R: Radio>(
        &mut self,
        fingerprint: &DeviceFingerprint,
        radio: &mut R,
    ) -> LinkResult<()> {
        self.reset();
        self.request = PairedIdentity::request(fingerprint);

        radio.disable();
        radio.configure(&RadioAddressSet::DISCOVERY, Role::Initiator)?;

        link_info!("Pairing");
        link_info!("Device address: {:x}", fingerprint.as_u64());
        link_info!("Checksum: {:x}", self.request.checksum());

        self.state = PairingState::Discovering;
        Ok(())
    }

    /// Offer a received 8-byte frame; true if it answers our request
    ///
    /// Frames arriving outside discovery are ignored.
    pub fn offer_reply(&mut self, reply: &[u8]) -> bool {
        if self.state != PairingState::Discovering {
            return false;
        }
        let Some(candidate) = PairedIdentity::from_slice(reply) else {
            return false;
        };
        if candidate.checksum() != self.request.checksum() {
            link_warn!("Incorrect checksum: {:x}", candidate.checksum());
            return false;
        }
        self.matched = Some(candidate);
        true
    }

    /// Advance the handshake at time `now`
    pub fn poll<R, S, D>(
        &mut self,
        now: Timestamp,
        radio: &mut R,
        store: &mut IdentityStore<S, D>,
    ) -> nb::Result<PairedIdentity, LinkError>
    where
        R: Radio,
        S: RetainedRegion,
        D: DurableStore,
    {
        match self.state {
            PairingState::Confirmed => return Ok(self.identity),
            PairingState::Unpaired => return Err(nb::Error::Other(LinkError::NotDiscovering)),
            PairingState::Discovering => {}
        }

        if let Some(reply) = self.matched.take() {
            return self.confirm(reply, radio, store).map_err(nb::Error::Other);
        }

        let due = self
            .last_broadcast
            .map_or(true, |at| elapsed(at, now, self.interval));
        if due {
            if let Err(_err) = self.broadcast(radio) {
                link_warn!("Pairing broadcast failed, retrying");
            }
            self.interval = self.config.interval_for(self.attempts);
            self.attempts = self.attempts.saturating_add(1);
            self.last_broadcast = Some(now);
        }
        Err(nb::Error::WouldBlock)
    }

    fn broadcast<R: Radio>(&mut self, radio: &mut R) -> LinkResult<()> {
        let payload = Payload::new(&self.request.to_bytes())?;
        radio.flush_rx();
        radio.flush_tx();
        radio.enqueue(&payload)?;
        radio.start_transmit()
    }

    fn confirm<R, S, D>(
        &mut self,
        reply: PairedIdentity,
        radio: &mut R,
        store: &mut IdentityStore<S, D>,
    ) -> LinkResult<PairedIdentity>
    where
        R: Radio,
        S: RetainedRegion,
        D: DurableStore,
    {
        if let Err(err) = store.write_identity(&reply) {
            link_error!("Pairing reply could not be persisted");
            self.matched = Some(reply);
            return Err(err);
        }

        radio.disable();
        if let Err(err) = radio.configure(&derive_addresses(&reply), Role::Initiator) {
            link_error!("Radio rejected the paired addresses: {:?}", err);
            self.matched = Some(reply);
            return Err(configuration_fault(err));
        }

        link_info!("Paired");
        link_info!("Tracker ID: {}", reply.tracker_id());
        link_info!("Receiver address: {:x}", reply.receiver_address());

        self.identity = reply;
        self.state = PairingState::Confirmed;
        Ok(reply)
    }

    /// Drop any identity and go idle
    pub fn reset(&mut self) {
        self.state = PairingState::Unpaired;
        self.request = PairedIdentity::UNPAIRED;
        self.identity = PairedIdentity::UNPAIRED;
        self.matched = None;
        self.last_broadcast = None;
        self.interval = 0;
        self.attempts = 0;
    }

    /// Current state
    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Confirmed identity, `UNPAIRED` until then
    pub fn identity(&self) -> &PairedIdentity {
        &self.identity
    }

    /// Request being broadcast
    pub fn request(&self) -> &PairedIdentity {
        &self.request
    }

    /// Broadcasts sent in the current discovery
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// A radio that cannot take the paired addresses is misconfigured,
/// whatever error it reported
fn configuration_fault(err: LinkError) -> LinkError {
    match err {
        LinkError::Configuration { .. } => err,
        LinkError::Radio { reason } => LinkError::Configuration { reason },
        _ => LinkError::Configuration { reason: "paired addresses rejected" },
    }
}
