//! Radio link core for Tracklink motion-tracking nodes
//!
//! Pairs a tracker with its receiver, keeps the pairing across power loss,
//! and sorts incoming radio traffic into a bounded report buffer.
//! Designed for nRF52-class nodes talking Enhanced ShockBurst.
//!
//! Key constraints:
//! - No heap allocation, no globals
//! - Radio interrupt talks to the link through an spsc queue only
//! - Pairing never sleeps; callers drive it with timestamps
//!
//! ```no_run
//! use tracklink_core::{
//!     FixedIdentity, IdentityStore, LinkConfig, MemoryDurable, MemoryRetained,
//!     NoIndicator, RadioEventQueue, TrackerLink,
//! };
//! # use tracklink_core::{Payload, Radio, RadioAddressSet, Role, LinkResult};
//! # struct Esb;
//! # impl Radio for Esb {
//! #     fn configure(&mut self, _: &RadioAddressSet, _: Role) -> LinkResult<()> { Ok(()) }
//! #     fn enqueue(&mut self, _: &Payload) -> LinkResult<()> { Ok(()) }
//! #     fn flush_tx(&mut self) {}
//! #     fn flush_rx(&mut self) {}
//! #     fn start_transmit(&mut self) -> LinkResult<()> { Ok(()) }
//! #     fn disable(&mut self) {}
//! # }
//!
//! let mut queue = RadioEventQueue::new();
//! let (_producer, consumer) = queue.split();
//! let store = IdentityStore::new(MemoryRetained::new(), MemoryDurable::new());
//!
//! let mut link: TrackerLink<'_, _, _, _, _> =
//!     TrackerLink::new(Esb, store, consumer, NoIndicator, LinkConfig::default())?;
//! link.boot(&FixedIdentity(0x1234_5678_9abc))?;
//! link.poll(0)?;
//! # Ok::<(), tracklink_core::LinkError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod address;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod filter;
pub mod identity;
pub mod link;
pub mod packet;
pub mod pairing;
pub mod radio;
pub mod report;
pub mod signal;
pub mod storage;
pub mod time;

// Public API
pub use address::{derive_addresses, RadioAddressSet};
pub use config::{LinkConfig, PairingConfig};
pub use dispatcher::{Dispatch, DispatchStats, PacketDispatcher};
pub use errors::{LinkError, LinkResult};
pub use identity::{DeviceFingerprint, FixedIdentity, IdentitySource, PairedIdentity};
pub use link::{LinkStatus, TrackerLink};
pub use pairing::{PairingCoordinator, PairingState};
pub use radio::{
    post_event, Payload, Radio, RadioEvent, RadioEventConsumer, RadioEventProducer,
    RadioEventQueue, Role,
};
pub use report::{PendingReport, ReportBuffer, ReportOutcome};
pub use signal::{NoIndicator, PairingIndicator};
pub use storage::{
    DurableStore, IdentityStore, MemoryDurable, MemoryRetained, RetainedRegion, StoreKey,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
