//! User-visible status hooks
//!
//! The node shows pairing progress on its LED. Patterns and timing belong
//! to the board support code; the link only says what happened.

/// Receiver of link status changes
///
/// Calls are fire-and-forget and must return quickly. Every method has an
/// empty default.
pub trait PairingIndicator {
    /// Discovery started, no receiver yet
    fn pairing_started(&mut self) {}

    /// Pairing confirmed and persisted
    fn pairing_complete(&mut self) {}

    /// The transceiver could not be configured
    fn connection_error(&mut self) {}
}

/// Indicator that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl PairingIndicator for NoIndicator {}
