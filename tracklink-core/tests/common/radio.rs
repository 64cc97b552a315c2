//! Recording radio double
//!
//! Every command the link issues is appended to a call log so tests can
//! assert on ordering (flush before enqueue, disable before configure).

use tracklink_core::{LinkError, LinkResult, Payload, Radio, RadioAddressSet, Role};

/// One command received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCall {
    Configure(RadioAddressSet, Role),
    Enqueue(Vec<u8>),
    FlushTx,
    FlushRx,
    StartTransmit,
    Disable,
}

/// Radio that records commands and fails on request
#[derive(Debug, Default)]
pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    pub fail_configure: bool,
    pub fail_enqueue: bool,
    /// Fail every configure once this many have succeeded
    pub configure_limit: Option<(usize, LinkError)>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address set of the most recent successful configure
    pub fn configured(&self) -> Option<RadioAddressSet> {
        self.calls.iter().rev().find_map(|call| match call {
            RadioCall::Configure(addresses, _) => Some(*addresses),
            _ => None,
        })
    }

    /// Frames handed to the radio, oldest first
    pub fn enqueued(&self) -> Vec<&[u8]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RadioCall::Enqueue(data) => Some(data.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn transmits(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == RadioCall::StartTransmit)
            .count()
    }

    /// Accept `accepted` configures, then fail with `err`
    pub fn fail_configure_after(mut self, accepted: usize, err: LinkError) -> Self {
        self.configure_limit = Some((accepted, err));
        self
    }

    pub fn configures(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, RadioCall::Configure(..)))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Radio for MockRadio {
    fn configure(&mut self, addresses: &RadioAddressSet, role: Role) -> LinkResult<()> {
        if self.fail_configure {
            return Err(LinkError::Configuration { reason: "esb init failed" });
        }
        if let Some((accepted, err)) = self.configure_limit {
            if self.configures() >= accepted {
                return Err(err);
            }
        }
        self.calls.push(RadioCall::Configure(*addresses, role));
        Ok(())
    }

    fn enqueue(&mut self, payload: &Payload) -> LinkResult<()> {
        if self.fail_enqueue {
            return Err(LinkError::Radio { reason: "tx fifo full" });
        }
        self.calls.push(RadioCall::Enqueue(payload.data().to_vec()));
        Ok(())
    }

    fn flush_tx(&mut self) {
        self.calls.push(RadioCall::FlushTx);
    }

    fn flush_rx(&mut self) {
        self.calls.push(RadioCall::FlushRx);
    }

    fn start_transmit(&mut self) -> LinkResult<()> {
        self.calls.push(RadioCall::StartTransmit);
        Ok(())
    }

    fn disable(&mut self) {
        self.calls.push(RadioCall::Disable);
    }
}
