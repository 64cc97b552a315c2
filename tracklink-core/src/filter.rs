//! Noise gate for unconfirmed report sources
//!
//! Channel noise occasionally decodes as a well-formed 16-byte report.
//! Such phantoms show up once or twice under a random source id, while a
//! real tracker sends continuously. The gate counts sightings per source
//! id and discards the first `threshold` packets of every source; from the
//! next packet on the source is trusted.
//!
//! ```text
//! sighting:  1   2  ...  T   T+1  T+2 ...
//! verdict:  drop drop   drop pass pass
//! ```
//!
//! Counters saturate at the threshold and are only cleared by `reset`.

use crate::constants::SOURCE_ID_SPACE;

/// Per-source sighting counters
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    counters: [u8; SOURCE_ID_SPACE],
    threshold: u8,
}

impl DiscoveryFilter {
    /// Gate requiring `threshold` sightings before trusting a source
    pub const fn new(threshold: u8) -> Self {
        Self {
            counters: [0; SOURCE_ID_SPACE],
            threshold,
        }
    }

    /// Record a sighting of `source`; true once the source is trusted
    pub fn admit(&mut self, source: u8) -> bool {
        let count = &mut self.counters[source as usize];
        if *count < self.threshold {
            *count += 1;
            return false;
        }
        true
    }

    /// Whether `source` has crossed the threshold
    pub fn is_trusted(&self, source: u8) -> bool {
        self.counters[source as usize] >= self.threshold
    }

    /// Sightings counted for `source` (saturates at the threshold)
    pub fn sightings(&self, source: u8) -> u8 {
        self.counters[source as usize]
    }

    /// Configured threshold
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Forget every source
    pub fn reset(&mut self) {
        self.counters = [0; SOURCE_ID_SPACE];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_threshold_sightings_dropped() {
        let mut filter = DiscoveryFilter::new(3);
        assert!(!filter.admit(42));
        assert!(!filter.admit(42));
        assert!(!filter.admit(42));
        assert!(filter.is_trusted(42));
        assert!(filter.admit(42));
        assert!(filter.admit(42));
        assert_eq!(filter.sightings(42), 3);
    }

    #[test]
    fn sources_are_independent() {
        let mut filter = DiscoveryFilter::new(1);
        assert!(!filter.admit(1));
        assert!(!filter.admit(2));
        assert!(filter.admit(1));
        assert!(!filter.is_trusted(3));
    }

    #[test]
    fn zero_threshold_trusts_everyone() {
        let mut filter = DiscoveryFilter::new(0);
        assert!(filter.admit(255));
    }

    #[test]
    fn reset_forgets() {
        let mut filter = DiscoveryFilter::new(1);
        filter.admit(9);
        assert!(filter.is_trusted(9));
        filter.reset();
        assert!(!filter.is_trusted(9));
    }
}
