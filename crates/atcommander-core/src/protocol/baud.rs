//! Baud rate candidates for autodetection
//!
//! The device's current speed is unknown when a session starts, so command
//! mode entry walks an ordered list of host speeds. Order matters: the most
//! likely rates come first to keep the handshake short.

use super::CANDIDATE_BAUD_RATES;

/// Ordered list of host baud rates tried during command mode entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaudSequencer {
    candidates: Vec<u32>,
}

impl Default for BaudSequencer {
    fn default() -> Self {
        Self::new(CANDIDATE_BAUD_RATES.to_vec())
    }
}

impl BaudSequencer {
    /// Use a custom candidate order
    pub fn new(candidates: Vec<u32>) -> Self {
        Self { candidates }
    }

    /// Candidates in the order they will be tried
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.candidates.iter().copied()
    }

    pub fn candidates(&self) -> &[u32] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
