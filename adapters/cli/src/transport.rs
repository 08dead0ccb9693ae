//! In-process datagram channel standing in for the remote-call network.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Lossy, ordered, fire-and-forget datagram queue.
#[derive(Debug)]
pub(crate) struct LoopbackTransport {
    queue: VecDeque<Vec<u8>>,
    rng: ChaCha8Rng,
    drop_rate: f64,
    sent: u64,
    dropped: u64,
}

impl LoopbackTransport {
    /// `drop_rate` is clamped into `[0, 1]`.
    pub(crate) fn new(seed: u64, drop_rate: f64) -> Self {
        let drop_rate = if drop_rate.is_finite() {
            drop_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            queue: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            drop_rate,
            sent: 0,
            dropped: 0,
        }
    }

    pub(crate) fn send(&mut self, datagram: Vec<u8>) {
        self.sent = self.sent.saturating_add(1);
        if self.rng.gen_bool(self.drop_rate) {
            self.dropped = self.dropped.saturating_add(1);
            debug!(bytes = datagram.len(), "datagram_dropped");
            return;
        }
        self.queue.push_back(datagram);
    }

    /// Hands every datagram that survived the trip to the receiver.
    pub(crate) fn deliver(&mut self) -> impl Iterator<Item = Vec<u8>> + '_ {
        self.queue.drain(..)
    }

    pub(crate) fn sent(&self) -> u64 {
        self.sent
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped
    }
}
