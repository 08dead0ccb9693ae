//! Remote call surface between owning clients and the authority.
//!
//! Calls are one-way datagrams: no acknowledgement, no sequence numbers and
//! no redelivery. A datagram that fails to decode is simply dropped by the
//! receiver.

use bincode::Options;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CharacterId, ClientId};

/// Upper bound on the size of a single intent datagram.
pub const MAX_DATAGRAM_BYTES: u64 = 256;

/// Action requested by an owning client for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Per-frame locomotion input.
    Movement {
        /// Travel direction, expected to be unit length or zero.
        direction: Vec3,
        /// Whether the run modifier was active.
        running: bool,
    },
    /// Request to play the attack animation.
    Attack,
    /// Request to dash along a direction.
    Dash {
        /// Dash direction; normalised by the authority.
        direction: Vec3,
    },
}

/// Addressed remote call as it travels over the wire.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentEnvelope {
    /// Sending client.
    pub client: ClientId,
    /// Character the call addresses.
    pub character: CharacterId,
    /// Requested action.
    pub intent: Intent,
}

impl IntentEnvelope {
    /// Creates a new envelope.
    #[must_use]
    pub const fn new(client: ClientId, character: CharacterId, intent: Intent) -> Self {
        Self {
            client,
            character,
            intent,
        }
    }

    /// Encodes the envelope into a datagram.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        codec().serialize(self).map_err(WireError::Encode)
    }

    /// Decodes a datagram produced by [`Self::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.is_empty() {
            return Err(WireError::Empty);
        }
        codec().deserialize(bytes).map_err(WireError::Decode)
    }
}

/// Errors raised while moving envelopes across the wire.
#[derive(Debug, Error)]
pub enum WireError {
    /// The datagram carried no bytes.
    #[error("intent datagram was empty")]
    Empty,
    /// The envelope could not be serialised.
    #[error("could not encode intent datagram: {0}")]
    Encode(#[source] bincode::Error),
    /// The datagram was truncated, oversized or otherwise malformed.
    #[error("could not decode intent datagram: {0}")]
    Decode(#[source] bincode::Error),
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_DATAGRAM_BYTES)
        .reject_trailing_bytes()
}
