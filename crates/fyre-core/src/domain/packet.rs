//! The ephemeral packet value.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::domain::address::Address;

/// One simulated packet.
///
/// A packet exists only for the duration of a single send: it is built by the
/// router, evaluated by at most one firewall, handed to at most one receive
/// sink, and then dropped on the floor.  Nothing persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Address of the sending node.
    pub source: Address,
    /// Address the packet is trying to reach.
    pub destination: Address,
    /// Destination port; the value firewall allow-lists are checked against.
    pub destination_port: u16,
    /// Source port on the sending node.
    pub source_port: u16,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

impl Packet {
    /// Builds a packet.
    pub fn new(
        source: Address,
        destination: Address,
        destination_port: u16,
        source_port: u16,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            source,
            destination,
            destination_port,
            source_port,
            payload,
        }
    }

    /// The payload as text, with invalid UTF-8 replaced.
    ///
    /// Display helper for sinks and logs; the engine never interprets
    /// payload bytes.
    pub fn payload_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
