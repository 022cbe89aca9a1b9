//! Console delivery log.
//!
//! The simulator has no real network, so "receiving" a packet means
//! printing a line about it.  This sink is the default [`PacketSink`]
//! wired into the router; tests substitute their own recording sinks.

use fyre_core::{NodeId, NodeKind, Packet};

use crate::application::deliver_packet::PacketSink;

/// Logs every delivered packet through `tracing`.
pub struct ConsoleSink;

impl PacketSink for ConsoleSink {
    fn packet_received(&self, node: NodeId, kind: NodeKind, packet: &Packet) {
        tracing::info!(
            %node,
            %kind,
            source = %packet.source,
            port = packet.destination_port,
            payload = %packet.payload_text(),
            "packet received"
        );
    }
}
