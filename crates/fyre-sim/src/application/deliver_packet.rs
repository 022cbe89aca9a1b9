//! PacketRouter: walks one send request to its terminal outcome.
//!
//! Everything the simulator exists to show happens here: the destination
//! address resolves through the [`Platform`], the firewall enclosing the
//! destination at this instant rules on the packet, and accepted packets
//! land in the [`PacketSink`].
//!
//! # Architecture
//!
//! The router owns nothing but its delivery sink.  Both collaborators are
//! trait objects (`PacketSink` here, `BoundsProvider` inside the platform),
//! so tests swap in recording doubles and never touch infrastructure.

use std::sync::Arc;

use fyre_core::{Address, DropReason, NodeId, NodeKind, Packet, Verdict};
use thiserror::Error;

use crate::application::platform::{EndpointRef, Platform};

/// Error type for the deliver-packet use case.
#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    /// No client or server is registered at the destination address.
    #[error("destination {address} not found")]
    DestinationNotFound {
        /// The address the packet was sent to.
        address: Address,
    },
}

/// Trait for surfacing a delivered packet to the UI layer.
///
/// Infrastructure implementations print or render; test implementations
/// record calls.  The router never reads anything back — delivery display is
/// fire-and-forget.
pub trait PacketSink: Send + Sync {
    /// Called exactly once per successful delivery.
    fn packet_received(&self, node: NodeId, kind: NodeKind, packet: &Packet);
}

/// Terminal outcome of one send.
///
/// Both variants are successes: a dropped packet means an interposing
/// firewall did its job, not that the engine failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The packet reached the destination's receive sink.
    Delivered {
        /// Canvas identity of the destination node.
        destination: NodeId,
        /// Whether the destination is a client or a server.
        kind: NodeKind,
    },
    /// An interposing firewall refused the packet; the sink was never called.
    Dropped {
        /// Canvas identity of the deciding firewall.
        firewall: NodeId,
        /// Why the packet was refused.
        reason: DropReason,
    },
}

/// The Deliver Packet use case.
///
/// One send is exactly one resolve, at most one policy evaluation, and at
/// most one delivery.  There are no retries and no queues.
pub struct PacketRouter {
    sink: Arc<dyn PacketSink>,
}

impl PacketRouter {
    /// Creates a router delivering through `sink`.
    pub fn new(sink: Arc<dyn PacketSink>) -> Self {
        Self { sink }
    }

    /// Sends one packet from `source` to `destination`.
    ///
    /// The firewall check applies to the *destination* only: a sender sitting
    /// inside a firewall is not filtered on the way out.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::DestinationNotFound`] if no endpoint holds the
    /// destination address; the sink is not invoked.
    pub fn send(
        &self,
        platform: &Platform,
        source: Address,
        destination: Address,
        destination_port: u16,
        source_port: u16,
        payload: Vec<u8>,
    ) -> Result<Delivery, RouteError> {
        let endpoint = platform
            .lookup_by_address(&destination)
            .map_err(|_| RouteError::DestinationNotFound {
                address: destination.clone(),
            })?;
        tracing::debug!(
            destination = %destination,
            kind = %endpoint.kind(),
            name = endpoint.name(),
            "destination resolved"
        );

        let packet = Packet::new(source, destination, destination_port, source_port, payload);

        match platform.firewall_containing(endpoint.id()) {
            Some(firewall) => match firewall.policy().evaluate(&packet) {
                Verdict::Accept => {
                    tracing::debug!(
                        firewall = firewall.name(),
                        destination = %packet.destination,
                        port = packet.destination_port,
                        "firewall accepted packet"
                    );
                    Ok(self.deliver(endpoint, &packet))
                }
                Verdict::Drop(reason) => {
                    tracing::info!(
                        firewall = firewall.name(),
                        destination = %packet.destination,
                        port = packet.destination_port,
                        %reason,
                        "packet dropped"
                    );
                    Ok(Delivery::Dropped {
                        firewall: firewall.id(),
                        reason,
                    })
                }
            },
            // No enclosing firewall: deliver unconditionally
            None => Ok(self.deliver(endpoint, &packet)),
        }
    }

    fn deliver(&self, endpoint: EndpointRef<'_>, packet: &Packet) -> Delivery {
        self.sink.packet_received(endpoint.id(), endpoint.kind(), packet);
        tracing::info!(
            destination = %packet.destination,
            kind = %endpoint.kind(),
            port = packet.destination_port,
            "packet delivered"
        );
        Delivery::Delivered {
            destination: endpoint.id(),
            kind: endpoint.kind(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::platform::BoundsProvider;
    use fyre_core::{Client, Firewall, PolicyDocument, Rect, Server};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingSink {
        received: Mutex<Vec<(NodeId, NodeKind, Packet)>>,
    }

    impl PacketSink for RecordingSink {
        fn packet_received(&self, node: NodeId, kind: NodeKind, packet: &Packet) {
            self.received
                .lock()
                .unwrap()
                .push((node, kind, packet.clone()));
        }
    }

    #[derive(Default)]
    struct FakeCanvas {
        rects: Mutex<HashMap<NodeId, Rect>>,
    }

    impl FakeCanvas {
        fn set(&self, node: NodeId, x: i32, y: i32, width: u32, height: u32) {
            self.rects.lock().unwrap().insert(
                node,
                Rect {
                    x,
                    y,
                    width,
                    height,
                },
            );
        }
    }

    impl BoundsProvider for FakeCanvas {
        fn bounds_of(&self, node: NodeId) -> Option<Rect> {
            self.rects.lock().unwrap().get(&node).cloned()
        }
    }

    fn address(text: &str) -> Address {
        text.parse().expect("test address should parse")
    }

    /// One client at 10.0.0.9, one server at 10.0.0.1 behind a firewall
    /// allowing only port 80.
    struct Topology {
        canvas: Arc<FakeCanvas>,
        platform: Platform,
        router: PacketRouter,
        sink: Arc<RecordingSink>,
        server_id: NodeId,
        firewall_id: NodeId,
    }

    fn make_guarded_topology() -> Topology {
        let canvas = Arc::new(FakeCanvas::default());
        let sink = Arc::new(RecordingSink::default());
        let mut platform = Platform::new(Arc::clone(&canvas) as Arc<dyn BoundsProvider>);
        let router = PacketRouter::new(Arc::clone(&sink) as Arc<dyn PacketSink>);

        let client = Client::new("Client", address("10.0.0.9"));
        let client_id = client.id();
        platform.register_client(client).unwrap();

        let server = Server::new("Server", address("10.0.0.1"));
        let server_id = server.id();
        platform.register_server(server).unwrap();

        let mut firewall = Firewall::new("Firewall");
        firewall
            .policy_mut()
            .configure(&PolicyDocument {
                allowed_ports: vec![80],
                blocked_ips: vec![],
            })
            .unwrap();
        let firewall_id = firewall.id();
        platform.register_firewall(firewall);

        // Client outside, server inside the firewall rectangle
        canvas.set(client_id, 100, 100, 120, 60);
        canvas.set(firewall_id, 300, 300, 250, 250);
        canvas.set(server_id, 350, 400, 120, 60);

        Topology {
            canvas,
            platform,
            router,
            sink,
            server_id,
            firewall_id,
        }
    }

    fn send(
        topology: &Topology,
        source: &str,
        destination: &str,
        port: u16,
    ) -> Result<Delivery, RouteError> {
        topology.router.send(
            &topology.platform,
            address(source),
            address(destination),
            port,
            49152,
            format!("curl {destination}:{port}").into_bytes(),
        )
    }

    // ── Firewall-mediated delivery ────────────────────────────────────────────

    #[test]
    fn test_allowed_port_is_delivered_exactly_once() {
        // Arrange
        let topology = make_guarded_topology();

        // Act
        let delivery = send(&topology, "10.0.0.9", "10.0.0.1", 80).unwrap();

        // Assert
        assert_eq!(
            delivery,
            Delivery::Delivered {
                destination: topology.server_id,
                kind: NodeKind::Server,
            }
        );
        let received = topology.sink.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, topology.server_id);
        assert_eq!(received[0].2.destination_port, 80);
        assert_eq!(received[0].2.source, address("10.0.0.9"));
    }

    #[test]
    fn test_disallowed_port_is_dropped_before_the_sink() {
        // Arrange
        let topology = make_guarded_topology();

        // Act
        let delivery = send(&topology, "10.0.0.9", "10.0.0.1", 22).unwrap();

        // Assert
        assert_eq!(
            delivery,
            Delivery::Dropped {
                firewall: topology.firewall_id,
                reason: DropReason::PortNotAllowed,
            }
        );
        assert!(topology.sink.received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_blocked_source_is_dropped_on_allowed_port() {
        // Arrange
        let mut topology = make_guarded_topology();
        let firewall_id = topology.firewall_id;
        topology
            .platform
            .firewall_mut(firewall_id)
            .unwrap()
            .policy_mut()
            .configure(&PolicyDocument {
                allowed_ports: vec![80],
                blocked_ips: vec!["10.0.0.9".to_string()],
            })
            .unwrap();

        // Act
        let delivery = send(&topology, "10.0.0.9", "10.0.0.1", 80).unwrap();

        // Assert
        assert_eq!(
            delivery,
            Delivery::Dropped {
                firewall: firewall_id,
                reason: DropReason::SourceBlocked,
            }
        );
        assert!(topology.sink.received.lock().unwrap().is_empty());
    }

    // ── Unguarded delivery ────────────────────────────────────────────────────

    #[test]
    fn test_destination_outside_every_firewall_is_delivered_unconditionally() {
        // Arrange – drag the server out of the firewall; its policy would
        // drop port 22, so delivery proves no policy ran
        let topology = make_guarded_topology();
        topology.canvas.set(topology.server_id, 600, 100, 120, 60);

        // Act
        let delivery = send(&topology, "10.0.0.9", "10.0.0.1", 22).unwrap();

        // Assert
        assert_eq!(
            delivery,
            Delivery::Delivered {
                destination: topology.server_id,
                kind: NodeKind::Server,
            }
        );
        assert_eq!(topology.sink.received.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sender_inside_a_firewall_is_not_filtered_on_the_way_out() {
        // Arrange – move the CLIENT inside the firewall and the server out;
        // only the destination's containment matters
        let topology = make_guarded_topology();
        let client_id = topology.platform.clients()[0].id();
        topology.canvas.set(client_id, 350, 350, 100, 50);
        topology.canvas.set(topology.server_id, 600, 100, 120, 60);

        // Act – port 22 is not in the firewall's allow-list
        let delivery = send(&topology, "10.0.0.9", "10.0.0.1", 22).unwrap();

        // Assert
        assert!(matches!(delivery, Delivery::Delivered { .. }));
    }

    #[test]
    fn test_client_destination_receives_like_a_server() {
        // Arrange – a second client outside the firewall as destination
        let mut topology = make_guarded_topology();
        let peer = Client::new("Peer", address("10.0.0.10"));
        let peer_id = peer.id();
        topology.platform.register_client(peer).unwrap();
        topology.canvas.set(peer_id, 600, 100, 120, 60);

        // Act
        let delivery = send(&topology, "10.0.0.9", "10.0.0.10", 9000).unwrap();

        // Assert
        assert_eq!(
            delivery,
            Delivery::Delivered {
                destination: peer_id,
                kind: NodeKind::Client,
            }
        );
    }

    // ── Failure paths ─────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_destination_propagates_not_found() {
        // Arrange
        let topology = make_guarded_topology();

        // Act
        let result = send(&topology, "10.0.0.9", "10.99.99.99", 80);

        // Assert
        assert_eq!(
            result,
            Err(RouteError::DestinationNotFound {
                address: address("10.99.99.99"),
            })
        );
        assert!(topology.sink.received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drop_reason_survives_into_the_result() {
        // Arrange
        let topology = make_guarded_topology();

        // Act
        let delivery = send(&topology, "10.0.0.9", "10.0.0.1", 21).unwrap();

        // Assert
        match delivery {
            Delivery::Dropped { reason, .. } => {
                assert_eq!(reason, DropReason::PortNotAllowed);
                assert_eq!(reason.to_string(), "port not allowed");
            }
            other => panic!("expected a drop, got {other:?}"),
        }
    }
}
