//! Node entities: clients, servers (with their services), and firewalls.
//!
//! Clients and servers are addressable endpoints; a firewall is a
//! pass-through filter with no address of its own.  None of these types know
//! where they sit on the canvas — bounds belong to the UI layer and reach the
//! engine only through a rectangle query at containment time.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::address::Address;
use crate::policy::rules::FirewallPolicy;

/// Unique identifier for any node on the canvas, derived from UUID v4.
///
/// Identity is separate from addressing on purpose: firewalls have no
/// address, yet the canvas still needs to name their rectangles.
pub type NodeId = Uuid;

/// The three kinds of node a topology can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Client,
    Server,
    Firewall,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Client => write!(f, "client"),
            NodeKind::Server => write!(f, "server"),
            NodeKind::Firewall => write!(f, "firewall"),
        }
    }
}

/// An addressable endpoint that originates packets.
#[derive(Debug, Clone)]
pub struct Client {
    id: NodeId,
    name: String,
    address: Address,
}

impl Client {
    /// Creates a client with a fresh id.
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address,
        }
    }

    /// Unique canvas identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Simulated address.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Run state of a [`Service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Stopped,
    Running,
}

/// A named listener bound to one port of one server.
///
/// Purely simulated: a service never accepts connections, it is state the
/// topology displays.  Services start in the `Running` state the moment they
/// are registered.
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    port: u16,
    state: ServiceState,
    allowed_sources: BTreeSet<Address>,
}

impl Service {
    fn new(name: String, port: u16) -> Self {
        Self {
            name,
            port,
            state: ServiceState::Running,
            allowed_sources: BTreeSet::new(),
        }
    }

    /// Service name, unique within its server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Port the service listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Current run state.
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Marks the service running.  Idempotent.
    pub fn start(&mut self) {
        self.state = ServiceState::Running;
    }

    /// Marks the service stopped.  Idempotent.
    pub fn stop(&mut self) {
        self.state = ServiceState::Stopped;
    }

    /// Adds an address to the allow-list.  Re-adding is harmless.
    pub fn allow_source(&mut self, address: Address) {
        self.allowed_sources.insert(address);
    }

    /// Returns `true` if `address` may use this service.
    ///
    /// An empty allow-list means unrestricted.
    pub fn allows_source(&self, address: &Address) -> bool {
        self.allowed_sources.is_empty() || self.allowed_sources.contains(address)
    }

    /// The allow-list in address order.
    pub fn allowed_sources(&self) -> &BTreeSet<Address> {
        &self.allowed_sources
    }
}

/// An addressable endpoint that hosts services and receives packets.
#[derive(Debug, Clone)]
pub struct Server {
    id: NodeId,
    name: String,
    address: Address,
    services: Vec<Service>,
}

impl Server {
    /// Creates a server with a fresh id and no services.
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address,
            services: Vec::new(),
        }
    }

    /// Unique canvas identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Simulated address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Registers a service and starts it immediately.
    ///
    /// If a service with that name already exists the call is silently
    /// ignored: the first registration wins and the existing service keeps
    /// its port and state.
    pub fn register_service(&mut self, name: &str, port: u16) {
        if self.service(name).is_some() {
            tracing::debug!(
                server = %self.name,
                service = name,
                "service already registered; keeping the first registration"
            );
            return;
        }
        self.services.push(Service::new(name.to_string(), port));
    }

    /// All services in registration order.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Looks up a service by name.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.name == name)
    }

    /// Looks up a service by name for mutation.
    pub fn service_mut(&mut self, name: &str) -> Option<&mut Service> {
        self.services
            .iter_mut()
            .find(|service| service.name == name)
    }
}

/// A pass-through packet filter with no address.
///
/// A firewall applies to whichever nodes sit entirely inside its rectangle at
/// the moment a packet is routed.  Its policy starts empty, which allows no
/// port until the firewall is configured.
#[derive(Debug, Clone)]
pub struct Firewall {
    id: NodeId,
    name: String,
    policy: FirewallPolicy,
}

impl Firewall {
    /// Creates a firewall with a fresh id and an empty policy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            policy: FirewallPolicy::default(),
        }
    }

    /// Unique canvas identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The packet filter rules.
    pub fn policy(&self) -> &FirewallPolicy {
        &self.policy
    }

    /// Mutable access for configuration.
    pub fn policy_mut(&mut self) -> &mut FirewallPolicy {
        &mut self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(text: &str) -> Address {
        text.parse().expect("test address should parse")
    }

    #[test]
    fn test_new_nodes_get_distinct_ids() {
        // Arrange / Act
        let first = Client::new("Client", address("10.0.0.1"));
        let second = Client::new("Client", address("10.0.0.2"));
        let server = Server::new("Server", address("10.0.0.3"));
        let firewall = Firewall::new("Firewall");

        // Assert
        assert_ne!(first.id(), second.id());
        assert_ne!(first.id(), server.id());
        assert_ne!(server.id(), firewall.id());
    }

    #[test]
    fn test_register_service_starts_it_running() {
        // Arrange
        let mut server = Server::new("Server", address("10.0.0.1"));

        // Act
        server.register_service("website", 80);

        // Assert
        let service = server.service("website").expect("service should exist");
        assert_eq!(service.port(), 80);
        assert_eq!(service.state(), ServiceState::Running);
    }

    #[test]
    fn test_register_service_ignores_duplicate_name() {
        // Arrange
        let mut server = Server::new("Server", address("10.0.0.1"));
        server.register_service("website", 80);

        // Act – same name, different port; the first registration must win
        server.register_service("website", 8080);

        // Assert
        assert_eq!(server.services().len(), 1);
        assert_eq!(server.service("website").map(Service::port), Some(80));
    }

    #[test]
    fn test_register_service_keeps_registration_order() {
        // Arrange
        let mut server = Server::new("Server", address("10.0.0.1"));

        // Act
        server.register_service("website", 80);
        server.register_service("ssh", 22);
        server.register_service("ftp", 21);

        // Assert
        let names: Vec<&str> = server.services().iter().map(Service::name).collect();
        assert_eq!(names, vec!["website", "ssh", "ftp"]);
    }

    #[test]
    fn test_service_start_and_stop_are_idempotent() {
        // Arrange
        let mut server = Server::new("Server", address("10.0.0.1"));
        server.register_service("ssh", 22);
        let service = server.service_mut("ssh").expect("service should exist");

        // Act / Assert – double stop then double start, no state surprises
        service.stop();
        service.stop();
        assert_eq!(service.state(), ServiceState::Stopped);

        service.start();
        service.start();
        assert_eq!(service.state(), ServiceState::Running);
    }

    #[test]
    fn test_empty_allow_list_is_unrestricted() {
        // Arrange
        let mut server = Server::new("Server", address("10.0.0.1"));
        server.register_service("website", 80);
        let service = server.service("website").expect("service should exist");

        // Act / Assert
        assert!(service.allows_source(&address("172.16.0.9")));
    }

    #[test]
    fn test_allow_list_restricts_once_populated() {
        // Arrange
        let mut server = Server::new("Server", address("10.0.0.1"));
        server.register_service("website", 80);
        let service = server.service_mut("website").expect("service should exist");

        // Act
        service.allow_source(address("10.0.0.2"));
        service.allow_source(address("10.0.0.2"));

        // Assert – duplicates collapse, listed passes, unlisted fails
        assert_eq!(service.allowed_sources().len(), 1);
        assert!(service.allows_source(&address("10.0.0.2")));
        assert!(!service.allows_source(&address("10.0.0.3")));
    }

    #[test]
    fn test_new_firewall_has_empty_policy() {
        // Arrange / Act
        let firewall = Firewall::new("Firewall");
        let document = firewall.policy().export();

        // Assert
        assert!(document.allowed_ports.is_empty());
        assert!(document.blocked_ips.is_empty());
    }
}
