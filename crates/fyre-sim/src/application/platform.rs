//! Platform: the node registry and firewall-membership oracle.
//!
//! The `Platform` is the engine's in-memory database of every node on the
//! canvas.  Each entry tracks:
//!
//! - Clients and servers, keyed by their unique simulated address.
//! - Firewalls, which have no address and are kept in registration order.
//!
//! # Address uniqueness (for beginners)
//!
//! Two nodes may never share an address while both are registered.  The
//! platform enforces this with a used-address set checked *before* any state
//! changes, so a rejected registration leaves no trace: either the node list
//! and the address set both gain an entry, or neither does.
//!
//! Firewalls sit outside the scheme entirely — they are filters, not
//! endpoints, so registering one can never fail.
//!
//! # Why bounds are a trait
//!
//! "Is this server behind that firewall?" depends on where the user has
//! dragged the rectangles *right now*.  The canvas owns the rectangles, the
//! platform only queries them through [`BoundsProvider`] at the moment of
//! each containment check, and nothing is cached in between.

use std::collections::HashSet;
use std::sync::Arc;

use fyre_core::{Address, Client, Firewall, NodeId, NodeKind, Rect, Server};
use thiserror::Error;

/// Read-only access to current node rectangles, supplied by the canvas.
pub trait BoundsProvider: Send + Sync {
    /// Returns the node's bounds, or `None` if the canvas has no rectangle
    /// for it.
    fn bounds_of(&self, node: NodeId) -> Option<Rect>;
}

/// Errors raised by registry operations.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// A registered node already carries this address.
    #[error("address {address} is already in use")]
    DuplicateAddress {
        /// The address the new node tried to claim.
        address: Address,
    },

    /// No client or server carries this address.
    #[error("no node registered at {address}")]
    NotFound {
        /// The address that was looked up.
        address: Address,
    },

    /// The server exists but has no service with this name.
    #[error("server {address} has no service named '{name}'")]
    ServiceNotFound {
        /// Address of the server that was addressed.
        address: Address,
        /// The missing service name.
        name: String,
    },
}

/// A resolved addressable endpoint.
///
/// Tagged by kind so callers can branch without downcasting; the common
/// accessors cover the cases where the kind does not matter.
#[derive(Debug, Clone, Copy)]
pub enum EndpointRef<'a> {
    Client(&'a Client),
    Server(&'a Server),
}

impl<'a> EndpointRef<'a> {
    /// Which kind of endpoint resolved.
    pub fn kind(&self) -> NodeKind {
        match self {
            EndpointRef::Client(_) => NodeKind::Client,
            EndpointRef::Server(_) => NodeKind::Server,
        }
    }

    /// The endpoint's canvas identity.
    pub fn id(&self) -> NodeId {
        match self {
            EndpointRef::Client(client) => client.id(),
            EndpointRef::Server(server) => server.id(),
        }
    }

    /// The endpoint's display name.
    pub fn name(&self) -> &'a str {
        match self {
            EndpointRef::Client(client) => client.name(),
            EndpointRef::Server(server) => server.name(),
        }
    }

    /// The endpoint's address.
    pub fn address(&self) -> &'a Address {
        match self {
            EndpointRef::Client(client) => client.address(),
            EndpointRef::Server(server) => server.address(),
        }
    }
}

/// In-memory registry of every node in one topology.
///
/// Single-threaded by design: every operation completes before the caller's
/// next statement.  A multi-threaded host wraps the whole platform in one
/// coarse `Mutex` (see the UI bridge) rather than locking piecemeal.
pub struct Platform {
    clients: Vec<Client>,
    servers: Vec<Server>,
    firewalls: Vec<Firewall>,
    used_addresses: HashSet<Address>,
    bounds: Arc<dyn BoundsProvider>,
}

impl Platform {
    /// Creates an empty platform reading bounds from `bounds`.
    pub fn new(bounds: Arc<dyn BoundsProvider>) -> Self {
        Self {
            clients: Vec::new(),
            servers: Vec::new(),
            firewalls: Vec::new(),
            used_addresses: HashSet::new(),
            bounds,
        }
    }

    // ── Registration ──────────────────────────────────────────────────────────

    /// Registers a client.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAddress`] if the address is taken;
    /// the client is not added.
    pub fn register_client(&mut self, client: Client) -> Result<(), RegistryError> {
        self.claim_address(client.address())?;
        tracing::info!(name = client.name(), address = %client.address(), "client registered");
        self.clients.push(client);
        Ok(())
    }

    /// Registers a server.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAddress`] if the address is taken;
    /// the server is not added.
    pub fn register_server(&mut self, server: Server) -> Result<(), RegistryError> {
        self.claim_address(server.address())?;
        tracing::info!(name = server.name(), address = %server.address(), "server registered");
        self.servers.push(server);
        Ok(())
    }

    /// Registers a firewall.  Always succeeds — firewalls have no address.
    pub fn register_firewall(&mut self, firewall: Firewall) {
        tracing::info!(name = firewall.name(), "firewall registered");
        self.firewalls.push(firewall);
    }

    /// Reserves an address, failing without side effects if it is taken.
    fn claim_address(&mut self, address: &Address) -> Result<(), RegistryError> {
        if self.used_addresses.contains(address) {
            return Err(RegistryError::DuplicateAddress {
                address: address.clone(),
            });
        }
        self.used_addresses.insert(address.clone());
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Resolves an address to its endpoint.
    ///
    /// Scans clients before servers; with the uniqueness invariant intact the
    /// order is unobservable, but it makes the tie-break deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no endpoint has this address.
    pub fn lookup_by_address(&self, address: &Address) -> Result<EndpointRef<'_>, RegistryError> {
        if let Some(client) = self.clients.iter().find(|c| c.address() == address) {
            return Ok(EndpointRef::Client(client));
        }
        if let Some(server) = self.servers.iter().find(|s| s.address() == address) {
            return Ok(EndpointRef::Server(server));
        }
        Err(RegistryError::NotFound {
            address: address.clone(),
        })
    }

    /// Resolves an address that must belong to a client.
    pub fn client_by_address(&self, address: &Address) -> Result<&Client, RegistryError> {
        self.clients
            .iter()
            .find(|c| c.address() == address)
            .ok_or_else(|| RegistryError::NotFound {
                address: address.clone(),
            })
    }

    /// Resolves an address that must belong to a server.
    pub fn server_by_address(&self, address: &Address) -> Result<&Server, RegistryError> {
        self.servers
            .iter()
            .find(|s| s.address() == address)
            .ok_or_else(|| RegistryError::NotFound {
                address: address.clone(),
            })
    }

    fn server_by_address_mut(&mut self, address: &Address) -> Result<&mut Server, RegistryError> {
        self.servers
            .iter_mut()
            .find(|s| s.address() == address)
            .ok_or_else(|| RegistryError::NotFound {
                address: address.clone(),
            })
    }

    /// Returns `true` if any registered endpoint holds this address.
    pub fn is_address_used(&self, address: &Address) -> bool {
        self.used_addresses.contains(address)
    }

    /// All clients in registration order.
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// All servers in registration order.
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// All firewalls in registration order.
    pub fn firewalls(&self) -> &[Firewall] {
        &self.firewalls
    }

    /// Looks up a firewall by canvas identity.
    pub fn firewall(&self, id: NodeId) -> Option<&Firewall> {
        self.firewalls.iter().find(|firewall| firewall.id() == id)
    }

    /// Looks up a firewall for configuration.
    pub fn firewall_mut(&mut self, id: NodeId) -> Option<&mut Firewall> {
        self.firewalls
            .iter_mut()
            .find(|firewall| firewall.id() == id)
    }

    // ── Firewall membership ───────────────────────────────────────────────────

    /// Returns the firewall whose bounds currently contain the node's bounds.
    ///
    /// Bounds are read from the canvas at call time.  When several firewalls
    /// contain the node, the first-registered one wins.  A node or firewall
    /// the canvas has no rectangle for is treated as not contained.
    pub fn firewall_containing(&self, node: NodeId) -> Option<&Firewall> {
        let node_bounds = self.bounds.bounds_of(node)?;
        self.firewalls.iter().find(|firewall| {
            self.bounds
                .bounds_of(firewall.id())
                .map_or(false, |firewall_bounds| {
                    firewall_bounds.contains(&node_bounds)
                })
        })
    }

    // ── Services ──────────────────────────────────────────────────────────────

    /// Registers a service on the server at `server_address`.
    ///
    /// The service starts running immediately; if the name already exists the
    /// call silently keeps the first registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no server has this address.
    pub fn register_service(
        &mut self,
        server_address: &Address,
        name: &str,
        port: u16,
    ) -> Result<(), RegistryError> {
        let server = self.server_by_address_mut(server_address)?;
        server.register_service(name, port);
        Ok(())
    }

    /// Starts a service.  Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown server address and
    /// [`RegistryError::ServiceNotFound`] for an unknown service name.
    pub fn start_service(
        &mut self,
        server_address: &Address,
        name: &str,
    ) -> Result<(), RegistryError> {
        let server = self.server_by_address_mut(server_address)?;
        match server.service_mut(name) {
            Some(service) => {
                service.start();
                tracing::debug!(address = %server_address, service = name, "service started");
                Ok(())
            }
            None => Err(RegistryError::ServiceNotFound {
                address: server_address.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Stops a service.  Idempotent.
    ///
    /// # Errors
    ///
    /// Same as [`start_service`](Self::start_service).
    pub fn stop_service(
        &mut self,
        server_address: &Address,
        name: &str,
    ) -> Result<(), RegistryError> {
        let server = self.server_by_address_mut(server_address)?;
        match server.service_mut(name) {
            Some(service) => {
                service.stop();
                tracing::debug!(address = %server_address, service = name, "service stopped");
                Ok(())
            }
            None => Err(RegistryError::ServiceNotFound {
                address: server_address.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Adds a source address to a service's allow-list.
    ///
    /// # Errors
    ///
    /// Same as [`start_service`](Self::start_service).
    pub fn allow_service_source(
        &mut self,
        server_address: &Address,
        name: &str,
        source: Address,
    ) -> Result<(), RegistryError> {
        let server = self.server_by_address_mut(server_address)?;
        match server.service_mut(name) {
            Some(service) => {
                service.allow_source(source);
                Ok(())
            }
            None => Err(RegistryError::ServiceNotFound {
                address: server_address.clone(),
                name: name.to_string(),
            }),
        }
    }
}
