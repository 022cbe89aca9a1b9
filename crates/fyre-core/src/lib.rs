//! # fyre-core
//!
//! Shared library for FyreFyre containing the domain entities (addresses,
//! canvas rectangles, nodes, packets) and the firewall policy engine with its
//! JSON document codec.
//!
//! This crate is used by the simulation crate and by any future UI shell.
//! It has zero dependencies on OS APIs, UI frameworks, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! FyreFyre is a visual network toy: you drop clients, servers, and firewalls
//! onto a canvas and "send" packets between them.  Nothing ever touches a real
//! network — a packet is delivered when a server's rectangle is reachable
//! under the rules of whichever firewall rectangle encloses it.
//!
//! This crate (`fyre-core`) is the foundation.  It defines:
//!
//! - **`domain`** – Pure values with no I/O.  Addresses that look like IPv4
//!   but are only identities, the `Rect` geometry used for the containment
//!   test ("is this server behind that firewall?"), the node entities, and
//!   the ephemeral `Packet`.
//!
//! - **`policy`** – The firewall decision engine.  A `FirewallPolicy` holds an
//!   allow-list of ports and a block-list of source addresses and answers
//!   accept/drop for one packet at a time.  Policies are configured from a
//!   small JSON document; the codec and its validation live here too.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod policy;

// Re-export the most-used types at the crate root so callers can write
// `fyre_core::Address` instead of `fyre_core::domain::address::Address`.
pub use domain::address::{Address, AddressAllocator, AddressError};
pub use domain::geometry::Rect;
pub use domain::node::{Client, Firewall, NodeId, NodeKind, Server, Service, ServiceState};
pub use domain::packet::Packet;
pub use policy::document::{PolicyDocument, PolicyError};
pub use policy::rules::{DropReason, FirewallPolicy, Verdict};
