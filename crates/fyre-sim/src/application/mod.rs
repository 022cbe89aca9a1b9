//! Application layer use cases for the simulation engine.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The domain crate (`fyre-core`) knows the rules — what a valid address
//! looks like, when a policy drops a packet.  The infrastructure knows the
//! outside world — files, logging, the canvas shell.  The application layer
//! in between turns one user goal into one orchestrated walk over domain
//! objects, and talks to the outside world only through traits it defines
//! itself (`BoundsProvider`, `PacketSink`).  Nothing in here opens a file or
//! touches the OS.
//!
//! # Sub-modules
//!
//! - **`platform`** – The registry of every node in the topology: address
//!   uniqueness, lookup by address, and the firewall-membership query that
//!   reads live canvas bounds.
//!
//! - **`deliver_packet`** – Builds a packet from a send request, runs it past
//!   the interposing firewall, and hands it to the destination's receive
//!   sink.  Every send in the simulator funnels through here.

pub mod deliver_packet;
pub mod platform;
