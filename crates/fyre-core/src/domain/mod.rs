//! Domain entities for FyreFyre.
//!
//! Pure values only: everything in here can be built, compared, and tested
//! with no canvas, no config file, and no logging subscriber behind it.
//!
//! # Reading order (for beginners)
//!
//! The types stack bottom-up:
//!
//! - [`address`] – the four-octet simulated address endpoints are known by,
//!   and the allocator that mints fresh ones.
//! - [`geometry`] – the screen rectangles nodes occupy; rectangle
//!   containment is what makes a firewall "enclose" a server.
//! - [`node`] – clients, servers with their services, and firewalls.
//! - [`packet`] – the value that travels when a send is simulated.
//!
//! Outer layers (the platform registry, the router, the UI bridge) depend on
//! these types; nothing here knows those layers exist.

pub mod address;
pub mod geometry;
pub mod node;
pub mod packet;
