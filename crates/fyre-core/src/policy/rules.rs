//! Firewall decision rules.
//!
//! A policy is two lists: ports that may pass and source addresses that may
//! not.  Evaluation order is fixed and observable — the port check always
//! runs first, so a packet to a disallowed port reports `PortNotAllowed`
//! even when its source is also blocked.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::address::Address;
use crate::domain::packet::Packet;
use crate::policy::document::{PolicyDocument, PolicyError};

/// Why a firewall refused a packet.
///
/// Drop reasons are ordinary outcomes, not errors: a dropped packet means the
/// policy did its job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The destination port is not on the allow-list.
    PortNotAllowed,
    /// The source address is on the block-list.
    SourceBlocked,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::PortNotAllowed => write!(f, "port not allowed"),
            DropReason::SourceBlocked => write!(f, "source blocked"),
        }
    }
}

/// The firewall's answer for one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Let the packet through to its destination.
    Accept,
    /// Refuse the packet; delivery never happens.
    Drop(DropReason),
}

/// Per-firewall packet filter rules.
///
/// A fresh policy is empty, and an empty allow-list passes no port at all —
/// a firewall filters everything until somebody configures it.  Both lists
/// keep document order so that an exported policy reads back the way it was
/// written.
#[derive(Debug, Clone, Default)]
pub struct FirewallPolicy {
    allowed_ports: Vec<u16>,
    blocked_sources: Vec<Address>,
}

impl FirewallPolicy {
    /// Replaces the whole configuration from a validated document.
    ///
    /// Validation happens before any state changes: if one `blocked_ips`
    /// entry fails to parse, the previous configuration stays in force and
    /// the error describes the offending entry.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidBlockedAddress`] for a `blocked_ips`
    /// entry that is not a well-formed address.
    pub fn configure(&mut self, document: &PolicyDocument) -> Result<(), PolicyError> {
        let mut blocked_sources = Vec::with_capacity(document.blocked_ips.len());
        for value in &document.blocked_ips {
            let address = value
                .parse()
                .map_err(|source| PolicyError::InvalidBlockedAddress {
                    value: value.clone(),
                    source,
                })?;
            blocked_sources.push(address);
        }

        self.allowed_ports = document.allowed_ports.clone();
        self.blocked_sources = blocked_sources;
        tracing::debug!(
            allowed_ports = ?self.allowed_ports,
            blocked_sources = self.blocked_sources.len(),
            "firewall policy configured"
        );
        Ok(())
    }

    /// Decides accept or drop for one packet.
    ///
    /// The port check precedes the source check.
    pub fn evaluate(&self, packet: &Packet) -> Verdict {
        if !self.allowed_ports.contains(&packet.destination_port) {
            return Verdict::Drop(DropReason::PortNotAllowed);
        }
        if self.blocked_sources.contains(&packet.source) {
            return Verdict::Drop(DropReason::SourceBlocked);
        }
        Verdict::Accept
    }

    /// Renders the current configuration back into document form.
    pub fn export(&self) -> PolicyDocument {
        PolicyDocument {
            allowed_ports: self.allowed_ports.clone(),
            blocked_ips: self
                .blocked_sources
                .iter()
                .map(Address::to_string)
                .collect(),
        }
    }
}
