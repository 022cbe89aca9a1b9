//! Firewall policy module containing the decision rules and the JSON
//! document codec used to configure them.

pub mod document;
pub mod rules;

pub use document::{PolicyDocument, PolicyError};
pub use rules::{DropReason, FirewallPolicy, Verdict};
