//! JSON codec for firewall policy documents.
//!
//! Document format:
//! ```json
//! {
//!   "allowed_ports": [80, 443],
//!   "blocked_ips": ["10.0.0.13", "172.16.4.1"]
//! }
//! ```
//! Both fields are required and keep their order through an
//! export/import round trip.  Ports must fit in an unsigned 16-bit
//! integer; address validation happens in
//! [`FirewallPolicy::configure`](crate::policy::rules::FirewallPolicy::configure)
//! so that a rejected document leaves the running policy untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::address::AddressError;

/// Errors raised while parsing or applying a policy document.
///
/// Any of these means "invalid configuration": the document was refused and
/// the firewall keeps whatever rules it had before.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The text is not valid JSON for the document shape (bad syntax, missing
    /// field, wrong type, port out of range).
    #[error("malformed policy document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A `blocked_ips` entry is not a well-formed address.
    #[error("invalid blocked address '{value}'")]
    InvalidBlockedAddress {
        /// The offending entry as written in the document.
        value: String,
        #[source]
        source: AddressError,
    },
}

/// The interchange form of a firewall configuration.
///
/// This is the exact shape users import and export; the engine validates it
/// into a [`FirewallPolicy`](crate::policy::rules::FirewallPolicy) before any
/// rule takes effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Ports the firewall lets through, in document order.
    pub allowed_ports: Vec<u16>,
    /// Source addresses the firewall refuses, in document order.
    pub blocked_ips: Vec<String>,
}

impl PolicyDocument {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Malformed`] if the text is not valid JSON or
    /// does not match the document shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fyre_core::PolicyDocument;
    ///
    /// let document = PolicyDocument::from_json_str(
    ///     r#"{"allowed_ports": [80], "blocked_ips": []}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(document.allowed_ports, vec![80]);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Renders the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Malformed`] if serialisation fails.
    pub fn to_json_string(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str_parses_full_document() {
        // Arrange
        let text = r#"{"allowed_ports": [80, 443], "blocked_ips": ["10.0.0.13"]}"#;

        // Act
        let document = PolicyDocument::from_json_str(text).expect("should parse");

        // Assert
        assert_eq!(document.allowed_ports, vec![80, 443]);
        assert_eq!(document.blocked_ips, vec!["10.0.0.13".to_string()]);
    }

    #[test]
    fn test_from_json_str_parses_empty_lists() {
        // Arrange / Act
        let document =
            PolicyDocument::from_json_str(r#"{"allowed_ports": [], "blocked_ips": []}"#)
                .expect("should parse");

        // Assert
        assert!(document.allowed_ports.is_empty());
        assert!(document.blocked_ips.is_empty());
    }

    #[test]
    fn test_from_json_str_rejects_missing_field() {
        // Arrange / Act
        let result = PolicyDocument::from_json_str(r#"{"allowed_ports": [80]}"#);

        // Assert
        assert!(matches!(result, Err(PolicyError::Malformed(_))));
    }

    #[test]
    fn test_from_json_str_rejects_non_numeric_port() {
        // Arrange / Act
        let result =
            PolicyDocument::from_json_str(r#"{"allowed_ports": ["80"], "blocked_ips": []}"#);

        // Assert
        assert!(matches!(result, Err(PolicyError::Malformed(_))));
    }

    #[test]
    fn test_from_json_str_rejects_port_above_u16() {
        // Arrange / Act
        let result =
            PolicyDocument::from_json_str(r#"{"allowed_ports": [70000], "blocked_ips": []}"#);

        // Assert
        assert!(matches!(result, Err(PolicyError::Malformed(_))));
    }

    #[test]
    fn test_from_json_str_rejects_broken_syntax() {
        // Arrange / Act
        let result = PolicyDocument::from_json_str("{not json");

        // Assert
        assert!(matches!(result, Err(PolicyError::Malformed(_))));
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        // Arrange
        let original = PolicyDocument {
            allowed_ports: vec![8080, 80, 21],
            blocked_ips: vec!["10.0.0.2".to_string(), "10.0.0.1".to_string()],
        };

        // Act
        let text = original.to_json_string().expect("should serialise");
        let reparsed = PolicyDocument::from_json_str(&text).expect("should re-parse");

        // Assert
        assert_eq!(reparsed, original);
    }
}
