//! Simulated IPv4-shaped addresses and the allocator that mints them.
//!
//! # Addresses in FyreFyre (for beginners)
//!
//! Every client and server on the canvas carries an address that *looks* like
//! IPv4 ("203.0.113.7") but never touches a network card.  The address is pure
//! identity: the platform keys its lookup table on it and firewall block-lists
//! match against it.  Firewalls themselves have no address — they are filters,
//! not endpoints.
//!
//! Two pieces share the work:
//!
//! - [`Address`] is the validated value type.  If you hold one, it is
//!   well-formed: four dot-separated octets, each 0–255.
//! - [`AddressAllocator`] mints random addresses.  It promises a well-formed
//!   value, **not** a unique one; uniqueness is enforced by the platform when
//!   a node registers.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing address text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The text does not split into exactly four dot-separated segments.
    #[error("'{text}' must have four dot-separated octets, found {found} segment(s)")]
    SegmentCount {
        /// The full text that failed to parse.
        text: String,
        /// How many segments the split produced.
        found: usize,
    },

    /// A segment is empty or contains a non-digit character.
    #[error("octet '{segment}' in '{text}' is not a plain decimal number")]
    NotANumber {
        /// The full text that failed to parse.
        text: String,
        /// The offending segment.
        segment: String,
    },

    /// A segment is numeric but does not fit in 0–255.
    #[error("octet '{segment}' in '{text}' is out of range (0-255)")]
    OctetOutOfRange {
        /// The full text that failed to parse.
        text: String,
        /// The offending segment.
        segment: String,
    },
}

/// A simulated IPv4-shaped address: four octets, each 0–255.
///
/// Construct one by parsing (`"10.0.0.1".parse::<Address>()?`) or through
/// [`AddressAllocator::generate`].  Serialises as its dotted string form so
/// that policy documents and UI payloads stay human-readable.
///
/// # Examples
///
/// ```rust
/// use fyre_core::Address;
///
/// let address: Address = "10.0.0.1".parse().unwrap();
/// assert_eq!(address.to_string(), "10.0.0.1");
/// assert!("10.0.0".parse::<Address>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 4]);

impl Address {
    /// Builds an address directly from four octets.
    ///
    /// Always well-formed: every `u8` is a valid octet.
    pub fn from_octets(octets: [u8; 4]) -> Self {
        Self(octets)
    }

    /// Returns the four octets.
    pub fn octets(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = text.split('.').collect();
        if segments.len() != 4 {
            return Err(AddressError::SegmentCount {
                text: text.to_string(),
                found: segments.len(),
            });
        }

        let mut octets = [0u8; 4];
        for (slot, segment) in octets.iter_mut().zip(&segments) {
            // `u8::from_str` tolerates a leading '+'; addresses do not.
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AddressError::NotANumber {
                    text: text.to_string(),
                    segment: segment.to_string(),
                });
            }
            *slot = segment
                .parse()
                .map_err(|_| AddressError::OctetOutOfRange {
                    text: text.to_string(),
                    segment: segment.to_string(),
                })?;
        }
        Ok(Self(octets))
    }
}

// String conversions for serde: an `Address` travels as "a.b.c.d" in JSON and
// TOML, and deserialisation runs the same validation as `FromStr`.
impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Mints random simulated addresses.
///
/// Each call to [`generate`](Self::generate) draws four independently uniform
/// octets.  Collisions are possible and expected to be handled at registration
/// time, not here.
pub struct AddressAllocator {
    rng: StdRng,
}

impl AddressAllocator {
    /// Creates an allocator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates an allocator with a fixed seed.
    ///
    /// Two allocators built from the same seed generate the same sequence of
    /// addresses, which keeps tests and scripted demos reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produces one random address.
    pub fn generate(&mut self) -> Address {
        let address = Address::from_octets(self.rng.gen());
        tracing::debug!(%address, "allocated simulated address");
        address
    }
}

impl Default for AddressAllocator {
    fn default() -> Self {
        Self::new()
    }
}
