//! Storage infrastructure: everything the simulator keeps on disk.
//!
//! Two unrelated file formats live behind this module, each with its own
//! failure contract:
//!
//! - `config`: the TOML application configuration (canvas size, default
//!   service catalogue), read from the platform-appropriate directory.  A
//!   missing file is normal — first run gets defaults.
//! - `policy_file`: import and export of firewall rule documents as JSON at
//!   user-chosen paths.  A missing file here is an error, because the user
//!   asked for that specific document.
//!
//! Nothing outside this module touches the file system, so swapping a format
//! stays a local change.

pub mod config;
pub mod policy_file;
