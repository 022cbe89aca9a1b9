//! fyre-sim: the simulation engine behind the FyreFyre canvas.
//!
//! Built as a library so the binary in `main.rs` and the integration tests
//! under `tests/` drive the exact same module tree.

pub mod application;
pub mod infrastructure;
