//! Infrastructure layer for the simulator.
//!
//! Adapters that face the host rather than the simulation: the canvas
//! geometry store the shell writes into, the console delivery log, config
//! and policy files on disk, and the command bridge the shell calls.
//!
//! **Dependency rule**: code here may use `application` and `fyre_core`;
//! neither of those layers may import anything from here.

pub mod canvas;
pub mod console;
pub mod storage;
pub mod ui_bridge;
