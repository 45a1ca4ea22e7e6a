//! sori-core — Pure types and text processing.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod extract;
pub mod filename;
pub mod manifest;
pub mod rate;
pub mod record;
pub mod types;
