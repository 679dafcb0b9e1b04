//! TractionBox firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by the `espidf`
//! cargo feature within each module, so host builds and `cargo test`
//! never touch the toolchain-specific crates.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod protocol;
pub mod sequence;

mod error;
mod pins;

pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
