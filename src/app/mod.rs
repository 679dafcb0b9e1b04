//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the TractionBox trainer:
//! sequence orchestration, inbound message dispatch, and acknowledgement
//! routing. All interaction with hardware and the operator link happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals or sockets.

pub mod events;
pub mod ports;
pub mod service;
