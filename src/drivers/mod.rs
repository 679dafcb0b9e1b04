//! Hardware drivers — dumb actuators and sensors with no policy.
//!
//! Each driver tracks its own state in memory and drives the real
//! peripheral through the `hw_init` register helpers. On non-espidf
//! builds the helpers are no-op stubs, so every driver compiles and
//! behaves deterministically in host tests.

pub mod encoder;
pub mod hw_init;
pub mod motor;
pub mod servo_brake;
