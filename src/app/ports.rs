//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (encoder, servo brake, UDP link, event sinks) implement
//! these traits. The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never touches hardware directly.

use crate::protocol::RawMessage;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain the pull displacement.
pub trait SensorPort {
    /// Instantaneous displacement sample, in encoder distance units.
    /// No averaging or filtering; the sequence machine consumes raw samples.
    fn read_distance(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: discrete actuation commands. The brake servo has no
/// feedback channel, so all methods are fire-and-forget.
pub trait ActuatorPort {
    /// Full brake lock.
    fn lock(&mut self);

    /// Partial hold — resistance without a hard stop.
    fn weak_hold(&mut self);

    /// Free-running.
    fn release(&mut self);

    /// Wind the tether back onto the spool (the `Winding` command path,
    /// unrelated to the sequence machine).
    fn rewind(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Message port (driven adapter: domain ↔ operator link)
// ───────────────────────────────────────────────────────────────

/// Best-effort, single-peer duplex text channel.
///
/// The adapter owns the peer endpoint: it remembers the source of the most
/// recent inbound datagram and targets it for every send. There is exactly
/// one tracked peer — the device does not support concurrent sessions.
pub trait MessagePort {
    /// Pop the next pending inbound message, whitespace-trimmed, in
    /// arrival order. `None` when the channel is drained.
    fn poll_message(&mut self) -> Option<RawMessage>;

    /// Send a line to the current peer. Silently dropped when no peer has
    /// ever been observed (best-effort, matching the transport contract).
    fn send(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log today; a
/// future console UI or trace buffer would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
