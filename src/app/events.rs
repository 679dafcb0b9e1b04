//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial today, feed a trace buffer
//! or console UI tomorrow.

use crate::protocol::{AckLabel, EventLabel};
use crate::sequence::PhaseId;
use crate::sequence::context::BrakeAction;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries initial phase).
    Started(PhaseId),

    /// A new run was armed with table entry `table_index`.
    SequenceArmed { table_index: usize },

    /// The sequence machine changed phase.
    PhaseChanged { from: PhaseId, to: PhaseId },

    /// A stage/event label was sent to the operator console.
    LabelSent(EventLabel),

    /// A pending wait was resolved by this acknowledgement.
    AckReceived(AckLabel),

    /// A bounded wait expired; the run was aborted fail-safe.
    AckTimedOut,

    /// The brake was driven.
    BrakeDriven(BrakeAction),

    /// Operator `Stop` processed. `cancelled` reflects the configured
    /// stop semantics (brake-only pause vs full run cancellation).
    Stopped { cancelled: bool },

    /// Operator `Winding` processed; wind-back motor pulsed.
    RewindRequested,
}
